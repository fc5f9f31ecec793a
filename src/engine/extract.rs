// ==========================================
// 冷链仓储计费结算 - 数量提取器
// ==========================================
// 从异构表单载荷中提取计费数量的纯函数集
// 红线: 提取器不报错, 数值缺失一律按 0; 过滤与布局差异全部收敛在此
// ==========================================

use crate::config::BillingTables;
use crate::domain::{
    CalculationBase, FormOperation, ItemRow, ItemsLayout, VehicleGroup, LOOSE_PALLET_SENTINEL,
};
use crate::repository::ArticleCatalog;
use std::collections::HashSet;

// ==========================================
// QuantityExtractor - 数量提取器
// ==========================================
pub struct QuantityExtractor;

impl QuantityExtractor {
    pub fn new() -> Self {
        QuantityExtractor
    }

    // ==========================================
    // 明细行收集与过滤
    // ==========================================

    /// 收集表单全部明细行并按存储区过滤
    ///
    /// # 规则
    /// 1. 四处明细列表按固定顺序拼接 (productos → items → destinos → placas)
    /// 2. 过滤值缺失或为双区哨兵 → 不过滤
    /// 3. 否则仅保留货品目录归属等于过滤值的行; 目录查不到的行被过滤掉
    pub fn line_items<'a>(
        &self,
        op: &'a FormOperation,
        session_filter: Option<&str>,
        catalog: &dyn ArticleCatalog,
        tables: &BillingTables,
    ) -> Vec<&'a ItemRow> {
        let all: Vec<&ItemRow> = op.form_data.all_items().collect();
        let wanted = match session_filter {
            Some(s) if !tables.is_session_both(s) => s.trim().to_uppercase(),
            _ => return all,
        };
        all.into_iter()
            .filter(|item| {
                item.codigo_producto
                    .as_deref()
                    .and_then(|codigo| catalog.session_of(codigo))
                    .map(|sesion| sesion.trim().to_uppercase() == wanted)
                    .unwrap_or(false)
            })
            .collect()
    }

    // ==========================================
    // 重量提取 (kg)
    // ==========================================

    /// 提取计费重量
    ///
    /// # 规则
    /// 1. 固定重量表单, 未过滤 → 整单毛重合计 total_peso_bruto
    /// 2. 固定重量表单, 已过滤 → Σ 行净重
    /// 3. 变动重量汇总布局 → Σ 行净重
    /// 4. 变动重量明细布局, 入库 → Σ (毛重 - 皮重)
    /// 5. 变动重量明细布局, 出库 → Σ 行净重
    pub fn total_weight_kg(&self, op: &FormOperation, items: &[&ItemRow], filtered: bool) -> f64 {
        if op.form_kind.is_fixed() {
            if !filtered {
                return op.form_data.total_peso_bruto.unwrap_or(0.0);
            }
            return items.iter().map(|i| i.net_kg()).sum();
        }
        match op.form_data.items_layout {
            ItemsLayout::Summary => items.iter().map(|i| i.net_kg()).sum(),
            ItemsLayout::Detail => {
                if op.form_kind.is_reception() {
                    items.iter().map(|i| i.gross_kg() - i.tare_kg()).sum()
                } else {
                    items.iter().map(|i| i.net_kg()).sum()
                }
            }
        }
    }

    // ==========================================
    // 托盘数提取
    // ==========================================

    /// 提取计费托盘数
    ///
    /// # 规则
    /// 1. 隧道冻结订单 → 逐车分组统计后求和
    /// 2. 固定重量表单 → Σ 行级托盘合计
    /// 3. 变动重量汇总布局 → Σ 行级托盘合计;
    ///    按目的地拆分的出库单优先取整单出库托盘总计 (为 0 时回落求和)
    /// 4. 变动重量明细布局 → 按托盘号去重计数:
    ///    - 999 散件哨兵每次出现计 1 托, 不去重
    ///    - 拣选行不进入托盘计数
    ///    - 无托盘号的行不计
    pub fn total_pallets(
        &self,
        op: &FormOperation,
        items: &[&ItemRow],
        tables: &BillingTables,
    ) -> f64 {
        if self.is_tunnel_order(op, tables) {
            return op
                .form_data
                .placas
                .iter()
                .map(|g| self.vehicle_group_pallets(g))
                .sum();
        }
        if op.form_kind.is_fixed() {
            return items.iter().map(|i| i.pallet_count()).sum();
        }
        match op.form_data.items_layout {
            ItemsLayout::Summary => {
                if op.form_kind.is_dispatch() && !op.form_data.destinos.is_empty() {
                    let total = op.form_data.total_paletas_despacho.unwrap_or(0.0);
                    if total > 0.0 {
                        return total;
                    }
                }
                items.iter().map(|i| i.pallet_count()).sum()
            }
            ItemsLayout::Detail => distinct_pallet_count(items.iter().copied()),
        }
    }

    /// 单个车辆分组的托盘数（明细去重规则同上）
    pub fn vehicle_group_pallets(&self, group: &VehicleGroup) -> f64 {
        distinct_pallet_count(group.items.iter())
    }

    /// 单个车辆分组的净重 (kg)
    pub fn vehicle_group_net_kg(&self, group: &VehicleGroup) -> f64 {
        group.items.iter().map(|i| i.net_kg()).sum()
    }

    // ==========================================
    // 件数提取
    // ==========================================

    /// 提取计费件数
    ///
    /// # 规则
    /// 1. 入库 → Σ 行件数
    /// 2. 出库 → 默认仅拣选行计件; 白名单客户全行计件
    pub fn total_units(
        &self,
        op: &FormOperation,
        items: &[&ItemRow],
        tables: &BillingTables,
    ) -> f64 {
        if op.form_kind.is_dispatch() && !tables.dispatch_counts_all_items(&op.client) {
            return items
                .iter()
                .filter(|i| i.is_picking())
                .map(|i| i.unit_count())
                .sum();
        }
        items.iter().map(|i| i.unit_count()).sum()
    }

    /// 提取货筐数
    pub fn total_baskets(&self, items: &[&ItemRow]) -> f64 {
        items.iter().map(|i| i.basket_count()).sum()
    }

    // ==========================================
    // 按计量基准取数
    // ==========================================

    /// 按概念计量基准提取数量
    ///
    /// OPERACIONES / CONTENEDORES 按单计数 (每单 1);
    /// POSICIONES 不从表单提取 (库存/包月概念专用), 按 0 计
    pub fn quantity_for_base(
        &self,
        base: CalculationBase,
        op: &FormOperation,
        items: &[&ItemRow],
        filtered: bool,
        tables: &BillingTables,
    ) -> f64 {
        match base {
            CalculationBase::Toneladas => self.total_weight_kg(op, items, filtered) / 1000.0,
            CalculationBase::Kilogramos => self.total_weight_kg(op, items, filtered),
            CalculationBase::Paletas => self.total_pallets(op, items, tables),
            CalculationBase::Cajas => self.total_units(op, items, tables),
            CalculationBase::Canastillas => self.total_baskets(items),
            CalculationBase::Operaciones | CalculationBase::Contenedores => 1.0,
            CalculationBase::Posiciones => 0.0,
        }
    }

    /// 是否隧道冻结订单
    fn is_tunnel_order(&self, op: &FormOperation, tables: &BillingTables) -> bool {
        op.tipo_pedido
            .as_deref()
            .map(|t| t.trim().eq_ignore_ascii_case(&tables.tunnel_pedido_type))
            .unwrap_or(false)
    }
}

impl Default for QuantityExtractor {
    fn default() -> Self {
        QuantityExtractor::new()
    }
}

/// 按托盘号去重计数 (999 散件每次计 1, 拣选行与无号行不计)
pub(crate) fn distinct_pallet_count<'a>(items: impl Iterator<Item = &'a ItemRow>) -> f64 {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut count = 0.0;
    for item in items {
        if item.is_picking() {
            continue;
        }
        match item.numero_paleta {
            Some(LOOSE_PALLET_SENTINEL) => count += 1.0,
            Some(n) => {
                if seen.insert(n) {
                    count += 1.0;
                }
            }
            None => {}
        }
    }
    count
}
