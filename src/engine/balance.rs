// ==========================================
// 冷链仓储计费结算 - 余额计费引擎
// ==========================================
// 集装箱余额: 按日滚动托盘余额, 当日行计的是未应用当日进出前的余额
// 库存余额: 按外部库存日报逐日计费
// ==========================================

use crate::config::BillingTables;
use crate::domain::{
    local_date, BillingConcept, DailyInventory, FormOperation, SettlementRequest, SettlementRow,
};
use crate::engine::extract::QuantityExtractor;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// ContainerBalanceEngine - 集装箱余额引擎
// ==========================================
pub struct ContainerBalanceEngine {
    extractor: QuantityExtractor,
}

impl ContainerBalanceEngine {
    pub fn new() -> Self {
        ContainerBalanceEngine {
            extractor: QuantityExtractor::new(),
        }
    }

    /// 结算集装箱余额概念
    ///
    /// # 规则
    /// 1. 按集装箱号分组 (无箱号的表单不参与)
    /// 2. 开账余额 = 区间起点之前全部历史的 (入库托盘 - 出库托盘)
    /// 3. 逐日出行: 当日行 = 应用当日进出**之前**的存量余额, 仅正余额出行
    /// 4. 单价取概念单一费率
    pub fn settle_concept(
        &self,
        concept: &BillingConcept,
        history: &[&FormOperation],
        request: &SettlementRequest,
        tables: &BillingTables,
    ) -> Vec<SettlementRow> {
        // BTreeMap 保证逐箱输出顺序稳定
        let mut por_contenedor: BTreeMap<String, Vec<&FormOperation>> = BTreeMap::new();
        for op in history {
            let contenedor = match op.contenedor.as_deref() {
                Some(c) if !c.trim().is_empty() => c.trim().to_string(),
                _ => continue,
            };
            por_contenedor.entry(contenedor).or_default().push(op);
        }

        let unit = concept.unit_label();
        let value = concept.flat_value();
        let mut rows = Vec::new();

        for (contenedor, ops) in por_contenedor {
            let mut opening = 0.0;
            let mut daily_net: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for op in ops {
                let items: Vec<_> = op.form_data.all_items().collect();
                let pallets = self.extractor.total_pallets(op, &items, tables);
                let signed = if op.form_kind.is_reception() {
                    pallets
                } else {
                    -pallets
                };
                let day = local_date(&op.fecha);
                if day < request.desde {
                    opening += signed;
                } else if day <= request.hasta {
                    *daily_net.entry(day).or_insert(0.0) += signed;
                }
            }

            let mut balance = opening;
            for day in request.days() {
                if balance > 0.0 {
                    let mut row =
                        SettlementRow::new(day, &concept.concept_name, balance, &unit, value);
                    row.contenedor = contenedor.clone();
                    row.total_paletas = balance;
                    rows.push(row);
                } else {
                    debug!(contenedor = %contenedor, dia = %day, "余额非正, 当日不出行");
                }
                balance += daily_net.get(&day).copied().unwrap_or(0.0);
            }
        }
        rows
    }
}

impl Default for ContainerBalanceEngine {
    fn default() -> Self {
        ContainerBalanceEngine::new()
    }
}

// ==========================================
// InventoryBalanceEngine - 库存余额引擎
// ==========================================
pub struct InventoryBalanceEngine;

impl InventoryBalanceEngine {
    pub fn new() -> Self {
        InventoryBalanceEngine
    }

    /// 结算库存余额概念: 逐日报表行计费, 零货位日不出行
    ///
    /// 报表行带库区标注时按概念 inventory_sesion 过滤, 未标注的行保留
    pub fn settle_concept(
        &self,
        concept: &BillingConcept,
        inventory: &[DailyInventory],
    ) -> Vec<SettlementRow> {
        let unit = concept.unit_label();
        let value = concept.flat_value();
        let wanted_session = concept
            .inventory_sesion
            .as_deref()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty());
        inventory
            .iter()
            .filter(|r| r.posiciones > 0.0)
            .filter(|r| match (&wanted_session, &r.camara) {
                (Some(wanted), Some(camara)) => camara.trim().to_uppercase() == *wanted,
                _ => true,
            })
            .map(|r| {
                let mut row =
                    SettlementRow::new(r.fecha, &concept.concept_name, r.posiciones, &unit, value);
                row.camara = r
                    .camara
                    .clone()
                    .or_else(|| concept.inventory_sesion.clone())
                    .unwrap_or_default();
                row
            })
            .collect()
    }
}

impl Default for InventoryBalanceEngine {
    fn default() -> Self {
        InventoryBalanceEngine::new()
    }
}
