// ==========================================
// 冷链仓储计费结算 - 专项结算引擎
// ==========================================
// 命名客户/概念的定制策略:
//   1. 批次冻结客户: 入库批次冻结费 + 宽限期后的按日仓储费
//   2. 货筐装车客户: 吨位档位取白班单价, 数量按货筐数
//   3. 隧道冻结概念: 逐车出净重行
// 策略级配置缺失 → 中止; 单笔作业无匹配 → 静默跳过
// ==========================================

use crate::config::BillingTables;
use crate::domain::{
    local_date, BillingConcept, CalculationBase, FormOperation, ItemRow, SettlementRequest,
    SettlementRow,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::extract::{distinct_pallet_count, QuantityExtractor};
use crate::engine::tariff::TariffResolver;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

// 批次跟踪: 同一批次可能分散在多张入库单
struct LotTrack<'a> {
    entry: NaiveDate,
    entry_op: &'a FormOperation,
    items: Vec<&'a ItemRow>,
}

// ==========================================
// SpecialCaseEngine - 专项结算引擎
// ==========================================
pub struct SpecialCaseEngine {
    extractor: QuantityExtractor,
    resolver: TariffResolver,
}

impl SpecialCaseEngine {
    pub fn new() -> Self {
        SpecialCaseEngine {
            extractor: QuantityExtractor::new(),
            resolver: TariffResolver::new(),
        }
    }

    /// 客户是否命中专项客户登记表
    pub fn is_special_client(&self, client: &str, tables: &BillingTables) -> bool {
        client == tables.special_clients.lot_freezing.client
            || client == tables.special_clients.basket_loading.client
    }

    /// 专项客户整体结算
    ///
    /// 返回 (结算行, 已消费的概念名); 被消费的概念不再进入通用策略循环
    pub fn settle_client(
        &self,
        request: &SettlementRequest,
        forms: &[&FormOperation],
        tables: &BillingTables,
    ) -> EngineResult<(Vec<SettlementRow>, HashSet<String>)> {
        let mut rows = Vec::new();
        let mut consumed = HashSet::new();

        if request.client == tables.special_clients.lot_freezing.client {
            self.settle_lot_freezing(request, forms, tables, &mut rows, &mut consumed)?;
        }
        if request.client == tables.special_clients.basket_loading.client {
            self.settle_basket_loading(request, forms, tables, &mut rows, &mut consumed)?;
        }
        Ok((rows, consumed))
    }

    // ==========================================
    // 批次冻结客户
    // ==========================================
    // 入库当日为第 0 天, 第 storage_grace_days 天起计仓储费,
    // 至批次出库前一日或区间截止日为止
    fn settle_lot_freezing(
        &self,
        request: &SettlementRequest,
        forms: &[&FormOperation],
        tables: &BillingTables,
        rows: &mut Vec<SettlementRow>,
        consumed: &mut HashSet<String>,
    ) -> EngineResult<()> {
        let rules = &tables.special_clients.lot_freezing;
        let freezing = request
            .concepts
            .iter()
            .find(|c| c.concept_name == rules.freezing_concept);
        let storage = request
            .concepts
            .iter()
            .find(|c| c.concept_name == rules.storage_concept);

        // 请求里没有这对概念 → 本次不结算批次冻结
        let (freezing, storage) = match (freezing, storage) {
            (Some(f), Some(s)) => (f, s),
            (None, None) => return Ok(()),
            (Some(f), None) => {
                return Err(EngineError::config_missing(
                    &f.concept_name,
                    &format!("缺少配套仓储概念 {}", rules.storage_concept),
                ))
            }
            (None, Some(s)) => {
                return Err(EngineError::config_missing(
                    &s.concept_name,
                    &format!("缺少配套冻结概念 {}", rules.freezing_concept),
                ))
            }
        };
        if freezing.value.is_none() {
            return Err(EngineError::config_missing(&freezing.concept_name, "未配置单一费率"));
        }
        if storage.value.is_none() {
            return Err(EngineError::config_missing(&storage.concept_name, "未配置单一费率"));
        }
        consumed.insert(freezing.concept_name.clone());
        consumed.insert(storage.concept_name.clone());

        // 按批次归并入库明细 (BTreeMap 保证逐批输出顺序稳定)
        let mut lots: BTreeMap<String, LotTrack> = BTreeMap::new();
        let mut dispatched: BTreeMap<String, NaiveDate> = BTreeMap::new();
        for op in forms {
            for item in op.form_data.all_items() {
                let lote = match item.lote.as_deref() {
                    Some(l) if !l.trim().is_empty() => l.trim().to_string(),
                    _ => continue,
                };
                let day = local_date(&op.fecha);
                if op.form_kind.is_reception() {
                    let track = lots.entry(lote).or_insert_with(|| LotTrack {
                        entry: day,
                        entry_op: op,
                        items: Vec::new(),
                    });
                    if day < track.entry {
                        track.entry = day;
                        track.entry_op = op;
                    }
                    track.items.push(item);
                } else {
                    dispatched
                        .entry(lote)
                        .and_modify(|d| {
                            if day < *d {
                                *d = day;
                            }
                        })
                        .or_insert(day);
                }
            }
        }

        let freezing_unit = freezing.unit_label();
        let storage_unit = storage.unit_label();
        for (lote, track) in &lots {
            // 冻结费: 批次入库当日一行
            let qty = lot_quantity(freezing.calculation_base, &track.items);
            let mut row = SettlementRow::new(
                track.entry,
                &freezing.concept_name,
                qty,
                &freezing_unit,
                freezing.flat_value(),
            );
            let pallets = distinct_pallet_count(track.items.iter().copied());
            row.fill_form_context(track.entry_op, "", pallets);
            row.sub_concepto = Some(lote.clone());
            rows.push(row);

            // 仓储费: 宽限期满起逐日一行
            let storage_qty = lot_quantity(storage.calculation_base, &track.items);
            let first_charged = track.entry + Duration::days(rules.storage_grace_days);
            let last_charged = match dispatched.get(lote) {
                Some(salida) => (*salida - Duration::days(1)).min(request.hasta),
                None => request.hasta,
            };
            let mut day = first_charged.max(request.desde);
            while day <= last_charged {
                let mut row = SettlementRow::new(
                    day,
                    &storage.concept_name,
                    storage_qty,
                    &storage_unit,
                    storage.flat_value(),
                );
                row.sub_concepto = Some(lote.clone());
                rows.push(row);
                day += Duration::days(1);
            }
        }
        Ok(())
    }

    // ==========================================
    // 货筐装车客户
    // ==========================================
    fn settle_basket_loading(
        &self,
        request: &SettlementRequest,
        forms: &[&FormOperation],
        tables: &BillingTables,
        rows: &mut Vec<SettlementRow>,
        consumed: &mut HashSet<String>,
    ) -> EngineResult<()> {
        let rules = &tables.special_clients.basket_loading;
        let concept = match request
            .concepts
            .iter()
            .find(|c| c.concept_name == rules.concept)
        {
            Some(c) => c,
            None => return Ok(()),
        };
        if concept.tariff_ranges.is_empty() {
            return Err(EngineError::config_missing(&concept.concept_name, "吨位区间表为空"));
        }
        consumed.insert(concept.concept_name.clone());

        let unit = concept.unit_label();
        for op in forms {
            if !concept.filter_operation_type.admits(op.form_kind) {
                continue;
            }
            let items: Vec<&ItemRow> = op.form_data.all_items().collect();
            let tons = self.extractor.total_weight_kg(op, &items, false) / 1000.0;
            let range = match self.resolver.match_range(tons, &concept.tariff_ranges) {
                Some(r) => r,
                None => {
                    debug!(operacion = %op.id, tons, "吨位无档位覆盖, 跳过");
                    continue;
                }
            };
            let baskets = self.extractor.total_baskets(&items);
            let mut row = SettlementRow::new(
                local_date(&op.fecha),
                &concept.concept_name,
                baskets,
                &unit,
                range.day_tariff,
            );
            let pallets = self.extractor.total_pallets(op, &items, tables);
            row.fill_form_context(op, "", pallets);
            rows.push(row);
        }
        Ok(())
    }

    // ==========================================
    // 隧道冻结概念
    // ==========================================

    /// 隧道冻结: 订单类型命中的表单逐车出净重行
    pub fn settle_tunnel(
        &self,
        concept: &BillingConcept,
        forms: &[&FormOperation],
        tables: &BillingTables,
    ) -> EngineResult<Vec<SettlementRow>> {
        if concept.value.is_none() {
            return Err(EngineError::config_missing(&concept.concept_name, "未配置单一费率"));
        }
        let unit = concept.unit_label();
        let value = concept.flat_value();
        let mut rows = Vec::new();
        for op in forms {
            let tunnel = op
                .tipo_pedido
                .as_deref()
                .map(|t| t.trim().eq_ignore_ascii_case(&tables.tunnel_pedido_type))
                .unwrap_or(false);
            if !tunnel {
                continue;
            }
            if op.form_data.placas.is_empty() {
                debug!(operacion = %op.id, "隧道订单无车辆分组, 跳过");
                continue;
            }
            for group in &op.form_data.placas {
                let net_kg = self.extractor.vehicle_group_net_kg(group);
                let mut row = SettlementRow::new(
                    local_date(&op.fecha),
                    &concept.concept_name,
                    net_kg,
                    &unit,
                    value,
                );
                row.fill_form_context(op, "", self.extractor.vehicle_group_pallets(group));
                // 行上车牌以分组为准, 不取表单头
                row.placa = group.placa.clone().unwrap_or_default();
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

impl Default for SpecialCaseEngine {
    fn default() -> Self {
        SpecialCaseEngine::new()
    }
}

/// 按计量基准折算批次数量
fn lot_quantity(base: CalculationBase, items: &[&ItemRow]) -> f64 {
    let weight_kg: f64 = items
        .iter()
        .map(|i| {
            let net = i.net_kg();
            if net > 0.0 {
                net
            } else {
                i.gross_kg() - i.tare_kg()
            }
        })
        .sum();
    match base {
        CalculationBase::Toneladas => weight_kg / 1000.0,
        CalculationBase::Kilogramos => weight_kg,
        CalculationBase::Paletas => distinct_pallet_count(items.iter().copied()),
        CalculationBase::Cajas => items.iter().map(|i| i.unit_count()).sum(),
        CalculationBase::Canastillas => items.iter().map(|i| i.basket_count()).sum(),
        CalculationBase::Operaciones | CalculationBase::Contenedores => 1.0,
        CalculationBase::Posiciones => 0.0,
    }
}
