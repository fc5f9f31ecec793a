// ==========================================
// 冷链仓储计费结算 - 概念策略分发器
// ==========================================
// 按 calculation_type x tariff_type 选策略, 逐概念产出结算行
// 过滤链: 方向 → 货品类型 → 订单类型白名单 → 存储区 (过滤后空明细整单跳过)
// ==========================================

use crate::config::BillingTables;
use crate::domain::{
    local_date, BillingConcept, CalculationType, DailyInventory, FormOperation, ItemRow,
    ManualOperation, OperationRecord, SettlementRequest, SettlementRow, TariffType,
};
use crate::engine::balance::{ContainerBalanceEngine, InventoryBalanceEngine};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::extract::QuantityExtractor;
use crate::engine::shift::ShiftClassifier;
use crate::engine::special::SpecialCaseEngine;
use crate::engine::tariff::TariffResolver;
use crate::engine::time_extra::TimeExtraEngine;
use crate::repository::ArticleCatalog;
use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, warn};

/// 某日所在月份的天数
fn days_in_month(day: NaiveDate) -> i64 {
    let first = NaiveDate::from_ymd_opt(day.year(), day.month(), 1)
        .unwrap_or(day);
    let next_month = if day.month() == 12 {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year(), day.month() + 1, 1)
    }
    .unwrap_or(day + Duration::days(30));
    (next_month - first).num_days()
}

// ==========================================
// DispatchContext - 分发上下文
// ==========================================
// 编排器预取好的所有数据, 分发器本身不做 IO
pub struct DispatchContext<'a> {
    pub request: &'a SettlementRequest,
    pub operations: &'a [OperationRecord], // 区间内作业记录
    pub history_forms: Vec<&'a FormOperation>, // 截止区间末的历史表单 (余额概念需要, 其余为空)
    pub inventory: &'a [DailyInventory],   // 库存日报 (库存概念需要, 其余为空)
    pub catalog: &'a dyn ArticleCatalog,
    pub tables: &'a BillingTables,
}

impl<'a> DispatchContext<'a> {
    /// 区间内表单记录
    pub fn forms(&self) -> Vec<&'a FormOperation> {
        self.operations.iter().filter_map(|r| r.as_form()).collect()
    }

    /// 概念名下的手工记录 (crew_only = 仅装卸队记录)
    pub fn manuals_for(&self, concepto: &str, crew_only: bool) -> Vec<&'a ManualOperation> {
        self.operations
            .iter()
            .filter(|r| !crew_only || r.is_manual_crew())
            .filter_map(|r| r.as_manual())
            .filter(|m| m.concepto == concepto)
            .collect()
    }
}

// ==========================================
// SettlementDispatcher - 策略分发器
// ==========================================
pub struct SettlementDispatcher {
    extractor: QuantityExtractor,
    classifier: ShiftClassifier,
    resolver: TariffResolver,
    time_extra: TimeExtraEngine,
    container_balance: ContainerBalanceEngine,
    inventory_balance: InventoryBalanceEngine,
    special: SpecialCaseEngine,
}

impl SettlementDispatcher {
    pub fn new() -> Self {
        SettlementDispatcher {
            extractor: QuantityExtractor::new(),
            classifier: ShiftClassifier::new(),
            resolver: TariffResolver::new(),
            time_extra: TimeExtraEngine::new(),
            container_balance: ContainerBalanceEngine::new(),
            inventory_balance: InventoryBalanceEngine::new(),
            special: SpecialCaseEngine::new(),
        }
    }

    /// 结算单个概念
    pub fn settle_concept(
        &self,
        concept: &BillingConcept,
        ctx: &DispatchContext<'_>,
    ) -> EngineResult<Vec<SettlementRow>> {
        match concept.calculation_type {
            CalculationType::Rules => self.settle_rules(concept, ctx),
            CalculationType::Observation => self.settle_observation(concept, ctx),
            CalculationType::Manual => self.settle_manual(concept, ctx),
            CalculationType::BalanceContainer => Ok(self.container_balance.settle_concept(
                concept,
                &ctx.history_forms,
                ctx.request,
                ctx.tables,
            )),
            CalculationType::BalanceInventory => {
                Ok(self.inventory_balance.settle_concept(concept, ctx.inventory))
            }
            CalculationType::SpecialLogic => {
                if concept.concept_name == ctx.tables.tunnel_concept {
                    return self.special.settle_tunnel(concept, &ctx.forms(), ctx.tables);
                }
                // 客户级专项概念在编排器前置阶段消费; 落到这里说明配置拼错了
                warn!(concepto = %concept.concept_name, "专项概念无对应策略, 跳过");
                Ok(Vec::new())
            }
        }
    }

    // ==========================================
    // RULES 主干
    // ==========================================
    fn settle_rules(
        &self,
        concept: &BillingConcept,
        ctx: &DispatchContext<'_>,
    ) -> EngineResult<Vec<SettlementRow>> {
        let session_filter = concept
            .filter_sesion
            .as_deref()
            .filter(|s| !ctx.tables.is_session_both(s));
        let camara = session_filter.unwrap_or_default();

        let mut rows = Vec::new();
        for op in ctx.forms() {
            if !self.passes_filters(concept, op) {
                continue;
            }
            let items = self
                .extractor
                .line_items(op, session_filter, ctx.catalog, ctx.tables);
            // 存储区过滤后无明细 → 该作业不属于本概念的存储区
            if session_filter.is_some() && items.is_empty() {
                debug!(operacion = %op.id, concepto = %concept.concept_name, "过滤后无明细, 跳过");
                continue;
            }
            let filtered = session_filter.is_some();

            match concept.tariff_type {
                TariffType::Unique => {
                    let qty = self.extractor.quantity_for_base(
                        concept.calculation_base,
                        op,
                        &items,
                        filtered,
                        ctx.tables,
                    );
                    let mut row = SettlementRow::new(
                        local_date(&op.fecha),
                        &concept.concept_name,
                        qty,
                        &concept.unit_label(),
                        concept.flat_value(),
                    );
                    self.fill_context(&mut row, op, &items, camara, ctx);
                    rows.push(row);
                }
                TariffType::Ranges => {
                    if let Some(row) = self.settle_ranged_op(concept, op, &items, filtered, camara, ctx) {
                        rows.push(row);
                    }
                }
                TariffType::ByTemperature => {
                    if let Some(row) =
                        self.settle_temperature_op(concept, op, &items, filtered, camara, ctx)
                    {
                        rows.push(row);
                    }
                }
                TariffType::Specific => {
                    debug!(concepto = %concept.concept_name, "RULES 概念不支持专项费率目录, 跳过");
                }
            }
        }
        Ok(rows)
    }

    /// 吨位区间策略: 分班取列, 无档位覆盖跳过
    fn settle_ranged_op(
        &self,
        concept: &BillingConcept,
        op: &FormOperation,
        items: &[&ItemRow],
        filtered: bool,
        camara: &str,
        ctx: &DispatchContext<'_>,
    ) -> Option<SettlementRow> {
        let tons = self.extractor.total_weight_kg(op, items, filtered) / 1000.0;
        let range = match self.resolver.match_range(tons, &concept.tariff_ranges) {
            Some(r) => r,
            None => {
                debug!(operacion = %op.id, concepto = %concept.concept_name, tons, "吨位无档位覆盖, 跳过");
                return None;
            }
        };
        let shift = self.classifier.classify(
            &op.fecha,
            op.hora_inicio.as_deref(),
            op.hora_fin.as_deref(),
            concept,
            ctx.tables,
        );
        let rate = range.tariff_for_shift(shift);

        // 装卸类概念按趟计: 数量恒 1, 单位改按趟
        let (qty, unit) = if ctx.tables.is_per_trip(&concept.concept_name) {
            (1.0, ctx.tables.per_trip_unit.clone())
        } else {
            (
                self.extractor.quantity_for_base(
                    concept.calculation_base,
                    op,
                    items,
                    filtered,
                    ctx.tables,
                ),
                concept.unit_label(),
            )
        };
        let mut row = SettlementRow::new(local_date(&op.fecha), &concept.concept_name, qty, &unit, rate);
        self.fill_context(&mut row, op, items, camara, ctx);
        if let Some(vehiculo) = &range.vehicle_type {
            row.tipo_vehiculo = vehiculo.clone();
        }
        Some(row)
    }

    /// 温度区间策略: 全部读数取均值, 无读数或无档位跳过
    fn settle_temperature_op(
        &self,
        concept: &BillingConcept,
        op: &FormOperation,
        items: &[&ItemRow],
        filtered: bool,
        camara: &str,
        ctx: &DispatchContext<'_>,
    ) -> Option<SettlementRow> {
        let readings: Vec<f64> = items.iter().flat_map(|i| i.temperature_readings()).collect();
        if readings.is_empty() {
            debug!(operacion = %op.id, concepto = %concept.concept_name, "无测温读数, 跳过");
            return None;
        }
        let avg = readings.iter().sum::<f64>() / readings.len() as f64;
        let range = match self
            .resolver
            .match_temperature(avg, &concept.tariff_ranges_temperature)
        {
            Some(r) => r,
            None => {
                debug!(operacion = %op.id, concepto = %concept.concept_name, avg, "温度无档位覆盖, 跳过");
                return None;
            }
        };
        let qty = self.extractor.quantity_for_base(
            concept.calculation_base,
            op,
            items,
            filtered,
            ctx.tables,
        );
        let mut row = SettlementRow::new(
            local_date(&op.fecha),
            &concept.concept_name,
            qty,
            &concept.unit_label(),
            range.rate_per_kg,
        );
        self.fill_context(&mut row, op, items, camara, ctx);
        Some(row)
    }

    // ==========================================
    // OBSERVATION 主干
    // ==========================================
    fn settle_observation(
        &self,
        concept: &BillingConcept,
        ctx: &DispatchContext<'_>,
    ) -> EngineResult<Vec<SettlementRow>> {
        let wanted = concept
            .associated_observation
            .as_deref()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                EngineError::config_missing(&concept.concept_name, "未配置关联观察项类型")
            })?;

        let mut rows = Vec::new();
        for op in ctx.forms() {
            if !self.passes_filters(concept, op) {
                continue;
            }
            for obs in &op.observaciones {
                if obs.tipo.trim().to_uppercase() != wanted {
                    continue;
                }
                let fecha = obs.fecha.unwrap_or(op.fecha);
                if !ctx.request.contains(&fecha) {
                    continue;
                }
                let mut row = SettlementRow::new(
                    local_date(&fecha),
                    &concept.concept_name,
                    obs.cantidad.unwrap_or(0.0),
                    &concept.unit_label(),
                    concept.flat_value(),
                );
                let items: Vec<&ItemRow> = op.form_data.all_items().collect();
                self.fill_context(&mut row, op, &items, "", ctx);
                rows.push(row);
            }
        }
        Ok(rows)
    }

    // ==========================================
    // MANUAL 主干
    // ==========================================
    fn settle_manual(
        &self,
        concept: &BillingConcept,
        ctx: &DispatchContext<'_>,
    ) -> EngineResult<Vec<SettlementRow>> {
        let name = concept.concept_name.as_str();

        // 装卸队加班: 专用引擎
        if ctx.tables.is_time_extra(name) {
            let fixed_roster = name == ctx.tables.time_extra_fixed_concept;
            let ops = ctx.manuals_for(name, true);
            return self.time_extra.settle_concept(concept, &ops, fixed_roster);
        }

        // 固定货位包月: 数量 = 基准数量 x 当月天数, 逐目录条目出行
        if name == ctx.tables.fixed_positions_concept {
            let mut rows = Vec::new();
            for op in ctx.manuals_for(name, false) {
                let day = local_date(&op.fecha);
                let month_days = days_in_month(day) as f64;
                for tariff in &concept.specific_tariffs {
                    let qty = tariff.base_quantity.unwrap_or(0.0) * month_days;
                    let unit = tariff
                        .unit
                        .clone()
                        .unwrap_or_else(|| concept.unit_label());
                    let mut row =
                        SettlementRow::new(day, &concept.concept_name, qty, &unit, tariff.value);
                    row.sub_concepto = Some(tariff.name.clone());
                    rows.push(row);
                }
            }
            return Ok(rows);
        }

        // 通用手工作业: 逐引用费率计价, 目录查不到的引用跳过
        let mut rows = Vec::new();
        for op in ctx.manuals_for(name, false) {
            for applied in &op.specific_tariffs {
                let tariff = match concept.specific_by_id(&applied.tariff_id) {
                    Some(t) => t,
                    None => {
                        debug!(operacion = %op.id, tariff_id = %applied.tariff_id, "引用费率不在目录, 跳过");
                        continue;
                    }
                };
                let unit = tariff
                    .unit
                    .clone()
                    .unwrap_or_else(|| concept.unit_label());
                let mut row = SettlementRow::new(
                    local_date(&op.fecha),
                    &concept.concept_name,
                    applied.cantidad.unwrap_or(0.0),
                    &unit,
                    tariff.value,
                );
                row.sub_concepto = Some(tariff.name.clone());
                row.placa = op.detalles.placa.clone().unwrap_or_default();
                row.contenedor = op.detalles.contenedor.clone().unwrap_or_default();
                row.hora_inicio = op.detalles.hora_inicio.clone();
                row.hora_fin = op.detalles.hora_fin.clone();
                rows.push(row);
            }
        }
        Ok(rows)
    }

    // ==========================================
    // 过滤与上下文
    // ==========================================

    /// 方向 / 货品类型 / 订单类型白名单过滤
    fn passes_filters(&self, concept: &BillingConcept, op: &FormOperation) -> bool {
        if !concept.filter_operation_type.admits(op.form_kind) {
            return false;
        }
        if !concept.filter_product_type.admits(op.form_kind) {
            return false;
        }
        if !concept.filter_pedido_types.is_empty() {
            let tipo = op
                .tipo_pedido
                .as_deref()
                .map(|t| t.trim().to_uppercase())
                .unwrap_or_default();
            if !concept
                .filter_pedido_types
                .iter()
                .any(|p| p.trim().to_uppercase() == tipo)
            {
                return false;
            }
        }
        true
    }

    fn fill_context(
        &self,
        row: &mut SettlementRow,
        op: &FormOperation,
        items: &[&ItemRow],
        camara: &str,
        ctx: &DispatchContext<'_>,
    ) {
        let pallets = self.extractor.total_pallets(op, items, ctx.tables);
        row.fill_form_context(op, camara, pallets);
    }
}

impl Default for SettlementDispatcher {
    fn default() -> Self {
        SettlementDispatcher::new()
    }
}
