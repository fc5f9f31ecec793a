// ==========================================
// 冷链仓储计费结算 - 装卸队加班引擎
// ==========================================
// 两个命名概念: 固定装卸队 (人数取费率目录基准数量)
//              临时装卸队 (人数取作业登记的角色人数)
// 时段按概念白班终点拆成白班/夜班两段, 按角色逐段计人时
// ==========================================

use crate::domain::{local_date, BillingConcept, ManualOperation, SettlementRow};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::shift::parse_hhmm;
use chrono::{NaiveTime, Timelike};
use tracing::debug;

// 角色班次标签后缀 (费率目录条目命名约定: "{角色} DIURNA" / "{角色} NOCTURNA")
const DIURNA_SUFFIX: &str = "DIURNA";
const NOCTURNA_SUFFIX: &str = "NOCTURNA";

// 加班费率目录缺省计量单位
const DEFAULT_UNIT: &str = "HORAS";

/// 时段按白班终点拆分, 返回 (白班分钟, 夜班分钟)
///
/// # 规则
/// 1. 结束 ≤ 开始视为跨夜, 结束顺延次日
/// 2. 开始早于边界 → 白班段 = min(结束, 边界) - 开始, 其余为夜班段
/// 3. 开始不早于边界 → 全部为夜班段
pub fn split_minutes(inicio: NaiveTime, fin: NaiveTime, boundary: NaiveTime) -> (i64, i64) {
    let start = (inicio.hour() * 60 + inicio.minute()) as i64;
    let mut end = (fin.hour() * 60 + fin.minute()) as i64;
    if end <= start {
        end += 24 * 60;
    }
    let limit = (boundary.hour() * 60 + boundary.minute()) as i64;
    let total = end - start;
    let diurnal = if start < limit {
        (end.min(limit) - start).max(0)
    } else {
        0
    };
    (diurnal, total - diurnal)
}

// ==========================================
// TimeExtraEngine - 加班结算引擎
// ==========================================
pub struct TimeExtraEngine;

impl TimeExtraEngine {
    pub fn new() -> Self {
        TimeExtraEngine
    }

    /// 结算一个加班概念下的全部手工装卸队作业
    ///
    /// # 参数
    /// - fixed_roster: true = 固定装卸队 (人数取目录基准数量),
    ///   false = 临时装卸队 (人数取作业登记角色人数)
    ///
    /// # 规则
    /// 1. 概念必须配置白班终点与非空费率目录, 否则整次结算中止
    /// 2. 作业起止时刻缺失或解析失败 → 跳过该作业
    /// 3. 每个角色每个班段: 人时 = 分钟/60 x 人数;
    ///    费率按 "{角色} {班段}" 名称查目录, 查不到跳过该段
    /// 4. 零时长班段与零人数角色不出行
    pub fn settle_concept(
        &self,
        concept: &BillingConcept,
        ops: &[&ManualOperation],
        fixed_roster: bool,
    ) -> EngineResult<Vec<SettlementRow>> {
        let boundary = concept
            .day_shift_end_time
            .as_deref()
            .and_then(parse_hhmm)
            .ok_or_else(|| {
                EngineError::config_missing(&concept.concept_name, "未配置白班终点 day_shift_end_time")
            })?;
        if concept.specific_tariffs.is_empty() {
            return Err(EngineError::config_missing(
                &concept.concept_name,
                "专项费率目录为空",
            ));
        }

        let mut rows = Vec::new();
        for op in ops {
            let (inicio, fin) = match (
                op.detalles.hora_inicio.as_deref().and_then(parse_hhmm),
                op.detalles.hora_fin.as_deref().and_then(parse_hhmm),
            ) {
                (Some(i), Some(f)) => (i, f),
                _ => {
                    debug!(operacion = %op.id, "加班作业缺起止时刻, 跳过");
                    continue;
                }
            };
            let (diurnal_min, nocturnal_min) = split_minutes(inicio, fin, boundary);

            if fixed_roster {
                self.settle_fixed(concept, op, diurnal_min, nocturnal_min, &mut rows);
            } else {
                self.settle_adhoc(concept, op, diurnal_min, nocturnal_min, &mut rows);
            }
        }
        Ok(rows)
    }

    /// 固定装卸队: 逐目录条目出行, 班段与人数都来自目录
    fn settle_fixed(
        &self,
        concept: &BillingConcept,
        op: &ManualOperation,
        diurnal_min: i64,
        nocturnal_min: i64,
        rows: &mut Vec<SettlementRow>,
    ) {
        for tariff in &concept.specific_tariffs {
            let label = tariff.name.trim().to_uppercase();
            let minutes = if label.ends_with(DIURNA_SUFFIX) {
                diurnal_min
            } else if label.ends_with(NOCTURNA_SUFFIX) {
                nocturnal_min
            } else {
                continue;
            };
            let headcount = tariff.base_quantity.unwrap_or(0.0);
            if minutes <= 0 || headcount <= 0.0 {
                continue;
            }
            rows.push(self.build_row(concept, op, &tariff.name, tariff, minutes, headcount));
        }
    }

    /// 临时装卸队: 逐登记角色出行, 费率按角色+班段名称查目录
    fn settle_adhoc(
        &self,
        concept: &BillingConcept,
        op: &ManualOperation,
        diurnal_min: i64,
        nocturnal_min: i64,
        rows: &mut Vec<SettlementRow>,
    ) {
        for role in &op.detalles.personal {
            if role.numero_personas == 0 {
                continue;
            }
            for (suffix, minutes) in [(DIURNA_SUFFIX, diurnal_min), (NOCTURNA_SUFFIX, nocturnal_min)]
            {
                if minutes <= 0 {
                    continue;
                }
                let label = format!("{} {}", role.rol.trim().to_uppercase(), suffix);
                match concept.specific_by_name(&label) {
                    Some(tariff) => {
                        rows.push(self.build_row(
                            concept,
                            op,
                            &label,
                            tariff,
                            minutes,
                            role.numero_personas as f64,
                        ));
                    }
                    None => {
                        debug!(operacion = %op.id, rol = %label, "角色班段无费率, 跳过");
                    }
                }
            }
        }
    }

    fn build_row(
        &self,
        concept: &BillingConcept,
        op: &ManualOperation,
        label: &str,
        tariff: &crate::domain::SpecificTariff,
        minutes: i64,
        headcount: f64,
    ) -> SettlementRow {
        let person_hours = minutes as f64 / 60.0 * headcount;
        let unit = tariff.unit.clone().unwrap_or_else(|| DEFAULT_UNIT.to_string());
        let mut row = SettlementRow::new(
            local_date(&op.fecha),
            &concept.concept_name,
            person_hours,
            &unit,
            tariff.value,
        );
        row.sub_concepto = Some(label.to_string());
        row.numero_personas = Some(headcount.round() as u32);
        row.hora_inicio = op.detalles.hora_inicio.clone();
        row.hora_fin = op.detalles.hora_fin.clone();
        row.placa = op.detalles.placa.clone().unwrap_or_default();
        row.contenedor = op.detalles.contenedor.clone().unwrap_or_default();
        row
    }
}

impl Default for TimeExtraEngine {
    fn default() -> Self {
        TimeExtraEngine::new()
    }
}
