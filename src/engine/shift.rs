// ==========================================
// 冷链仓储计费结算 - 班次分类器
// ==========================================
// 输出决定吨位区间费率取哪一列 (白班/夜班/加班)
// 红线: 全函数, 任何缺失或解析失败 → NO_APLICA, 不报错
// ==========================================

use crate::config::BillingTables;
use crate::domain::{
    local_datetime, BillingConcept, CalculationType, ShiftKind, TariffType,
};
use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};

/// 解析 "HH:mm" 文本时刻
pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// 时刻折算为当日分钟数
fn minutes_of(t: NaiveTime) -> i32 {
    (t.hour() * 60 + t.minute()) as i32
}

// ==========================================
// ShiftClassifier - 班次分类器
// ==========================================
pub struct ShiftClassifier;

impl ShiftClassifier {
    pub fn new() -> Self {
        ShiftClassifier
    }

    /// 作业时段分班
    ///
    /// # 规则
    /// 1. 豁免概念 → NO_APLICA
    /// 2. 仅 RULES x RANGES 概念参与分班, 其余 → NO_APLICA
    /// 3. 起止时刻缺失或解析失败 → NO_APLICA
    /// 4. 作业日按本地挂钟 (UTC-5) 折算; 结束 ≤ 开始视为跨夜, 结束顺延次日
    /// 5. 周日 → EXTRA (无条件)
    /// 6. 当日白班窗口: 工作日取 weekday 窗口, 周六取 saturday 窗口;
    ///    窗口未配置或解析失败 → NO_APLICA
    /// 7. 时段整体落在窗口内 (双端含) → DIURNO
    /// 8. 越出窗口: 工作日 → NOCTURNO, 周六 → EXTRA
    pub fn classify(
        &self,
        fecha: &DateTime<Utc>,
        hora_inicio: Option<&str>,
        hora_fin: Option<&str>,
        concept: &BillingConcept,
        tables: &BillingTables,
    ) -> ShiftKind {
        if tables.is_shift_exempt(&concept.concept_name) {
            return ShiftKind::NoAplica;
        }
        if concept.calculation_type != CalculationType::Rules
            || concept.tariff_type != TariffType::Ranges
        {
            return ShiftKind::NoAplica;
        }

        let inicio = match hora_inicio.and_then(parse_hhmm) {
            Some(t) => t,
            None => return ShiftKind::NoAplica,
        };
        let fin = match hora_fin.and_then(parse_hhmm) {
            Some(t) => t,
            None => return ShiftKind::NoAplica,
        };

        let local = local_datetime(fecha);
        if local.weekday() == Weekday::Sun {
            return ShiftKind::Extra;
        }
        let saturday = local.weekday() == Weekday::Sat;

        let (win_start_raw, win_end_raw) = if saturday {
            (
                concept.saturday_day_shift_start.as_deref(),
                concept.saturday_day_shift_end.as_deref(),
            )
        } else {
            (
                concept.weekday_day_shift_start.as_deref(),
                concept.weekday_day_shift_end.as_deref(),
            )
        };
        let win_start = match win_start_raw.and_then(parse_hhmm) {
            Some(t) => minutes_of(t),
            None => return ShiftKind::NoAplica,
        };
        let win_end = match win_end_raw.and_then(parse_hhmm) {
            Some(t) => minutes_of(t),
            None => return ShiftKind::NoAplica,
        };

        let start_min = minutes_of(inicio);
        let mut end_min = minutes_of(fin);
        if end_min <= start_min {
            // 跨夜作业: 结束顺延次日
            end_min += 24 * 60;
        }

        if start_min >= win_start && end_min <= win_end {
            ShiftKind::Diurno
        } else if saturday {
            ShiftKind::Extra
        } else {
            ShiftKind::Nocturno
        }
    }
}

impl Default for ShiftClassifier {
    fn default() -> Self {
        ShiftClassifier::new()
    }
}
