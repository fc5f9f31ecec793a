// ==========================================
// 冷链仓储计费结算 - 结算行排序引擎
// ==========================================
// 职责: 对账单行做最终稳定排序
// 输入: 各概念产出的结算行合集
// 输出: 按日期 → 概念优先级 → 角色优先级 → 子概念排好的行
// ==========================================

use crate::config::BillingTables;
use crate::domain::SettlementRow;
use std::cmp::Ordering;

// ==========================================
// RowSequencer - 结算行排序引擎
// ==========================================
pub struct RowSequencer {
    // 无状态引擎, 排序规则全部来自计费规则表
}

impl RowSequencer {
    pub fn new() -> Self {
        Self {}
    }

    /// 排序结算行
    ///
    /// 排序键:
    /// 1) fecha 升序
    /// 2) 概念优先级表序 (表外概念按配置顺序殿后)
    /// 3) 加班概念内按角色优先级 (子概念以角色名开头)
    /// 4) sub_concepto 字典序
    ///
    /// 稳定排序: 键全等的行保持产出顺序
    pub fn sort(&self, mut rows: Vec<SettlementRow>, tables: &BillingTables) -> Vec<SettlementRow> {
        rows.sort_by(|a, b| self.compare(a, b, tables));
        rows
    }

    fn compare(&self, a: &SettlementRow, b: &SettlementRow, tables: &BillingTables) -> Ordering {
        // 1. 日期升序
        match a.fecha.cmp(&b.fecha) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 概念优先级表序
        match tables
            .concept_rank(&a.concepto)
            .cmp(&tables.concept_rank(&b.concepto))
        {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. 加班概念内按角色排
        if tables.is_time_extra(&a.concepto) && tables.is_time_extra(&b.concepto) {
            let rank_a = a
                .sub_concepto
                .as_deref()
                .map(|s| tables.role_rank(s))
                .unwrap_or(usize::MAX);
            let rank_b = b
                .sub_concepto
                .as_deref()
                .map(|s| tables.role_rank(s))
                .unwrap_or(usize::MAX);
            match rank_a.cmp(&rank_b) {
                Ordering::Equal => {}
                other => return other,
            }
        }

        // 4. 子概念字典序
        a.sub_concepto.cmp(&b.sub_concepto)
    }
}

impl Default for RowSequencer {
    fn default() -> Self {
        RowSequencer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(fecha: (i32, u32, u32), concepto: &str, sub: Option<&str>, qty: f64) -> SettlementRow {
        let mut r = SettlementRow::new(
            NaiveDate::from_ymd_opt(fecha.0, fecha.1, fecha.2).unwrap(),
            concepto,
            qty,
            "UND",
            1.0,
        );
        r.sub_concepto = sub.map(|s| s.to_string());
        r
    }

    #[test]
    fn test_date_then_concept_order() {
        // 场景1: 先按日期, 同日按概念优先级表
        let tables = BillingTables::default();
        let rows = vec![
            row((2024, 3, 2), "CARGUE", None, 1.0),
            row((2024, 3, 1), "DESCARGUE", None, 1.0),
            row((2024, 3, 1), "ALMACENAMIENTO CONGELADOS", None, 1.0),
        ];
        let sorted = RowSequencer::new().sort(rows, &tables);
        assert_eq!(sorted[0].concepto, "ALMACENAMIENTO CONGELADOS");
        assert_eq!(sorted[1].concepto, "DESCARGUE");
        assert_eq!(sorted[2].concepto, "CARGUE");
        assert_eq!(
            sorted[2].fecha,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_unknown_concept_sorts_last() {
        // 场景2: 优先级表外的概念排在表内概念之后
        let tables = BillingTables::default();
        let rows = vec![
            row((2024, 3, 1), "CONCEPTO RARO", None, 1.0),
            row((2024, 3, 1), "CARGUE", None, 1.0),
        ];
        let sorted = RowSequencer::new().sort(rows, &tables);
        assert_eq!(sorted[0].concepto, "CARGUE");
        assert_eq!(sorted[1].concepto, "CONCEPTO RARO");
    }

    #[test]
    fn test_time_extra_rows_order_by_role() {
        // 场景3: 加班行按角色优先级 (SUPERVISOR > MONTACARGUISTA > OPERARIO)
        let tables = BillingTables::default();
        let concepto = tables.time_extra_fixed_concept.clone();
        let rows = vec![
            row((2024, 3, 1), &concepto, Some("OPERARIO DIURNA"), 1.0),
            row((2024, 3, 1), &concepto, Some("SUPERVISOR NOCTURNA"), 1.0),
            row((2024, 3, 1), &concepto, Some("MONTACARGUISTA DIURNA"), 1.0),
        ];
        let sorted = RowSequencer::new().sort(rows, &tables);
        assert_eq!(sorted[0].sub_concepto.as_deref(), Some("SUPERVISOR NOCTURNA"));
        assert_eq!(
            sorted[1].sub_concepto.as_deref(),
            Some("MONTACARGUISTA DIURNA")
        );
        assert_eq!(sorted[2].sub_concepto.as_deref(), Some("OPERARIO DIURNA"));
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        // 场景4: 键全等时保持产出顺序
        let tables = BillingTables::default();
        let rows = vec![
            row((2024, 3, 1), "CARGUE", None, 1.0),
            row((2024, 3, 1), "CARGUE", None, 2.0),
            row((2024, 3, 1), "CARGUE", None, 3.0),
        ];
        let sorted = RowSequencer::new().sort(rows, &tables);
        let qty: Vec<f64> = sorted.iter().map(|r| r.cantidad).collect();
        assert_eq!(qty, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sub_concept_lexicographic_tiebreak() {
        // 场景5: 非加班概念同键按子概念字典序
        let tables = BillingTables::default();
        let rows = vec![
            row((2024, 3, 1), "SERVICIO DE CONGELACION", Some("LOTE-B"), 1.0),
            row((2024, 3, 1), "SERVICIO DE CONGELACION", Some("LOTE-A"), 1.0),
        ];
        let sorted = RowSequencer::new().sort(rows, &tables);
        assert_eq!(sorted[0].sub_concepto.as_deref(), Some("LOTE-A"));
        assert_eq!(sorted[1].sub_concepto.as_deref(), Some("LOTE-B"));
    }
}
