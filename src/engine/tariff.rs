// ==========================================
// 冷链仓储计费结算 - 费率解析器
// ==========================================
// 吨位区间: 按声明顺序首个匹配 (配置侧前置条件: 区间互不重叠)
// 温度区间: 匹配前归一化上下界 (历史配置存在写反的数据)
// ==========================================

use crate::domain::{TariffRange, TemperatureRange};

// ==========================================
// TariffResolver - 费率解析器
// ==========================================
pub struct TariffResolver;

impl TariffResolver {
    pub fn new() -> Self {
        TariffResolver
    }

    /// 按吨位取首个覆盖的区间
    ///
    /// # 规则
    /// 1. 按声明顺序扫描, 首个 min ≤ tons ≤ max 的区间生效
    /// 2. 无覆盖区间 → None (调用方按无费率跳过该行)
    pub fn match_range<'a>(&self, tons: f64, ranges: &'a [TariffRange]) -> Option<&'a TariffRange> {
        ranges.iter().find(|r| r.contains(tons))
    }

    /// 按温度取首个覆盖的区间 (上下界先归一化)
    pub fn match_temperature<'a>(
        &self,
        temp: f64,
        ranges: &'a [TemperatureRange],
    ) -> Option<&'a TemperatureRange> {
        ranges.iter().find(|r| r.contains(temp))
    }

    /// 校验吨位区间配置, 返回违规清单 (空 = 合格)
    ///
    /// # 检查项
    /// 1. 区间上下界倒置
    /// 2. 两区间重叠 (双闭区间相交)
    pub fn validate_ranges(&self, ranges: &[TariffRange]) -> Vec<String> {
        let mut violations = Vec::new();
        for (i, r) in ranges.iter().enumerate() {
            if r.min_tons > r.max_tons {
                violations.push(format!(
                    "区间 {} 上下界倒置: [{}, {}]",
                    i, r.min_tons, r.max_tons
                ));
            }
        }
        for i in 0..ranges.len() {
            for j in (i + 1)..ranges.len() {
                let a = &ranges[i];
                let b = &ranges[j];
                if a.min_tons <= b.max_tons && b.min_tons <= a.max_tons {
                    violations.push(format!(
                        "区间 {} 与区间 {} 重叠: [{}, {}] / [{}, {}]",
                        i, j, a.min_tons, a.max_tons, b.min_tons, b.max_tons
                    ));
                }
            }
        }
        violations
    }
}

impl Default for TariffResolver {
    fn default() -> Self {
        TariffResolver::new()
    }
}
