// ==========================================
// 冷链仓储计费结算 - 计费概念领域模型
// ==========================================
// 计费概念 = 客户合同里的一条计费条目
// 用途: 配置层注入, 引擎层只读
// ==========================================

use crate::domain::types::{
    BillingPeriod, CalculationBase, CalculationType, OperationFlow, ProductFilter, ShiftKind,
    TariffType,
};
use serde::{Deserialize, Serialize};

// ==========================================
// TariffRange - 吨位区间费率
// ==========================================
// 区间按声明顺序首个匹配生效, 配置侧需保证互不重叠
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffRange {
    pub min_tons: f64,                 // 区间下界（吨, 含）
    pub max_tons: f64,                 // 区间上界（吨, 含）
    pub day_tariff: f64,               // 白班单价
    pub night_tariff: f64,             // 夜班单价
    pub extra_tariff: f64,             // 加班单价
    #[serde(default)]
    pub vehicle_type: Option<String>,  // 适用车型（装卸类概念回填结算行）
}

impl TariffRange {
    /// 按班次取对应单价列
    ///
    /// # 规则
    /// - DIURNO → day_tariff
    /// - NOCTURNO → night_tariff
    /// - EXTRA → extra_tariff
    /// - NO_APLICA → day_tariff（班次不适用时按白班列计）
    pub fn tariff_for_shift(&self, shift: ShiftKind) -> f64 {
        match shift {
            ShiftKind::Diurno | ShiftKind::NoAplica => self.day_tariff,
            ShiftKind::Nocturno => self.night_tariff,
            ShiftKind::Extra => self.extra_tariff,
        }
    }

    /// 吨位是否落入本区间（双闭区间）
    pub fn contains(&self, tons: f64) -> bool {
        tons >= self.min_tons && tons <= self.max_tons
    }
}

// ==========================================
// TemperatureRange - 温度区间费率
// ==========================================
// 历史配置存在上下界写反的数据, 匹配前先归一化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min_temp: f64,    // 温度下界（摄氏度）
    pub max_temp: f64,    // 温度上界（摄氏度）
    pub rate_per_kg: f64, // 每公斤单价
}

impl TemperatureRange {
    /// 归一化上下界（低值在前）
    pub fn normalized(&self) -> (f64, f64) {
        if self.min_temp <= self.max_temp {
            (self.min_temp, self.max_temp)
        } else {
            (self.max_temp, self.min_temp)
        }
    }

    /// 温度是否落入本区间（归一化后双闭区间）
    pub fn contains(&self, temp: f64) -> bool {
        let (lo, hi) = self.normalized();
        temp >= lo && temp <= hi
    }
}

// ==========================================
// SpecificTariff - 专项费率目录条目
// ==========================================
// 手工作业按 id 引用; 加班概念按 "{角色} {班次}" 名称引用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificTariff {
    pub id: String,                     // 目录内唯一编号
    pub name: String,                   // 费率名称
    pub value: f64,                     // 单价
    #[serde(default)]
    pub unit: Option<String>,           // 计量单位文本
    #[serde(default)]
    pub base_quantity: Option<f64>,     // 基准数量（固定包月类概念使用）
}

// ==========================================
// BillingConcept - 计费概念
// ==========================================
// calculation_type 选策略主干, tariff_type 选费率表分支
// 未被所选分支读取的费率字段一律忽略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConcept {
    // ===== 业务键 =====
    pub concept_name: String, // 概念名称（精确匹配, 不做模糊归一）

    // ===== 策略选择 =====
    pub calculation_type: CalculationType, // 计算类型
    pub tariff_type: TariffType,           // 费率类型
    pub calculation_base: CalculationBase, // 计量基准

    // ===== 费率数据（按 tariff_type 择一生效）=====
    #[serde(default)]
    pub value: Option<f64>, // 单一费率单价（UNIQUE）
    #[serde(default)]
    pub tariff_ranges: Vec<TariffRange>, // 吨位区间表（RANGES）
    #[serde(default)]
    pub tariff_ranges_temperature: Vec<TemperatureRange>, // 温度区间表（BY_TEMPERATURE）
    #[serde(default)]
    pub specific_tariffs: Vec<SpecificTariff>, // 专项费率目录（SPECIFIC）

    // ===== 班次窗口配置（"HH:mm" 文本, 解析失败按缺失处理）=====
    #[serde(default)]
    pub weekday_day_shift_start: Option<String>, // 工作日白班开始
    #[serde(default)]
    pub weekday_day_shift_end: Option<String>, // 工作日白班结束
    #[serde(default)]
    pub saturday_day_shift_start: Option<String>, // 周六白班开始
    #[serde(default)]
    pub saturday_day_shift_end: Option<String>, // 周六白班结束
    #[serde(default)]
    pub day_shift_end_time: Option<String>, // 加班拆分边界（白班终点）

    // ===== 作业过滤条件 =====
    #[serde(default)]
    pub filter_operation_type: OperationFlow, // 作业方向过滤
    #[serde(default)]
    pub filter_product_type: ProductFilter, // 货品类型过滤
    #[serde(default)]
    pub filter_pedido_types: Vec<String>, // 订单类型白名单（空 = 不限）
    #[serde(default)]
    pub filter_sesion: Option<String>, // 存储区过滤（"AMBAS" = 双区哨兵）
    #[serde(default)]
    pub associated_observation: Option<String>, // 关联观察项类型（OBSERVATION）

    // ===== 库存计费配置（BALANCE_INVENTORY）=====
    #[serde(default)]
    pub inventory_sesion: Option<String>, // 库存报表存储区
    #[serde(default)]
    pub inventory_source: Option<String>, // 库存报表来源标识

    // ===== 展示与周期 =====
    #[serde(default)]
    pub unit_of_measure: Option<String>, // 结算行计量单位文本（缺省用计量基准名）
    #[serde(default)]
    pub billing_period: BillingPeriod, // 计费周期
}

impl BillingConcept {
    /// 单一费率单价, 缺失按 0 计
    pub fn flat_value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    /// 结算行计量单位文本
    pub fn unit_label(&self) -> String {
        match &self.unit_of_measure {
            Some(u) if !u.trim().is_empty() => u.clone(),
            _ => self.calculation_base.to_string(),
        }
    }

    /// 按编号查专项费率
    pub fn specific_by_id(&self, id: &str) -> Option<&SpecificTariff> {
        self.specific_tariffs.iter().find(|t| t.id == id)
    }

    /// 按名称查专项费率（忽略大小写与首尾空白）
    pub fn specific_by_name(&self, name: &str) -> Option<&SpecificTariff> {
        let wanted = name.trim().to_uppercase();
        self.specific_tariffs
            .iter()
            .find(|t| t.name.trim().to_uppercase() == wanted)
    }

    /// 本概念是否需要进场历史（集装箱余额开账）
    pub fn needs_history(&self) -> bool {
        self.calculation_type == CalculationType::BalanceContainer
    }

    /// 本概念是否需要库存日报
    pub fn needs_inventory(&self) -> bool {
        self.calculation_type == CalculationType::BalanceInventory
    }
}
