// ==========================================
// 冷链仓储计费结算 - 领域类型定义
// ==========================================
// 枚举序列化格式: SCREAMING_SNAKE_CASE (与概念配置数据一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 计算类型 (Calculation Type)
// ==========================================
// 决定概念走哪条结算策略主干
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationType {
    Rules,            // 规则计算: 从表单作业记录推导数量
    Manual,           // 手工录入: 人工登记的客户作业
    Observation,      // 观察项: 表单附注中登记的计数
    BalanceInventory, // 库存余额: 按日库存报表计费
    BalanceContainer, // 集装箱余额: 按日滚动托盘余额计费
    SpecialLogic,     // 专项逻辑: 指定客户的定制策略
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationType::Rules => write!(f, "RULES"),
            CalculationType::Manual => write!(f, "MANUAL"),
            CalculationType::Observation => write!(f, "OBSERVATION"),
            CalculationType::BalanceInventory => write!(f, "BALANCE_INVENTORY"),
            CalculationType::BalanceContainer => write!(f, "BALANCE_CONTAINER"),
            CalculationType::SpecialLogic => write!(f, "SPECIAL_LOGIC"),
        }
    }
}

impl CalculationType {
    /// 从配置字符串解析计算类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RULES" => Some(CalculationType::Rules),
            "MANUAL" => Some(CalculationType::Manual),
            "OBSERVATION" => Some(CalculationType::Observation),
            "BALANCE_INVENTORY" => Some(CalculationType::BalanceInventory),
            "BALANCE_CONTAINER" => Some(CalculationType::BalanceContainer),
            "SPECIAL_LOGIC" => Some(CalculationType::SpecialLogic),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CalculationType::Rules => "RULES",
            CalculationType::Manual => "MANUAL",
            CalculationType::Observation => "OBSERVATION",
            CalculationType::BalanceInventory => "BALANCE_INVENTORY",
            CalculationType::BalanceContainer => "BALANCE_CONTAINER",
            CalculationType::SpecialLogic => "SPECIAL_LOGIC",
        }
    }
}

// ==========================================
// 费率类型 (Tariff Type)
// ==========================================
// 决定概念读取哪张费率表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TariffType {
    Unique,        // 单一费率: 固定单价 value
    Ranges,        // 吨位区间费率: tariff_ranges + 班次列
    ByTemperature, // 温度区间费率: tariff_ranges_temperature (按公斤)
    Specific,      // 专项费率目录: specific_tariffs (按编号引用)
}

impl fmt::Display for TariffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TariffType::Unique => write!(f, "UNIQUE"),
            TariffType::Ranges => write!(f, "RANGES"),
            TariffType::ByTemperature => write!(f, "BY_TEMPERATURE"),
            TariffType::Specific => write!(f, "SPECIFIC"),
        }
    }
}

impl TariffType {
    /// 从配置字符串解析费率类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "UNIQUE" => Some(TariffType::Unique),
            "RANGES" => Some(TariffType::Ranges),
            "BY_TEMPERATURE" => Some(TariffType::ByTemperature),
            "SPECIFIC" => Some(TariffType::Specific),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TariffType::Unique => "UNIQUE",
            TariffType::Ranges => "RANGES",
            TariffType::ByTemperature => "BY_TEMPERATURE",
            TariffType::Specific => "SPECIFIC",
        }
    }
}

// ==========================================
// 计量基准 (Calculation Base)
// ==========================================
// 规则计算时从作业记录提取哪种数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationBase {
    Toneladas,    // 吨 (公斤 / 1000)
    Kilogramos,   // 公斤
    Paletas,      // 托盘数
    Cajas,        // 箱数 (件数)
    Operaciones,  // 作业次数 (每单一次)
    Contenedores, // 集装箱数
    Canastillas,  // 货筐数
    Posiciones,   // 存储货位数
}

impl fmt::Display for CalculationBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationBase::Toneladas => write!(f, "TONELADAS"),
            CalculationBase::Kilogramos => write!(f, "KILOGRAMOS"),
            CalculationBase::Paletas => write!(f, "PALETAS"),
            CalculationBase::Cajas => write!(f, "CAJAS"),
            CalculationBase::Operaciones => write!(f, "OPERACIONES"),
            CalculationBase::Contenedores => write!(f, "CONTENEDORES"),
            CalculationBase::Canastillas => write!(f, "CANASTILLAS"),
            CalculationBase::Posiciones => write!(f, "POSICIONES"),
        }
    }
}

// ==========================================
// 班次类型 (Shift Kind)
// ==========================================
// 班次分类器的输出, 决定吨位区间费率取哪一列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Diurno,   // 白班: 作业整体落在当日白班窗口内
    Nocturno, // 夜班: 工作日越出白班窗口
    Extra,    // 加班: 周日全天, 或周六越出白班窗口
    NoAplica, // 不适用: 概念豁免 / 数据缺失 / 解析失败
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftKind::Diurno => write!(f, "DIURNO"),
            ShiftKind::Nocturno => write!(f, "NOCTURNO"),
            ShiftKind::Extra => write!(f, "EXTRA"),
            ShiftKind::NoAplica => write!(f, "NO_APLICA"),
        }
    }
}

// ==========================================
// 作业方向过滤 (Operation Flow)
// ==========================================
// 概念的作业方向过滤条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationFlow {
    Recepcion, // 仅入库
    Despacho,  // 仅出库
    Ambas,     // 双向
}

impl fmt::Display for OperationFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationFlow::Recepcion => write!(f, "RECEPCION"),
            OperationFlow::Despacho => write!(f, "DESPACHO"),
            OperationFlow::Ambas => write!(f, "AMBAS"),
        }
    }
}

impl Default for OperationFlow {
    fn default() -> Self {
        OperationFlow::Ambas
    }
}

impl OperationFlow {
    /// 判断表单类型是否满足方向过滤
    pub fn admits(&self, kind: FormKind) -> bool {
        match self {
            OperationFlow::Recepcion => kind.is_reception(),
            OperationFlow::Despacho => kind.is_dispatch(),
            OperationFlow::Ambas => true,
        }
    }
}

// ==========================================
// 货品类型过滤 (Product Filter)
// ==========================================
// 固定重量货品 (整托标准重) 与变动重量货品 (逐托称重)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductFilter {
    Fijo,     // 仅固定重量表单
    Variable, // 仅变动重量表单
    Ambos,    // 两类均可
}

impl fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductFilter::Fijo => write!(f, "FIJO"),
            ProductFilter::Variable => write!(f, "VARIABLE"),
            ProductFilter::Ambos => write!(f, "AMBOS"),
        }
    }
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter::Ambos
    }
}

impl ProductFilter {
    /// 判断表单类型是否满足货品类型过滤
    pub fn admits(&self, kind: FormKind) -> bool {
        match self {
            ProductFilter::Fijo => kind.is_fixed(),
            ProductFilter::Variable => kind.is_variable(),
            ProductFilter::Ambos => true,
        }
    }
}

// ==========================================
// 计费周期 (Billing Period)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingPeriod {
    Mensual,   // 月结
    Quincenal, // 半月结
    Ninguno,   // 无周期 (随作业结算)
}

impl Default for BillingPeriod {
    fn default() -> Self {
        BillingPeriod::Ninguno
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingPeriod::Mensual => write!(f, "MENSUAL"),
            BillingPeriod::Quincenal => write!(f, "QUINCENAL"),
            BillingPeriod::Ninguno => write!(f, "NINGUNO"),
        }
    }
}

// ==========================================
// 表单类型 (Form Kind)
// ==========================================
// 四种表单: 货品重量模式 x 作业方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormKind {
    FijoRecepcion,     // 固定重量入库单
    FijoDespacho,      // 固定重量出库单
    VariableRecepcion, // 变动重量入库单
    VariableDespacho,  // 变动重量出库单
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormKind::FijoRecepcion => write!(f, "FIJO_RECEPCION"),
            FormKind::FijoDespacho => write!(f, "FIJO_DESPACHO"),
            FormKind::VariableRecepcion => write!(f, "VARIABLE_RECEPCION"),
            FormKind::VariableDespacho => write!(f, "VARIABLE_DESPACHO"),
        }
    }
}

impl FormKind {
    /// 是否入库方向
    pub fn is_reception(&self) -> bool {
        matches!(self, FormKind::FijoRecepcion | FormKind::VariableRecepcion)
    }

    /// 是否出库方向
    pub fn is_dispatch(&self) -> bool {
        matches!(self, FormKind::FijoDespacho | FormKind::VariableDespacho)
    }

    /// 是否固定重量表单
    pub fn is_fixed(&self) -> bool {
        matches!(self, FormKind::FijoRecepcion | FormKind::FijoDespacho)
    }

    /// 是否变动重量表单
    pub fn is_variable(&self) -> bool {
        matches!(self, FormKind::VariableRecepcion | FormKind::VariableDespacho)
    }

    /// 结算行上展示的作业方向文本
    pub fn flow_label(&self) -> &'static str {
        if self.is_reception() {
            "RECEPCION"
        } else {
            "DESPACHO"
        }
    }
}

// ==========================================
// 明细布局 (Items Layout)
// ==========================================
// 入库归一化时判定一次, 提取器只读不再推导
// 判定规则: 任一明细行 numero_paleta == 0 (汇总哨兵) 则为汇总布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemsLayout {
    Summary, // 汇总布局: 每行即一托汇总, 直接读行级合计
    Detail,  // 明细布局: 逐件登记, 按托盘号去重统计
}

impl Default for ItemsLayout {
    fn default() -> Self {
        ItemsLayout::Summary
    }
}

impl fmt::Display for ItemsLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemsLayout::Summary => write!(f, "SUMMARY"),
            ItemsLayout::Detail => write!(f, "DETAIL"),
        }
    }
}
