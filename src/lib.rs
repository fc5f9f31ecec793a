// ==========================================
// 冷链仓储运营系统 - 客户计费结算引擎核心库
// ==========================================
// 系统定位: 决策支持系统 (结算结果供人工开票前复核)
// 技术栈: Rust + Tokio
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据来源层 - 协作方接口
pub mod repository;

// 引擎层 - 结算规则
pub mod engine;

// 配置层 - 业务参数表
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BillingPeriod, CalculationBase, CalculationType, FormKind, ItemsLayout, OperationFlow,
    ProductFilter, ShiftKind, TariffType,
};

// 领域实体
pub use domain::{
    BillingConcept, DailyInventory, FormData, FormOperation, ItemRow, ManualOperation,
    OperationRecord, SettlementRequest, SettlementRow, SpecificTariff, TariffRange,
    TemperatureRange,
};

// 引擎
pub use engine::{
    ContainerBalanceEngine, EngineError, EngineResult, InventoryBalanceEngine, QuantityExtractor,
    RowSequencer, SettlementDispatcher, SettlementOrchestrator, SettlementOutcome, SettlementRun,
    SettlementSources, ShiftClassifier, TariffResolver, TimeExtraEngine,
};

// 配置
pub use config::BillingTables;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "冷链仓储客户计费结算引擎";

// 仓储本地时区: UTC-5 固定偏移 (哥伦比亚, 无夏令时)
pub const LOCAL_UTC_OFFSET_HOURS: i32 = -5;

// ==========================================
// 预编译检查
// ==========================================
