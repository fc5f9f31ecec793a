// ==========================================
// 冷链仓储计费结算 - 配置层
// ==========================================
// 职责: 业务参数表的定义、生产默认值与加载
// 注入: 引擎只读, CLI 可用 JSON 覆盖, 测试按场景构造
// ==========================================

pub mod billing_tables;

// 重导出核心配置
pub use billing_tables::{
    BasketLoadingRules, BillingTables, LotFreezingRules, SpecialClientRegistry,
};
