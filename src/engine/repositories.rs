// ==========================================
// 冷链仓储计费结算 - 引擎层数据源聚合
// ==========================================
// 职责: 聚合结算编排所需的全部数据源
// 目标: 减少 SettlementOrchestrator 的构造函数参数数量
// ==========================================

use std::sync::Arc;

use crate::repository::{ArticleCatalog, InventorySource, OperationSource};

/// 结算引擎数据源集合
///
/// 聚合编排器所需的全部数据源, 简化依赖注入。
///
/// # 包含的数据源
/// - `operations`: 作业记录源 (表单 + 手工登记)
/// - `articles`: 货品目录 (货品 → 存储区)
/// - `inventory`: 库存日报源 (货位占用)
#[derive(Clone)]
pub struct SettlementSources {
    /// 作业记录源
    pub operations: Arc<dyn OperationSource>,
    /// 货品目录
    pub articles: Arc<dyn ArticleCatalog>,
    /// 库存日报源
    pub inventory: Arc<dyn InventorySource>,
}

impl SettlementSources {
    /// 创建新的数据源集合
    pub fn new(
        operations: Arc<dyn OperationSource>,
        articles: Arc<dyn ArticleCatalog>,
        inventory: Arc<dyn InventorySource>,
    ) -> Self {
        Self {
            operations,
            articles,
            inventory,
        }
    }
}
