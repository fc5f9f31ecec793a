// ==========================================
// 冷链仓储计费结算 - 数据来源层
// ==========================================
// 红线: 数据来源不含结算业务逻辑
// ==========================================
// 职责: 定义结算引擎的协作方查询接口, 屏蔽存储细节
// 引擎只依赖本层 trait; 生产实现与引擎彻底解耦
// ==========================================

pub mod article_catalog;
pub mod error;
pub mod inventory_source;
pub mod memory;
pub mod operation_source;

// 重导出核心接口
pub use article_catalog::ArticleCatalog;
pub use error::{SourceError, SourceResult};
pub use inventory_source::InventorySource;
pub use memory::{
    ArticleSession, InMemoryArticleCatalog, InMemoryInventorySource, InMemoryOperationSource,
};
pub use operation_source::OperationSource;
