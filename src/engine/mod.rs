// ==========================================
// 冷链仓储计费结算 - 引擎层
// ==========================================
// 职责: 实现计费业务规则, 不做 IO
// 红线: 引擎只消费数据源 trait, 所有跳过必须留日志
// ==========================================

pub mod balance;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod repositories;
pub mod sequencer;
pub mod shift;
pub mod special;
pub mod tariff;
pub mod time_extra;

// 重导出核心引擎
pub use balance::{ContainerBalanceEngine, InventoryBalanceEngine};
pub use dispatcher::{DispatchContext, SettlementDispatcher};
pub use error::{EngineError, EngineResult};
pub use extract::QuantityExtractor;
pub use orchestrator::{OutcomeError, SettlementOrchestrator, SettlementOutcome, SettlementRun};
pub use repositories::SettlementSources;
pub use sequencer::RowSequencer;
pub use shift::ShiftClassifier;
pub use special::SpecialCaseEngine;
pub use tariff::TariffResolver;
pub use time_extra::TimeExtraEngine;
