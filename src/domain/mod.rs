// ==========================================
// 冷链仓储计费结算 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、入库归一化规则
// 红线: 不含数据访问逻辑, 不含结算引擎逻辑
// ==========================================

pub mod concept;
pub mod operation;
pub mod settlement;
pub mod types;

// 重导出核心类型
pub use concept::{BillingConcept, SpecificTariff, TariffRange, TemperatureRange};
pub use operation::{
    AppliedTariff, DestinationGroup, FormData, FormOperation, ItemRow, ManualDetails,
    ManualOperation, ObservacionRegistro, OperationRecord, RoleCount, VehicleGroup,
    LOOSE_PALLET_SENTINEL, SUMMARY_PALLET_SENTINEL,
};
pub use settlement::{
    local_date, local_datetime, DailyInventory, SettlementRequest, SettlementRow,
};
pub use types::{
    BillingPeriod, CalculationBase, CalculationType, FormKind, ItemsLayout, OperationFlow,
    ProductFilter, ShiftKind, TariffType,
};
