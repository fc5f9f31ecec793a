// ==========================================
// 冷链仓储计费结算 - 库存日报来源接口
// ==========================================

use crate::domain::DailyInventory;
use crate::repository::error::SourceResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 库存日报来源
///
/// 库存余额概念 (BALANCE_INVENTORY) 按外部对账报表计费,
/// 报表由库存系统逐日汇总生成, 引擎只读
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// 客户在结算区间内的逐日占用货位数
    ///
    /// # 参数
    /// - sesion: 存储区过滤, None 表示全部存储区合计
    async fn daily_positions(
        &self,
        client: &str,
        sesion: Option<&str>,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> SourceResult<Vec<DailyInventory>>;
}
