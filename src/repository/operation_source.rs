// ==========================================
// 冷链仓储计费结算 - 作业记录来源接口
// ==========================================
// 结算引擎唯一的作业数据入口, 存储实现在引擎之外
// ==========================================

use crate::domain::OperationRecord;
use crate::repository::error::SourceResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 作业记录来源
///
/// # 约定
/// - 日期区间按本地日历日（UTC-5）双闭区间
/// - 返回记录已完成入库归一化（明细布局已固化）
#[async_trait]
pub trait OperationSource: Send + Sync {
    /// 查询客户在结算区间内的全部作业记录
    async fn operations_in_range(
        &self,
        client: &str,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> SourceResult<Vec<OperationRecord>>;

    /// 查询客户截止某日（含）的全部历史作业记录
    ///
    /// 集装箱余额概念需要区间起点之前的进出历史来计算开账余额
    async fn operations_through(
        &self,
        client: &str,
        hasta: NaiveDate,
    ) -> SourceResult<Vec<OperationRecord>>;
}
