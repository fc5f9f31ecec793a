// ==========================================
// 冷链仓储计费结算 - 结算编排器
// ==========================================
// 用途: 协调数据拉取、专项客户前置结算、通用概念循环与最终排序
// 出口: try_settle 返回结构化错误, settle 包装为用户可读结果
// ==========================================

use crate::config::BillingTables;
use crate::domain::{FormOperation, SettlementRequest, SettlementRow};
use crate::engine::dispatcher::{DispatchContext, SettlementDispatcher};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::repositories::SettlementSources;
use crate::engine::sequencer::RowSequencer;
use crate::engine::special::SpecialCaseEngine;
use crate::i18n::{t, t_with_args};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// SettlementRun - 结算产物
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRun {
    pub run_id: Uuid,                // 本次结算标识
    pub client: String,              // 客户编码
    pub desde: NaiveDate,            // 区间起 (含)
    pub hasta: NaiveDate,            // 区间止 (含)
    pub generated_at: DateTime<Utc>, // 生成时刻
    pub rows: Vec<SettlementRow>,    // 排好序的账单行
}

/// 面向调用方的错误载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeError {
    pub kind: String,                    // CONFIG_MISSING / INDEX_REQUIRED / SOURCE / UNKNOWN
    pub message: String,                 // 按当前语言渲染的提示
    pub remediation_url: Option<String>, // 建索引链接 (仅 INDEX_REQUIRED)
}

/// 包装后的结算结果, 错误不外抛
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub success: bool,
    pub run: Option<SettlementRun>,
    pub error: Option<OutcomeError>,
}

impl SettlementOutcome {
    fn ok(run: SettlementRun) -> Self {
        SettlementOutcome {
            success: true,
            run: Some(run),
            error: None,
        }
    }

    fn failed(err: &EngineError) -> Self {
        SettlementOutcome {
            success: false,
            run: None,
            error: Some(OutcomeError::from_engine_error(err)),
        }
    }

    /// 结算行视图 (失败时为空)
    pub fn rows(&self) -> &[SettlementRow] {
        self.run.as_ref().map(|r| r.rows.as_slice()).unwrap_or(&[])
    }
}

impl OutcomeError {
    fn from_engine_error(err: &EngineError) -> Self {
        match err {
            EngineError::ConfigMissing { concepto, detalle } => OutcomeError {
                kind: "CONFIG_MISSING".to_string(),
                message: t_with_args(
                    "settlement.config_missing",
                    &[("concepto", concepto), ("detalle", detalle)],
                ),
                remediation_url: None,
            },
            EngineError::IndexRequired { url } => OutcomeError {
                kind: "INDEX_REQUIRED".to_string(),
                message: match url {
                    Some(u) => t_with_args("settlement.index_required_url", &[("url", u)]),
                    None => t("settlement.index_required"),
                },
                remediation_url: url.clone(),
            },
            EngineError::Source(source) => OutcomeError {
                kind: "SOURCE".to_string(),
                message: t_with_args(
                    "settlement.source_error",
                    &[("detalle", &source.to_string())],
                ),
                remediation_url: None,
            },
            EngineError::Unknown(inner) => OutcomeError {
                kind: "UNKNOWN".to_string(),
                message: t_with_args(
                    "settlement.unknown_error",
                    &[("detalle", &inner.to_string())],
                ),
                remediation_url: None,
            },
        }
    }
}

// ==========================================
// SettlementOrchestrator - 结算编排器
// ==========================================

pub struct SettlementOrchestrator {
    sources: SettlementSources,
    tables: Arc<BillingTables>,
    dispatcher: SettlementDispatcher,
    special: SpecialCaseEngine,
    sequencer: RowSequencer,
}

impl SettlementOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - sources: 数据源集合
    /// - tables: 计费规则表
    pub fn new(sources: SettlementSources, tables: Arc<BillingTables>) -> Self {
        Self {
            sources,
            tables,
            dispatcher: SettlementDispatcher::new(),
            special: SpecialCaseEngine::new(),
            sequencer: RowSequencer::new(),
        }
    }

    /// 执行完整结算流程
    ///
    /// # 参数
    /// - request: 结算请求 (客户 + 区间 + 概念清单)
    ///
    /// # 返回
    /// 排好序的结算产物; 配置缺失与数据源索引缺失为致命错误
    #[instrument(skip(self, request), fields(client = %request.client, desde = %request.desde, hasta = %request.hasta))]
    pub async fn try_settle(&self, request: &SettlementRequest) -> EngineResult<SettlementRun> {
        info!(
            concepts_count = request.concepts.len(),
            "开始执行结算流程"
        );

        // ==========================================
        // 步骤1: 并发拉取数据源
        // ==========================================
        debug!("步骤1: 拉取作业记录与报表");

        let need_history = request.concepts.iter().any(|c| c.needs_history());
        let need_inventory = request.concepts.iter().any(|c| c.needs_inventory());

        let operations_fut = self.sources.operations.operations_in_range(
            &request.client,
            request.desde,
            request.hasta,
        );
        let history_fut = async {
            if need_history {
                self.sources
                    .operations
                    .operations_through(&request.client, request.hasta)
                    .await
            } else {
                Ok(Vec::new())
            }
        };
        let inventory_fut = async {
            if need_inventory {
                self.sources
                    .inventory
                    .daily_positions(&request.client, None, request.desde, request.hasta)
                    .await
            } else {
                Ok(Vec::new())
            }
        };

        let (mut operations, mut history, inventory) =
            tokio::try_join!(operations_fut, history_fut, inventory_fut)?;

        info!(
            operations_count = operations.len(),
            history_count = history.len(),
            inventory_count = inventory.len(),
            "数据拉取完成"
        );

        // ==========================================
        // 步骤2: 入库归一化
        // ==========================================
        debug!("步骤2: 固化明细布局");

        for record in operations.iter_mut().chain(history.iter_mut()) {
            record.normalize();
        }

        let forms: Vec<&FormOperation> = operations.iter().filter_map(|r| r.as_form()).collect();
        let history_forms: Vec<&FormOperation> =
            history.iter().filter_map(|r| r.as_form()).collect();

        // ==========================================
        // 步骤3: 专项客户前置结算
        // ==========================================
        debug!("步骤3: 专项客户前置结算");

        let mut rows: Vec<SettlementRow> = Vec::new();
        let mut consumed: HashSet<String> = HashSet::new();

        if self.special.is_special_client(&request.client, &self.tables) {
            let (special_rows, special_consumed) =
                self.special.settle_client(request, &forms, &self.tables)?;
            info!(
                rows_count = special_rows.len(),
                consumed_count = special_consumed.len(),
                "专项客户结算完成"
            );
            rows.extend(special_rows);
            consumed = special_consumed;
        }

        // ==========================================
        // 步骤4: 通用概念循环
        // ==========================================
        debug!("步骤4: 逐概念结算");

        let ctx = DispatchContext {
            request,
            operations: &operations,
            history_forms,
            inventory: &inventory,
            catalog: &*self.sources.articles,
            tables: &self.tables,
        };
        for concept in &request.concepts {
            if consumed.contains(&concept.concept_name) {
                debug!(concepto = %concept.concept_name, "已由专项策略消费, 跳过");
                continue;
            }
            let concept_rows = self.dispatcher.settle_concept(concept, &ctx)?;
            debug!(
                concepto = %concept.concept_name,
                rows_count = concept_rows.len(),
                "概念结算完成"
            );
            rows.extend(concept_rows);
        }

        // ==========================================
        // 步骤5: 最终排序
        // ==========================================
        debug!("步骤5: 结算行排序");

        let rows = self.sequencer.sort(rows, &self.tables);

        info!(rows_count = rows.len(), "结算流程完成");

        Ok(SettlementRun {
            run_id: Uuid::new_v4(),
            client: request.client.clone(),
            desde: request.desde,
            hasta: request.hasta,
            generated_at: Utc::now(),
            rows,
        })
    }

    /// 结算并包装结果, 错误转为用户可读载荷
    ///
    /// IndexRequired 错误附带建索引链接, 调用方可直接展示
    pub async fn settle(&self, request: &SettlementRequest) -> SettlementOutcome {
        match self.try_settle(request).await {
            Ok(run) => SettlementOutcome::ok(run),
            Err(err) => {
                error!(error = %err, "结算流程失败");
                SettlementOutcome::failed(&err)
            }
        }
    }
}
