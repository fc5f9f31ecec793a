// ==========================================
// 冷链仓储计费结算 - 内存数据来源实现
// ==========================================
// CLI 运行器与集成测试共用; 生产数据源在引擎之外另行实现
// ==========================================

use crate::domain::{local_date, DailyInventory, OperationRecord};
use crate::repository::article_catalog::ArticleCatalog;
use crate::repository::error::SourceResult;
use crate::repository::inventory_source::InventorySource;
use crate::repository::operation_source::OperationSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// 作业记录
// ==========================================

/// 内存作业记录来源
pub struct InMemoryOperationSource {
    records: Vec<OperationRecord>,
}

impl InMemoryOperationSource {
    /// 装入记录并完成入库归一化
    pub fn new(mut records: Vec<OperationRecord>) -> Self {
        for record in &mut records {
            record.normalize();
        }
        InMemoryOperationSource { records }
    }
}

#[async_trait]
impl OperationSource for InMemoryOperationSource {
    async fn operations_in_range(
        &self,
        client: &str,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> SourceResult<Vec<OperationRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.client() == client)
            .filter(|r| {
                let d = local_date(&r.fecha());
                d >= desde && d <= hasta
            })
            .cloned()
            .collect())
    }

    async fn operations_through(
        &self,
        client: &str,
        hasta: NaiveDate,
    ) -> SourceResult<Vec<OperationRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.client() == client)
            .filter(|r| local_date(&r.fecha()) <= hasta)
            .cloned()
            .collect())
    }
}

// ==========================================
// 货品目录
// ==========================================

/// 货品编码与存储区的对应关系（CLI 请求文件里的目录条目）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSession {
    pub codigo: String, // 货品编码
    pub sesion: String, // 存储区
}

/// 内存货品目录
pub struct InMemoryArticleCatalog {
    sessions: HashMap<String, String>,
}

impl InMemoryArticleCatalog {
    pub fn new(entries: Vec<ArticleSession>) -> Self {
        let sessions = entries
            .into_iter()
            .map(|e| (e.codigo, e.sesion))
            .collect();
        InMemoryArticleCatalog { sessions }
    }

    /// 空目录（无存储区过滤需求的场景）
    pub fn empty() -> Self {
        InMemoryArticleCatalog {
            sessions: HashMap::new(),
        }
    }
}

impl ArticleCatalog for InMemoryArticleCatalog {
    fn session_of(&self, codigo_producto: &str) -> Option<String> {
        self.sessions.get(codigo_producto).cloned()
    }
}

// ==========================================
// 库存日报
// ==========================================

/// 内存库存日报来源, 按客户分组存放
pub struct InMemoryInventorySource {
    por_cliente: HashMap<String, Vec<DailyInventory>>,
}

impl InMemoryInventorySource {
    pub fn new(por_cliente: HashMap<String, Vec<DailyInventory>>) -> Self {
        InMemoryInventorySource { por_cliente }
    }

    /// 单客户报表
    pub fn single_client(client: &str, rows: Vec<DailyInventory>) -> Self {
        let mut por_cliente = HashMap::new();
        por_cliente.insert(client.to_string(), rows);
        InMemoryInventorySource { por_cliente }
    }

    /// 空报表
    pub fn empty() -> Self {
        InMemoryInventorySource {
            por_cliente: HashMap::new(),
        }
    }
}

#[async_trait]
impl InventorySource for InMemoryInventorySource {
    async fn daily_positions(
        &self,
        client: &str,
        sesion: Option<&str>,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> SourceResult<Vec<DailyInventory>> {
        let rows = match self.por_cliente.get(client) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };
        // 未标注存储区的报表行视为已按请求范围汇总
        Ok(rows
            .iter()
            .filter(|r| r.fecha >= desde && r.fecha <= hasta)
            .filter(|r| match (sesion, r.camara.as_deref()) {
                (Some(wanted), Some(etiqueta)) => etiqueta.eq_ignore_ascii_case(wanted),
                _ => true,
            })
            .cloned()
            .collect())
    }
}
