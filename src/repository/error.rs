// ==========================================
// 冷链仓储计费结算 - 数据来源层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 数据来源层错误类型
#[derive(Error, Debug)]
pub enum SourceError {
    // ===== 查询基础设施错误 =====
    #[error("数据源缺少查询索引 (建索引链接: {})", .url.as_deref().unwrap_or("无"))]
    IndexRequired { url: Option<String> },

    #[error("数据源查询失败: {0}")]
    Query(String),

    #[error("数据源不可用: {0}")]
    Unavailable(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SourceError {
    /// 从查询失败消息归类错误
    ///
    /// # 规则
    /// - 消息含缺索引特征文本 → IndexRequired, 并提取其中的建索引控制台链接
    /// - 其余 → Query 原样透传
    pub fn from_query_message(msg: &str) -> Self {
        let lower = msg.to_lowercase();
        if lower.contains("requires an index") || lower.contains("index required") {
            return SourceError::IndexRequired {
                url: extract_https_url(msg),
            };
        }
        SourceError::Query(msg.to_string())
    }

    /// 是否缺索引错误
    pub fn is_index_required(&self) -> bool {
        matches!(self, SourceError::IndexRequired { .. })
    }
}

/// 提取消息中的首个 https 链接（到空白或常见收尾符为止）
fn extract_https_url(msg: &str) -> Option<String> {
    let start = msg.find("https://")?;
    let tail = &msg[start..];
    let end = tail
        .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ')' || c == ',')
        .unwrap_or(tail.len());
    Some(tail[..end].to_string())
}

/// Result 类型别名
pub type SourceResult<T> = Result<T, SourceError>;
