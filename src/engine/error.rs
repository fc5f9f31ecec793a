// ==========================================
// 冷链仓储计费结算 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 配置缺失与缺索引中止整次结算; 单行无费率匹配静默跳过
// ==========================================

use crate::repository::SourceError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 配置错误 =====
    #[error("概念配置缺失 ({concepto}): {detalle}")]
    ConfigMissing { concepto: String, detalle: String },

    // ===== 数据源基础设施错误 =====
    #[error("数据源缺少查询索引 (建索引链接: {})", .url.as_deref().unwrap_or("无"))]
    IndexRequired { url: Option<String> },

    #[error(transparent)]
    Source(SourceError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl EngineError {
    /// 构造配置缺失错误
    pub fn config_missing(concepto: &str, detalle: &str) -> Self {
        EngineError::ConfigMissing {
            concepto: concepto.to_string(),
            detalle: detalle.to_string(),
        }
    }
}

// 缺索引错误在引擎层提级, 其余数据源错误原样包装
impl From<SourceError> for EngineError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::IndexRequired { url } => EngineError::IndexRequired { url },
            other => EngineError::Source(other),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
