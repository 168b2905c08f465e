// ==========================================
// 八字运势引擎 - API层错误类型
// ==========================================
// 职责: 汇总输入校验与配置错误，引擎本身不产生错误
// ==========================================

use crate::config::ConfigError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 过滤条件下没有任何可评分日期
    #[error("未生成可用日期，请调整筛选条件后重试")]
    NoCandidateDates,

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("缓存锁获取失败: {0}")]
    LockError(String),
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ApiError::InvalidInput(msg.into())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
