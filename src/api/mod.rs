// ==========================================
// 八字运势引擎 - API 层
// ==========================================
// 职责: 输入校验、命盘缓存，供请求层与命令行调用
// ==========================================

pub mod cache;
pub mod error;
pub mod fortune_api;
pub mod validator;

// 重导出核心类型
pub use cache::{ChartCache, ChartKey};
pub use error::{ApiError, ApiResult};
pub use fortune_api::{BirthInput, ChartAnalysis, FortuneApi, FortuneReport};
