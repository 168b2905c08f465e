// ==========================================
// 八字运势引擎 - 核心库
// ==========================================
// 排盘(真太阳时/早子时/节气定月) → 旺衰 → 用神 → 大运 → 流日评分 → 择日
// 系统定位: 纯计算核心，无 I/O、无全局状态；请求层与持久化不在此库内
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值类型与规则表
pub mod domain;

// 引擎层 - 计算规则
pub mod engine;

// 配置层 - 引擎参数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 校验、缓存、门面
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    Branch, Dimension, Element, Gender, Polarity, Stem, StrengthLevel, TenGod,
};

// 领域记录
pub use domain::{
    FavorableElementSet, FlowingPillars, FortuneScore, FourPillarChart, GanZhi, RuleTables,
    StrengthResult,
};

// 引擎
pub use engine::{
    DatePicker, DecadeCycleCalculator, FavorableElementDeriver, FortuneScoreEngine,
    GanZhiCalculator, SolarTermProvider, StrengthAnalyzer,
};

// 配置
pub use config::{ConfigError, EngineConfig};

// API
pub use api::{ApiError, ApiResult, ChartAnalysis, FortuneApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "八字运势引擎";
