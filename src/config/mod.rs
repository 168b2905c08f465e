// ==========================================
// 八字运势引擎 - 配置层
// ==========================================
// 职责: 引擎参数（权重/阈值/历法基准）的加载与校验
// 来源: 默认值 / JSON 文件 / BAZI_FORTUNE_CONFIG 环境变量
// ==========================================

pub mod engine_config;

pub use engine_config::{
    CalendarConfig, ConfigError, CycleWeight, EngineConfig, FavorableConfig, FortuneConfig,
    StrengthConfig, StrengthWeights, CONFIG_ENV_VAR,
};
