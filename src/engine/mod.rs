// ==========================================
// 八字运势引擎 - 引擎层
// ==========================================
// 职责: 排盘、旺衰、用神、大运、流日评分、择日
// 红线: 引擎均为纯函数, 规则表由构造时注入, 不读取全局状态
// ==========================================

pub mod date_picker;
pub mod decade;
pub mod favorable;
pub mod fortune;
pub mod ganzhi_calculator;
pub mod jitter;
pub mod solar_terms;
pub mod strength;

// 重导出核心引擎
pub use date_picker::{DatePickResult, DatePicker, DateRequest, Purpose, WeekendPolicy};
pub use decade::{DecadeCycle, DecadeCycleCalculator, DecadeDirection, DecadePillar};
pub use favorable::FavorableElementDeriver;
pub use fortune::{FortuneProfile, FortuneScoreEngine};
pub use ganzhi_calculator::GanZhiCalculator;
pub use jitter::DayJitter;
pub use solar_terms::{SolarTermProvider, SolarTermTable};
pub use strength::StrengthAnalyzer;
