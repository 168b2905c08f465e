// ==========================================
// 八字运势引擎 - 领域模型层
// ==========================================
// 职责: 定义干支/五行值类型、规则表、各阶段结果记录
// 红线: 不含引擎逻辑, 全部为不可变值类型
// ==========================================

pub mod favorable;
pub mod fortune;
pub mod ganzhi;
pub mod strength;
pub mod tables;
pub mod types;

// 重导出核心类型
pub use favorable::{ElementClass, FavorableCandidate, FavorableElementSet, FavorableTier};
pub use fortune::{FlowingPillars, FortuneScore, MarkerHit, ScoreBreakdown};
pub use ganzhi::{FourPillarChart, GanZhi, PillarPosition, SolarTermInfo};
pub use strength::{StrengthBreakdown, StrengthComponent, StrengthResult};
pub use tables::{ClimateRule, MarkerRule, MarkerTrigger, QiLayer, RuleTables, Triad};
pub use types::{
    Branch, Dimension, Element, ElementRelation, Gender, Polarity, Stem, StrengthLevel, TenGod,
};
