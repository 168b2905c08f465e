// ==========================================
// 八字运势引擎 - 流运与运势评分
// ==========================================
// FlowingPillars: 大运 + 流年 + 流月 + 流日
// FortuneScore: 总分 + 分项明细 + 六维度分 + 命中神煞
// ==========================================

use crate::domain::ganzhi::GanZhi;
use crate::domain::types::{Dimension, TenGod};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// 目标日期的流运干支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowingPillars {
    pub target_date: NaiveDate,
    /// 大运（起运前为 None）
    pub decade: Option<GanZhi>,
    pub year: GanZhi,
    pub month: GanZhi,
    pub day: GanZhi,
}

/// 命中的神煞
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerHit {
    pub key: &'static str,
    pub name: &'static str,
    pub score: i32,
    pub auspicious: bool,
    pub desc: &'static str,
}

/// 分项得分明细
///
/// 年/月/日三项为加权后的贡献值（保留 1 位小数）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub decade_adjustment: i32,
    pub year: f64,
    pub month: f64,
    pub day: f64,
    pub stem_interaction: i32,
    pub branch_interaction: i32,
    pub markers: i32,
    pub relation: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FortuneScore {
    pub target_date: NaiveDate,
    pub total: i32,
    pub breakdown: ScoreBreakdown,
    pub dimensions: BTreeMap<Dimension, i32>,
    /// 流日天干相对日主的十神
    pub ten_god: TenGod,
    pub markers: Vec<MarkerHit>,
    pub pillars: FlowingPillars,
    /// 干支互动说明
    pub notes: Vec<String>,
}

impl FortuneScore {
    pub fn dimension(&self, dimension: Dimension) -> i32 {
        self.dimensions.get(&dimension).copied().unwrap_or(self.total)
    }
}
