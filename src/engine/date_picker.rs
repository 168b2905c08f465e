// ==========================================
// 八字运势引擎 - 择日推荐
// ==========================================
// 流程: 逐日扫描 → 过滤(排除日期/周末策略) → 运势评分
//      → 场景分 + 风险分级 + 置信度 → 排序取前 N → 摘要
// 场景分 = 0.55 × 场景加权维度均分 + 0.25 × 核心维度 + 0.20 × 总分
// 红线: 同一输入的推荐结果必须完全一致（评分本身确定）
// ==========================================

use crate::domain::fortune::FortuneScore;
use crate::domain::ganzhi::GanZhi;
use crate::domain::types::Dimension;
use crate::engine::fortune::{FortuneProfile, FortuneScoreEngine};
use crate::engine::ganzhi_calculator::GanZhiCalculator;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, instrument};

pub const MIN_RANGE_DAYS: u32 = 3;
pub const MAX_RANGE_DAYS: u32 = 60;
pub const DEFAULT_RANGE_DAYS: u32 = 14;
pub const MIN_TOP_N: usize = 3;
pub const MAX_TOP_N: usize = 20;
pub const DEFAULT_TOP_N: usize = 10;

// ==========================================
// 择日场景 (Purpose)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Moving,   // 搬家
    Opening,  // 开业
    Travel,   // 出行
    Romance,  // 约会/婚嫁
    Wealth,   // 求财
    Academic, // 考试
    Other,
}

impl Purpose {
    pub const ALL: [Purpose; 7] = [
        Purpose::Moving,
        Purpose::Opening,
        Purpose::Travel,
        Purpose::Romance,
        Purpose::Wealth,
        Purpose::Academic,
        Purpose::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Moving => "moving",
            Purpose::Opening => "opening",
            Purpose::Travel => "travel",
            Purpose::Romance => "romance",
            Purpose::Wealth => "wealth",
            Purpose::Academic => "academic",
            Purpose::Other => "other",
        }
    }

    /// 场景核心维度（None 表示以总分为核心）
    pub fn core_dimension(self) -> Option<Dimension> {
        match self {
            Purpose::Moving => Some(Dimension::Career),
            Purpose::Opening | Purpose::Wealth => Some(Dimension::Wealth),
            Purpose::Travel => Some(Dimension::Travel),
            Purpose::Romance => Some(Dimension::Romance),
            Purpose::Academic => Some(Dimension::Study),
            Purpose::Other => None,
        }
    }

    /// 维度权重，顺序同 Dimension::ALL，合计为 1
    pub fn weights(self) -> [f64; 6] {
        match self {
            Purpose::Moving => [0.40, 0.10, 0.05, 0.25, 0.05, 0.15],
            Purpose::Opening => [0.15, 0.50, 0.05, 0.10, 0.05, 0.15],
            Purpose::Travel => [0.05, 0.10, 0.10, 0.30, 0.05, 0.40],
            Purpose::Romance => [0.05, 0.05, 0.55, 0.15, 0.05, 0.15],
            Purpose::Wealth => [0.20, 0.45, 0.05, 0.10, 0.05, 0.15],
            Purpose::Academic => [0.20, 0.05, 0.05, 0.10, 0.50, 0.10],
            Purpose::Other => [0.20, 0.20, 0.15, 0.15, 0.15, 0.15],
        }
    }

    /// 周末不宜的场景
    fn prefers_workday(self) -> bool {
        matches!(self, Purpose::Opening | Purpose::Academic)
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Purpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Purpose::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("未知择日场景: {}", s))
    }
}

// ==========================================
// 周末策略 (WeekendPolicy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendPolicy {
    #[default]
    All,
    WeekendOnly,
    WorkdayOnly,
}

impl WeekendPolicy {
    pub fn allows(self, date: NaiveDate) -> bool {
        match self {
            WeekendPolicy::All => true,
            WeekendPolicy::WeekendOnly => is_weekend(date),
            WeekendPolicy::WorkdayOnly => !is_weekend(date),
        }
    }
}

impl std::str::FromStr for WeekendPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(WeekendPolicy::All),
            "weekend_only" | "weekend" => Ok(WeekendPolicy::WeekendOnly),
            "workday_only" | "workday" => Ok(WeekendPolicy::WorkdayOnly),
            other => Err(format!("未知周末策略: {}", other)),
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 5
}

// ==========================================
// 请求与结果
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRequest {
    pub start: NaiveDate,
    pub range_days: u32,
    pub purpose: Purpose,
    #[serde(default)]
    pub weekend_policy: WeekendPolicy,
    #[serde(default)]
    pub excluded: BTreeSet<NaiveDate>,
    pub top_n: usize,
}

impl DateRequest {
    pub fn new(start: NaiveDate, purpose: Purpose) -> Self {
        Self {
            start,
            range_days: DEFAULT_RANGE_DAYS,
            purpose,
            weekend_policy: WeekendPolicy::All,
            excluded: BTreeSet::new(),
            top_n: DEFAULT_TOP_N,
        }
    }

    /// 扫描天数截断到 3..=60, 推荐数截断到 3..=20
    pub fn normalized(&self) -> Self {
        Self {
            range_days: self.range_days.clamp(MIN_RANGE_DAYS, MAX_RANGE_DAYS),
            top_n: self.top_n.clamp(MIN_TOP_N, MAX_TOP_N),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    GlobalScoreLow,
    PurposeScoreLow,
    CoreDimensionWeak,
    WeekendMismatch,
    HealthDrag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_weight(weight: u32) -> Self {
        match weight {
            0..=1 => RiskLevel::Low,
            2..=3 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

/// 单日候选
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateCandidate {
    pub date: NaiveDate,
    /// 0 = 周一
    pub weekday: u32,
    pub total: i32,
    pub purpose_score: i32,
    pub confidence: i32,
    pub risk_level: RiskLevel,
    pub risk_weight: u32,
    pub risk_flags: Vec<RiskFlag>,
    pub dimensions: BTreeMap<Dimension, i32>,
    pub highlights: Vec<String>,
    pub cautions: Vec<String>,
    pub tags: Vec<String>,
    pub year_pillar: GanZhi,
    pub month_pillar: GanZhi,
    pub day_pillar: GanZhi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePickSummary {
    pub best_date: NaiveDate,
    pub best_score: i32,
    pub worst_date: NaiveDate,
    pub worst_score: i32,
    pub trend: Trend,
    pub average_confidence: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePickResult {
    pub purpose: Purpose,
    pub start: NaiveDate,
    pub range_days: u32,
    pub scanned_days: usize,
    pub skipped_days: usize,
    pub recommendations: Vec<DateCandidate>,
    /// 全部候选，按日期排列
    pub timeline: Vec<DateCandidate>,
    pub summary: DatePickSummary,
}

// ==========================================
// DatePicker - 择日推荐器
// ==========================================
#[derive(Debug, Clone)]
pub struct DatePicker {
    calculator: GanZhiCalculator,
    engine: FortuneScoreEngine,
}

impl DatePicker {
    pub fn new(calculator: GanZhiCalculator, engine: FortuneScoreEngine) -> Self {
        Self { calculator, engine }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 扫描日期区间并给出推荐
    ///
    /// 过滤后没有任何可评分日期时返回 None
    #[instrument(skip(self, profile, request), fields(purpose = %request.purpose, start = %request.start))]
    pub fn recommend(&self, profile: &FortuneProfile, request: &DateRequest) -> Option<DatePickResult> {
        let request = request.normalized();

        let mut timeline = Vec::new();
        let mut skipped_days = 0;
        for offset in 0..request.range_days {
            let date = request.start + Duration::days(i64::from(offset));
            if request.excluded.contains(&date) || !request.weekend_policy.allows(date) {
                skipped_days += 1;
                continue;
            }
            let score = self.engine.score_profile(&self.calculator, profile, date);
            timeline.push(self.candidate(request.purpose, &score));
        }

        if timeline.is_empty() {
            debug!(skipped_days, "过滤后无可用日期");
            return None;
        }

        let mut ranked = timeline.clone();
        ranked.sort_by(|a, b| {
            b.purpose_score
                .cmp(&a.purpose_score)
                .then(b.total.cmp(&a.total))
                .then(a.risk_weight.cmp(&b.risk_weight))
                .then(a.date.cmp(&b.date))
        });
        ranked.truncate(request.top_n);

        let summary = summarize(&timeline, &ranked);
        info!(
            scanned = timeline.len(),
            skipped_days,
            best = %summary.best_date,
            trend = ?summary.trend,
            "择日推荐完成"
        );

        Some(DatePickResult {
            purpose: request.purpose,
            start: request.start,
            range_days: request.range_days,
            scanned_days: timeline.len(),
            skipped_days,
            recommendations: ranked,
            timeline,
            summary,
        })
    }

    /// 单日候选: 场景分 → 风险 → 置信度 → 说明
    pub fn candidate(&self, purpose: Purpose, score: &FortuneScore) -> DateCandidate {
        let date = score.target_date;
        let total = score.total;
        let purpose_score = purpose_score(purpose, score);
        let (risk_level, risk_weight, risk_flags) = analyze_risk(purpose, date, score, purpose_score);
        let confidence = confidence(purpose_score, risk_weight, total);
        let (highlights, cautions) = explanations(&score.dimensions);

        DateCandidate {
            date,
            weekday: date.weekday().num_days_from_monday(),
            total,
            purpose_score,
            confidence,
            risk_level,
            risk_weight,
            risk_flags,
            dimensions: score.dimensions.clone(),
            highlights,
            cautions,
            tags: tags(purpose_score, total, risk_level),
            year_pillar: score.pillars.year,
            month_pillar: score.pillars.month,
            day_pillar: score.pillars.day,
        }
    }
}

impl Default for DatePicker {
    fn default() -> Self {
        Self::new(GanZhiCalculator::default(), FortuneScoreEngine::default())
    }
}

// ==========================================
// 评分细则
// ==========================================

/// 场景分，四舍六入五成双后截断到 [0, 100]
pub fn purpose_score(purpose: Purpose, score: &FortuneScore) -> i32 {
    let weighted: f64 = Dimension::ALL
        .iter()
        .zip(purpose.weights())
        .map(|(d, w)| score.dimension(*d) as f64 * w)
        .sum();
    let core = purpose
        .core_dimension()
        .map_or(score.total, |d| score.dimension(d));
    let blended = weighted * 0.55 + core as f64 * 0.25 + score.total as f64 * 0.20;
    (blended.round_ties_even() as i32).clamp(0, 100)
}

pub fn analyze_risk(
    purpose: Purpose,
    date: NaiveDate,
    score: &FortuneScore,
    purpose_score: i32,
) -> (RiskLevel, u32, Vec<RiskFlag>) {
    let mut flags = Vec::new();
    if score.total < 52 {
        flags.push(RiskFlag::GlobalScoreLow);
    }
    if purpose_score < 58 {
        flags.push(RiskFlag::PurposeScoreLow);
    }
    if let Some(core) = purpose.core_dimension() {
        if score.dimension(core) < 55 {
            flags.push(RiskFlag::CoreDimensionWeak);
        }
    }
    if purpose.prefers_workday() && is_weekend(date) {
        flags.push(RiskFlag::WeekendMismatch);
    }
    if score.dimension(Dimension::Health) < 45 {
        flags.push(RiskFlag::HealthDrag);
    }

    let mut weight = flags.len() as u32;
    if score.total < 45 || purpose_score < 48 {
        weight += 1;
    }
    (RiskLevel::from_weight(weight), weight, flags)
}

pub fn confidence(purpose_score: i32, risk_weight: u32, total: i32) -> i32 {
    let raw = purpose_score as f64 - risk_weight as f64 * 8.0 + (total - 60) as f64 * 0.2;
    (raw.trunc() as i32).clamp(35, 99)
}

fn explanations(dimensions: &BTreeMap<Dimension, i32>) -> (Vec<String>, Vec<String>) {
    let mut ordered: Vec<(Dimension, i32)> = Dimension::ALL
        .iter()
        .map(|d| (*d, dimensions.get(d).copied().unwrap_or(50)))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    let highlights = ordered
        .iter()
        .take(2)
        .map(|(d, v)| format!("{}势能强（{}）", d.label_cn(), v))
        .collect();

    let mut cautions: Vec<String> = ordered
        .iter()
        .rev()
        .filter(|(_, v)| *v < 58)
        .take(2)
        .map(|(d, v)| format!("{}偏弱（{}），建议保守操作", d.label_cn(), v))
        .collect();
    if cautions.is_empty() {
        cautions.push("整体风险可控，按计划推进即可".to_string());
    }
    (highlights, cautions)
}

fn tags(purpose_score: i32, total: i32, risk_level: RiskLevel) -> Vec<String> {
    let mut tags = Vec::new();
    if purpose_score >= 88 {
        tags.push("场景高契合".to_string());
    }
    if total >= 85 {
        tags.push("势能峰值".to_string());
    }
    if risk_level == RiskLevel::Low {
        tags.push("低风险".to_string());
    }
    if tags.is_empty() {
        tags.push("均衡可用".to_string());
    }
    tags
}

/// timeline 按日期排列且非空, ranked 非空
fn summarize(timeline: &[DateCandidate], ranked: &[DateCandidate]) -> DatePickSummary {
    let best = &ranked[0];
    let worst = timeline
        .iter()
        .min_by_key(|c| c.purpose_score)
        .unwrap_or(best);

    let half = timeline.len() / 2;
    let first = &timeline[..half.max(1)];
    let second = &timeline[half..];
    let trend = trend(average(first), average(second));

    let confidence_sum: i32 = timeline.iter().map(|c| c.confidence).sum();
    DatePickSummary {
        best_date: best.date,
        best_score: best.purpose_score,
        worst_date: worst.date,
        worst_score: worst.purpose_score,
        trend,
        average_confidence: confidence_sum / timeline.len() as i32,
    }
}

fn average(candidates: &[DateCandidate]) -> f64 {
    let sum: i32 = candidates.iter().map(|c| c.purpose_score).sum();
    sum as f64 / candidates.len().max(1) as f64
}

pub fn trend(first_avg: f64, second_avg: f64) -> Trend {
    if second_avg > first_avg + 4.0 {
        Trend::Rising
    } else if first_avg > second_avg + 4.0 {
        Trend::Falling
    } else {
        Trend::Stable
    }
}
