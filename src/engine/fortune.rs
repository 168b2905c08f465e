// ==========================================
// 八字运势引擎 - 运势评分引擎
// ==========================================
// 总分 = 基础分 + 大运修正
//      + 流年(10%) + 流月(20%) + 流日(70%)
//      + 天干互动 + 地支互动 + 神煞 + 十神
// 截断到 [floor, ceiling] (默认 30 ~ 100)
// 六维度: 以总分为底, 叠加核心十神 / 日支合冲 / 神煞加成, 各自截断到 [0, 100]
// 红线: 扰动只由流日干支播种, 同一输入必须得到完全相同的输出
// ==========================================

mod scoring;

#[cfg(test)]
mod tests;

use crate::config::{CycleWeight, FortuneConfig};
use crate::domain::favorable::FavorableElementSet;
use crate::domain::fortune::{FlowingPillars, FortuneScore, MarkerHit, ScoreBreakdown};
use crate::domain::ganzhi::{FourPillarChart, PillarPosition};
use crate::domain::tables::{MarkerRule, MarkerTrigger, RuleTables};
use crate::domain::types::{Branch, Dimension, Element, ElementRelation, Gender, Stem, TenGod};
use crate::engine::decade::DecadeCycle;
use crate::engine::ganzhi_calculator::GanZhiCalculator;
use crate::engine::jitter::DayJitter;
use chrono::{Datelike, NaiveDate};
use scoring::{cycle_bonus, dimension_core, relation_bonus, CyclePart};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

// ==========================================
// FortuneProfile - 命主画像（命盘 + 用神 + 大运）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FortuneProfile {
    pub chart: FourPillarChart,
    pub favorable: FavorableElementSet,
    pub gender: Gender,
    pub decade: DecadeCycle,
}

impl FortuneProfile {
    /// 目标日期的流运干支，大运按公历年份查找
    pub fn pillars_on(&self, calculator: &GanZhiCalculator, date: NaiveDate) -> FlowingPillars {
        let mut pillars = calculator.flowing_pillars(date);
        pillars.decade = self.decade.pillar_for_year(date.year());
        pillars
    }
}

// ==========================================
// FortuneScoreEngine - 运势评分引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct FortuneScoreEngine {
    config: FortuneConfig,
    tables: Arc<RuleTables>,
}

impl FortuneScoreEngine {
    pub fn new(config: FortuneConfig, tables: Arc<RuleTables>) -> Self {
        Self { config, tables }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算目标日期的运势分
    #[instrument(skip(self, chart, favorable, pillars), fields(day = %pillars.day, date = %pillars.target_date))]
    pub fn score(
        &self,
        chart: &FourPillarChart,
        favorable: &FavorableElementSet,
        pillars: &FlowingPillars,
        gender: Gender,
    ) -> FortuneScore {
        let mut jitter = DayJitter::for_day(pillars.day);
        let is_weak = favorable.strength_level.is_weak();
        let dm = chart.day_master();
        let mut notes = Vec::new();

        // 1. 基础分 + 大运修正
        let base = self.config.base_score;
        let decade_adjustment = self.decade_adjustment(favorable, pillars);

        // 2. 流年/流月/流日（抽取顺序固定）
        let cfg = &self.config;
        let year = self.cycle_contribution(
            &mut jitter,
            favorable,
            (CyclePart::YearStem, pillars.year.stem.element()),
            (CyclePart::YearBranch, pillars.year.branch.element()),
            &cfg.year,
        );
        let month = self.cycle_contribution(
            &mut jitter,
            favorable,
            (CyclePart::MonthStem, pillars.month.stem.element()),
            (CyclePart::MonthBranch, pillars.month.branch.element()),
            &cfg.month,
        );
        let day = self.cycle_contribution(
            &mut jitter,
            favorable,
            (CyclePart::DayStem, pillars.day.stem.element()),
            (CyclePart::DayBranch, pillars.day.branch.element()),
            &cfg.day,
        );

        // 3. 天干互动
        let stem_interaction =
            self.stem_interaction(dm, pillars.day.stem, favorable, is_weak, &mut notes);

        // 4. 地支互动
        let branch_interaction =
            self.branch_interaction(chart, pillars.day.branch, favorable, &mut notes);

        // 5. 神煞
        let hits = self.marker_hits(chart, pillars.day.branch);
        let marker_sum: i32 = hits.iter().map(|m| m.score).sum();
        let markers = marker_sum.clamp(-cfg.marker_cap, cfg.marker_cap);

        // 6. 十神
        let ten_god = TenGod::between(dm, pillars.day.stem);
        let relation = relation_bonus(ten_god, is_weak);

        let raw = (base + decade_adjustment) as f64
            + year
            + month
            + day
            + (stem_interaction + branch_interaction + markers + relation) as f64;
        let total = (raw.trunc() as i32).clamp(cfg.floor, cfg.ceiling);

        let dimensions =
            self.dimension_scores(total, chart, pillars.day.branch, ten_god, &hits, gender);

        debug!(raw, total, ten_god = %ten_god, markers = hits.len(), "运势评分完成");

        FortuneScore {
            target_date: pillars.target_date,
            total,
            breakdown: ScoreBreakdown {
                base,
                decade_adjustment,
                year: round1(year),
                month: round1(month),
                day: round1(day),
                stem_interaction,
                branch_interaction,
                markers,
                relation,
            },
            dimensions,
            ten_god,
            markers: hits
                .iter()
                .map(|rule| MarkerHit {
                    key: rule.key,
                    name: rule.name_cn,
                    score: rule.score,
                    auspicious: rule.is_auspicious(),
                    desc: rule.desc,
                })
                .collect(),
            pillars: *pillars,
            notes,
        }
    }

    /// 按命主画像为某一天评分
    pub fn score_profile(
        &self,
        calculator: &GanZhiCalculator,
        profile: &FortuneProfile,
        date: NaiveDate,
    ) -> FortuneScore {
        let pillars = profile.pillars_on(calculator, date);
        self.score(&profile.chart, &profile.favorable, &pillars, profile.gender)
    }

    // ==========================================
    // 分项
    // ==========================================

    /// 大运天干为喜用 +adj, 为忌神 -adj
    fn decade_adjustment(&self, favorable: &FavorableElementSet, pillars: &FlowingPillars) -> i32 {
        match pillars.decade {
            Some(decade) => {
                let element = decade.stem.element();
                if favorable.is_favorable(element) {
                    self.config.decade_adjustment
                } else if favorable.is_unfavorable(element) {
                    -self.config.decade_adjustment
                } else {
                    0
                }
            }
            None => 0,
        }
    }

    /// 单个流运周期: (干分 × 干比 + 支分 × 支比) × 缩放
    fn cycle_contribution(
        &self,
        jitter: &mut DayJitter,
        favorable: &FavorableElementSet,
        stem: (CyclePart, Element),
        branch: (CyclePart, Element),
        weight: &CycleWeight,
    ) -> f64 {
        let stem_score = draw(jitter, stem.0, favorable, stem.1);
        let branch_score = draw(jitter, branch.0, favorable, branch.1);
        (stem_score as f64 * weight.stem_ratio + branch_score as f64 * weight.branch_ratio)
            * weight.scale()
    }

    /// 日主与流日天干的生克比和
    fn stem_interaction(
        &self,
        dm: Stem,
        other: Stem,
        favorable: &FavorableElementSet,
        is_weak: bool,
        notes: &mut Vec<String>,
    ) -> i32 {
        let other_element = other.element();
        let is_fav = favorable.is_favorable(other_element);
        let is_unfav = favorable.is_unfavorable(other_element);

        let (score, note) = match other_element.relation_to(dm.element()) {
            ElementRelation::Generates if is_fav => (4, "天干相生，喜神助力"),
            ElementRelation::Generates if is_unfav => (-3, "天干相生，生助忌神"),
            ElementRelation::Generates => (1, "天干相生，温和助力"),
            ElementRelation::Restrains if is_unfav => (3, "天干相克，克制忌神"),
            ElementRelation::Restrains if is_fav => (-3, "天干受克，喜神受损"),
            ElementRelation::Restrains => (-1, "天干相克，轻微影响"),
            ElementRelation::Same if is_weak => (3, "天干比和，同类相助"),
            ElementRelation::Same => (-4, "天干比和，竞争夺利"),
            _ => return 0,
        };
        notes.push(note.to_string());
        score
    }

    /// 流日地支冲命局四支
    fn branch_interaction(
        &self,
        chart: &FourPillarChart,
        day_branch: Branch,
        favorable: &FavorableElementSet,
        notes: &mut Vec<String>,
    ) -> i32 {
        let mut score = 0;
        for position in PillarPosition::ALL {
            let natal = chart.pillar(position).branch;
            if !self.tables.clashes(day_branch, natal) {
                continue;
            }
            let element = natal.element();
            let (delta, note) = if position == PillarPosition::Day {
                (scoring::CLASH_DAY_BRANCH, "动荡不安")
            } else if favorable.is_unfavorable(element) {
                (scoring::CLASH_UNFAVORABLE, "冲去忌神，变动中求吉")
            } else if favorable.is_favorable(element) {
                (scoring::CLASH_FAVORABLE, "冲动用神，防备突发")
            } else {
                (scoring::CLASH_NEUTRAL, "有变动")
            };
            score += delta;
            notes.push(format!(
                "六冲{}（{}冲{}），{}",
                position.branch_label(),
                day_branch,
                natal,
                note
            ));
        }
        score
    }

    /// 命中的神煞（每条规则至多计一次）
    pub fn marker_hits(&self, chart: &FourPillarChart, day_branch: Branch) -> Vec<&MarkerRule> {
        let dm = chart.day_master();
        let anchors = [chart.year.branch, chart.day.branch];

        self.tables
            .markers
            .iter()
            .filter(|rule| match rule.trigger {
                MarkerTrigger::ByDayStem(rows) => rows
                    .iter()
                    .any(|(stem, targets)| *stem == dm && targets.contains(&day_branch)),
                MarkerTrigger::ByBranchGroup(rows) => anchors.iter().any(|anchor| {
                    rows.iter()
                        .any(|(group, target)| group.contains(anchor) && *target == day_branch)
                }),
            })
            .collect()
    }

    /// 六维度分
    fn dimension_scores(
        &self,
        total: i32,
        chart: &FourPillarChart,
        day_branch: Branch,
        ten_god: TenGod,
        hits: &[&MarkerRule],
        gender: Gender,
    ) -> BTreeMap<Dimension, i32> {
        let mut scores = BTreeMap::new();
        for dimension in Dimension::ALL {
            let mut value = total;

            let (core, bonus) = dimension_core(dimension, gender);
            if core.contains(&ten_god) {
                value += bonus;
            }

            if dimension == Dimension::Romance {
                if self.tables.harmonizes(day_branch, chart.day.branch) {
                    value += scoring::ROMANCE_HARMONY_BONUS;
                } else if self.tables.clashes(day_branch, chart.day.branch) {
                    value += scoring::ROMANCE_CLASH_PENALTY;
                }
            }

            for rule in hits {
                for (boosted, amount) in rule.dimension_boosts {
                    if *boosted == dimension {
                        value += amount;
                    }
                }
            }

            scores.insert(dimension, value.clamp(0, 100));
        }
        scores
    }
}

impl Default for FortuneScoreEngine {
    fn default() -> Self {
        Self::new(FortuneConfig::default(), Arc::new(RuleTables::standard()))
    }
}

fn draw(
    jitter: &mut DayJitter,
    part: CyclePart,
    favorable: &FavorableElementSet,
    element: Element,
) -> i32 {
    let (base, lo, hi) = cycle_bonus(part, favorable.classify(element));
    base + jitter.int(lo, hi)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
