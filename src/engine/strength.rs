// ==========================================
// 八字运势引擎 - 日主旺衰分析引擎
// ==========================================
// 五个子维度各自独立计算并截断到 [0, 1]:
//   得令 (月令) / 得地 (通根) / 得势 (透干) / 三合 / 六冲
// 加权求和后按阈值分为 身旺 / 中和 / 身弱
// 红线: 权重与阈值来自配置, 不写死在代码里
// ==========================================

use crate::config::StrengthConfig;
use crate::domain::ganzhi::FourPillarChart;
use crate::domain::strength::{StrengthBreakdown, StrengthComponent, StrengthResult};
use crate::domain::tables::{QiLayer, RuleTables};
use crate::domain::types::{Branch, Element, ElementRelation, Stem, StrengthLevel};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 日支所在柱位
const DAY_POSITION: usize = 2;

// ==========================================
// StrengthAnalyzer - 旺衰分析引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct StrengthAnalyzer {
    config: StrengthConfig,
    tables: Arc<RuleTables>,
}

impl StrengthAnalyzer {
    pub fn new(config: StrengthConfig, tables: Arc<RuleTables>) -> Self {
        Self { config, tables }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    #[instrument(skip(self, chart), fields(day_master = %chart.day_master()))]
    pub fn analyze(&self, chart: &FourPillarChart) -> StrengthResult {
        let dm = chart.day_master_element();
        let branches = chart.branches();
        let stems = chart.stems();

        let breakdown = StrengthBreakdown {
            month_command: self.month_command(dm, chart.month.branch),
            rootedness: self.rootedness(dm, &branches),
            exposed_support: self.exposed_support(dm, &stems),
            combination: self.combination(dm, &branches),
            clash: self.clash(&branches),
        };

        let weights = self.config.weights.as_array();
        let score: f64 = breakdown
            .scores()
            .iter()
            .zip(weights.iter())
            .map(|(s, w)| s * w)
            .sum();
        let level = self.classify(score);

        debug!(score, level = %level, scores = ?breakdown.scores(), "旺衰分析完成");

        StrengthResult {
            score,
            level,
            breakdown,
        }
    }

    /// 按阈值判定旺衰
    pub fn classify(&self, score: f64) -> StrengthLevel {
        if score >= self.config.strong_threshold {
            StrengthLevel::Strong
        } else if score <= self.config.weak_threshold {
            StrengthLevel::Weak
        } else {
            StrengthLevel::Neutral
        }
    }

    // ==========================================
    // 子维度
    // ==========================================

    /// 得令: 月令司令五行与日主的五态关系
    pub fn month_command(&self, dm: Element, month_branch: Branch) -> StrengthComponent {
        let ruling = self.tables.month_ruling_element(month_branch);
        let (score, verb) = match ruling.relation_to(dm) {
            ElementRelation::Same => (1.0, "同气, 日主得令"),
            ElementRelation::Generates => (0.8, "生日主"),
            ElementRelation::GeneratedBy => (0.3, "泄日主之气"),
            ElementRelation::Restrains => (0.1, "克日主, 日主失令"),
            ElementRelation::RestrainedBy => (0.5, "为日主所克"),
        };
        StrengthComponent::new(
            score,
            format!("月令{}({}){}", month_branch, ruling, verb),
        )
    }

    /// 得地: 每个地支取第一个与日主同五行的藏干 (本气 0.35 / 中气 0.20 / 余气 0.10)
    pub fn rootedness(&self, dm: Element, branches: &[Branch]) -> StrengthComponent {
        let mut total: f64 = 0.0;
        let mut roots = Vec::new();

        for &branch in branches {
            let hit = self
                .tables
                .hidden_stems(branch)
                .iter()
                .position(|stem| stem.element() == dm);
            if let Some(position) = hit {
                let layer = QiLayer::from_position(position);
                total += root_weight(layer);
                roots.push(format!("{}{}", branch, layer.label_cn()));
            }
        }

        if roots.is_empty() {
            return StrengthComponent::new(0.0, "日主在地支无根");
        }
        StrengthComponent::new(
            total.min(1.0),
            format!("日主通根于 {}", roots.join("、")),
        )
    }

    /// 得势: 年/月/时三干, 同五行 +0.20, 生日主 +0.15
    pub fn exposed_support(&self, dm: Element, stems: &[Stem; 4]) -> StrengthComponent {
        let mut score: f64 = 0.5;
        let mut helpers = Vec::new();

        for (position, stem) in stems.iter().enumerate() {
            if position == DAY_POSITION {
                continue;
            }
            match stem.element().relation_to(dm) {
                ElementRelation::Same => {
                    score += 0.20;
                    helpers.push(format!("{}比劫", stem));
                }
                ElementRelation::Generates => {
                    score += 0.15;
                    helpers.push(format!("{}印星", stem));
                }
                _ => {}
            }
        }

        let reason = if helpers.is_empty() {
            "天干无帮扶".to_string()
        } else {
            format!("天干透出 {}", helpers.join("、"))
        };
        StrengthComponent::new(score.min(1.0), reason)
    }

    /// 三合: 至少两支到位才计, 全合 0.30, 半合 0.15
    pub fn combination(&self, dm: Element, branches: &[Branch]) -> StrengthComponent {
        let present: BTreeSet<Branch> = branches.iter().copied().collect();
        let mut score: f64 = 0.5;
        let mut notes = Vec::new();

        for triad in &self.tables.triads {
            let count = triad.members.iter().filter(|m| present.contains(*m)).count();
            if count < 2 {
                continue;
            }
            let amount = if count == 3 { 0.30 } else { 0.15 };
            let kind = if count == 3 { "三合" } else { "半合" };
            let label: String = triad.members.iter().map(|b| b.symbol()).collect();

            match triad.element.relation_to(dm) {
                ElementRelation::Same | ElementRelation::Generates => {
                    score += amount;
                    notes.push(format!("{}{}{}局助身", label, kind, triad.element));
                }
                ElementRelation::Restrains | ElementRelation::GeneratedBy => {
                    score -= amount;
                    notes.push(format!("{}{}{}局耗身", label, kind, triad.element));
                }
                ElementRelation::RestrainedBy => {
                    notes.push(format!("{}{}{}局为日主所克", label, kind, triad.element));
                }
            }
        }

        let reason = if notes.is_empty() {
            "无三合局".to_string()
        } else {
            notes.join("; ")
        };
        StrengthComponent::new(score, reason)
    }

    /// 六冲: 涉及日支 -0.25, 其余 -0.15
    pub fn clash(&self, branches: &[Branch; 4]) -> StrengthComponent {
        let mut score: f64 = 0.5;
        let mut notes = Vec::new();

        for i in 0..branches.len() {
            for j in (i + 1)..branches.len() {
                if !self.tables.clashes(branches[i], branches[j]) {
                    continue;
                }
                if i == DAY_POSITION || j == DAY_POSITION {
                    score -= 0.25;
                    notes.push(format!("{}{}冲(日支)", branches[i], branches[j]));
                } else {
                    score -= 0.15;
                    notes.push(format!("{}{}冲", branches[i], branches[j]));
                }
            }
        }

        let reason = if notes.is_empty() {
            "地支无冲".to_string()
        } else {
            notes.join("、")
        };
        StrengthComponent::new(score, reason)
    }
}

fn root_weight(layer: QiLayer) -> f64 {
    match layer {
        QiLayer::Primary => 0.35,
        QiLayer::Secondary => 0.20,
        QiLayer::Residual => 0.10,
    }
}

impl Default for StrengthAnalyzer {
    fn default() -> Self {
        Self::new(StrengthConfig::default(), Arc::new(RuleTables::standard()))
    }
}
