// ==========================================
// 八字运势引擎 - 喜用神推导引擎
// ==========================================
// 三层推导 (优先级从高到低):
//   1. 调候 (100): 月支 → 所需五行
//   2. 通关 (80):  前两强五行对峙且相克时, 取居间相生的五行
//   3. 扶抑 (60):  身旺取食伤/财, 身弱取印/比劫, 中和取月令
// 冲突消解: 低层候选若被已采纳的高层五行所克则舍弃
// 校验: 去掉克日主者; 日主本五行仅在唯一时保留; 最多 2 个
// ==========================================

use crate::config::FavorableConfig;
use crate::domain::favorable::{FavorableCandidate, FavorableElementSet, FavorableTier};
use crate::domain::ganzhi::FourPillarChart;
use crate::domain::strength::StrengthResult;
use crate::domain::tables::RuleTables;
use crate::domain::types::{Element, StrengthLevel};
use std::sync::Arc;
use tracing::{debug, instrument};

const MAX_FAVORABLE: usize = 2;

// ==========================================
// FavorableElementDeriver - 喜用神推导引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct FavorableElementDeriver {
    config: FavorableConfig,
    tables: Arc<RuleTables>,
}

impl FavorableElementDeriver {
    pub fn new(config: FavorableConfig, tables: Arc<RuleTables>) -> Self {
        Self { config, tables }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    #[instrument(skip(self, chart, strength), fields(level = %strength.level))]
    pub fn derive(&self, chart: &FourPillarChart, strength: &StrengthResult) -> FavorableElementSet {
        let dm = chart.day_master_element();

        let mut proposals: Vec<FavorableCandidate> = Vec::new();
        proposals.extend(self.climate_candidate(chart));
        proposals.extend(self.mediator_candidate(chart));
        proposals.extend(self.balance_candidates(chart, strength.level));

        let accepted = resolve_conflicts(proposals);
        let validated = validate(accepted, dm);

        let favorable: Vec<Element> = validated.iter().map(|c| c.element).collect();
        debug!(favorable = ?favorable, "喜用神推导完成");

        FavorableElementSet::from_favorable(favorable, strength.level, validated)
    }

    // ==========================================
    // 三层候选
    // ==========================================

    /// 调候
    pub fn climate_candidate(&self, chart: &FourPillarChart) -> Option<FavorableCandidate> {
        let month = chart.month.branch;
        self.tables.climate_rule(month).map(|rule| {
            debug!(month = %month, element = %rule.element, "调候候选");
            candidate(
                rule.element,
                FavorableTier::Climate,
                format!("{}月{}，取{}", month, rule.reason, rule.element),
            )
        })
    }

    /// 通关
    pub fn mediator_candidate(&self, chart: &FourPillarChart) -> Option<FavorableCandidate> {
        let ranked = self.presence_ranking(chart);
        let (first, first_weight) = ranked[0];
        let (second, second_weight) = ranked[1];

        if first_weight - second_weight >= self.config.mediator_margin {
            return None;
        }

        let (attacker, victim) = if first.restrains() == second {
            (first, second)
        } else if second.restrains() == first {
            (second, first)
        } else {
            return None;
        };

        // 克者所生、且生被克者: 金克木 → 水
        let bridge = attacker.generates();
        debug!(attacker = %attacker, victim = %victim, bridge = %bridge, "通关候选");
        Some(candidate(
            bridge,
            FavorableTier::Mediator,
            format!("{}{}相战({:.1}/{:.1})，取{}通关", attacker, victim, first_weight, second_weight, bridge),
        ))
    }

    /// 扶抑
    pub fn balance_candidates(&self, chart: &FourPillarChart, level: StrengthLevel) -> Vec<FavorableCandidate> {
        let dm = chart.day_master_element();
        match level {
            StrengthLevel::Strong => vec![
                candidate(dm.generates(), FavorableTier::Balance, format!("身旺，取食伤{}泄秀", dm.generates())),
                candidate(dm.restrains(), FavorableTier::Balance, format!("身旺，取财星{}耗身", dm.restrains())),
            ],
            StrengthLevel::Weak => vec![
                candidate(dm.generated_by(), FavorableTier::Balance, format!("身弱，取印星{}生身", dm.generated_by())),
                candidate(dm, FavorableTier::Balance, format!("身弱，取比劫{}帮身", dm)),
            ],
            StrengthLevel::Neutral => {
                let ruling = self.tables.month_ruling_element(chart.month.branch);
                vec![candidate(ruling, FavorableTier::Balance, format!("中和，顺月令{}", ruling))]
            }
        }
    }

    /// 五行出现权重排名（降序, 同分按 木火土金水 顺序）
    pub fn presence_ranking(&self, chart: &FourPillarChart) -> [(Element, f64); 5] {
        let mut weights = [0.0_f64; 5];
        for branch in chart.branches() {
            weights[branch.element().index()] += self.config.branch_presence;
        }
        for stem in chart.stems() {
            weights[stem.element().index()] += self.config.stem_presence;
        }

        let mut ranked = Element::ALL.map(|e| (e, weights[e.index()]));
        // 稳定排序保留五行顺序
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl Default for FavorableElementDeriver {
    fn default() -> Self {
        Self::new(FavorableConfig::default(), Arc::new(RuleTables::standard()))
    }
}

fn candidate(element: Element, tier: FavorableTier, reason: String) -> FavorableCandidate {
    FavorableCandidate {
        element,
        tier,
        priority: tier.priority(),
        reason,
    }
}

/// 按优先级依次采纳; 重复跳过; 被更高层已采纳五行所克则舍弃
fn resolve_conflicts(mut proposals: Vec<FavorableCandidate>) -> Vec<FavorableCandidate> {
    proposals.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut accepted: Vec<FavorableCandidate> = Vec::new();
    for proposal in proposals {
        if accepted.iter().any(|a| a.element == proposal.element) {
            continue;
        }
        let blocker = accepted
            .iter()
            .find(|a| a.priority > proposal.priority && a.element.restrains() == proposal.element);
        if let Some(blocker) = blocker {
            debug!(
                dropped = %proposal.element,
                tier = %proposal.tier,
                by = %blocker.element,
                "候选被高层喜用神所克, 舍弃"
            );
            continue;
        }
        accepted.push(proposal);
    }
    accepted
}

fn validate(candidates: Vec<FavorableCandidate>, dm: Element) -> Vec<FavorableCandidate> {
    let mut kept: Vec<FavorableCandidate> = candidates
        .into_iter()
        .filter(|c| c.element.restrains() != dm)
        .collect();

    if kept.len() > 1 {
        kept.retain(|c| c.element != dm);
    }
    kept.truncate(MAX_FAVORABLE);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ganzhi::{GanZhi, SolarTermInfo};
    use crate::domain::strength::{StrengthBreakdown, StrengthComponent};
    use crate::domain::types::{Branch, Stem};
    use chrono::NaiveDate;

    fn pillar(s: Stem, b: Branch) -> GanZhi {
        GanZhi::new(s, b).unwrap()
    }

    fn chart(pillars: [GanZhi; 4]) -> FourPillarChart {
        FourPillarChart {
            year: pillars[0],
            month: pillars[1],
            day: pillars[2],
            hour: pillars[3],
            solar_term: SolarTermInfo { name: "立春", index: 2, approximate: true },
            corrected_time: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    fn strength(level: StrengthLevel) -> StrengthResult {
        let c = StrengthComponent::new(0.5, "");
        StrengthResult {
            score: 0.5,
            level,
            breakdown: StrengthBreakdown {
                month_command: c.clone(),
                rootedness: c.clone(),
                exposed_support: c.clone(),
                combination: c.clone(),
                clash: c,
            },
        }
    }

    #[test]
    fn test_climate_first_then_balance() {
        let deriver = FavorableElementDeriver::default();
        // 甲木生于子月 (寒冬需暖 → 火), 身弱 → 水、木
        let c = chart([
            pillar(Stem::Geng, Branch::Wu),
            pillar(Stem::Bing, Branch::Zi),
            pillar(Stem::Jia, Branch::Shen),
            pillar(Stem::Ji, Branch::Si),
        ]);
        let set = deriver.derive(&c, &strength(StrengthLevel::Weak));
        // 木与水火同列时剔除日主本五行
        assert_eq!(set.favorable, vec![Element::Fire, Element::Water]);
        assert_eq!(set.supportive, vec![Element::Wood, Element::Metal]);
        assert_eq!(set.unfavorable, vec![Element::Earth]);
    }

    #[test]
    fn test_duplicate_balance_candidate_is_skipped() {
        let deriver = FavorableElementDeriver::default();
        // 庚金生于午月 (炎夏需润 → 水), 身旺 → 食伤水(重复)、财木
        let c = chart([
            pillar(Stem::Ren, Branch::Zi),
            pillar(Stem::Bing, Branch::Wu),
            pillar(Stem::Geng, Branch::Chen),
            pillar(Stem::Wu, Branch::Yin),
        ]);
        let set = deriver.derive(&c, &strength(StrengthLevel::Strong));
        assert_eq!(set.favorable, vec![Element::Water, Element::Wood]);
        assert_eq!(set.candidates[0].tier, FavorableTier::Climate);
    }

    #[test]
    fn test_lower_tier_restrained_by_higher_is_dropped() {
        let deriver = FavorableElementDeriver::default();
        // 戊土生于子月 (寒冬需暖 → 火), 身旺 → 食伤金、财水; 火克金, 金被舍弃
        // 土 4.5 远超水 1.0, 不触发通关
        let c = chart([
            pillar(Stem::Wu, Branch::Chen),
            pillar(Stem::Jia, Branch::Zi),
            pillar(Stem::Wu, Branch::Xu),
            pillar(Stem::Ji, Branch::Wei),
        ]);
        assert!(deriver.mediator_candidate(&c).is_none());

        let set = deriver.derive(&c, &strength(StrengthLevel::Strong));
        assert_eq!(set.favorable, vec![Element::Fire, Element::Water]);
        assert!(set.candidates.iter().all(|c| c.element != Element::Metal));
        assert_eq!(set.candidates[0].tier, FavorableTier::Climate);
        assert_eq!(set.candidates[1].tier, FavorableTier::Balance);
    }

    #[test]
    fn test_mediator_bridges_metal_and_wood() {
        let deriver = FavorableElementDeriver::default();
        // 金: 申酉 + 庚辛 = 3.0; 木: 寅卯 + 甲 = 2.5; 差 0.5 < 1.0, 金克木 → 水
        let c = chart([
            pillar(Stem::Geng, Branch::Shen),
            pillar(Stem::Ji, Branch::You),
            pillar(Stem::Jia, Branch::Yin),
            pillar(Stem::Xin, Branch::Mao),
        ]);
        let mediator = deriver.mediator_candidate(&c).unwrap();
        assert_eq!(mediator.element, Element::Water);
        assert_eq!(mediator.priority, 80);
    }

    #[test]
    fn test_validation_removes_day_master_restrainer() {
        // 甲木日主: 金克木, 必须剔除
        let candidates = vec![
            candidate(Element::Metal, FavorableTier::Climate, String::new()),
            candidate(Element::Water, FavorableTier::Balance, String::new()),
        ];
        let kept = validate(candidates, Element::Wood);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].element, Element::Water);
    }

    #[test]
    fn test_day_master_element_kept_only_when_alone() {
        let alone = validate(
            vec![candidate(Element::Wood, FavorableTier::Balance, String::new())],
            Element::Wood,
        );
        assert_eq!(alone.len(), 1);

        let crowded = validate(
            vec![
                candidate(Element::Water, FavorableTier::Balance, String::new()),
                candidate(Element::Wood, FavorableTier::Balance, String::new()),
            ],
            Element::Wood,
        );
        assert_eq!(crowded.len(), 1);
        assert_eq!(crowded[0].element, Element::Water);
    }
}
