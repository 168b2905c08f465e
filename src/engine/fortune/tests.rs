use super::FortuneScoreEngine;
use crate::config::FortuneConfig;
use crate::domain::favorable::FavorableElementSet;
use crate::domain::fortune::FlowingPillars;
use crate::domain::ganzhi::{FourPillarChart, GanZhi};
use crate::domain::tables::RuleTables;
use crate::domain::types::{Branch, Dimension, Element, Gender, Stem, StrengthLevel, TenGod};
use crate::engine::ganzhi_calculator::GanZhiCalculator;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// 测试辅助函数
// ==========================================

/// 1990-05-15 10:30 @116.4°E → 庚午 辛巳 庚辰 辛巳 (庚金日主)
fn reference_chart() -> FourPillarChart {
    let birth = NaiveDate::from_ymd_opt(1990, 5, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    GanZhiCalculator::default().chart(birth, 116.4)
}

fn gz(stem: Stem, branch: Branch) -> GanZhi {
    GanZhi::new(stem, branch).unwrap()
}

fn pillars(day: GanZhi, decade: Option<GanZhi>) -> FlowingPillars {
    FlowingPillars {
        target_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        decade,
        year: gz(Stem::Yi, Branch::Si),
        month: gz(Stem::Ren, Branch::Wu),
        day,
    }
}

fn favorable(elements: &[Element], level: StrengthLevel) -> FavorableElementSet {
    FavorableElementSet::custom(elements, level)
}

// ==========================================
// 确定性
// ==========================================

#[test]
fn test_score_is_deterministic() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    let fav = favorable(&[Element::Earth, Element::Water], StrengthLevel::Weak);
    let p = pillars(gz(Stem::Wu, Branch::Yin), Some(gz(Stem::Ren, Branch::Wu)));

    let a = engine.score(&chart, &fav, &p, Gender::Male);
    let b = engine.score(&chart, &fav, &p, Gender::Male);
    assert_eq!(a, b);
}

#[test]
fn test_total_always_within_bounds() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    let fav = favorable(&[Element::Fire], StrengthLevel::Strong);
    for i in 0..60 {
        let score = engine.score(&chart, &fav, &pillars(GanZhi::from_index(i), None), Gender::Female);
        assert!((30..=100).contains(&score.total), "{} 越界: {}", i, score.total);
        for value in score.dimensions.values() {
            assert!((0..=100).contains(value));
        }
        assert_eq!(score.dimensions.len(), 6);
    }
}

// ==========================================
// 流运周期贡献
// ==========================================

#[test]
fn test_primary_day_pillar_contribution_range() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    let fav = favorable(&[Element::Fire], StrengthLevel::Neutral);
    // 丙午: 干支皆为主用神
    let score = engine.score(&chart, &fav, &pillars(gz(Stem::Bing, Branch::Wu), None), Gender::Male);
    // 干 35..41, 支 25..29 → 0.6/0.4 混合
    assert!(score.breakdown.day >= 31.0 && score.breakdown.day <= 36.2);
}

#[test]
fn test_unfavorable_day_pillar_contribution_range() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    // 喜火 → 水为忌
    let fav = favorable(&[Element::Fire], StrengthLevel::Neutral);
    let score = engine.score(&chart, &fav, &pillars(gz(Stem::Ren, Branch::Zi), None), Gender::Male);
    assert!(score.breakdown.day >= -19.2 && score.breakdown.day <= -16.6);
}

#[test]
fn test_decade_adjustment_direction() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    let fav = favorable(&[Element::Fire], StrengthLevel::Neutral);
    let day = gz(Stem::Wu, Branch::Yin);

    let none = engine.score(&chart, &fav, &pillars(day, None), Gender::Male);
    let good = engine.score(&chart, &fav, &pillars(day, Some(gz(Stem::Bing, Branch::Yin))), Gender::Male);
    let bad = engine.score(&chart, &fav, &pillars(day, Some(gz(Stem::Ren, Branch::Xu))), Gender::Male);

    assert_eq!(none.breakdown.decade_adjustment, 0);
    assert_eq!(good.breakdown.decade_adjustment, 10);
    assert_eq!(bad.breakdown.decade_adjustment, -10);
    // 大运不影响扰动序列
    assert_eq!(none.breakdown.day, good.breakdown.day);
    assert_eq!(none.breakdown.year, bad.breakdown.year);
}

// ==========================================
// 天干互动
// ==========================================

#[test]
fn test_stem_interaction_cases() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    let day = gz(Stem::Wu, Branch::Yin);

    // 戊土生庚金, 土为喜用
    let s = engine.score(&chart, &favorable(&[Element::Earth], StrengthLevel::Weak), &pillars(day, None), Gender::Male);
    assert_eq!(s.breakdown.stem_interaction, 4);

    // 土为闲神
    let s = engine.score(&chart, &favorable(&[Element::Wood], StrengthLevel::Weak), &pillars(day, None), Gender::Male);
    assert_eq!(s.breakdown.stem_interaction, 1);

    // 比和: 身弱相助, 身旺竞争
    let same = gz(Stem::Geng, Branch::Zi);
    let weak = engine.score(&chart, &favorable(&[Element::Wood], StrengthLevel::Weak), &pillars(same, None), Gender::Male);
    let strong = engine.score(&chart, &favorable(&[Element::Wood], StrengthLevel::Strong), &pillars(same, None), Gender::Male);
    assert_eq!(weak.breakdown.stem_interaction, 3);
    assert_eq!(strong.breakdown.stem_interaction, -4);
}

// ==========================================
// 地支互动
// ==========================================

#[test]
fn test_clash_with_day_branch() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    // 戌冲日支辰
    let s = engine.score(&chart, &favorable(&[Element::Wood], StrengthLevel::Neutral), &pillars(gz(Stem::Jia, Branch::Xu), None), Gender::Male);
    assert_eq!(s.breakdown.branch_interaction, -12);
}

#[test]
fn test_clash_on_year_branch_depends_on_element() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    let day = gz(Stem::Jia, Branch::Zi); // 子冲年支午(火)

    let fire_favorable = engine.score(&chart, &favorable(&[Element::Fire], StrengthLevel::Neutral), &pillars(day, None), Gender::Male);
    assert_eq!(fire_favorable.breakdown.branch_interaction, -10);

    // 喜金 → 火为忌, 冲去忌神
    let fire_unfavorable = engine.score(&chart, &favorable(&[Element::Metal], StrengthLevel::Neutral), &pillars(day, None), Gender::Male);
    assert_eq!(fire_unfavorable.breakdown.branch_interaction, 5);
}

#[test]
fn test_double_neutral_clash() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    // 亥冲月支、时支两个巳; 喜木时火为闲神
    let s = engine.score(&chart, &favorable(&[Element::Wood], StrengthLevel::Neutral), &pillars(gz(Stem::Yi, Branch::Hai), None), Gender::Male);
    assert_eq!(s.breakdown.branch_interaction, -4);
}

// ==========================================
// 神煞
// ==========================================

fn hit_keys(engine: &FortuneScoreEngine, chart: &FourPillarChart, branch: Branch) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = engine.marker_hits(chart, branch).iter().map(|r| r.key).collect();
    keys.sort();
    keys
}

#[test]
fn test_marker_hits_for_reference_chart() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();

    // 庚见丑为天乙; 日支辰属寅卯辰, 寡宿在丑
    assert_eq!(hit_keys(&engine, &chart, Branch::Chou), vec!["guasu", "tianyi_guiren"]);
    // 年支午属寅午戌驿马在申, 属巳午未孤辰在申
    assert_eq!(hit_keys(&engine, &chart, Branch::Shen), vec!["guchen", "yima"]);
    // 庚文昌在亥, 寅午戌劫煞在亥
    assert_eq!(hit_keys(&engine, &chart, Branch::Hai), vec!["jiesha", "wenchang"]);
    // 庚羊刃在酉, 申子辰桃花在酉
    assert_eq!(hit_keys(&engine, &chart, Branch::You), vec!["taohua", "yangren"]);
}

#[test]
fn test_marker_total_is_capped() {
    let config = FortuneConfig {
        marker_cap: 1,
        ..FortuneConfig::default()
    };
    let engine = FortuneScoreEngine::new(config, Arc::new(RuleTables::standard()));
    let chart = reference_chart();
    let s = engine.score(&chart, &favorable(&[Element::Wood], StrengthLevel::Neutral), &pillars(gz(Stem::Yi, Branch::Hai), None), Gender::Male);
    // 文昌 +8, 劫煞 -6 → 2, 截断为 1
    assert_eq!(s.breakdown.markers, 1);
    assert_eq!(s.markers.len(), 2);
}

// ==========================================
// 十神与维度
// ==========================================

#[test]
fn test_relation_bonus_depends_on_strength() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    // 庚见甲为偏财
    let day = gz(Stem::Jia, Branch::Chen);
    let strong = engine.score(&chart, &favorable(&[Element::Water], StrengthLevel::Strong), &pillars(day, None), Gender::Male);
    let weak = engine.score(&chart, &favorable(&[Element::Water], StrengthLevel::Weak), &pillars(day, None), Gender::Male);
    assert_eq!(strong.ten_god, TenGod::IndirectWealth);
    assert_eq!(strong.breakdown.relation, 12);
    assert_eq!(weak.breakdown.relation, -2);

    // 中和按非身弱处理
    let neutral = engine.score(&chart, &favorable(&[Element::Water], StrengthLevel::Neutral), &pillars(day, None), Gender::Male);
    assert_eq!(neutral.breakdown.relation, 12);
}

#[test]
fn test_dimension_adjustments() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    // 乙酉: 庚见乙为正财; 酉合日支辰; 羊刃(事业+3)、桃花(感情+10)
    let day = gz(Stem::Yi, Branch::You);
    let fav = favorable(&[Element::Earth], StrengthLevel::Neutral);

    let male = engine.score(&chart, &fav, &pillars(day, None), Gender::Male);
    let female = engine.score(&chart, &fav, &pillars(day, None), Gender::Female);
    assert_eq!(male.ten_god, TenGod::DirectWealth);
    assert_eq!(male.total, female.total);

    let total = male.total;
    assert_eq!(male.dimension(Dimension::Romance), (total + 12 + 10 + 10).clamp(0, 100));
    assert_eq!(female.dimension(Dimension::Romance), (total + 12 + 10).clamp(0, 100));
    assert_eq!(male.dimension(Dimension::Wealth), (total + 12).clamp(0, 100));
    assert_eq!(male.dimension(Dimension::Career), (total + 3).clamp(0, 100));
    assert_eq!(male.dimension(Dimension::Health), total);
    assert_eq!(male.dimension(Dimension::Study), total);
    assert_eq!(male.dimension(Dimension::Travel), total);
}

#[test]
fn test_romance_clash_penalty_and_travel_boost() {
    let engine = FortuneScoreEngine::default();
    let chart = reference_chart();
    let fav = favorable(&[Element::Earth], StrengthLevel::Neutral);

    // 甲戌冲日支辰
    let clash = engine.score(&chart, &fav, &pillars(gz(Stem::Jia, Branch::Xu), None), Gender::Female);
    assert_eq!(clash.dimension(Dimension::Romance), (clash.total - 15).clamp(0, 100));

    // 壬申: 驿马 → 出行 +15
    let travel = engine.score(&chart, &fav, &pillars(gz(Stem::Ren, Branch::Shen), None), Gender::Female);
    assert_eq!(travel.dimension(Dimension::Travel), (travel.total + 15).clamp(0, 100));
}
