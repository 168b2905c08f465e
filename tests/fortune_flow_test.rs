// ==========================================
// 排盘 → 旺衰 → 用神 → 运势 全流程测试
// ==========================================
// 测试目标: 旺衰各分项规则、用神集合合法性、评分确定性
// ==========================================

mod test_helpers;

use bazi_fortune::domain::tables::RuleTables;
use bazi_fortune::domain::types::{Branch, Dimension, Element, Gender};
use bazi_fortune::engine::{FavorableElementDeriver, GanZhiCalculator, StrengthAnalyzer};
use chrono::Duration;
use test_helpers::{birth, chart_of, date, reference_input, test_api};

// ==========================================
// 旺衰
// ==========================================

#[test]
fn test_jia_in_shen_month_is_lowest_rung() {
    let analyzer = StrengthAnalyzer::default();
    // 申月金旺，克甲木
    let component = analyzer.month_command(Element::Wood, Branch::Shen);
    assert_eq!(component.score, 0.1);

    let chart = chart_of(["庚午", "壬申", "甲子", "甲子"]);
    let result = analyzer.analyze(&chart);
    assert_eq!(result.breakdown.month_command.score, 0.1);
}

#[test]
fn test_full_fire_triad_adds_full_bonus() {
    let analyzer = StrengthAnalyzer::default();
    // 寅午戌三合火局，丙火日主
    let full = analyzer.analyze(&chart_of(["丙寅", "甲午", "丙戌", "戊子"]));
    assert!((full.breakdown.combination.score - 0.80).abs() < 1e-9);
    assert!(full.breakdown.combination.reason.contains("三合"));

    // 仅寅午半合
    let partial = analyzer.analyze(&chart_of(["丙寅", "甲午", "丙子", "戊子"]));
    assert!((partial.breakdown.combination.score - 0.65).abs() < 1e-9);
    assert!(partial.breakdown.combination.reason.contains("半合"));
}

#[test]
fn test_rootedness_never_drops_when_adding_primary_root() {
    let analyzer = StrengthAnalyzer::default();
    let tables = RuleTables::standard();
    let all = Branch::ALL;

    for dm in Element::ALL {
        let roots: Vec<Branch> = all
            .iter()
            .copied()
            .filter(|b| tables.hidden_stems(*b)[0].element() == dm)
            .collect();

        for i in 0..12 {
            for j in i..12 {
                for k in j..12 {
                    let base = vec![all[i], all[j], all[k]];
                    let before = analyzer.rootedness(dm, &base).score;
                    for root in &roots {
                        let mut extended = base.clone();
                        extended.push(*root);
                        let after = analyzer.rootedness(dm, &extended).score;
                        assert!(after >= before, "{:?} {:?} + {:?}: {} < {}", dm, base, root, after, before);
                    }
                }
            }
        }
    }
}

#[test]
fn test_strength_score_stays_in_unit_interval() {
    let calc = GanZhiCalculator::default();
    let analyzer = StrengthAnalyzer::default();
    let mut dt = birth(1985, 1, 1, 0, 0);
    for _ in 0..1500 {
        let result = analyzer.analyze(&calc.chart(dt, 120.0));
        assert!((0.0..=1.0).contains(&result.score));
        for s in result.breakdown.scores() {
            assert!((0.0..=1.0).contains(&s));
        }
        dt += Duration::hours(29);
    }
}

// ==========================================
// 用神
// ==========================================

#[test]
fn test_favorable_set_validity_over_many_charts() {
    let calc = GanZhiCalculator::default();
    let analyzer = StrengthAnalyzer::default();
    let deriver = FavorableElementDeriver::default();
    let mut dt = birth(1970, 1, 1, 1, 0);

    for _ in 0..3000 {
        let chart = calc.chart(dt, 120.0);
        let strength = analyzer.analyze(&chart);
        let set = deriver.derive(&chart, &strength);
        let dm = chart.day_master_element();

        assert!(set.favorable.len() <= 2);
        for element in &set.favorable {
            assert_ne!(element.restrains(), dm, "{}: {} 克日主", chart, element);
            assert!(!set.unfavorable.contains(element));
            assert!(!set.supportive.contains(element));
        }
        if set.favorable.contains(&dm) {
            assert_eq!(set.favorable.len(), 1, "{}: 日主五行与其他用神并存", chart);
        }
        dt += Duration::hours(53);
    }
}

// ==========================================
// 运势
// ==========================================

#[test]
fn test_fortune_is_deterministic_through_api() {
    let api = test_api();
    let a = api.fortune_from_input(&reference_input("female"), "2025-06-01").unwrap();
    let b = api.fortune_from_input(&reference_input("female"), "2025-06-01").unwrap();
    assert_eq!(a.fortune, b.fortune);

    // 新实例（冷缓存）结果相同
    let fresh = test_api()
        .fortune_from_input(&reference_input("female"), "2025-06-01")
        .unwrap();
    assert_eq!(a.fortune, fresh.fortune);
}

#[test]
fn test_fortune_varies_across_days() {
    let api = test_api();
    let analysis = api.chart_from_input(&reference_input("male")).unwrap();
    let start = date(2025, 6, 1);

    let totals: Vec<i32> = (0..30)
        .map(|d| {
            api.compute_fortune(&analysis, start + Duration::days(d), Gender::Male)
                .unwrap()
                .total
        })
        .collect();
    let distinct: std::collections::BTreeSet<i32> = totals.iter().copied().collect();
    assert!(distinct.len() > 1, "30 天总分完全相同: {:?}", totals);

    for total in totals {
        assert!((30..=100).contains(&total));
    }
}

#[test]
fn test_dimensions_are_complete_and_bounded() {
    let api = test_api();
    let analysis = api.chart_from_input(&reference_input("male")).unwrap();
    let score = api
        .compute_fortune(&analysis, date(2025, 9, 9), Gender::Male)
        .unwrap();
    for dimension in Dimension::ALL {
        let value = score.dimension(dimension);
        assert!((0..=100).contains(&value), "{:?} = {}", dimension, value);
    }
}
