// ==========================================
// 运势评分 - 奖惩表
// ==========================================
// 流年/流月/流日各部位按五行归类取 (基准分, 扰动下限, 扰动上限)
// ==========================================

use crate::domain::favorable::ElementClass;
use crate::domain::types::{Dimension, Gender, TenGod};

/// 流运部位，顺序即扰动抽取顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CyclePart {
    YearStem,
    YearBranch,
    MonthStem,
    MonthBranch,
    DayStem,
    DayBranch,
}

/// (基准, 扰动下限, 扰动上限)
pub(crate) fn cycle_bonus(part: CyclePart, class: ElementClass) -> (i32, i32, i32) {
    use CyclePart::*;
    use ElementClass::*;

    match (part, class) {
        (YearStem, Primary) => (9, -1, 1),
        (YearStem, Supportive) => (6, -1, 1),
        (YearStem, Unfavorable) => (-7, -1, 0),
        (YearStem, Neutral) => (0, -2, 2),

        (YearBranch, Primary) => (6, -1, 1),
        (YearBranch, Supportive) => (4, 0, 1),
        (YearBranch, Unfavorable) => (-5, -1, 0),
        (YearBranch, Neutral) => (0, -1, 1),

        (MonthStem | MonthBranch, Primary) => (13, -2, 2),
        (MonthStem | MonthBranch, Supportive) => (8, -1, 1),
        (MonthStem | MonthBranch, Unfavorable) => (-9, -1, 1),
        (MonthStem | MonthBranch, Neutral) => (0, -2, 2),

        (DayStem, Primary) => (38, -3, 3),
        (DayStem, Supportive) => (22, -2, 2),
        (DayStem, Unfavorable) => (-20, -2, 1),
        (DayStem, Neutral) => (0, -4, 4),

        (DayBranch, Primary) => (27, -2, 2),
        (DayBranch, Supportive) => (17, -1, 1),
        (DayBranch, Unfavorable) => (-14, -1, 1),
        (DayBranch, Neutral) => (0, -3, 3),
    }
}

/// 流日十神奖惩 (身弱 / 非身弱)
pub(crate) fn relation_bonus(god: TenGod, is_weak: bool) -> i32 {
    let (weak, strong) = match god {
        TenGod::Companion => (8, -4),
        TenGod::RobWealth => (5, -6),
        TenGod::EatingGod => (10, 10),
        TenGod::HurtingOfficer => (3, 3),
        TenGod::IndirectWealth => (-2, 12),
        TenGod::DirectWealth => (-3, 8),
        TenGod::SevenKillings => (-12, -8),
        TenGod::DirectOfficer => (5, 10),
        TenGod::IndirectResource => (0, 0),
        TenGod::DirectResource => (10, 10),
    };
    if is_weak {
        weak
    } else {
        strong
    }
}

/// 各维度的核心十神及加分
pub(crate) fn dimension_core(dimension: Dimension, gender: Gender) -> (&'static [TenGod], i32) {
    match dimension {
        Dimension::Career => (
            &[TenGod::DirectOfficer, TenGod::SevenKillings, TenGod::DirectResource],
            10,
        ),
        Dimension::Wealth => (
            &[
                TenGod::DirectWealth,
                TenGod::IndirectWealth,
                TenGod::EatingGod,
                TenGod::HurtingOfficer,
            ],
            12,
        ),
        Dimension::Romance => match gender {
            Gender::Male => (&[TenGod::DirectWealth, TenGod::IndirectWealth], 10),
            Gender::Female => (&[TenGod::DirectOfficer, TenGod::SevenKillings], 10),
        },
        Dimension::Study => (
            &[
                TenGod::DirectResource,
                TenGod::IndirectResource,
                TenGod::EatingGod,
                TenGod::HurtingOfficer,
            ],
            10,
        ),
        Dimension::Health | Dimension::Travel => (&[], 0),
    }
}

/// 流日地支与日支相合
pub(crate) const ROMANCE_HARMONY_BONUS: i32 = 12;
/// 流日地支冲日支
pub(crate) const ROMANCE_CLASH_PENALTY: i32 = -15;

/// 流日冲命局地支
pub(crate) const CLASH_DAY_BRANCH: i32 = -12;
pub(crate) const CLASH_UNFAVORABLE: i32 = 5;
pub(crate) const CLASH_FAVORABLE: i32 = -10;
pub(crate) const CLASH_NEUTRAL: i32 = -2;
