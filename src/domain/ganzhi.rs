// ==========================================
// 八字运势引擎 - 干支与四柱
// ==========================================
// GanZhi: 天干地支对 (值类型, 可作查表键)
// FourPillarChart: 一次出生事件的年/月/日/时四柱
// ==========================================

use crate::domain::types::{Branch, Element, Stem};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// GanZhi - 干支柱
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GanZhi {
    pub stem: Stem,
    pub branch: Branch,
}

impl GanZhi {
    /// 构造干支
    ///
    /// 天干与地支阴阳不一致时（如 甲丑）不存在于六十甲子中，返回 None
    pub fn new(stem: Stem, branch: Branch) -> Option<Self> {
        if stem.index() % 2 == branch.index() % 2 {
            Some(Self { stem, branch })
        } else {
            None
        }
    }

    /// 六十甲子索引转干支（按 60 取模，支持负数）
    pub fn from_index(index: i64) -> Self {
        let index = index.rem_euclid(60);
        Self {
            stem: Stem::from_index(index),
            branch: Branch::from_index(index),
        }
    }

    /// 六十甲子索引 (0-59)
    ///
    /// 满足 index ≡ 干索引 (mod 10) 且 index ≡ 支索引 (mod 12) 的唯一解
    pub fn sexagenary_index(&self) -> usize {
        let s = self.stem.index() as i64;
        let b = self.branch.index() as i64;
        (6 * s - 5 * b).rem_euclid(60) as usize
    }

    /// 沿六十甲子前进（负数为后退）
    pub fn step(&self, offset: i64) -> Self {
        Self::from_index(self.sexagenary_index() as i64 + offset)
    }

    pub fn full(&self) -> String {
        format!("{}{}", self.stem.symbol(), self.branch.symbol())
    }
}

impl fmt::Display for GanZhi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

// ==========================================
// 柱位 (Pillar Position)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarPosition {
    Year,
    Month,
    Day,
    Hour,
}

impl PillarPosition {
    pub const ALL: [PillarPosition; 4] = [
        PillarPosition::Year,
        PillarPosition::Month,
        PillarPosition::Day,
        PillarPosition::Hour,
    ];

    pub fn stem_label(self) -> &'static str {
        match self {
            PillarPosition::Year => "年干",
            PillarPosition::Month => "月干",
            PillarPosition::Day => "日干",
            PillarPosition::Hour => "时干",
        }
    }

    pub fn branch_label(self) -> &'static str {
        match self {
            PillarPosition::Year => "年支",
            PillarPosition::Month => "月支",
            PillarPosition::Day => "日支",
            PillarPosition::Hour => "时支",
        }
    }
}

// ==========================================
// 节气信息
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTermInfo {
    pub name: &'static str,
    pub index: usize,
    /// 节气日期来自近似表（可能有 ±1 天误差）
    pub approximate: bool,
}

// ==========================================
// FourPillarChart - 四柱八字
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourPillarChart {
    pub year: GanZhi,
    pub month: GanZhi,
    pub day: GanZhi,
    pub hour: GanZhi,
    /// 出生时刻所在节气
    pub solar_term: SolarTermInfo,
    /// 真太阳时校准后的出生时刻（未做早子时换日）
    pub corrected_time: NaiveDateTime,
}

/// 早子时换日: 23 点起按次日排日柱, 时支记为 0 点
pub fn early_zi_rollover(corrected: NaiveDateTime) -> (NaiveDate, u32) {
    let date = corrected.date();
    if corrected.hour() == 23 {
        match date.succ_opt() {
            Some(next) => (next, 0),
            None => (date, 23),
        }
    } else {
        (date, corrected.hour())
    }
}

impl FourPillarChart {
    /// 排盘所用日期（早子时换日后）
    pub fn pillar_date(&self) -> NaiveDate {
        early_zi_rollover(self.corrected_time).0
    }

    /// 日主（日干）
    pub fn day_master(&self) -> Stem {
        self.day.stem
    }

    pub fn day_master_element(&self) -> Element {
        self.day.stem.element()
    }

    pub fn pillar(&self, position: PillarPosition) -> GanZhi {
        match position {
            PillarPosition::Year => self.year,
            PillarPosition::Month => self.month,
            PillarPosition::Day => self.day,
            PillarPosition::Hour => self.hour,
        }
    }

    pub fn pillars(&self) -> [GanZhi; 4] {
        [self.year, self.month, self.day, self.hour]
    }

    pub fn stems(&self) -> [Stem; 4] {
        [self.year.stem, self.month.stem, self.day.stem, self.hour.stem]
    }

    pub fn branches(&self) -> [Branch; 4] {
        [
            self.year.branch,
            self.month.branch,
            self.day.branch,
            self.hour.branch,
        ]
    }
}

impl fmt::Display for FourPillarChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}
