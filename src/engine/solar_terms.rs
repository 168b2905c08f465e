// ==========================================
// 八字运势引擎 - 节气提供器
// ==========================================
// 职责: (年, 节气索引) → (月, 日); 当前节气判定; 立春前判定
// 数据: 精确表仅覆盖部分年份, 其余年份回退近似表 (±1 天)
// 红线: 查表结果必须携带 approximate 标志, 不得静默降级
// ==========================================

use crate::domain::ganzhi::SolarTermInfo;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 二十四节气，索引 0 为小寒
pub const SOLAR_TERM_NAMES: [&str; 24] = [
    "小寒", "大寒", "立春", "雨水", "惊蛰", "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至",
    "小暑", "大暑", "立秋", "处暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至",
];

/// 立春索引
pub const START_OF_SPRING: usize = 2;

/// 节气在公历中的 (月, 日)
pub type TermDates = [(u32, u32); 24];

const APPROXIMATE_TERM_DATES: TermDates = [
    (1, 5), (1, 20), (2, 3), (2, 18), (3, 5), (3, 20),
    (4, 4), (4, 19), (5, 5), (5, 20), (6, 5), (6, 21),
    (7, 6), (7, 22), (8, 7), (8, 23), (9, 7), (9, 22),
    (10, 8), (10, 23), (11, 7), (11, 22), (12, 7), (12, 21),
];

const PRECISE_2025: TermDates = [
    (1, 5), (1, 20), (2, 3), (2, 18), (3, 5), (3, 20),
    (4, 4), (4, 19), (5, 5), (5, 20), (6, 5), (6, 21),
    (7, 6), (7, 22), (8, 7), (8, 23), (9, 7), (9, 22),
    (10, 8), (10, 23), (11, 7), (11, 22), (12, 7), (12, 21),
];

/// 节气名称
pub fn term_name(index: usize) -> &'static str {
    SOLAR_TERM_NAMES[index % 24]
}

/// 节（月首）: 小寒、立春、惊蛰…… 偶数索引
pub fn is_sectional(index: usize) -> bool {
    index % 2 == 0
}

/// 单次节气查询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermDate {
    pub month: u32,
    pub day: u32,
    pub approximate: bool,
}

// ==========================================
// SolarTermTable - 可注入的节气数据
// ==========================================
#[derive(Debug, Clone)]
pub struct SolarTermTable {
    precise: HashMap<i32, TermDates>,
    approximate: TermDates,
}

impl SolarTermTable {
    pub fn new(approximate: TermDates) -> Self {
        Self {
            precise: HashMap::new(),
            approximate,
        }
    }

    /// 内置数据
    pub fn standard() -> Self {
        let mut table = Self::new(APPROXIMATE_TERM_DATES);
        table.insert_year(2025, PRECISE_2025);
        table
    }

    pub fn insert_year(&mut self, year: i32, dates: TermDates) {
        self.precise.insert(year, dates);
    }

    pub fn has_precise(&self, year: i32) -> bool {
        self.precise.contains_key(&year)
    }
}

impl Default for SolarTermTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ==========================================
// SolarTermProvider - 节气提供器
// ==========================================
#[derive(Debug, Clone)]
pub struct SolarTermProvider {
    table: Arc<SolarTermTable>,
}

impl SolarTermProvider {
    pub fn new() -> Self {
        Self::with_table(Arc::new(SolarTermTable::standard()))
    }

    pub fn with_table(table: Arc<SolarTermTable>) -> Self {
        Self { table }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 查询某年某节气的公历月日
    ///
    /// 索引按 24 取模
    pub fn term_date(&self, year: i32, term_index: usize) -> TermDate {
        let index = term_index % 24;
        match self.table.precise.get(&year) {
            Some(dates) => {
                let (month, day) = dates[index];
                TermDate { month, day, approximate: false }
            }
            None => {
                let (month, day) = self.table.approximate[index];
                TermDate { month, day, approximate: true }
            }
        }
    }

    /// 某年某节气的日期（年份超出日历范围时为 None）
    pub fn term_naive_date(&self, year: i32, term_index: usize) -> Option<(NaiveDate, bool)> {
        let term = self.term_date(year, term_index);
        NaiveDate::from_ymd_opt(year, term.month, term.day).map(|d| (d, term.approximate))
    }

    /// 指定日期所处的节气
    ///
    /// 从冬至倒序扫描当年节气，返回第一个不晚于该日期者；
    /// 早于当年小寒时返回上一年冬至 (索引 23)
    pub fn current_term(&self, date: NaiveDate) -> SolarTermInfo {
        let year = date.year();
        let approximate = !self.table.has_precise(year);
        let key = (date.month(), date.day());

        let index = (0..24)
            .rev()
            .find(|&i| {
                let term = self.term_date(year, i);
                (term.month, term.day) <= key
            })
            .unwrap_or(23);

        // 回退到上一年冬至时，精度取决于上一年的数据
        let first = self.term_date(year, 0);
        let approximate = if key < (first.month, first.day) {
            !self.table.has_precise(year - 1)
        } else {
            approximate
        };

        debug!(date = %date, term = term_name(index), approximate, "节气判定");
        SolarTermInfo {
            name: term_name(index),
            index,
            approximate,
        }
    }

    /// 是否早于当年立春
    pub fn is_before_start_of_spring(&self, date: NaiveDate) -> bool {
        let spring = self.term_date(date.year(), START_OF_SPRING);
        (date.month(), date.day()) < (spring.month, spring.day)
    }

    /// 严格晚于 date 的下一个"节"（偶数索引）
    pub fn next_sectional_term(&self, date: NaiveDate) -> Option<(NaiveDate, usize)> {
        for year in [date.year(), date.year() + 1] {
            for index in (0..24).filter(|i| is_sectional(*i)) {
                if let Some((term_date, _)) = self.term_naive_date(year, index) {
                    if term_date > date {
                        return Some((term_date, index));
                    }
                }
            }
        }
        None
    }

    /// 不晚于 date 的上一个"节"（偶数索引）
    pub fn previous_sectional_term(&self, date: NaiveDate) -> Option<(NaiveDate, usize)> {
        for year in [date.year(), date.year() - 1] {
            for index in (0..24).rev().filter(|i| is_sectional(*i)) {
                if let Some((term_date, _)) = self.term_naive_date(year, index) {
                    if term_date <= date {
                        return Some((term_date, index));
                    }
                }
            }
        }
        None
    }
}

impl Default for SolarTermProvider {
    fn default() -> Self {
        Self::new()
    }
}
