// ==========================================
// 八字运势引擎 - 大运推算
// ==========================================
// 顺逆: 阳年男 / 阴年女 顺行, 其余逆行
// 起运: 排盘日期(早子时换日后)到下一个(顺)/上一个(逆)"节"的天数, 三天折一年 (一天 = 四个月)
// 排列: 自月柱起沿六十甲子顺/逆排 8 步, 每步 10 年
// ==========================================

use crate::domain::ganzhi::{FourPillarChart, GanZhi};
use crate::domain::types::{Gender, Polarity};
use crate::engine::solar_terms::SolarTermProvider;
use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, instrument};

pub const DECADE_COUNT: usize = 8;
pub const DECADE_YEARS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecadeDirection {
    Forward,
    Backward,
}

impl DecadeDirection {
    pub fn step(self) -> i64 {
        match self {
            DecadeDirection::Forward => 1,
            DecadeDirection::Backward => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecadePillar {
    pub pillar: GanZhi,
    pub start_year: i32,
    pub end_year: i32,
    /// 起始虚岁（按起运年数取整）
    pub start_age: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecadeCycle {
    pub direction: DecadeDirection,
    pub start_age_months: i64,
    pub start_year: i32,
    pub pillars: Vec<DecadePillar>,
}

impl DecadeCycle {
    /// 指定公历年份所行大运（起运前或超出 8 步时为 None）
    pub fn pillar_for_year(&self, year: i32) -> Option<GanZhi> {
        self.pillars
            .iter()
            .find(|p| p.start_year <= year && year <= p.end_year)
            .map(|p| p.pillar)
    }
}

// ==========================================
// DecadeCycleCalculator - 大运推算器
// ==========================================
#[derive(Debug, Clone)]
pub struct DecadeCycleCalculator {
    terms: SolarTermProvider,
}

impl DecadeCycleCalculator {
    pub fn new(terms: SolarTermProvider) -> Self {
        Self { terms }
    }

    pub fn direction(chart: &FourPillarChart, gender: Gender) -> DecadeDirection {
        match (chart.year.stem.polarity(), gender) {
            (Polarity::Yang, Gender::Male) | (Polarity::Yin, Gender::Female) => DecadeDirection::Forward,
            _ => DecadeDirection::Backward,
        }
    }

    #[instrument(skip(self, chart), fields(year = %chart.year))]
    pub fn cycle(&self, chart: &FourPillarChart, gender: Gender) -> DecadeCycle {
        let direction = Self::direction(chart, gender);
        let birth = chart.pillar_date();

        let days = match direction {
            DecadeDirection::Forward => self
                .terms
                .next_sectional_term(birth)
                .map(|(term, _)| term.signed_duration_since(birth).num_days()),
            DecadeDirection::Backward => self
                .terms
                .previous_sectional_term(birth)
                .map(|(term, _)| birth.signed_duration_since(term).num_days()),
        }
        .unwrap_or(0);

        let start_age_months = days * 4;
        let start_offset = (start_age_months / 12) as i32;
        let start_year = birth.year() + start_offset;

        let pillars = (0..DECADE_COUNT)
            .map(|k| {
                let k_i32 = k as i32;
                DecadePillar {
                    pillar: chart.month.step(direction.step() * (k as i64 + 1)),
                    start_year: start_year + DECADE_YEARS * k_i32,
                    end_year: start_year + DECADE_YEARS * k_i32 + DECADE_YEARS - 1,
                    start_age: start_offset + DECADE_YEARS * k_i32,
                }
            })
            .collect();

        debug!(?direction, days, start_age_months, start_year, "大运推算完成");

        DecadeCycle {
            direction,
            start_age_months,
            start_year,
            pillars,
        }
    }
}

impl Default for DecadeCycleCalculator {
    fn default() -> Self {
        Self::new(SolarTermProvider::new())
    }
}
