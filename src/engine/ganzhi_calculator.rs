// ==========================================
// 八字运势引擎 - 干支推算引擎
// ==========================================
// 职责: 出生时刻 + 经度 → 四柱八字; 任意日期 → 流年/流月/流日
// 流程: 真太阳时校准 → 早子时换日 → 年/月/日/时四柱
// 红线: 全部运算为全函数, 非法经度回退到参考经线, 不返回错误
// ==========================================

use crate::config::CalendarConfig;
use crate::domain::ganzhi::{early_zi_rollover, FourPillarChart, GanZhi};
use crate::domain::fortune::FlowingPillars;
use crate::domain::tables::RuleTables;
use crate::domain::types::{Branch, Stem};
use crate::engine::solar_terms::SolarTermProvider;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// GanZhiCalculator - 干支推算引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct GanZhiCalculator {
    calendar: CalendarConfig,
    tables: Arc<RuleTables>,
    terms: SolarTermProvider,
}

impl GanZhiCalculator {
    pub fn new(calendar: CalendarConfig, tables: Arc<RuleTables>, terms: SolarTermProvider) -> Self {
        Self {
            calendar,
            tables,
            terms,
        }
    }

    pub fn solar_terms(&self) -> &SolarTermProvider {
        &self.terms
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排盘
    ///
    /// 1. 真太阳时: 按 (经度 - 参考经线) × 4 分钟平移
    /// 2. 早子时: 校准后 23 点按次日子时 (0 点) 计
    /// 3. 年/月/日/时四柱均以换日后的日期推算
    #[instrument(skip(self))]
    pub fn chart(&self, birth: NaiveDateTime, longitude: f64) -> FourPillarChart {
        let corrected = self.true_solar_time(birth, longitude);
        let (date, hour) = self.early_zi_adjust(corrected);

        let year = self.year_pillar(date);
        let month = self.month_pillar(date, year.stem);
        let day = self.day_pillar(date);
        let hour_pillar = self.hour_pillar(hour, day.stem);
        let solar_term = self.terms.current_term(date);

        if solar_term.approximate {
            warn!(
                year = date.year(),
                term = solar_term.name,
                "节气使用近似表, 月柱边界可能有 ±1 天误差"
            );
        }

        debug!(
            corrected = %corrected,
            effective_date = %date,
            hour,
            pillars = %format!("{} {} {} {}", year, month, day, hour_pillar),
            "排盘完成"
        );

        FourPillarChart {
            year,
            month,
            day,
            hour: hour_pillar,
            solar_term,
            corrected_time: corrected,
        }
    }

    /// 流年（取该年 3 月 1 日，必在立春之后）
    pub fn flowing_year(&self, year: i32) -> GanZhi {
        match NaiveDate::from_ymd_opt(year, 3, 1) {
            Some(date) => self.year_pillar(date),
            None => GanZhi::from_index(year as i64 - self.calendar.year_epoch as i64),
        }
    }

    /// 流月
    pub fn flowing_month(&self, date: NaiveDate) -> GanZhi {
        let year = self.year_pillar(date);
        self.month_pillar(date, year.stem)
    }

    /// 流日
    pub fn flowing_day(&self, date: NaiveDate) -> GanZhi {
        self.day_pillar(date)
    }

    /// 目标日期的流年/流月/流日（大运由调用方填入）
    ///
    /// 流年按立春换年，与流月保持一致
    pub fn flowing_pillars(&self, date: NaiveDate) -> FlowingPillars {
        FlowingPillars {
            target_date: date,
            decade: None,
            year: self.year_pillar(date),
            month: self.flowing_month(date),
            day: self.flowing_day(date),
        }
    }

    // ==========================================
    // 校准
    // ==========================================

    /// 真太阳时校准
    ///
    /// 经度非有限或超出 [-180, 180] 时按参考经线处理（零校准）
    pub fn true_solar_time(&self, birth: NaiveDateTime, longitude: f64) -> NaiveDateTime {
        let reference = self.calendar.reference_longitude;
        let longitude = if longitude.is_finite() && (-180.0..=180.0).contains(&longitude) {
            longitude
        } else {
            warn!(longitude, reference, "经度无效, 按参考经线处理");
            reference
        };

        let offset_ms = ((longitude - reference) * 4.0 * 60_000.0).round() as i64;
        birth + Duration::milliseconds(offset_ms)
    }

    /// 早子时: 23 点换日并按 0 点计时辰
    pub fn early_zi_adjust(&self, corrected: NaiveDateTime) -> (NaiveDate, u32) {
        early_zi_rollover(corrected)
    }

    // ==========================================
    // 四柱推算
    // ==========================================

    /// 年柱: 立春换年
    pub fn year_pillar(&self, date: NaiveDate) -> GanZhi {
        let mut nominal = date.year();
        if self.terms.is_before_start_of_spring(date) {
            nominal -= 1;
        }
        GanZhi::from_index(nominal as i64 - self.calendar.year_epoch as i64)
    }

    /// 月柱: 节气定月支, 五虎遁定月干
    pub fn month_pillar(&self, date: NaiveDate, year_stem: Stem) -> GanZhi {
        let term = self.terms.current_term(date);
        // 每个月支覆盖两个节气: 小寒/大寒 → 丑, 立春/雨水 → 寅 ...
        let branch = Branch::from_index((term.index / 2 + 1) as i64);
        let start = self.tables.month_stem_start(year_stem);
        // 寅月起干
        let offset = (branch.index() as i64 - Branch::Yin.index() as i64).rem_euclid(12);
        let stem = Stem::from_index(start.index() as i64 + offset);
        GanZhi { stem, branch }
    }

    /// 日柱: 距基准日的天数按 60 取模
    pub fn day_pillar(&self, date: NaiveDate) -> GanZhi {
        let days = date.signed_duration_since(self.calendar.day_epoch).num_days();
        GanZhi::from_index(self.calendar.day_epoch_index as i64 + days)
    }

    /// 时柱: 时支 ((hour + 1) / 2) % 12, 五鼠遁定时干
    pub fn hour_pillar(&self, hour: u32, day_stem: Stem) -> GanZhi {
        let branch = Branch::from_index(((hour as i64 + 1) / 2) % 12);
        let start = self.tables.hour_stem_start(day_stem);
        let stem = Stem::from_index(start.index() as i64 + branch.index() as i64);
        GanZhi { stem, branch }
    }
}

impl Default for GanZhiCalculator {
    fn default() -> Self {
        Self::new(
            CalendarConfig::default(),
            Arc::new(RuleTables::standard()),
            SolarTermProvider::new(),
        )
    }
}
