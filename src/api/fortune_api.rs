// ==========================================
// 八字运势引擎 - 运势 API
// ==========================================
// 职责: 组装各引擎（共享同一份规则表），对外提供
//       compute_chart / compute_fortune / recommend_dates
// 架构: 请求层 → FortuneApi → Engine 层（纯函数）
// 红线: 配置在构造时校验一次；命盘结果经缓存，同一出生信息至多计算一次
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::api::cache::{ChartCache, ChartKey};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::config::EngineConfig;
use crate::domain::favorable::FavorableElementSet;
use crate::domain::fortune::FortuneScore;
use crate::domain::ganzhi::FourPillarChart;
use crate::domain::strength::StrengthResult;
use crate::domain::tables::RuleTables;
use crate::domain::types::{Element, Gender};
use crate::engine::date_picker::{DatePickResult, DatePicker, DateRequest};
use crate::engine::decade::{DecadeCycle, DecadeCycleCalculator};
use crate::engine::favorable::FavorableElementDeriver;
use crate::engine::fortune::{FortuneProfile, FortuneScoreEngine};
use crate::engine::ganzhi_calculator::GanZhiCalculator;
use crate::engine::solar_terms::SolarTermProvider;
use crate::engine::strength::StrengthAnalyzer;

// ==========================================
// 数据结构
// ==========================================

/// 出生信息推导出的全部不变量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartAnalysis {
    pub chart: FourPillarChart,
    pub strength: StrengthResult,
    pub favorable: FavorableElementSet,
}

/// 字符串形式的出生信息（请求层输入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthInput {
    pub birth_date: String,
    #[serde(default)]
    pub birth_time: Option<String>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub gender: String,
    /// 自定义用神，覆盖推导结果
    #[serde(default)]
    pub custom_favorable: Option<Vec<Element>>,
}

/// 单日运势结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FortuneReport {
    pub analysis: ChartAnalysis,
    pub decade: DecadeCycle,
    pub fortune: FortuneScore,
}

// ==========================================
// FortuneApi - 运势 API
// ==========================================
pub struct FortuneApi {
    config: EngineConfig,
    calculator: GanZhiCalculator,
    strength: StrengthAnalyzer,
    favorable: FavorableElementDeriver,
    decade: DecadeCycleCalculator,
    fortune: FortuneScoreEngine,
    picker: DatePicker,
    cache: ChartCache,
}

impl FortuneApi {
    /// 使用标准规则表创建
    pub fn new(config: EngineConfig) -> ApiResult<Self> {
        Self::with_tables(config, Arc::new(RuleTables::standard()))
    }

    /// 使用指定规则表创建（测试可替换规则）
    pub fn with_tables(config: EngineConfig, tables: Arc<RuleTables>) -> ApiResult<Self> {
        config.validate()?;

        let terms = SolarTermProvider::new();
        let calculator = GanZhiCalculator::new(config.calendar.clone(), Arc::clone(&tables), terms.clone());
        let strength = StrengthAnalyzer::new(config.strength.clone(), Arc::clone(&tables));
        let favorable = FavorableElementDeriver::new(config.favorable.clone(), Arc::clone(&tables));
        let decade = DecadeCycleCalculator::new(terms);
        let fortune = FortuneScoreEngine::new(config.fortune.clone(), tables);
        let picker = DatePicker::new(calculator.clone(), fortune.clone());

        info!(
            day_epoch = %config.calendar.day_epoch,
            reference_longitude = config.calendar.reference_longitude,
            "运势引擎初始化完成"
        );

        Ok(Self {
            config,
            calculator,
            strength,
            favorable,
            decade,
            fortune,
            picker,
            cache: ChartCache::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ChartCache {
        &self.cache
    }

    pub fn calculator(&self) -> &GanZhiCalculator {
        &self.calculator
    }

    // ==========================================
    // 核心接口
    // ==========================================

    /// 排盘 + 旺衰 + 用神（按出生信息缓存）
    #[instrument(skip(self))]
    pub fn compute_chart(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        longitude: f64,
    ) -> ApiResult<Arc<ChartAnalysis>> {
        validator::validate_year("出生日期", date)?;

        let key = ChartKey::new(date, time, longitude);
        self.cache.get_or_compute(key, || {
            let chart = self.calculator.chart(date.and_time(time), longitude);
            let strength = self.strength.analyze(&chart);
            let favorable = self.favorable.derive(&chart, &strength);
            debug!(chart = %chart, level = %strength.level, favorable = ?favorable.favorable, "命盘分析完成");
            ChartAnalysis {
                chart,
                strength,
                favorable,
            }
        })
    }

    /// 大运排列
    pub fn decade_cycle(&self, analysis: &ChartAnalysis, gender: Gender) -> DecadeCycle {
        self.decade.cycle(&analysis.chart, gender)
    }

    /// 组装命主画像；提供自定义用神时以其替换推导结果
    pub fn profile(
        &self,
        analysis: &ChartAnalysis,
        gender: Gender,
        custom_favorable: Option<&[Element]>,
    ) -> FortuneProfile {
        let favorable = match custom_favorable {
            Some(elements) if !elements.is_empty() => {
                FavorableElementSet::custom(elements, analysis.strength.level)
            }
            _ => analysis.favorable.clone(),
        };
        FortuneProfile {
            chart: analysis.chart.clone(),
            favorable,
            gender,
            decade: self.decade_cycle(analysis, gender),
        }
    }

    /// 目标日期运势
    #[instrument(skip(self, analysis), fields(chart = %analysis.chart))]
    pub fn compute_fortune(
        &self,
        analysis: &ChartAnalysis,
        target: NaiveDate,
        gender: Gender,
    ) -> ApiResult<FortuneScore> {
        let profile = self.profile(analysis, gender, None);
        self.compute_fortune_for(&profile, target)
    }

    /// 按已组装的命主画像计算目标日期运势
    pub fn compute_fortune_for(&self, profile: &FortuneProfile, target: NaiveDate) -> ApiResult<FortuneScore> {
        validator::validate_year("目标日期", target)?;
        Ok(self.fortune.score_profile(&self.calculator, profile, target))
    }

    /// 择日推荐
    #[instrument(skip(self, profile, request), fields(purpose = %request.purpose))]
    pub fn recommend_dates(
        &self,
        profile: &FortuneProfile,
        request: &DateRequest,
    ) -> ApiResult<DatePickResult> {
        validator::validate_year("起始日期", request.start)?;
        self.picker
            .recommend(profile, request)
            .ok_or(ApiError::NoCandidateDates)
    }

    // ==========================================
    // 字符串输入接口
    // ==========================================

    /// 解析出生信息并排盘
    pub fn chart_from_input(&self, input: &BirthInput) -> ApiResult<Arc<ChartAnalysis>> {
        let date = validator::parse_date("出生日期", &input.birth_date)?;
        let time = validator::parse_time(
            input
                .birth_time
                .as_deref()
                .unwrap_or(validator::DEFAULT_BIRTH_TIME),
        )?;
        let longitude = input
            .longitude
            .unwrap_or(self.config.calendar.reference_longitude);
        self.compute_chart(date, time, longitude)
    }

    /// 解析出生信息并组装命主画像
    pub fn profile_from_input(&self, input: &BirthInput) -> ApiResult<(Arc<ChartAnalysis>, FortuneProfile)> {
        let analysis = self.chart_from_input(input)?;
        let gender = validator::parse_gender(&input.gender)?;
        let profile = self.profile(&analysis, gender, input.custom_favorable.as_deref());
        Ok((analysis, profile))
    }

    /// 解析出生信息与目标日期并计算运势
    pub fn fortune_from_input(&self, input: &BirthInput, target: &str) -> ApiResult<FortuneReport> {
        let target = validator::parse_date("目标日期", target)?;
        let (analysis, profile) = self.profile_from_input(input)?;
        let fortune = self.compute_fortune_for(&profile, target)?;
        Ok(FortuneReport {
            analysis: ChartAnalysis::clone(&analysis),
            decade: profile.decade,
            fortune,
        })
    }
}
