// ==========================================
// 八字运势引擎 - 引擎配置
// ==========================================
// 覆盖范围: 历法基准 / 旺衰权重与阈值 / 喜用神通关参数 / 运势评分权重
// 加载方式: 默认值 → JSON 文件覆写 → 启动时一次性校验
// 红线: 日柱基准必须通过独立锚点校验 (1949-10-01 = 甲子)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// 指向配置文件的环境变量
pub const CONFIG_ENV_VAR: &str = "BAZI_FORTUNE_CONFIG";

const WEIGHT_TOLERANCE: f64 = 1e-6;

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("权重配置无效: {0}")]
    InvalidWeights(String),

    #[error("旺衰阈值无效: weak={weak}, strong={strong} (要求 0 <= weak < strong <= 1)")]
    InvalidThresholds { weak: f64, strong: f64 },

    #[error("日柱基准不一致: {date} 声明索引 {declared}, 按锚点推算应为 {expected}")]
    InconsistentEpoch {
        date: NaiveDate,
        declared: u8,
        expected: u8,
    },

    #[error("配置项无效: {field} ({reason})")]
    InvalidValue { field: &'static str, reason: String },

    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

// ==========================================
// 历法配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// 参考经线（东八区 120°E）
    pub reference_longitude: f64,
    /// 日柱基准日期
    pub day_epoch: NaiveDate,
    /// 基准日期的六十甲子索引
    pub day_epoch_index: u8,
    /// 已知甲子年
    pub year_epoch: i32,
}

/// 1984 为甲子年
const YEAR_ANCHOR: i32 = 1984;

impl CalendarConfig {
    /// 独立锚点: 1949-10-01 为甲子日
    pub fn anchor() -> (NaiveDate, u8) {
        (
            NaiveDate::from_ymd_opt(1949, 10, 1).unwrap_or(NaiveDate::MIN),
            0,
        )
    }

    /// 按锚点推算基准日期应有的索引
    pub fn expected_epoch_index(&self) -> u8 {
        let (anchor_date, anchor_index) = Self::anchor();
        let days = self.day_epoch.signed_duration_since(anchor_date).num_days();
        (anchor_index as i64 + days).rem_euclid(60) as u8
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            reference_longitude: 120.0,
            day_epoch: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN),
            day_epoch_index: 10,
            year_epoch: 1984,
        }
    }
}

// ==========================================
// 旺衰配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthWeights {
    pub month_command: f64,
    pub rootedness: f64,
    pub exposed_support: f64,
    pub combination: f64,
    pub clash: f64,
}

impl StrengthWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.month_command,
            self.rootedness,
            self.exposed_support,
            self.combination,
            self.clash,
        ]
    }
}

impl Default for StrengthWeights {
    fn default() -> Self {
        Self {
            month_command: 0.40,
            rootedness: 0.30,
            exposed_support: 0.20,
            combination: 0.05,
            clash: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthConfig {
    pub weights: StrengthWeights,
    /// 总分 >= 此值判为身旺
    pub strong_threshold: f64,
    /// 总分 <= 此值判为身弱
    pub weak_threshold: f64,
}

impl Default for StrengthConfig {
    fn default() -> Self {
        Self {
            weights: StrengthWeights::default(),
            strong_threshold: 0.70,
            weak_threshold: 0.30,
        }
    }
}

// ==========================================
// 喜用神配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavorableConfig {
    /// 地支五行的出现权重
    pub branch_presence: f64,
    /// 天干五行的出现权重
    pub stem_presence: f64,
    /// 前两强五行差值小于此值视为对峙
    pub mediator_margin: f64,
}

impl Default for FavorableConfig {
    fn default() -> Self {
        Self {
            branch_presence: 1.0,
            stem_presence: 0.5,
            mediator_margin: 1.0,
        }
    }
}

// ==========================================
// 运势评分配置
// ==========================================

/// 单个流运周期的权重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleWeight {
    pub weight: f64,
    /// 奖惩表标定时使用的权重，贡献值按 weight / reference 缩放
    pub reference: f64,
    pub stem_ratio: f64,
    pub branch_ratio: f64,
}

impl CycleWeight {
    pub fn scale(&self) -> f64 {
        self.weight / self.reference
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortuneConfig {
    pub base_score: i32,
    pub decade_adjustment: i32,
    pub floor: i32,
    pub ceiling: i32,
    pub year: CycleWeight,
    pub month: CycleWeight,
    pub day: CycleWeight,
    /// 神煞合计的绝对值上限
    pub marker_cap: i32,
}

impl Default for FortuneConfig {
    fn default() -> Self {
        Self {
            base_score: 60,
            decade_adjustment: 10,
            floor: 30,
            ceiling: 100,
            year: CycleWeight {
                weight: 0.10,
                reference: 0.12,
                stem_ratio: 0.6,
                branch_ratio: 0.4,
            },
            month: CycleWeight {
                weight: 0.20,
                reference: 0.18,
                stem_ratio: 0.6,
                branch_ratio: 0.4,
            },
            day: CycleWeight {
                weight: 0.70,
                reference: 0.70,
                stem_ratio: 0.6,
                branch_ratio: 0.4,
            },
            marker_cap: 20,
        }
    }
}

// ==========================================
// EngineConfig - 引擎总配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub calendar: CalendarConfig,
    pub strength: StrengthConfig,
    pub favorable: FavorableConfig,
    pub fortune: FortuneConfig,
}

impl EngineConfig {
    /// 从 JSON 字符串加载（缺省字段取默认值）
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "已加载引擎配置文件");
        Ok(config)
    }

    /// 读取 BAZI_FORTUNE_CONFIG 指向的文件，未设置时使用默认配置
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::load_or_default(std::env::var(CONFIG_ENV_VAR).ok().as_deref())
    }

    /// 路径为空或缺省时使用默认配置
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path.map(str::trim) {
            Some(path) if !path.is_empty() => Self::from_json_file(path),
            _ => {
                debug!("未指定配置文件，使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 一次性校验全部配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_calendar()?;
        self.validate_strength()?;
        self.validate_favorable()?;
        self.validate_fortune()?;
        Ok(())
    }

    fn validate_calendar(&self) -> Result<(), ConfigError> {
        let calendar = &self.calendar;
        let lon = calendar.reference_longitude;
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::InvalidValue {
                field: "calendar.reference_longitude",
                reason: format!("{} 超出 [-180, 180]", lon),
            });
        }
        if calendar.day_epoch_index >= 60 {
            return Err(ConfigError::InvalidValue {
                field: "calendar.day_epoch_index",
                reason: format!("{} 超出 0..60", calendar.day_epoch_index),
            });
        }
        let year_offset = (calendar.year_epoch - YEAR_ANCHOR).rem_euclid(60);
        if year_offset != 0 {
            return Err(ConfigError::InvalidValue {
                field: "calendar.year_epoch",
                reason: format!("{} 不是甲子年 (偏离 {} 年)", calendar.year_epoch, year_offset),
            });
        }
        let expected = calendar.expected_epoch_index();
        if expected != calendar.day_epoch_index {
            return Err(ConfigError::InconsistentEpoch {
                date: calendar.day_epoch,
                declared: calendar.day_epoch_index,
                expected,
            });
        }
        Ok(())
    }

    fn validate_strength(&self) -> Result<(), ConfigError> {
        let weights = self.strength.weights.as_array();
        check_weight_vector("strength.weights", &weights)?;

        let weak = self.strength.weak_threshold;
        let strong = self.strength.strong_threshold;
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_range(weak) || !in_range(strong) || weak >= strong {
            return Err(ConfigError::InvalidThresholds { weak, strong });
        }
        Ok(())
    }

    fn validate_favorable(&self) -> Result<(), ConfigError> {
        let f = &self.favorable;
        for (field, value) in [
            ("favorable.branch_presence", f.branch_presence),
            ("favorable.stem_presence", f.stem_presence),
            ("favorable.mediator_margin", f.mediator_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{} 必须为非负有限数", value),
                });
            }
        }
        Ok(())
    }

    fn validate_fortune(&self) -> Result<(), ConfigError> {
        let fortune = &self.fortune;
        if fortune.floor >= fortune.ceiling {
            return Err(ConfigError::InvalidValue {
                field: "fortune.floor",
                reason: format!("下限 {} 必须小于上限 {}", fortune.floor, fortune.ceiling),
            });
        }
        if fortune.marker_cap < 0 {
            return Err(ConfigError::InvalidValue {
                field: "fortune.marker_cap",
                reason: format!("{} 不能为负", fortune.marker_cap),
            });
        }

        let cycles = [
            ("fortune.year", &fortune.year),
            ("fortune.month", &fortune.month),
            ("fortune.day", &fortune.day),
        ];
        for (field, cycle) in cycles {
            if !cycle.weight.is_finite() || cycle.weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("weight={} 必须为非负有限数", cycle.weight),
                });
            }
            if !cycle.reference.is_finite() || cycle.reference <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("reference={} 必须为正数", cycle.reference),
                });
            }
            check_weight_vector(field, &[cycle.stem_ratio, cycle.branch_ratio])?;
        }

        let total = fortune.year.weight + fortune.month.weight + fortune.day.weight;
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::InvalidWeights(format!(
                "fortune 年/月/日权重之和为 {:.6}，应为 1",
                total
            )));
        }
        Ok(())
    }
}

/// 权重向量: 非负、有限、和为 1
fn check_weight_vector(field: &str, weights: &[f64]) -> Result<(), ConfigError> {
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(ConfigError::InvalidWeights(format!(
            "{} 含非法权重 {}",
            field, bad
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ConfigError::InvalidWeights(format!(
            "{} 之和为 {:.6}，应为 1",
            field, sum
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.calendar.expected_epoch_index(), 10);
    }

    #[test]
    fn test_rejects_misaligned_epoch() {
        // 1984-01-01 实为甲午日(30)，声明为甲子(0)应被拒绝
        let mut config = EngineConfig::default();
        config.calendar.day_epoch = NaiveDate::from_ymd_opt(1984, 1, 1).unwrap();
        config.calendar.day_epoch_index = 0;
        match config.validate() {
            Err(ConfigError::InconsistentEpoch { expected, .. }) => assert_eq!(expected, 30),
            other => panic!("期望 InconsistentEpoch, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_alternate_consistent_epoch_accepted() {
        let mut config = EngineConfig::default();
        config.calendar.day_epoch = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        config.calendar.day_epoch_index = 54;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_year_epoch_must_be_jiazi_year() {
        let mut config = EngineConfig::default();
        config.calendar.year_epoch = 1985;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "calendar.year_epoch", .. })
        ));

        // 相差 60 年整仍为甲子年
        config.calendar.year_epoch = 1924;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_weights_and_thresholds() {
        let mut config = EngineConfig::default();
        config.strength.weights.month_command = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWeights(_))));

        let mut config = EngineConfig::default();
        config.strength.weak_threshold = 0.8;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let raw = r#"{"strength": {"strong_threshold": 0.65, "weak_threshold": 0.35}}"#;
        let config = EngineConfig::from_json_str(raw).unwrap();
        assert_eq!(config.strength.strong_threshold, 0.65);
        assert_eq!(config.strength.weights, StrengthWeights::default());
        assert_eq!(config.fortune.base_score, 60);
        assert!(config.validate().is_ok());
    }
}
