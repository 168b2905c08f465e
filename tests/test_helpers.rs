// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的命盘构造、引擎实例、临时配置文件
// ==========================================
#![allow(dead_code)]

use bazi_fortune::api::{BirthInput, FortuneApi};
use bazi_fortune::config::EngineConfig;
use bazi_fortune::domain::ganzhi::{FourPillarChart, GanZhi, SolarTermInfo};
use bazi_fortune::domain::types::{Branch, Stem};
use bazi_fortune::engine::GanZhiCalculator;
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Write;
use tempfile::NamedTempFile;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn birth(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, mi, 0).unwrap()
}

/// 以参考经线（不做真太阳时偏移）排盘
pub fn chart_at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> FourPillarChart {
    GanZhiCalculator::default().chart(birth(y, m, d, h, mi), 120.0)
}

/// "甲子" → GanZhi
pub fn gz(symbols: &str) -> GanZhi {
    let mut chars = symbols.chars();
    let stem: Stem = chars.next().unwrap().to_string().parse().unwrap();
    let branch: Branch = chars.next().unwrap().to_string().parse().unwrap();
    GanZhi::new(stem, branch).unwrap()
}

/// 手工构造四柱（年 月 日 时），节气与校正时间仅占位
pub fn chart_of(pillars: [&str; 4]) -> FourPillarChart {
    FourPillarChart {
        year: gz(pillars[0]),
        month: gz(pillars[1]),
        day: gz(pillars[2]),
        hour: gz(pillars[3]),
        solar_term: SolarTermInfo {
            name: "立春",
            index: 2,
            approximate: true,
        },
        corrected_time: birth(2000, 3, 1, 12, 0),
    }
}

/// 默认配置的 API 实例
pub fn test_api() -> FortuneApi {
    FortuneApi::new(EngineConfig::default()).expect("默认配置必须有效")
}

/// 参考命例: 1990-05-15 10:30 北京 (116.4°E)
pub fn reference_input(gender: &str) -> BirthInput {
    BirthInput {
        birth_date: "1990-05-15".to_string(),
        birth_time: Some("10:30".to_string()),
        longitude: Some(116.4),
        gender: gender.to_string(),
        custom_favorable: None,
    }
}

/// 写入临时配置文件（需要保持返回值存活）
pub fn write_config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("创建临时文件失败");
    file.write_all(json.as_bytes()).expect("写入配置失败");
    file
}
