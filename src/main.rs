// ==========================================
// 八字运势引擎 - 命令行入口
// ==========================================
// 子命令: chart / fortune / pick，结果以 JSON 输出到 stdout
// 日志输出到 stderr（RUST_LOG 控制级别）
// ==========================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use bazi_fortune::api::{validator, BirthInput, FortuneApi};
use bazi_fortune::config::EngineConfig;
use bazi_fortune::engine::date_picker::DateRequest;
use bazi_fortune::{logging, Element};

#[derive(Parser)]
#[command(name = "bazi-fortune", version, about = "八字排盘与运势评分")]
struct Cli {
    /// 引擎配置文件 (JSON)，缺省时读取 BAZI_FORTUNE_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BirthArgs {
    /// 出生日期 (YYYY-MM-DD)
    #[arg(long)]
    date: String,
    /// 出生时间 (HH:MM)
    #[arg(long, default_value = validator::DEFAULT_BIRTH_TIME)]
    time: String,
    /// 出生地经度，东经为正
    #[arg(long, allow_negative_numbers = true, value_parser = validator::parse_longitude)]
    longitude: Option<f64>,
    /// male / female
    #[arg(long, default_value = "male")]
    gender: String,
    /// 自定义用神，逗号分隔（如 水,木）
    #[arg(long, value_delimiter = ',')]
    favorable: Vec<Element>,
}

impl BirthArgs {
    fn to_input(&self) -> BirthInput {
        BirthInput {
            birth_date: self.date.clone(),
            birth_time: Some(self.time.clone()),
            longitude: self.longitude,
            gender: self.gender.clone(),
            custom_favorable: (!self.favorable.is_empty()).then(|| self.favorable.clone()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 排盘: 四柱、旺衰、用神、大运
    Chart {
        #[command(flatten)]
        birth: BirthArgs,
    },
    /// 目标日期运势
    Fortune {
        #[command(flatten)]
        birth: BirthArgs,
        /// 目标日期 (YYYY-MM-DD)
        #[arg(long)]
        target: String,
    },
    /// 择日推荐
    Pick {
        #[command(flatten)]
        birth: BirthArgs,
        /// 起始日期，缺省为今天
        #[arg(long)]
        start: Option<String>,
        /// 扫描天数 (3-60)
        #[arg(long, default_value_t = 14)]
        days: u32,
        /// moving / opening / travel / romance / wealth / academic / other
        #[arg(long, default_value = "other")]
        purpose: String,
        /// all / weekend_only / workday_only
        #[arg(long, default_value = "all")]
        weekend: String,
        /// 排除日期，逗号分隔
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        /// 推荐数量 (3-20)
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[derive(Serialize)]
struct ChartOutput<'a> {
    analysis: &'a bazi_fortune::ChartAnalysis,
    decade: bazi_fortune::engine::DecadeCycle,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display())),
        None => EngineConfig::load_from_env().context("加载环境变量配置失败"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let config = load_config(cli.config.as_ref())?;
    let api = FortuneApi::new(config)?;

    match cli.command {
        Commands::Chart { birth } => {
            let (analysis, profile) = api.profile_from_input(&birth.to_input())?;
            print_json(&ChartOutput {
                analysis: &analysis,
                decade: profile.decade,
            })?;
        }

        Commands::Fortune { birth, target } => {
            let report = api.fortune_from_input(&birth.to_input(), &target)?;
            print_json(&report)?;
        }

        Commands::Pick {
            birth,
            start,
            days,
            purpose,
            weekend,
            exclude,
            top,
        } => {
            let (_, profile) = api.profile_from_input(&birth.to_input())?;
            let start: NaiveDate = match start {
                Some(raw) => validator::parse_date("起始日期", &raw)?,
                None => Local::now().date_naive(),
            };

            let mut request = DateRequest::new(start, validator::parse_purpose(&purpose));
            request.range_days = days;
            request.top_n = top;
            request.weekend_policy = validator::parse_weekend_policy(&weekend)?;
            request.excluded = exclude
                .iter()
                .map(|raw| validator::parse_date("排除日期", raw))
                .collect::<Result<_, _>>()?;

            let result = api.recommend_dates(&profile, &request)?;
            print_json(&result)?;
        }
    }

    Ok(())
}
