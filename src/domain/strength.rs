// ==========================================
// 八字运势引擎 - 日主旺衰结果
// ==========================================
// 五个子维度: 月令 / 通根 / 透干 / 三合 / 冲
// 说明文字仅用于可解释性,不参与控制流
// ==========================================

use crate::domain::types::StrengthLevel;
use serde::{Deserialize, Serialize};

/// 单个子维度得分 (0.0 ~ 1.0) 及判定说明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthComponent {
    pub score: f64,
    pub reason: String,
}

impl StrengthComponent {
    pub fn new(score: f64, reason: impl Into<String>) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthBreakdown {
    /// 得令
    pub month_command: StrengthComponent,
    /// 得地（通根）
    pub rootedness: StrengthComponent,
    /// 得势（透干帮扶）
    pub exposed_support: StrengthComponent,
    /// 三合局
    pub combination: StrengthComponent,
    /// 六冲
    pub clash: StrengthComponent,
}

impl StrengthBreakdown {
    /// 按固定顺序返回子维度得分
    pub fn scores(&self) -> [f64; 5] {
        [
            self.month_command.score,
            self.rootedness.score,
            self.exposed_support.score,
            self.combination.score,
            self.clash.score,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthResult {
    /// 加权总分 (0.0 ~ 1.0)
    pub score: f64,
    pub level: StrengthLevel,
    pub breakdown: StrengthBreakdown,
}

impl StrengthResult {
    /// 汇总说明，如 "身旺(0.72): 日主得令; ..."
    pub fn summary(&self) -> String {
        let b = &self.breakdown;
        format!(
            "{}({:.2}): {}; {}; {}; {}; {}",
            self.level.label_cn(),
            self.score,
            b.month_command.reason,
            b.rootedness.reason,
            b.exposed_support.reason,
            b.combination.reason,
            b.clash.reason
        )
    }
}
