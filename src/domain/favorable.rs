// ==========================================
// 八字运势引擎 - 喜用神集合
// ==========================================
// favorable: 0~2 个喜用神 (第一个为主用神)
// supportive: 生喜用神者; unfavorable: 克喜用神者 (两者互斥)
// 红线: 克日主的五行不得入喜用; 日主本五行仅在唯一候选时保留
// ==========================================

use crate::domain::types::{Element, StrengthLevel};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 推导层级 (Tier)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FavorableTier {
    Climate,  // 调候
    Mediator, // 通关
    Balance,  // 扶抑
}

impl FavorableTier {
    /// 优先级（越大越优先）
    pub fn priority(self) -> u8 {
        match self {
            FavorableTier::Climate => 100,
            FavorableTier::Mediator => 80,
            FavorableTier::Balance => 60,
        }
    }

    pub fn label_cn(self) -> &'static str {
        match self {
            FavorableTier::Climate => "调候",
            FavorableTier::Mediator => "通关",
            FavorableTier::Balance => "扶抑",
        }
    }
}

impl fmt::Display for FavorableTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label_cn())
    }
}

/// 候选喜用神及其来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavorableCandidate {
    pub element: Element,
    pub tier: FavorableTier,
    pub priority: u8,
    pub reason: String,
}

// ==========================================
// 五行对某命局的归类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementClass {
    Primary,     // 主用神
    Supportive,  // 次喜 (含第二喜用神)
    Unfavorable, // 忌神
    Neutral,     // 闲神
}

// ==========================================
// FavorableElementSet
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavorableElementSet {
    pub favorable: Vec<Element>,
    pub supportive: Vec<Element>,
    pub unfavorable: Vec<Element>,
    pub strength_level: StrengthLevel,
    /// 被采纳的候选来源（自定义时为空）
    pub candidates: Vec<FavorableCandidate>,
    /// 是否为用户自定义
    pub custom: bool,
}

impl FavorableElementSet {
    /// 由已确定的喜用神推出次喜/忌神
    pub fn from_favorable(
        favorable: Vec<Element>,
        strength_level: StrengthLevel,
        candidates: Vec<FavorableCandidate>,
    ) -> Self {
        let (supportive, unfavorable) = derive_secondary(&favorable);
        Self {
            favorable,
            supportive,
            unfavorable,
            strength_level,
            candidates,
            custom: false,
        }
    }

    /// 用户自定义喜用神（去重，最多保留 2 个，不做层级校验）
    pub fn custom(elements: &[Element], strength_level: StrengthLevel) -> Self {
        let mut favorable: Vec<Element> = Vec::with_capacity(2);
        for &element in elements {
            if favorable.len() == 2 {
                break;
            }
            if !favorable.contains(&element) {
                favorable.push(element);
            }
        }
        let mut set = Self::from_favorable(favorable, strength_level, Vec::new());
        set.custom = true;
        set
    }

    pub fn primary(&self) -> Option<Element> {
        self.favorable.first().copied()
    }

    pub fn is_favorable(&self, element: Element) -> bool {
        self.favorable.contains(&element)
    }

    pub fn is_unfavorable(&self, element: Element) -> bool {
        self.unfavorable.contains(&element)
    }

    /// 五行归类: 主用神 > 次喜 > 忌神 > 闲神
    pub fn classify(&self, element: Element) -> ElementClass {
        if self.primary() == Some(element) {
            ElementClass::Primary
        } else if self.favorable.contains(&element) || self.supportive.contains(&element) {
            ElementClass::Supportive
        } else if self.unfavorable.contains(&element) {
            ElementClass::Unfavorable
        } else {
            ElementClass::Neutral
        }
    }
}

/// 次喜: 非喜用且生某喜用神; 忌神: 非喜用、非次喜且克某喜用神
fn derive_secondary(favorable: &[Element]) -> (Vec<Element>, Vec<Element>) {
    let mut supportive = Vec::new();
    let mut unfavorable = Vec::new();
    for element in Element::ALL {
        if favorable.contains(&element) {
            continue;
        }
        if favorable.iter().any(|&f| element.generates() == f) {
            supportive.push(element);
        } else if favorable.iter().any(|&f| element.restrains() == f) {
            unfavorable.push(element);
        }
    }
    (supportive, unfavorable)
}
