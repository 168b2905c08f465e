// ==========================================
// 八字运势引擎 - 规则表
// ==========================================
// 月令 / 藏干 / 六冲 / 六合 / 三合 / 五虎遁 / 五鼠遁 / 调候 / 神煞
// 红线: 规则表以 Arc<RuleTables> 注入各引擎,不使用全局静态查表
// ==========================================

use crate::domain::types::{Branch, Dimension, Element, Stem};

/// 藏干层级权重顺序: 本气 > 中气 > 余气
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QiLayer {
    Primary,   // 本气
    Secondary, // 中气
    Residual,  // 余气
}

impl QiLayer {
    pub fn from_position(position: usize) -> QiLayer {
        match position {
            0 => QiLayer::Primary,
            1 => QiLayer::Secondary,
            _ => QiLayer::Residual,
        }
    }

    pub fn label_cn(self) -> &'static str {
        match self {
            QiLayer::Primary => "本气",
            QiLayer::Secondary => "中气",
            QiLayer::Residual => "余气",
        }
    }
}

/// 三合局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triad {
    pub members: [Branch; 3],
    pub element: Element,
}

/// 调候规则: 月支 → 所需五行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimateRule {
    pub element: Element,
    pub reason: &'static str,
}

/// 神煞触发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerTrigger {
    /// 以日干查: 日干 → 流日地支集合
    ByDayStem(&'static [(Stem, &'static [Branch])]),
    /// 以年支/日支所在的三支组查: 组 → 流日地支
    ByBranchGroup(&'static [([Branch; 3], Branch)]),
}

/// 神煞规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerRule {
    pub key: &'static str,
    pub name_cn: &'static str,
    pub score: i32,
    pub trigger: MarkerTrigger,
    pub dimension_boosts: &'static [(Dimension, i32)],
    pub desc: &'static str,
}

impl MarkerRule {
    pub fn is_auspicious(&self) -> bool {
        self.score > 0
    }
}

// ==========================================
// RuleTables - 规则表集合
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleTables {
    /// 月令司令五行（按地支索引）
    pub month_ruling: [Element; 12],
    /// 地支藏干（本气/中气/余气）
    pub hidden_stems: [&'static [Stem]; 12],
    /// 六冲对支
    pub clash: [Branch; 12],
    /// 六合对支
    pub harmony: [Branch; 12],
    /// 三合局
    pub triads: Vec<Triad>,
    /// 五虎遁: 年干 (索引 % 5) → 寅月月干
    pub month_stem_start: [Stem; 5],
    /// 五鼠遁: 日干 (索引 % 5) → 子时时干
    pub hour_stem_start: [Stem; 5],
    /// 调候表（按地支索引）
    pub climate: [Option<ClimateRule>; 12],
    /// 神煞表
    pub markers: Vec<MarkerRule>,
}

impl RuleTables {
    /// 标准规则表
    pub fn standard() -> Self {
        use Branch::*;
        use Element::*;

        Self {
            month_ruling: [
                Water, Earth, Wood, Wood, Earth, Fire, Fire, Earth, Metal, Metal, Earth, Water,
            ],
            hidden_stems: STANDARD_HIDDEN_STEMS,
            clash: [Wu, Wei, Shen, You, Xu, Hai, Zi, Chou, Yin, Mao, Chen, Si],
            harmony: [Chou, Zi, Hai, Xu, You, Shen, Wei, Wu, Si, Chen, Mao, Yin],
            triads: vec![
                Triad { members: [Shen, Zi, Chen], element: Water },
                Triad { members: [Hai, Mao, Wei], element: Wood },
                Triad { members: [Yin, Wu, Xu], element: Fire },
                Triad { members: [Si, You, Chou], element: Metal },
            ],
            // 甲己→丙 乙庚→戊 丙辛→庚 丁壬→壬 戊癸→甲
            month_stem_start: [Stem::Bing, Stem::Wu, Stem::Geng, Stem::Ren, Stem::Jia],
            // 甲己→甲 乙庚→丙 丙辛→戊 丁壬→庚 戊癸→壬
            hour_stem_start: [Stem::Jia, Stem::Bing, Stem::Wu, Stem::Geng, Stem::Ren],
            climate: STANDARD_CLIMATE,
            markers: STANDARD_MARKERS.to_vec(),
        }
    }

    pub fn month_ruling_element(&self, branch: Branch) -> Element {
        self.month_ruling[branch.index()]
    }

    pub fn hidden_stems(&self, branch: Branch) -> &'static [Stem] {
        self.hidden_stems[branch.index()]
    }

    pub fn clashes(&self, a: Branch, b: Branch) -> bool {
        self.clash[a.index()] == b
    }

    pub fn harmonizes(&self, a: Branch, b: Branch) -> bool {
        self.harmony[a.index()] == b
    }

    pub fn climate_rule(&self, month_branch: Branch) -> Option<ClimateRule> {
        self.climate[month_branch.index()]
    }

    pub fn month_stem_start(&self, year_stem: Stem) -> Stem {
        self.month_stem_start[year_stem.index() % 5]
    }

    pub fn hour_stem_start(&self, day_stem: Stem) -> Stem {
        self.hour_stem_start[day_stem.index() % 5]
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::standard()
    }
}

// ==========================================
// 标准数据
// ==========================================

const STANDARD_HIDDEN_STEMS: [&[Stem]; 12] = [
    &[Stem::Gui],                       // 子
    &[Stem::Ji, Stem::Gui, Stem::Xin],  // 丑
    &[Stem::Jia, Stem::Bing, Stem::Wu], // 寅
    &[Stem::Yi],                        // 卯
    &[Stem::Wu, Stem::Yi, Stem::Gui],   // 辰
    &[Stem::Bing, Stem::Geng, Stem::Wu], // 巳
    &[Stem::Ding, Stem::Ji],            // 午
    &[Stem::Ji, Stem::Ding, Stem::Yi],  // 未
    &[Stem::Geng, Stem::Ren, Stem::Wu], // 申
    &[Stem::Xin],                       // 酉
    &[Stem::Wu, Stem::Xin, Stem::Ding], // 戌
    &[Stem::Ren, Stem::Jia],            // 亥
];

const fn climate(element: Element, reason: &'static str) -> Option<ClimateRule> {
    Some(ClimateRule { element, reason })
}

const STANDARD_CLIMATE: [Option<ClimateRule>; 12] = [
    climate(Element::Fire, "寒冬需暖"),  // 子
    climate(Element::Fire, "寒冬需暖"),  // 丑
    climate(Element::Fire, "初春仍寒"),  // 寅
    climate(Element::Water, "仲春需润"), // 卯
    climate(Element::Fire, "湿土需燥"),  // 辰
    climate(Element::Water, "初夏渐热"), // 巳
    climate(Element::Water, "炎夏需润"), // 午
    climate(Element::Water, "暑热需润"), // 未
    climate(Element::Fire, "金寒需暖"),  // 申
    climate(Element::Fire, "金寒需暖"),  // 酉
    climate(Element::Water, "燥土需湿"), // 戌
    climate(Element::Fire, "寒冬需暖"),  // 亥
];

use Branch as B;

const SAN_HE_GROUPS: [[Branch; 3]; 4] = [
    [B::Shen, B::Zi, B::Chen],
    [B::Yin, B::Wu, B::Xu],
    [B::Si, B::You, B::Chou],
    [B::Hai, B::Mao, B::Wei],
];

const SAN_HUI_GROUPS: [[Branch; 3]; 4] = [
    [B::Hai, B::Zi, B::Chou],
    [B::Yin, B::Mao, B::Chen],
    [B::Si, B::Wu, B::Wei],
    [B::Shen, B::You, B::Xu],
];

const STANDARD_MARKERS: [MarkerRule; 9] = [
    MarkerRule {
        key: "tianyi_guiren",
        name_cn: "天乙贵人",
        score: 8,
        trigger: MarkerTrigger::ByDayStem(&[
            (Stem::Jia, &[B::Chou, B::Wei]),
            (Stem::Wu, &[B::Chou, B::Wei]),
            (Stem::Geng, &[B::Chou, B::Wei]),
            (Stem::Yi, &[B::Zi, B::Shen]),
            (Stem::Ji, &[B::Zi, B::Shen]),
            (Stem::Bing, &[B::Hai, B::You]),
            (Stem::Ding, &[B::Hai, B::You]),
            (Stem::Xin, &[B::Yin, B::Wu]),
            (Stem::Ren, &[B::Mao, B::Si]),
            (Stem::Gui, &[B::Mao, B::Si]),
        ]),
        dimension_boosts: &[],
        desc: "遇难呈祥，化险为夷",
    },
    MarkerRule {
        key: "wenchang",
        name_cn: "文昌贵人",
        score: 8,
        trigger: MarkerTrigger::ByDayStem(&[
            (Stem::Jia, &[B::Si]),
            (Stem::Yi, &[B::Wu]),
            (Stem::Bing, &[B::Shen]),
            (Stem::Ding, &[B::You]),
            (Stem::Wu, &[B::Shen]),
            (Stem::Ji, &[B::You]),
            (Stem::Geng, &[B::Hai]),
            (Stem::Xin, &[B::Zi]),
            (Stem::Ren, &[B::Yin]),
            (Stem::Gui, &[B::Mao]),
        ]),
        dimension_boosts: &[],
        desc: "聪明才智，学业有成",
    },
    MarkerRule {
        key: "yangren",
        name_cn: "羊刃",
        score: -8,
        trigger: MarkerTrigger::ByDayStem(&[
            (Stem::Jia, &[B::Mao]),
            (Stem::Yi, &[B::Chen]),
            (Stem::Bing, &[B::Wu]),
            (Stem::Ding, &[B::Wei]),
            (Stem::Wu, &[B::Wu]),
            (Stem::Ji, &[B::Wei]),
            (Stem::Geng, &[B::You]),
            (Stem::Xin, &[B::Xu]),
            (Stem::Ren, &[B::Zi]),
            (Stem::Gui, &[B::Chou]),
        ]),
        dimension_boosts: &[(Dimension::Career, 3)],
        desc: "刚烈冲动，易有血光",
    },
    MarkerRule {
        key: "taohua",
        name_cn: "咸池桃花",
        score: 5,
        trigger: MarkerTrigger::ByBranchGroup(&[
            (SAN_HE_GROUPS[0], B::You),
            (SAN_HE_GROUPS[1], B::Mao),
            (SAN_HE_GROUPS[2], B::Wu),
            (SAN_HE_GROUPS[3], B::Zi),
        ]),
        dimension_boosts: &[(Dimension::Romance, 10)],
        desc: "人缘魅力，情感机遇",
    },
    MarkerRule {
        key: "yima",
        name_cn: "驿马",
        score: 3,
        trigger: MarkerTrigger::ByBranchGroup(&[
            (SAN_HE_GROUPS[0], B::Yin),
            (SAN_HE_GROUPS[1], B::Shen),
            (SAN_HE_GROUPS[2], B::Hai),
            (SAN_HE_GROUPS[3], B::Si),
        ]),
        dimension_boosts: &[(Dimension::Travel, 15)],
        desc: "奔走动荡，变动出行",
    },
    MarkerRule {
        key: "jiesha",
        name_cn: "劫煞",
        score: -6,
        trigger: MarkerTrigger::ByBranchGroup(&[
            (SAN_HE_GROUPS[0], B::Si),
            (SAN_HE_GROUPS[1], B::Hai),
            (SAN_HE_GROUPS[2], B::Yin),
            (SAN_HE_GROUPS[3], B::Shen),
        ]),
        dimension_boosts: &[],
        desc: "破耗损失，小心财物",
    },
    MarkerRule {
        key: "zaisha",
        name_cn: "灾煞",
        score: -5,
        trigger: MarkerTrigger::ByBranchGroup(&[
            (SAN_HE_GROUPS[0], B::Wu),
            (SAN_HE_GROUPS[1], B::Zi),
            (SAN_HE_GROUPS[2], B::Mao),
            (SAN_HE_GROUPS[3], B::You),
        ]),
        dimension_boosts: &[],
        desc: "疾病灾祸，注意安全",
    },
    MarkerRule {
        key: "guchen",
        name_cn: "孤辰",
        score: -4,
        trigger: MarkerTrigger::ByBranchGroup(&[
            (SAN_HUI_GROUPS[0], B::Yin),
            (SAN_HUI_GROUPS[1], B::Si),
            (SAN_HUI_GROUPS[2], B::Shen),
            (SAN_HUI_GROUPS[3], B::Hai),
        ]),
        dimension_boosts: &[],
        desc: "孤独寂寞，六亲缘薄",
    },
    MarkerRule {
        key: "guasu",
        name_cn: "寡宿",
        score: -4,
        trigger: MarkerTrigger::ByBranchGroup(&[
            (SAN_HUI_GROUPS[0], B::Xu),
            (SAN_HUI_GROUPS[1], B::Chou),
            (SAN_HUI_GROUPS[2], B::Chen),
            (SAN_HUI_GROUPS[3], B::Wei),
        ]),
        dimension_boosts: &[],
        desc: "孤独冷清，感情不顺",
    },
];
