// ==========================================
// 八字运势引擎 - 领域类型定义
// ==========================================
// 五行 / 阴阳 / 天干 / 地支 / 十神 / 旺衰等级 / 运势维度
// 红线: 全部为封闭枚举,查表函数必须是全函数(不返回 Option)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 五行 (Element)
// ==========================================
// 相生: 木→火→土→金→水→木
// 相克: 木→土→水→火→金→木
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "木")]
    Wood,
    #[serde(rename = "火")]
    Fire,
    #[serde(rename = "土")]
    Earth,
    #[serde(rename = "金")]
    Metal,
    #[serde(rename = "水")]
    Water,
}

/// 两个五行之间的关系（以 self 为"我"）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRelation {
    Same,         // 同我
    Generates,    // 我生
    GeneratedBy,  // 生我
    Restrains,    // 我克
    RestrainedBy, // 克我
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    /// 我生
    pub fn generates(self) -> Element {
        Element::ALL[(self.index() + 1) % 5]
    }

    /// 生我
    pub fn generated_by(self) -> Element {
        Element::ALL[(self.index() + 4) % 5]
    }

    /// 我克
    pub fn restrains(self) -> Element {
        Element::ALL[(self.index() + 2) % 5]
    }

    /// 克我
    pub fn restrained_by(self) -> Element {
        Element::ALL[(self.index() + 3) % 5]
    }

    /// 判定 self 与 other 的生克关系
    pub fn relation_to(self, other: Element) -> ElementRelation {
        if self == other {
            ElementRelation::Same
        } else if self.generates() == other {
            ElementRelation::Generates
        } else if other.generates() == self {
            ElementRelation::GeneratedBy
        } else if self.restrains() == other {
            ElementRelation::Restrains
        } else {
            ElementRelation::RestrainedBy
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "木" | "wood" => Ok(Element::Wood),
            "火" | "fire" => Ok(Element::Fire),
            "土" | "earth" => Ok(Element::Earth),
            "金" | "metal" => Ok(Element::Metal),
            "水" | "water" => Ok(Element::Water),
            other => Err(format!("未知五行: {}", other)),
        }
    }
}

// ==========================================
// 阴阳 (Polarity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    #[serde(rename = "阳")]
    Yang,
    #[serde(rename = "阴")]
    Yin,
}

// ==========================================
// 天干 (Stem)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stem {
    #[serde(rename = "甲")]
    Jia,
    #[serde(rename = "乙")]
    Yi,
    #[serde(rename = "丙")]
    Bing,
    #[serde(rename = "丁")]
    Ding,
    #[serde(rename = "戊")]
    Wu,
    #[serde(rename = "己")]
    Ji,
    #[serde(rename = "庚")]
    Geng,
    #[serde(rename = "辛")]
    Xin,
    #[serde(rename = "壬")]
    Ren,
    #[serde(rename = "癸")]
    Gui,
}

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 按索引取天干，索引按 10 取模（支持负数）
    pub fn from_index(index: i64) -> Stem {
        Stem::ALL[index.rem_euclid(10) as usize]
    }

    pub fn symbol(self) -> &'static str {
        const SYMBOLS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
        SYMBOLS[self.index()]
    }

    /// 甲乙木 丙丁火 戊己土 庚辛金 壬癸水
    pub fn element(self) -> Element {
        Element::ALL[self.index() / 2]
    }

    pub fn polarity(self) -> Polarity {
        if self.index() % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Stem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Stem::ALL
            .iter()
            .copied()
            .find(|stem| stem.symbol() == s)
            .ok_or_else(|| format!("未知天干: {}", s))
    }
}

// ==========================================
// 地支 (Branch)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "子")]
    Zi,
    #[serde(rename = "丑")]
    Chou,
    #[serde(rename = "寅")]
    Yin,
    #[serde(rename = "卯")]
    Mao,
    #[serde(rename = "辰")]
    Chen,
    #[serde(rename = "巳")]
    Si,
    #[serde(rename = "午")]
    Wu,
    #[serde(rename = "未")]
    Wei,
    #[serde(rename = "申")]
    Shen,
    #[serde(rename = "酉")]
    You,
    #[serde(rename = "戌")]
    Xu,
    #[serde(rename = "亥")]
    Hai,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 按索引取地支，索引按 12 取模（支持负数）
    pub fn from_index(index: i64) -> Branch {
        Branch::ALL[index.rem_euclid(12) as usize]
    }

    pub fn symbol(self) -> &'static str {
        const SYMBOLS: [&str; 12] = [
            "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
        ];
        SYMBOLS[self.index()]
    }

    /// 地支本五行: 寅卯木 巳午火 申酉金 亥子水 辰戌丑未土
    pub fn element(self) -> Element {
        match self {
            Branch::Yin | Branch::Mao => Element::Wood,
            Branch::Si | Branch::Wu => Element::Fire,
            Branch::Shen | Branch::You => Element::Metal,
            Branch::Hai | Branch::Zi => Element::Water,
            Branch::Chen | Branch::Xu | Branch::Chou | Branch::Wei => Element::Earth,
        }
    }

    pub fn polarity(self) -> Polarity {
        if self.index() % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Branch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Branch::ALL
            .iter()
            .copied()
            .find(|branch| branch.symbol() == s)
            .ok_or_else(|| format!("未知地支: {}", s))
    }
}

// ==========================================
// 十神 (Ten God)
// ==========================================
// 由日主与目标天干的五行生克 + 阴阳异同决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenGod {
    #[serde(rename = "比肩")]
    Companion,
    #[serde(rename = "劫财")]
    RobWealth,
    #[serde(rename = "食神")]
    EatingGod,
    #[serde(rename = "伤官")]
    HurtingOfficer,
    #[serde(rename = "偏财")]
    IndirectWealth,
    #[serde(rename = "正财")]
    DirectWealth,
    #[serde(rename = "七杀")]
    SevenKillings,
    #[serde(rename = "正官")]
    DirectOfficer,
    #[serde(rename = "偏印")]
    IndirectResource,
    #[serde(rename = "正印")]
    DirectResource,
}

impl TenGod {
    pub const ALL: [TenGod; 10] = [
        TenGod::Companion,
        TenGod::RobWealth,
        TenGod::EatingGod,
        TenGod::HurtingOfficer,
        TenGod::IndirectWealth,
        TenGod::DirectWealth,
        TenGod::SevenKillings,
        TenGod::DirectOfficer,
        TenGod::IndirectResource,
        TenGod::DirectResource,
    ];

    /// 计算 other 相对日主 day_master 的十神
    pub fn between(day_master: Stem, other: Stem) -> TenGod {
        let same_polarity = day_master.polarity() == other.polarity();
        match day_master.element().relation_to(other.element()) {
            ElementRelation::Same if same_polarity => TenGod::Companion,
            ElementRelation::Same => TenGod::RobWealth,
            ElementRelation::Generates if same_polarity => TenGod::EatingGod,
            ElementRelation::Generates => TenGod::HurtingOfficer,
            ElementRelation::Restrains if same_polarity => TenGod::IndirectWealth,
            ElementRelation::Restrains => TenGod::DirectWealth,
            ElementRelation::RestrainedBy if same_polarity => TenGod::SevenKillings,
            ElementRelation::RestrainedBy => TenGod::DirectOfficer,
            ElementRelation::GeneratedBy if same_polarity => TenGod::IndirectResource,
            ElementRelation::GeneratedBy => TenGod::DirectResource,
        }
    }

    pub fn name_cn(self) -> &'static str {
        match self {
            TenGod::Companion => "比肩",
            TenGod::RobWealth => "劫财",
            TenGod::EatingGod => "食神",
            TenGod::HurtingOfficer => "伤官",
            TenGod::IndirectWealth => "偏财",
            TenGod::DirectWealth => "正财",
            TenGod::SevenKillings => "七杀",
            TenGod::DirectOfficer => "正官",
            TenGod::IndirectResource => "偏印",
            TenGod::DirectResource => "正印",
        }
    }
}

impl fmt::Display for TenGod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name_cn())
    }
}

// ==========================================
// 旺衰等级 (Strength Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrengthLevel {
    Strong,  // 身旺
    Neutral, // 中和
    Weak,    // 身弱
}

impl StrengthLevel {
    pub fn is_weak(self) -> bool {
        matches!(self, StrengthLevel::Weak)
    }

    pub fn label_cn(self) -> &'static str {
        match self {
            StrengthLevel::Strong => "身旺",
            StrengthLevel::Neutral => "中和",
            StrengthLevel::Weak => "身弱",
        }
    }
}

impl fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrengthLevel::Strong => write!(f, "STRONG"),
            StrengthLevel::Neutral => write!(f, "NEUTRAL"),
            StrengthLevel::Weak => write!(f, "WEAK"),
        }
    }
}

// ==========================================
// 性别 (Gender)
// ==========================================
// 仅影响大运顺逆与感情维度的核心十神
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "男" | "1" => Ok(Gender::Male),
            "female" | "f" | "女" | "2" => Ok(Gender::Female),
            other => Err(format!("未知性别: {}", other)),
        }
    }
}

// ==========================================
// 运势维度 (Dimension)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Career,
    Wealth,
    Romance,
    Health,
    Study,
    Travel,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Career,
        Dimension::Wealth,
        Dimension::Romance,
        Dimension::Health,
        Dimension::Study,
        Dimension::Travel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Career => "career",
            Dimension::Wealth => "wealth",
            Dimension::Romance => "romance",
            Dimension::Health => "health",
            Dimension::Study => "study",
            Dimension::Travel => "travel",
        }
    }

    pub fn label_cn(self) -> &'static str {
        match self {
            Dimension::Career => "事业",
            Dimension::Wealth => "财运",
            Dimension::Romance => "感情",
            Dimension::Health => "健康",
            Dimension::Study => "学业",
            Dimension::Travel => "出行",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_cycles() {
        assert_eq!(Element::Wood.generates(), Element::Fire);
        assert_eq!(Element::Water.generates(), Element::Wood);
        assert_eq!(Element::Wood.restrains(), Element::Earth);
        assert_eq!(Element::Fire.restrains(), Element::Metal);
        assert_eq!(Element::Wood.restrained_by(), Element::Metal);
        assert_eq!(Element::Wood.generated_by(), Element::Water);
    }

    #[test]
    fn test_element_relation_is_total() {
        for a in Element::ALL {
            for b in Element::ALL {
                let rel = a.relation_to(b);
                let reverse = b.relation_to(a);
                match rel {
                    ElementRelation::Same => assert_eq!(reverse, ElementRelation::Same),
                    ElementRelation::Generates => assert_eq!(reverse, ElementRelation::GeneratedBy),
                    ElementRelation::GeneratedBy => assert_eq!(reverse, ElementRelation::Generates),
                    ElementRelation::Restrains => assert_eq!(reverse, ElementRelation::RestrainedBy),
                    ElementRelation::RestrainedBy => assert_eq!(reverse, ElementRelation::Restrains),
                }
            }
        }
    }

    #[test]
    fn test_stem_and_branch_elements() {
        assert_eq!(Stem::Jia.element(), Element::Wood);
        assert_eq!(Stem::Gui.element(), Element::Water);
        assert_eq!(Stem::Geng.polarity(), Polarity::Yang);
        assert_eq!(Stem::Xin.polarity(), Polarity::Yin);
        assert_eq!(Branch::Shen.element(), Element::Metal);
        assert_eq!(Branch::Chou.element(), Element::Earth);
        assert_eq!(Stem::from_index(-1), Stem::Gui);
        assert_eq!(Branch::from_index(13), Branch::Chou);
    }

    #[test]
    fn test_symbol_parsing() {
        assert_eq!("丙".parse::<Stem>().unwrap(), Stem::Bing);
        assert_eq!("午".parse::<Branch>().unwrap(), Branch::Wu);
        assert_eq!("water".parse::<Element>().unwrap(), Element::Water);
        assert!("X".parse::<Stem>().is_err());
    }

    #[test]
    fn test_ten_god_by_element_and_polarity() {
        // 甲木日主
        assert_eq!(TenGod::between(Stem::Jia, Stem::Jia), TenGod::Companion);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Yi), TenGod::RobWealth);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Bing), TenGod::EatingGod);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Ding), TenGod::HurtingOfficer);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Wu), TenGod::IndirectWealth);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Ji), TenGod::DirectWealth);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Geng), TenGod::SevenKillings);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Xin), TenGod::DirectOfficer);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Ren), TenGod::IndirectResource);
        assert_eq!(TenGod::between(Stem::Jia, Stem::Gui), TenGod::DirectResource);

        // 阴干日主：乙见甲为劫财，不是按索引差推出的正印
        assert_eq!(TenGod::between(Stem::Yi, Stem::Jia), TenGod::RobWealth);
        assert_eq!(TenGod::between(Stem::Yi, Stem::Geng), TenGod::DirectOfficer);
    }

    #[test]
    fn test_serde_symbols() {
        let json = serde_json::to_string(&Stem::Jia).unwrap();
        assert_eq!(json, "\"甲\"");
        let element: Element = serde_json::from_str("\"火\"").unwrap();
        assert_eq!(element, Element::Fire);
    }
}
