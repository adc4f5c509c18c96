//! Character sheet data model.
//!
//! Plain serde-friendly records: ability scores with their modifier
//! breakdowns, equipment, skills, vitals, spells, and the roll
//! history. Derived fields (`total`, `modifier`, AC, max HP and so on)
//! are recomputed by the [`crate::stats`] functions; the types here
//! only hold the data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::stats::ability_modifier;

/// The six ability identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }

    /// Parse an abbreviation or full name, case-insensitive.
    pub fn from_name(name: &str) -> Option<Ability> {
        match name.trim().to_ascii_uppercase().as_str() {
            "STR" | "STRENGTH" => Some(Ability::Strength),
            "DEX" | "DEXTERITY" => Some(Ability::Dexterity),
            "CON" | "CONSTITUTION" => Some(Ability::Constitution),
            "INT" | "INTELLIGENCE" => Some(Ability::Intelligence),
            "WIS" | "WISDOM" => Some(Ability::Wisdom),
            "CHA" | "CHARISMA" => Some(Ability::Charisma),
            _ => None,
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a [`StatModifier`] applies to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Added to the base score.
    Bonus,
    /// Proposes a replacement total; the highest override wins and
    /// never lowers a total already reached by bonuses.
    Override,
}

/// Error from parsing a user-entered modifier value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModifierParseError {
    #[error("modifier value {0:?} is not a number")]
    NotANumber(String),
}

/// One contribution to an ability score, from an item or manual entry.
///
/// Item-derived modifiers carry a deterministic id built from the item
/// id, so recalculation reproduces the same breakdown byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifier {
    pub id: String,
    /// Display label, e.g. the contributing item's name.
    pub source: String,
    pub value: i32,
    pub kind: ModifierKind,
}

impl StatModifier {
    pub fn bonus(source: impl Into<String>, value: i32) -> Self {
        StatModifier {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            value,
            kind: ModifierKind::Bonus,
        }
    }

    pub fn override_to(source: impl Into<String>, value: i32) -> Self {
        StatModifier {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            value,
            kind: ModifierKind::Override,
        }
    }

    /// Build a modifier from a raw user-entered value string. The value
    /// must parse as an integer; anything else is rejected rather than
    /// coerced to zero.
    pub fn from_input(
        source: impl Into<String>,
        raw_value: &str,
        kind: ModifierKind,
    ) -> Result<Self, ModifierParseError> {
        let value: i32 = raw_value
            .trim()
            .parse()
            .map_err(|_| ModifierParseError::NotANumber(raw_value.to_string()))?;
        Ok(StatModifier {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            value,
            kind,
        })
    }
}

/// One ability score with its derived values.
///
/// `total`, `modifier`, and `breakdown` are derived and rewritten by
/// recalculation whenever `base`, `manual_modifiers`, or the equipped
/// items change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub base: i32,
    pub total: i32,
    pub modifier: i32,
    #[serde(default)]
    pub save_proficiency: bool,
    #[serde(default)]
    pub manual_modifiers: Vec<StatModifier>,
    #[serde(default)]
    pub breakdown: Vec<StatModifier>,
}

impl AbilityScore {
    pub fn new(base: i32) -> Self {
        AbilityScore {
            base,
            total: base,
            modifier: ability_modifier(base),
            save_proficiency: false,
            manual_modifiers: Vec::new(),
            breakdown: Vec::new(),
        }
    }
}

impl Default for AbilityScore {
    fn default() -> Self {
        AbilityScore::new(10)
    }
}

/// The six ability scores of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScoreSet {
    pub strength: AbilityScore,
    pub dexterity: AbilityScore,
    pub constitution: AbilityScore,
    pub intelligence: AbilityScore,
    pub wisdom: AbilityScore,
    pub charisma: AbilityScore,
}

impl AbilityScoreSet {
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        AbilityScoreSet {
            strength: AbilityScore::new(strength),
            dexterity: AbilityScore::new(dexterity),
            constitution: AbilityScore::new(constitution),
            intelligence: AbilityScore::new(intelligence),
            wisdom: AbilityScore::new(wisdom),
            charisma: AbilityScore::new(charisma),
        }
    }

    pub fn get(&self, ability: Ability) -> &AbilityScore {
        match ability {
            Ability::Strength => &self.strength,
            Ability::Dexterity => &self.dexterity,
            Ability::Constitution => &self.constitution,
            Ability::Intelligence => &self.intelligence,
            Ability::Wisdom => &self.wisdom,
            Ability::Charisma => &self.charisma,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut AbilityScore {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }
}

impl Default for AbilityScoreSet {
    fn default() -> Self {
        AbilityScoreSet::new(10, 10, 10, 10, 10, 10)
    }
}

/// Body armor and shield categories, classified from item type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
    Shield,
}

impl ArmorCategory {
    /// Classify an item type code such as `"HA"` or `"la|xphb"`. Only
    /// the segment before `'|'` matters, case-insensitive.
    pub fn from_code(code: &str) -> Option<ArmorCategory> {
        let clean = code.split('|').next().unwrap_or(code).trim();
        match clean.to_ascii_uppercase().as_str() {
            "LA" => Some(ArmorCategory::Light),
            "MA" => Some(ArmorCategory::Medium),
            "HA" => Some(ArmorCategory::Heavy),
            "S" => Some(ArmorCategory::Shield),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArmorCategory::Light => "Light",
            ArmorCategory::Medium => "Medium",
            ArmorCategory::Heavy => "Heavy",
            ArmorCategory::Shield => "Shield",
        }
    }
}

/// An inventory entry.
///
/// The per-ability bonus and override fields are a fixed set, one named
/// field per ability, read through [`Item::ability_bonus`] and
/// [`Item::ability_override`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub equipped: bool,
    #[serde(default)]
    pub req_attune: bool,
    #[serde(default)]
    pub is_attuned: bool,
    /// Armor class code, e.g. `"HA"` or `"LA|XPHB"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac: Option<i32>,
    /// Flat AC bonus granted while the item is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_ac: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_str: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_dex: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_con: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_int: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_wis: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_cha: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_str: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_dex: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_con: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_int: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_wis: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_cha: Option<i32>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Item {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: 1,
            weight: 0.0,
            notes: None,
            equipped: false,
            req_attune: false,
            is_attuned: false,
            armor_type: None,
            ac: None,
            bonus_ac: None,
            bonus_str: None,
            bonus_dex: None,
            bonus_con: None,
            bonus_int: None,
            bonus_wis: None,
            bonus_cha: None,
            override_str: None,
            override_dex: None,
            override_con: None,
            override_int: None,
            override_wis: None,
            override_cha: None,
        }
    }

    /// Construct a piece of armor with a type code and AC value.
    pub fn armor(name: impl Into<String>, code: &str, ac: i32) -> Self {
        let mut item = Item::new(name);
        item.armor_type = Some(code.to_string());
        item.ac = Some(ac);
        item
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_bonus_ac(mut self, bonus: i32) -> Self {
        self.bonus_ac = Some(bonus);
        self
    }

    pub fn with_ability_bonus(mut self, ability: Ability, value: i32) -> Self {
        match ability {
            Ability::Strength => self.bonus_str = Some(value),
            Ability::Dexterity => self.bonus_dex = Some(value),
            Ability::Constitution => self.bonus_con = Some(value),
            Ability::Intelligence => self.bonus_int = Some(value),
            Ability::Wisdom => self.bonus_wis = Some(value),
            Ability::Charisma => self.bonus_cha = Some(value),
        }
        self
    }

    pub fn with_ability_override(mut self, ability: Ability, value: i32) -> Self {
        match ability {
            Ability::Strength => self.override_str = Some(value),
            Ability::Dexterity => self.override_dex = Some(value),
            Ability::Constitution => self.override_con = Some(value),
            Ability::Intelligence => self.override_int = Some(value),
            Ability::Wisdom => self.override_wis = Some(value),
            Ability::Charisma => self.override_cha = Some(value),
        }
        self
    }

    pub fn requires_attunement(mut self) -> Self {
        self.req_attune = true;
        self
    }

    /// Whether the item currently contributes to stats and AC:
    /// equipped, or attuned when it requires attunement.
    pub fn is_active(&self) -> bool {
        self.equipped || (self.req_attune && self.is_attuned)
    }

    pub fn ability_bonus(&self, ability: Ability) -> Option<i32> {
        match ability {
            Ability::Strength => self.bonus_str,
            Ability::Dexterity => self.bonus_dex,
            Ability::Constitution => self.bonus_con,
            Ability::Intelligence => self.bonus_int,
            Ability::Wisdom => self.bonus_wis,
            Ability::Charisma => self.bonus_cha,
        }
    }

    pub fn ability_override(&self, ability: Ability) -> Option<i32> {
        match ability {
            Ability::Strength => self.override_str,
            Ability::Dexterity => self.override_dex,
            Ability::Constitution => self.override_con,
            Ability::Intelligence => self.override_int,
            Ability::Wisdom => self.override_wis,
            Ability::Charisma => self.override_cha,
        }
    }

    pub fn armor_category(&self) -> Option<ArmorCategory> {
        self.armor_type.as_deref().and_then(ArmorCategory::from_code)
    }
}

/// The 18 standard skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub fn name(&self) -> &'static str {
        match self {
            Skill::Acrobatics => "Acrobatics",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Arcana => "Arcana",
            Skill::Athletics => "Athletics",
            Skill::Deception => "Deception",
            Skill::History => "History",
            Skill::Insight => "Insight",
            Skill::Intimidation => "Intimidation",
            Skill::Investigation => "Investigation",
            Skill::Medicine => "Medicine",
            Skill::Nature => "Nature",
            Skill::Perception => "Perception",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
            Skill::Religion => "Religion",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Survival => "Survival",
        }
    }

    /// The ability governing this skill.
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Strength,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Dexterity,
            Skill::Arcana
            | Skill::History
            | Skill::Investigation
            | Skill::Nature
            | Skill::Religion => Ability::Intelligence,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Perception
            | Skill::Survival => Ability::Wisdom,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Charisma
            }
        }
    }

    pub fn all() -> [Skill; 18] {
        [
            Skill::Acrobatics,
            Skill::AnimalHandling,
            Skill::Arcana,
            Skill::Athletics,
            Skill::Deception,
            Skill::History,
            Skill::Insight,
            Skill::Intimidation,
            Skill::Investigation,
            Skill::Medicine,
            Skill::Nature,
            Skill::Perception,
            Skill::Performance,
            Skill::Persuasion,
            Skill::Religion,
            Skill::SleightOfHand,
            Skill::Stealth,
            Skill::Survival,
        ]
    }

    /// Parse a skill from its display name, ignoring case and spaces.
    pub fn from_name(name: &str) -> Option<Skill> {
        let wanted: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        Skill::all().into_iter().find(|skill| {
            skill
                .name()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase()
                == wanted
        })
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Proficiency tiers for a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProficiencyLevel {
    #[default]
    None,
    Proficient,
    Expertise,
}

impl ProficiencyLevel {
    pub fn multiplier(&self) -> i32 {
        match self {
            ProficiencyLevel::None => 0,
            ProficiencyLevel::Proficient => 1,
            ProficiencyLevel::Expertise => 2,
        }
    }

    pub fn bonus(&self, proficiency_bonus: i32) -> i32 {
        self.multiplier() * proficiency_bonus
    }

    /// The sheet's click cycle: None -> Proficient -> Expertise -> None.
    pub fn cycle(&self) -> ProficiencyLevel {
        match self {
            ProficiencyLevel::None => ProficiencyLevel::Proficient,
            ProficiencyLevel::Proficient => ProficiencyLevel::Expertise,
            ProficiencyLevel::Expertise => ProficiencyLevel::None,
        }
    }
}

/// One skill's tracked state on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillState {
    pub skill: Skill,
    pub proficiency: ProficiencyLevel,
}

impl SkillState {
    /// All 18 skills in display order, no proficiencies.
    pub fn default_list() -> Vec<SkillState> {
        Skill::all()
            .into_iter()
            .map(|skill| SkillState {
                skill,
                proficiency: ProficiencyLevel::None,
            })
            .collect()
    }
}

/// A single entry in the roll history. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollEntry {
    pub label: String,
    pub result: i32,
    pub details: String,
    /// Milliseconds since the Unix epoch at creation.
    pub timestamp: u64,
    pub dice_type: String,
    #[serde(default)]
    pub send_to_discord: bool,
}

impl RollEntry {
    pub fn new(
        label: impl Into<String>,
        result: i32,
        details: impl Into<String>,
        dice_type: impl Into<String>,
        send_to_discord: bool,
    ) -> Self {
        RollEntry {
            label: label.into(),
            result,
            details: details.into(),
            timestamp: now_millis(),
            dice_type: dice_type.into(),
            send_to_discord,
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Hit point pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HitPoints {
    pub current: i32,
    pub max: i32,
    pub temp: i32,
}

/// Hit dice pool; `face` is the die notation, e.g. `"d6"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HitDice {
    pub current: u32,
    pub max: u32,
    pub face: String,
}

/// Derived and tracked vital statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Vitals {
    pub hp: HitPoints,
    pub hit_dice: HitDice,
    pub ac: i32,
    pub initiative: i32,
    pub speed: u32,
    pub proficiency_bonus: i32,
}

/// Passive sense scores, each `10 + skill modifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Senses {
    pub passive_perception: i32,
    pub passive_investigation: i32,
    pub passive_insight: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Proficiencies {
    pub armor: Vec<String>,
    pub weapons: Vec<String>,
    pub tools: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Defenses {
    pub resistances: Vec<String>,
    pub immunities: Vec<String>,
    pub vulnerabilities: Vec<String>,
}

/// Coin purse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Wealth {
    pub cp: u32,
    pub sp: u32,
    pub ep: u32,
    pub gp: u32,
    pub pp: u32,
}

/// Experience points; `max` is the next level threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Experience {
    pub current: u32,
    pub max: u32,
}

/// Tracked slots for one spell level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SlotState {
    pub current: u8,
    pub max: u8,
}

impl SlotState {
    pub fn full(max: u8) -> Self {
        SlotState { current: max, max }
    }

    /// Spend one slot; returns false if none remain.
    pub fn spend(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn recover_all(&mut self) {
        self.current = self.max;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    MeleeWeapon,
    RangedWeapon,
    SpellAttack,
    Feature,
}

/// An attack or usable feature on the Actions tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub name: String,
    pub kind: ActionKind,
    pub range: String,
    pub hit_bonus: i32,
    /// Damage formula, e.g. `"1d8 + 3"`.
    pub damage: String,
    pub damage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Action {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            range: String::new(),
            hit_bonus: 0,
            damage: String::new(),
            damage_type: String::new(),
            notes: None,
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_hit_bonus(mut self, bonus: i32) -> Self {
        self.hit_bonus = bonus;
        self
    }

    pub fn with_damage(mut self, damage: impl Into<String>, damage_type: impl Into<String>) -> Self {
        self.damage = damage.into();
        self.damage_type = damage_type.into();
        self
    }
}

/// A known spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub id: Uuid,
    pub name: String,
    /// 0 for cantrips.
    pub level: u8,
    pub school: String,
    pub casting_time: String,
    pub range: String,
    pub components: String,
    pub duration: String,
    pub description: String,
    #[serde(default)]
    pub prepared: bool,
}

impl Spell {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Spell {
            id: Uuid::new_v4(),
            name: name.into(),
            level,
            school: String::new(),
            casting_time: String::new(),
            range: String::new(),
            components: String::new(),
            duration: String::new(),
            description: String::new(),
            prepared: false,
        }
    }
}

/// What using a feature consumes, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCost {
    pub name: String,
    pub amount: u32,
}

/// A class or racial feature, flattened to display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub source: String,
    pub level: u8,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<FeatureCost>,
}

/// The full character record.
///
/// Derived fields are refreshed by [`crate::sheet::CharacterSheet::recalculate`];
/// everything else is user-edited state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub race: String,
    pub class_name: String,
    pub level: u32,
    pub background: String,
    pub alignment: String,
    pub xp: Experience,
    pub abilities: AbilityScoreSet,
    pub vitals: Vitals,
    pub skills: Vec<SkillState>,
    pub senses: Senses,
    pub proficiencies: Proficiencies,
    pub defenses: Defenses,
    pub conditions: Vec<String>,
    pub actions: Vec<Action>,
    pub spells: Vec<Spell>,
    /// Tracked slots by spell level; maxima come from the class table.
    pub spell_slots: BTreeMap<u8, SlotState>,
    pub inventory: Vec<Item>,
    pub wealth: Wealth,
    pub features: Vec<Feature>,
    #[serde(default)]
    pub resources: Vec<crate::resources::TrackedResource>,
    #[serde(default)]
    pub roll_history: Vec<RollEntry>,
    #[serde(default)]
    pub send_rolls_to_discord: bool,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Character {
            name: name.into(),
            race: String::new(),
            class_name: String::new(),
            level: 1,
            background: String::new(),
            alignment: String::new(),
            xp: Experience::default(),
            abilities: AbilityScoreSet::default(),
            vitals: Vitals::default(),
            skills: SkillState::default_list(),
            senses: Senses::default(),
            proficiencies: Proficiencies::default(),
            defenses: Defenses::default(),
            conditions: Vec::new(),
            actions: Vec::new(),
            spells: Vec::new(),
            spell_slots: BTreeMap::new(),
            inventory: Vec::new(),
            wealth: Wealth::default(),
            features: Vec::new(),
            resources: Vec::new(),
            roll_history: Vec::new(),
            send_rolls_to_discord: false,
        }
    }

    pub fn ability(&self, ability: Ability) -> &AbilityScore {
        self.abilities.get(ability)
    }

    /// Current proficiency tier for a skill.
    pub fn skill_proficiency(&self, skill: Skill) -> ProficiencyLevel {
        self.skills
            .iter()
            .find(|s| s.skill == skill)
            .map(|s| s.proficiency)
            .unwrap_or_default()
    }

    /// Skill check modifier: ability modifier plus scaled proficiency.
    pub fn skill_modifier(&self, skill: Skill) -> i32 {
        let ability_mod = self.abilities.get(skill.ability()).modifier;
        ability_mod + self.skill_proficiency(skill).bonus(self.vitals.proficiency_bonus)
    }

    /// Saving throw modifier for an ability.
    pub fn save_modifier(&self, ability: Ability) -> i32 {
        let score = self.abilities.get(ability);
        let proficiency = if score.save_proficiency {
            self.vitals.proficiency_bonus
        } else {
            0
        };
        score.modifier + proficiency
    }

    pub fn item(&self, id: Uuid) -> Option<&Item> {
        self.inventory.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: Uuid) -> Option<&mut Item> {
        self.inventory.iter_mut().find(|i| i.id == id)
    }

    /// Items currently contributing to stats and AC.
    pub fn active_items(&self) -> impl Iterator<Item = &Item> {
        self.inventory.iter().filter(|i| i.is_active())
    }
}

impl Default for Character {
    fn default() -> Self {
        Character::new("Unnamed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_from_name() {
        assert_eq!(Ability::from_name("str"), Some(Ability::Strength));
        assert_eq!(Ability::from_name("Wisdom"), Some(Ability::Wisdom));
        assert_eq!(Ability::from_name("CHA"), Some(Ability::Charisma));
        assert_eq!(Ability::from_name("luck"), None);
    }

    #[test]
    fn test_skill_from_name() {
        assert_eq!(Skill::from_name("arcana"), Some(Skill::Arcana));
        assert_eq!(Skill::from_name("Sleight of Hand"), Some(Skill::SleightOfHand));
        assert_eq!(Skill::from_name("sleightofhand"), Some(Skill::SleightOfHand));
        assert_eq!(Skill::from_name("ANIMAL HANDLING"), Some(Skill::AnimalHandling));
        assert_eq!(Skill::from_name("basketweaving"), None);
    }

    #[test]
    fn test_ability_score_new_derives_modifier() {
        assert_eq!(AbilityScore::new(10).modifier, 0);
        assert_eq!(AbilityScore::new(14).modifier, 2);
        assert_eq!(AbilityScore::new(15).modifier, 2);
        assert_eq!(AbilityScore::new(8).modifier, -1);
        assert_eq!(AbilityScore::new(7).modifier, -2);
    }

    #[test]
    fn test_modifier_from_input() {
        let modifier =
            StatModifier::from_input("Belt", "4", ModifierKind::Bonus).unwrap();
        assert_eq!(modifier.value, 4);
        assert_eq!(modifier.kind, ModifierKind::Bonus);

        let modifier =
            StatModifier::from_input("Curse", " -2 ", ModifierKind::Bonus).unwrap();
        assert_eq!(modifier.value, -2);

        let err = StatModifier::from_input("Typo", "four", ModifierKind::Bonus).unwrap_err();
        assert_eq!(err, ModifierParseError::NotANumber("four".to_string()));

        assert!(StatModifier::from_input("Empty", "", ModifierKind::Override).is_err());
    }

    #[test]
    fn test_item_active_states() {
        let mut item = Item::new("Cloak of Protection").requires_attunement();
        assert!(!item.is_active());

        item.is_attuned = true;
        assert!(item.is_active());

        item.is_attuned = false;
        item.equipped = true;
        assert!(item.is_active());

        let plain = Item::new("Rope");
        assert!(!plain.is_active());
    }

    #[test]
    fn test_attunement_flag_without_requirement() {
        // Attuning an item that does not require attunement does not
        // activate it on its own.
        let mut item = Item::new("Torch");
        item.is_attuned = true;
        assert!(!item.is_active());
    }

    #[test]
    fn test_armor_category_from_code() {
        assert_eq!(ArmorCategory::from_code("HA"), Some(ArmorCategory::Heavy));
        assert_eq!(
            ArmorCategory::from_code("ha|xphb"),
            Some(ArmorCategory::Heavy)
        );
        assert_eq!(
            ArmorCategory::from_code("LA|PHB"),
            Some(ArmorCategory::Light)
        );
        assert_eq!(ArmorCategory::from_code("ma"), Some(ArmorCategory::Medium));
        assert_eq!(ArmorCategory::from_code("S"), Some(ArmorCategory::Shield));
        assert_eq!(ArmorCategory::from_code("RG"), None);
        assert_eq!(ArmorCategory::from_code(""), None);
    }

    #[test]
    fn test_item_ability_field_mapping() {
        let item = Item::new("Gauntlets of Ogre Power")
            .with_ability_override(Ability::Strength, 19)
            .requires_attunement();
        assert_eq!(item.ability_override(Ability::Strength), Some(19));
        assert_eq!(item.ability_override(Ability::Dexterity), None);
        assert_eq!(item.ability_bonus(Ability::Strength), None);

        let belt = Item::new("Belt of Hill Giant Strength")
            .with_ability_bonus(Ability::Strength, 2);
        assert_eq!(belt.ability_bonus(Ability::Strength), Some(2));
        for ability in Ability::all().into_iter().skip(1) {
            assert_eq!(belt.ability_bonus(ability), None);
        }
    }

    #[test]
    fn test_proficiency_cycle() {
        let level = ProficiencyLevel::None;
        let level = level.cycle();
        assert_eq!(level, ProficiencyLevel::Proficient);
        let level = level.cycle();
        assert_eq!(level, ProficiencyLevel::Expertise);
        let level = level.cycle();
        assert_eq!(level, ProficiencyLevel::None);
    }

    #[test]
    fn test_skill_modifier_with_expertise() {
        let mut character = Character::new("Test");
        character.abilities.dexterity = AbilityScore::new(16);
        character.vitals.proficiency_bonus = 3;

        assert_eq!(character.skill_modifier(Skill::Stealth), 3);

        for state in character.skills.iter_mut() {
            if state.skill == Skill::Stealth {
                state.proficiency = ProficiencyLevel::Expertise;
            }
        }
        assert_eq!(character.skill_modifier(Skill::Stealth), 9);
    }

    #[test]
    fn test_save_modifier() {
        let mut character = Character::new("Test");
        character.abilities.constitution = AbilityScore::new(17);
        character.vitals.proficiency_bonus = 3;
        assert_eq!(character.save_modifier(Ability::Constitution), 3);

        character.abilities.constitution.save_proficiency = true;
        assert_eq!(character.save_modifier(Ability::Constitution), 6);
    }

    #[test]
    fn test_slot_state() {
        let mut slot = SlotState::full(3);
        assert!(slot.spend());
        assert!(slot.spend());
        assert_eq!(slot.current, 1);
        assert!(slot.spend());
        assert!(!slot.spend());
        slot.recover_all();
        assert_eq!(slot.current, 3);
    }

    #[test]
    fn test_default_skill_list_covers_all() {
        let skills = SkillState::default_list();
        assert_eq!(skills.len(), 18);
        for skill in Skill::all() {
            assert!(skills.iter().any(|s| s.skill == skill));
        }
    }
}
