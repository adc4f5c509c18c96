//! Guided character creation.
//!
//! `CharacterBuilder` assembles a ready-to-play character from a name,
//! a class, and a set of base ability scores. Hit points, saving throw
//! proficiencies, spell slots, and class resource pools are derived
//! here the same way the sheet derives them on recalculation, so a
//! freshly built character is already internally consistent.

use rand::Rng;
use thiserror::Error;

use crate::classes::{self, CharacterClass};
use crate::model::{
    AbilityScoreSet, Character, Experience, HitDice, HitPoints, ProficiencyLevel, Skill, SlotState,
};
use crate::resources::{ResourceContext, ResourceFormula, TrackedResource};
use crate::stats;

/// How a character's base ability scores are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbilityMethod {
    #[default]
    StandardArray,
    PointBuy,
    Rolled,
}

impl AbilityMethod {
    pub fn name(&self) -> &'static str {
        match self {
            AbilityMethod::StandardArray => "Standard Array",
            AbilityMethod::PointBuy => "Point Buy",
            AbilityMethod::Rolled => "Rolled (4d6 drop lowest)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AbilityMethod::StandardArray => "Assign 15, 14, 13, 12, 10, 8 across the six abilities",
            AbilityMethod::PointBuy => "Spend 27 points on scores between 8 and 15",
            AbilityMethod::Rolled => "Roll 4d6 and keep the highest three for each score",
        }
    }

    pub fn all() -> [AbilityMethod; 3] {
        [
            AbilityMethod::StandardArray,
            AbilityMethod::PointBuy,
            AbilityMethod::Rolled,
        ]
    }
}

/// The fixed scores offered by the standard array, highest first.
pub const STANDARD_ARRAY: [i32; 6] = [15, 14, 13, 12, 10, 8];

/// Points available under point buy.
pub const POINT_BUY_TOTAL: u32 = 27;

/// Point cost of a single score under point buy. Scores outside 8-15
/// cannot be bought.
pub fn point_buy_cost(score: i32) -> Option<u32> {
    match score {
        8 => Some(0),
        9 => Some(1),
        10 => Some(2),
        11 => Some(3),
        12 => Some(4),
        13 => Some(5),
        14 => Some(7),
        15 => Some(9),
        _ => None,
    }
}

/// Check a full set of scores against the point-buy rules.
pub fn validate_point_buy(scores: &[i32; 6]) -> Result<(), BuilderError> {
    let mut cost = 0;
    for &score in scores {
        cost += point_buy_cost(score).ok_or(BuilderError::ScoreNotBuyable { score })?;
    }
    if cost > POINT_BUY_TOTAL {
        return Err(BuilderError::OverBudget {
            cost,
            budget: POINT_BUY_TOTAL,
        });
    }
    Ok(())
}

/// Roll 4d6 and keep the highest three.
pub fn roll_4d6_drop_lowest() -> i32 {
    let mut rng = rand::thread_rng();
    let mut dice: Vec<i32> = (0..4).map(|_| rng.gen_range(1..=6)).collect();
    dice.sort_unstable();
    dice[1..].iter().sum()
}

/// Roll a full set of six scores, highest first.
pub fn roll_ability_scores() -> [i32; 6] {
    let mut scores = [0; 6];
    for slot in scores.iter_mut() {
        *slot = roll_4d6_drop_lowest();
    }
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores
}

/// Reasons a character cannot be assembled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("character needs a name")]
    MissingName,
    #[error("character needs a class")]
    MissingClass,
    #[error("ability scores were never assigned")]
    MissingScores,
    #[error("level {0} is outside 1-20")]
    LevelOutOfRange(u32),
    #[error("standard array must use exactly 15, 14, 13, 12, 10, 8")]
    NotStandardArray,
    #[error("{score} cannot be bought with points (scores run 8-15)")]
    ScoreNotBuyable { score: i32 },
    #[error("scores cost {cost} points but the budget is {budget}")]
    OverBudget { cost: u32, budget: u32 },
}

/// Step-by-step character assembly.
///
/// Scores are always given in the order Strength, Dexterity,
/// Constitution, Intelligence, Wisdom, Charisma.
#[derive(Debug, Clone)]
pub struct CharacterBuilder {
    name: Option<String>,
    race: String,
    class: Option<CharacterClass>,
    background: String,
    alignment: String,
    level: u32,
    scores: Option<[i32; 6]>,
    method: AbilityMethod,
    skills: Vec<Skill>,
}

impl CharacterBuilder {
    pub fn new() -> Self {
        CharacterBuilder {
            name: None,
            race: String::new(),
            class: None,
            background: String::new(),
            alignment: String::new(),
            level: 1,
            scores: None,
            method: AbilityMethod::StandardArray,
            skills: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn race(mut self, race: impl Into<String>) -> Self {
        self.race = race.into();
        self
    }

    pub fn class(mut self, class: CharacterClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn alignment(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = alignment.into();
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Assign the standard array in the given order. The set must be a
    /// permutation of [`STANDARD_ARRAY`].
    pub fn standard_array(mut self, scores: [i32; 6]) -> Self {
        self.method = AbilityMethod::StandardArray;
        self.scores = Some(scores);
        self
    }

    /// Buy scores with points; validated at build time.
    pub fn point_buy(mut self, scores: [i32; 6]) -> Self {
        self.method = AbilityMethod::PointBuy;
        self.scores = Some(scores);
        self
    }

    /// Use pre-rolled scores, e.g. from [`roll_ability_scores`].
    pub fn rolled(mut self, scores: [i32; 6]) -> Self {
        self.method = AbilityMethod::Rolled;
        self.scores = Some(scores);
        self
    }

    /// Mark the chosen skills proficient.
    pub fn skills(mut self, skills: Vec<Skill>) -> Self {
        self.skills = skills;
        self
    }

    pub fn build(self) -> Result<Character, BuilderError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(BuilderError::MissingName)?;
        let class = self.class.ok_or(BuilderError::MissingClass)?;
        if !(1..=20).contains(&self.level) {
            return Err(BuilderError::LevelOutOfRange(self.level));
        }
        let scores = self.scores.ok_or(BuilderError::MissingScores)?;
        match self.method {
            AbilityMethod::StandardArray => {
                let mut sorted = scores;
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                if sorted != STANDARD_ARRAY {
                    return Err(BuilderError::NotStandardArray);
                }
            }
            AbilityMethod::PointBuy => validate_point_buy(&scores)?,
            AbilityMethod::Rolled => {}
        }

        let mut character = Character::new(name);
        character.race = self.race;
        character.class_name = class.name().to_string();
        character.level = self.level;
        character.background = self.background;
        character.alignment = self.alignment;
        character.abilities = AbilityScoreSet::new(
            scores[0], scores[1], scores[2], scores[3], scores[4], scores[5],
        );
        for ability in class.data().saving_throws {
            character.abilities.get_mut(ability).save_proficiency = true;
        }
        for skill in self.skills {
            if let Some(state) = character.skills.iter_mut().find(|s| s.skill == skill) {
                state.proficiency = ProficiencyLevel::Proficient;
            }
        }

        let con_modifier = character.abilities.constitution.modifier;
        let max_hp = stats::max_hp(self.level, con_modifier, class.name());
        character.vitals.hp = HitPoints {
            current: max_hp,
            max: max_hp,
            temp: 0,
        };
        character.vitals.hit_dice = HitDice {
            current: self.level,
            max: self.level,
            face: format!("d{}", class.hit_die()),
        };
        character.vitals.speed = 30;
        character.vitals.proficiency_bonus = stats::proficiency_bonus(self.level);
        character.vitals.initiative = character.abilities.dexterity.modifier;
        character.vitals.ac =
            stats::resolve_ac(character.abilities.dexterity.modifier, &character.inventory).total;
        character.senses.passive_perception = 10 + character.skill_modifier(Skill::Perception);
        character.senses.passive_investigation =
            10 + character.skill_modifier(Skill::Investigation);
        character.senses.passive_insight = 10 + character.skill_modifier(Skill::Insight);

        let slot_maxima = classes::spell_slots_for(class, self.level);
        character.spell_slots = slot_maxima
            .iter()
            .map(|(&level, &max)| (level, SlotState::full(max)))
            .collect();

        character.xp = Experience {
            current: classes::level_xp(self.level),
            max: classes::next_level_xp(self.level),
        };

        if class == CharacterClass::Sorcerer {
            let mut points =
                TrackedResource::new("Sorcery Points", ResourceFormula::SorceryPointsStandard);
            let ctx = ResourceContext {
                level: self.level,
                con_modifier,
                proficiency_bonus: character.vitals.proficiency_bonus,
                max_slots: &slot_maxima,
            };
            points.recompute(&ctx);
            points.recover_all();
            character.resources.push(points);
        }

        Ok(character)
    }
}

impl Default for CharacterBuilder {
    fn default() -> Self {
        CharacterBuilder::new()
    }
}
