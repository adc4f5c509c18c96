//! Class reference data: hit dice, saving throws, spell slot
//! progression, and experience thresholds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::Ability;

/// The twelve standard classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Barbarian,
    Bard,
    Cleric,
    Druid,
    Fighter,
    Monk,
    Paladin,
    Ranger,
    Rogue,
    Sorcerer,
    Warlock,
    Wizard,
}

/// Static reference data for a class.
#[derive(Debug, Clone)]
pub struct ClassData {
    pub hit_die: u32,
    pub saving_throws: [Ability; 2],
    pub primary_ability: &'static str,
    pub spellcasting_ability: Option<Ability>,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Barbarian => "Barbarian",
            CharacterClass::Bard => "Bard",
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Druid => "Druid",
            CharacterClass::Fighter => "Fighter",
            CharacterClass::Monk => "Monk",
            CharacterClass::Paladin => "Paladin",
            CharacterClass::Ranger => "Ranger",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Sorcerer => "Sorcerer",
            CharacterClass::Warlock => "Warlock",
            CharacterClass::Wizard => "Wizard",
        }
    }

    /// Parse a class name, case-insensitive.
    pub fn from_name(name: &str) -> Option<CharacterClass> {
        match name.trim().to_ascii_lowercase().as_str() {
            "barbarian" => Some(CharacterClass::Barbarian),
            "bard" => Some(CharacterClass::Bard),
            "cleric" => Some(CharacterClass::Cleric),
            "druid" => Some(CharacterClass::Druid),
            "fighter" => Some(CharacterClass::Fighter),
            "monk" => Some(CharacterClass::Monk),
            "paladin" => Some(CharacterClass::Paladin),
            "ranger" => Some(CharacterClass::Ranger),
            "rogue" => Some(CharacterClass::Rogue),
            "sorcerer" => Some(CharacterClass::Sorcerer),
            "warlock" => Some(CharacterClass::Warlock),
            "wizard" => Some(CharacterClass::Wizard),
            _ => None,
        }
    }

    pub fn all() -> [CharacterClass; 12] {
        [
            CharacterClass::Barbarian,
            CharacterClass::Bard,
            CharacterClass::Cleric,
            CharacterClass::Druid,
            CharacterClass::Fighter,
            CharacterClass::Monk,
            CharacterClass::Paladin,
            CharacterClass::Ranger,
            CharacterClass::Rogue,
            CharacterClass::Sorcerer,
            CharacterClass::Warlock,
            CharacterClass::Wizard,
        ]
    }

    pub fn data(&self) -> ClassData {
        match self {
            CharacterClass::Barbarian => ClassData {
                hit_die: 12,
                saving_throws: [Ability::Strength, Ability::Constitution],
                primary_ability: "Str",
                spellcasting_ability: None,
            },
            CharacterClass::Bard => ClassData {
                hit_die: 8,
                saving_throws: [Ability::Dexterity, Ability::Charisma],
                primary_ability: "Cha",
                spellcasting_ability: Some(Ability::Charisma),
            },
            CharacterClass::Cleric => ClassData {
                hit_die: 8,
                saving_throws: [Ability::Wisdom, Ability::Charisma],
                primary_ability: "Wis",
                spellcasting_ability: Some(Ability::Wisdom),
            },
            CharacterClass::Druid => ClassData {
                hit_die: 8,
                saving_throws: [Ability::Intelligence, Ability::Wisdom],
                primary_ability: "Wis",
                spellcasting_ability: Some(Ability::Wisdom),
            },
            CharacterClass::Fighter => ClassData {
                hit_die: 10,
                saving_throws: [Ability::Strength, Ability::Constitution],
                primary_ability: "Str/Dex",
                spellcasting_ability: None,
            },
            CharacterClass::Monk => ClassData {
                hit_die: 8,
                saving_throws: [Ability::Strength, Ability::Dexterity],
                primary_ability: "Dex/Wis",
                spellcasting_ability: None,
            },
            CharacterClass::Paladin => ClassData {
                hit_die: 10,
                saving_throws: [Ability::Wisdom, Ability::Charisma],
                primary_ability: "Str/Cha",
                spellcasting_ability: Some(Ability::Charisma),
            },
            CharacterClass::Ranger => ClassData {
                hit_die: 10,
                saving_throws: [Ability::Strength, Ability::Dexterity],
                primary_ability: "Dex/Wis",
                spellcasting_ability: Some(Ability::Wisdom),
            },
            CharacterClass::Rogue => ClassData {
                hit_die: 8,
                saving_throws: [Ability::Dexterity, Ability::Intelligence],
                primary_ability: "Dex",
                spellcasting_ability: None,
            },
            CharacterClass::Sorcerer => ClassData {
                hit_die: 6,
                saving_throws: [Ability::Constitution, Ability::Charisma],
                primary_ability: "Cha",
                spellcasting_ability: Some(Ability::Charisma),
            },
            CharacterClass::Warlock => ClassData {
                hit_die: 8,
                saving_throws: [Ability::Wisdom, Ability::Charisma],
                primary_ability: "Cha",
                spellcasting_ability: Some(Ability::Charisma),
            },
            CharacterClass::Wizard => ClassData {
                hit_die: 6,
                saving_throws: [Ability::Intelligence, Ability::Wisdom],
                primary_ability: "Int",
                spellcasting_ability: Some(Ability::Intelligence),
            },
        }
    }

    pub fn hit_die(&self) -> u32 {
        self.data().hit_die
    }

    pub fn is_spellcaster(&self) -> bool {
        self.data().spellcasting_ability.is_some()
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Slot counts per character level for the shared full-caster
/// progression. Rows are character levels 1-20, columns slot levels
/// 1-9.
const FULL_CASTER_SLOTS: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Spell slots available to a class at a character level, as a map
/// from slot level to count. Only the Sorcerer's progression is
/// modeled; every other class has no table and returns an empty map.
pub fn spell_slots_for(class: CharacterClass, level: u32) -> BTreeMap<u8, u8> {
    let mut slots = BTreeMap::new();
    if class != CharacterClass::Sorcerer {
        return slots;
    }
    if level == 0 {
        return slots;
    }
    let row = FULL_CASTER_SLOTS[(level.min(20) - 1) as usize];
    for (i, &count) in row.iter().enumerate() {
        if count > 0 {
            slots.insert((i + 1) as u8, count);
        }
    }
    slots
}

/// Total experience required to reach each level, indexed by level.
const XP_THRESHOLDS: [u32; 20] = [
    0, 300, 900, 2700, 6500, 14000, 23000, 34000, 48000, 64000, 85000, 100000, 120000, 140000,
    165000, 195000, 225000, 265000, 305000, 355000,
];

/// Total experience a character must have earned to sit at a level.
pub fn level_xp(level: u32) -> u32 {
    XP_THRESHOLDS[(level.clamp(1, 20) - 1) as usize]
}

/// Experience needed to reach the next level; the level 20 threshold
/// caps the scale.
pub fn next_level_xp(level: u32) -> u32 {
    let next = (level + 1).clamp(1, 20);
    XP_THRESHOLDS[(next - 1) as usize]
}
