//! Derived statistics.
//!
//! Pure functions that turn base scores, class, level, and inventory
//! into the numbers on the sheet: effective ability scores, armor
//! class with an itemized breakdown, hit point maximum, proficiency
//! bonus, and spell slots. None of these mutate the character; the
//! sheet layer calls them and writes the results back, so running them
//! twice over the same inputs produces the same outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classes::{spell_slots_for, CharacterClass};
use crate::model::{Ability, AbilityScoreSet, ArmorCategory, Item, ModifierKind, StatModifier};

/// The 5e ability modifier: floor((score - 10) / 2), correct for
/// scores below 10 as well.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Recompute effective ability scores from base values, manual
/// modifiers, and active items.
///
/// For each ability, manual modifiers come first, then one bonus and
/// one override entry per active item that defines them, in inventory
/// order. The total is `base + sum(bonuses)` raised to the highest
/// override if any override beats it; an override never lowers a
/// score. The full modifier list is kept as the score's breakdown.
pub fn resolve(abilities: &AbilityScoreSet, items: &[Item]) -> AbilityScoreSet {
    let mut resolved = abilities.clone();
    for ability in Ability::all() {
        let score = resolved.get_mut(ability);
        let mut modifiers = score.manual_modifiers.clone();
        for item in items {
            if !item.is_active() {
                continue;
            }
            if let Some(value) = item.ability_bonus(ability).filter(|v| *v != 0) {
                modifiers.push(StatModifier {
                    id: format!("{}-bonus-{}", item.id, ability.abbreviation()),
                    source: item.name.clone(),
                    value,
                    kind: ModifierKind::Bonus,
                });
            }
            if let Some(value) = item.ability_override(ability).filter(|v| *v != 0) {
                modifiers.push(StatModifier {
                    id: format!("{}-override-{}", item.id, ability.abbreviation()),
                    source: item.name.clone(),
                    value,
                    kind: ModifierKind::Override,
                });
            }
        }

        let bonus_sum: i32 = modifiers
            .iter()
            .filter(|m| m.kind == ModifierKind::Bonus)
            .map(|m| m.value)
            .sum();
        let mut total = score.base + bonus_sum;
        if let Some(floor) = modifiers
            .iter()
            .filter(|m| m.kind == ModifierKind::Override)
            .map(|m| m.value)
            .max()
        {
            total = total.max(floor);
        }

        score.total = total;
        score.modifier = ability_modifier(total);
        score.breakdown = modifiers;
    }
    resolved
}

/// A computed armor class along with the lines that explain it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArmorClass {
    pub total: i32,
    pub breakdown: Vec<String>,
}

/// Compute armor class from the dexterity modifier and inventory.
///
/// Body armor must be equipped, carry a light/medium/heavy type code,
/// and have a positive AC; the highest base AC wins and the first such
/// item breaks ties. Heavy armor ignores dexterity, medium caps it at
/// +2, light adds it in full, and no armor means 10 + dexterity. The
/// first equipped shield adds its AC (2 if unset), and every active
/// item with a nonzero AC bonus stacks on top.
pub fn resolve_ac(dex_modifier: i32, items: &[Item]) -> ResolvedArmorClass {
    let mut breakdown = Vec::new();

    let mut body_armor: Option<&Item> = None;
    for item in items.iter().filter(|i| i.equipped) {
        let wearable = matches!(
            item.armor_category(),
            Some(ArmorCategory::Light | ArmorCategory::Medium | ArmorCategory::Heavy)
        ) && item.ac.unwrap_or(0) > 0;
        if !wearable {
            continue;
        }
        match body_armor {
            Some(current) if current.ac.unwrap_or(0) >= item.ac.unwrap_or(0) => {}
            _ => body_armor = Some(item),
        }
    }

    let armor_ac = match body_armor {
        None => {
            breakdown.push("Unarmored: 10".to_string());
            breakdown.push(format!("Dexterity: {}", signed(dex_modifier)));
            10 + dex_modifier
        }
        Some(armor) => {
            let base = armor.ac.unwrap_or(10);
            match armor.armor_category() {
                Some(ArmorCategory::Heavy) => {
                    breakdown.push(format!("{} (Heavy): {}", armor.name, base));
                    breakdown.push("Dexterity: -".to_string());
                    base
                }
                Some(ArmorCategory::Medium) => {
                    let effective_dex = dex_modifier.min(2);
                    breakdown.push(format!("{} (Medium): {}", armor.name, base));
                    breakdown.push(format!("Dexterity (Max 2): {}", signed(effective_dex)));
                    base + effective_dex
                }
                _ => {
                    breakdown.push(format!("{} (Light): {}", armor.name, base));
                    breakdown.push(format!("Dexterity: {}", signed(dex_modifier)));
                    base + dex_modifier
                }
            }
        }
    };

    let shield_ac = match items
        .iter()
        .find(|i| i.equipped && i.armor_category() == Some(ArmorCategory::Shield))
    {
        Some(shield) => {
            let value = match shield.ac {
                Some(ac) if ac != 0 => ac,
                _ => 2,
            };
            breakdown.push(format!("{}: +{}", shield.name, value));
            value
        }
        None => 0,
    };

    let mut magic_bonus = 0;
    for item in items.iter().filter(|i| i.is_active()) {
        if let Some(bonus) = item.bonus_ac.filter(|v| *v != 0) {
            magic_bonus += bonus;
            breakdown.push(format!("{} (Bonus): {}", item.name, signed(bonus)));
        }
    }

    ResolvedArmorClass {
        total: armor_ac + shield_ac + magic_bonus,
        breakdown,
    }
}

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Hit point maximum: max die at level 1, average (rounded up) plus
/// the constitution modifier per level after that. Unrecognized class
/// names fall back to a d8 hit die. The result is not clamped, so a
/// sufficiently negative constitution can push it below 1.
pub fn max_hp(level: u32, con_modifier: i32, class_name: &str) -> i32 {
    let hit_die = CharacterClass::from_name(class_name)
        .map(|class| class.hit_die())
        .unwrap_or(8) as i32;
    let first_level = hit_die + con_modifier;
    if level == 1 {
        return first_level;
    }
    let per_level = hit_die / 2 + 1 + con_modifier;
    first_level + per_level * (level as i32 - 1)
}

/// Proficiency bonus by character level: +2 at level 1, +6 at 20.
pub fn proficiency_bonus(level: u32) -> i32 {
    (level as i32 + 3) / 4 + 1
}

/// Spell slots for a class name and level. Only recognized caster
/// classes produce slots; everything else gets an empty map.
pub fn spell_slots(level: u32, class_name: &str) -> BTreeMap<u8, u8> {
    match CharacterClass::from_name(class_name) {
        Some(class) => spell_slots_for(class, level),
        None => BTreeMap::new(),
    }
}
