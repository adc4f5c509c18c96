//! QA tests for the end-to-end sheet flow.
//!
//! These tests exercise the public API the way a front end would:
//! - Character creation through the builder
//! - Equipment and attunement cascading into derived stats
//! - Rolls landing in the history and reaching the notifier
//! - Spell slot and resource bookkeeping

use std::sync::Arc;

use charsheet_core::items;
use charsheet_core::model::{Ability, ProficiencyLevel, Skill};
use charsheet_core::testing::{create_sample_sorcerer, RecordingNotifier};
use charsheet_core::{Advantage, CharacterBuilder, CharacterClass, CharacterSheet};

// =============================================================================
// CHARACTER CREATION
// =============================================================================

#[test]
fn test_built_character_is_stable_under_recalculation() {
    let character = CharacterBuilder::new()
        .name("Astra")
        .race("Tiefling")
        .class(CharacterClass::Sorcerer)
        .background("Hermit")
        .level(3)
        .standard_array([8, 12, 14, 10, 13, 15])
        .skills(vec![Skill::Arcana, Skill::Deception])
        .build()
        .expect("builder output");

    // Wrapping recalculates everything; a freshly built character is
    // already consistent, so nothing should move.
    let expected = character.clone();
    let sheet = CharacterSheet::new(character);
    assert!(!sheet.is_dirty());
    assert_eq!(sheet.character(), &expected);
}

#[test]
fn test_new_sorcerer_plays_a_few_rounds() {
    let character = CharacterBuilder::new()
        .name("Astra")
        .class(CharacterClass::Sorcerer)
        .level(3)
        .standard_array([8, 12, 14, 10, 13, 15])
        .build()
        .expect("builder output");
    let mut sheet = CharacterSheet::new(character);

    // Level 3 sorcerer: four 1st-level slots, two 2nd-level.
    assert!(sheet.use_spell_slot(1));
    assert!(sheet.use_spell_slot(1));
    assert!(sheet.use_spell_slot(2));
    assert_eq!(sheet.character().spell_slots[&1].current, 2);
    assert_eq!(sheet.character().spell_slots[&2].current, 1);
    assert!(!sheet.use_spell_slot(3), "no 3rd-level slots at level 3");

    sheet.recover_slots();
    assert_eq!(sheet.character().spell_slots[&1].current, 4);
    assert_eq!(sheet.character().spell_slots[&2].current, 2);

    let outcome = sheet.ability_check(Ability::Charisma, Advantage::Normal);
    assert!((3..=22).contains(&outcome.total), "1d20 + 2: {outcome}");
    assert_eq!(sheet.character().roll_history.len(), 1);
}

// =============================================================================
// EQUIPMENT AND ATTUNEMENT
// =============================================================================

#[test]
fn test_equipping_catalog_armor_and_shield() {
    let mut sheet = CharacterSheet::new(create_sample_sorcerer());
    assert_eq!(sheet.character().vitals.ac, 11, "unarmored with +1 dex");

    let mut armor = items::standard_armor("Studded Leather").expect("catalog armor");
    armor.equipped = true;
    sheet.add_item(armor);
    assert_eq!(sheet.character().vitals.ac, 13);

    let mut shield = items::standard_armor("Shield").expect("catalog shield");
    shield.equipped = true;
    sheet.add_item(shield);
    assert_eq!(sheet.character().vitals.ac, 15);

    let ac = sheet.armor_class();
    assert_eq!(ac.total, 15);
    assert_eq!(
        ac.breakdown,
        vec![
            "Studded Leather (Light): 12".to_string(),
            "Dexterity: +1".to_string(),
            "Shield: +2".to_string(),
        ]
    );
}

#[test]
fn test_attunement_gates_the_gauntlets() {
    let mut sheet = CharacterSheet::new(create_sample_sorcerer());
    assert_eq!(sheet.character().ability(Ability::Strength).total, 8);

    let gauntlets = items::magic_item("Gauntlets of Ogre Power").expect("catalog item");
    let id = gauntlets.id;
    sheet.add_item(gauntlets);
    // In the pack but neither equipped nor attuned: inert.
    assert_eq!(sheet.character().ability(Ability::Strength).total, 8);

    assert!(sheet.set_attuned(id, true));
    assert_eq!(sheet.character().ability(Ability::Strength).total, 19);
    assert_eq!(sheet.character().ability(Ability::Strength).modifier, 4);

    let removed = sheet.remove_item(id).expect("item was present");
    assert_eq!(removed.name, "Gauntlets of Ogre Power");
    assert_eq!(sheet.character().ability(Ability::Strength).total, 8);
}

// =============================================================================
// ROLLS, HISTORY, AND NOTIFICATION
// =============================================================================

#[test]
fn test_rolls_accumulate_and_notify() {
    let notifier = Arc::new(RecordingNotifier::new());
    let mut sheet =
        CharacterSheet::new(create_sample_sorcerer()).with_notifier(notifier.clone());
    sheet.character_mut().send_rolls_to_discord = true;

    sheet.ability_check(Ability::Charisma, Advantage::Normal);
    sheet.skill_check(Skill::Deception, Advantage::Advantage);
    sheet.initiative_roll(Advantage::Normal);

    let history = &sheet.character().roll_history;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].label, "Charisma Check");
    assert_eq!(history[1].label, "Deception Check (Adv)");
    assert_eq!(history[2].label, "Initiative");
    for pair in history.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }

    let delivered = notifier.delivered();
    assert_eq!(delivered.len(), 3);
    assert_eq!(delivered[0].label, "Charisma Check");
}

#[test]
fn test_saving_throw_respects_proficiency_cycling() {
    let mut sheet = CharacterSheet::new(create_sample_sorcerer());

    // Wisdom is not a sorcerer save: 1d20 - 1.
    for _ in 0..30 {
        let outcome = sheet.saving_throw(Ability::Wisdom, Advantage::Normal);
        assert!((0..=19).contains(&outcome.total), "{outcome}");
    }

    sheet.set_save_proficiency(Ability::Wisdom, true);
    // Now 1d20 - 1 + 3.
    for _ in 0..30 {
        let outcome = sheet.saving_throw(Ability::Wisdom, Advantage::Normal);
        assert!((3..=22).contains(&outcome.total), "{outcome}");
    }
}

#[test]
fn test_skill_cycling_feeds_passive_senses() {
    let mut sheet = CharacterSheet::new(create_sample_sorcerer());
    assert_eq!(sheet.character().senses.passive_perception, 9);

    sheet.cycle_skill_proficiency(Skill::Perception);
    assert_eq!(
        sheet.character().skill_proficiency(Skill::Perception),
        ProficiencyLevel::Proficient
    );
    assert_eq!(sheet.character().senses.passive_perception, 12);

    sheet.cycle_skill_proficiency(Skill::Perception);
    assert_eq!(sheet.character().senses.passive_perception, 15);
}

// =============================================================================
// RESOURCES
// =============================================================================

#[test]
fn test_sorcery_points_survive_recalculation() {
    let mut sheet = CharacterSheet::new(create_sample_sorcerer());
    assert_eq!(sheet.character().resources[0].current, 6);

    assert!(sheet.character_mut().resources[0].spend(2));
    sheet.recalculate();
    // Recalculation refreshes the maximum but never refills spent points.
    assert_eq!(sheet.character().resources[0].current, 4);
    assert_eq!(sheet.character().resources[0].max, 6);

    sheet.character_mut().resources[0].recover_all();
    assert_eq!(sheet.character().resources[0].current, 6);
}
