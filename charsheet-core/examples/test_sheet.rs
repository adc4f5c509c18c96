//! Walk a character sheet through creation, equipment, and rolls

use charsheet_core::items;
use charsheet_core::model::{Ability, Skill};
use charsheet_core::{Advantage, CharacterBuilder, CharacterClass, CharacterSheet};

fn main() {
    println!("=== Character Creation ===\n");

    let character = CharacterBuilder::new()
        .name("Astra")
        .race("Tiefling")
        .class(CharacterClass::Sorcerer)
        .background("Hermit")
        .level(3)
        .standard_array([8, 12, 14, 10, 13, 15])
        .skills(vec![Skill::Arcana, Skill::Persuasion])
        .build()
        .expect("example character always builds");
    let mut sheet = CharacterSheet::new(character);
    print_summary(&sheet);

    println!("\n=== Shopping Trip ===\n");

    let mut armor = items::standard_armor("Studded Leather").expect("catalog armor");
    armor.equipped = true;
    sheet.add_item(armor);
    let mut shield = items::standard_armor("Shield").expect("catalog shield");
    shield.equipped = true;
    sheet.add_item(shield);
    print_armor_class(&sheet);

    println!("\n=== Rolls ===\n");

    sheet.initiative_roll(Advantage::Normal);
    sheet.skill_check(Skill::Arcana, Advantage::Advantage);
    sheet.saving_throw(Ability::Constitution, Advantage::Normal);
    for entry in &sheet.character().roll_history {
        println!("{}: {} ({})", entry.label, entry.result, entry.dice_type);
        for line in entry.details.lines() {
            println!("    {line}");
        }
    }
}

fn print_summary(sheet: &CharacterSheet) {
    let c = sheet.character();
    println!(
        "{} - level {} {} ({})",
        c.name, c.level, c.class_name, c.background
    );
    println!(
        "HP {}/{}  AC {}  initiative {:+}  proficiency {:+}",
        c.vitals.hp.current,
        c.vitals.hp.max,
        c.vitals.ac,
        c.vitals.initiative,
        c.vitals.proficiency_bonus
    );
    for ability in Ability::all() {
        let score = c.ability(ability);
        print!("  {} {} ({:+})", ability.abbreviation(), score.total, score.modifier);
    }
    println!();
    let slots: Vec<String> = c
        .spell_slots
        .iter()
        .map(|(level, slot)| format!("L{level} {}/{}", slot.current, slot.max))
        .collect();
    println!("Spell slots: {}", slots.join("  "));
}

fn print_armor_class(sheet: &CharacterSheet) {
    let ac = sheet.armor_class();
    for line in &ac.breakdown {
        println!("  {line}");
    }
    println!("  Total: {}", ac.total);
}
