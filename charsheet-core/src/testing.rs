//! Testing utilities.
//!
//! Provides a notifier that records deliveries instead of posting
//! them, and a fully populated sample character for exercising the
//! sheet end to end.

use std::sync::Mutex;

use crate::model::{
    Ability, AbilityScoreSet, Action, ActionKind, Character, Experience, Feature, HitDice,
    HitPoints, Item, ProficiencyLevel, RollEntry, Skill, SlotState, Spell, Vitals, Wealth,
};
use crate::notify::RollNotifier;
use crate::resources::{ResourceFormula, TrackedResource};

/// A notifier that captures delivered rolls for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<RollEntry>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of everything delivered so far, in order.
    pub fn delivered(&self) -> Vec<RollEntry> {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl RollNotifier for RecordingNotifier {
    fn deliver(&self, entry: &RollEntry) {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
    }
}

/// A level 6 sorcerer with attacks, spells, slots, and inventory
/// filled in, matching the numbers a hand-built sheet would show.
pub fn create_sample_sorcerer() -> Character {
    let mut character = Character::new("Leo & Orion");
    character.race = "Human/Construct".to_string();
    character.class_name = "Sorcerer".to_string();
    character.level = 6;
    character.background = "Sage".to_string();
    character.alignment = "Chaotic Good".to_string();
    character.xp = Experience {
        current: 14000,
        max: 23000,
    };

    character.abilities = AbilityScoreSet::new(8, 12, 17, 14, 8, 15);
    character.abilities.constitution.save_proficiency = true;
    character.abilities.charisma.save_proficiency = true;

    character.vitals = Vitals {
        hp: HitPoints {
            current: 44,
            max: 44,
            temp: 0,
        },
        hit_dice: HitDice {
            current: 6,
            max: 6,
            face: "d6".to_string(),
        },
        ac: 12,
        initiative: 1,
        speed: 30,
        proficiency_bonus: 3,
    };

    for skill in [
        Skill::Arcana,
        Skill::Deception,
        Skill::Insight,
        Skill::Persuasion,
    ] {
        if let Some(state) = character.skills.iter_mut().find(|s| s.skill == skill) {
            state.proficiency = ProficiencyLevel::Proficient;
        }
    }

    let mut dagger_attack = Action::new("Dagger", ActionKind::MeleeWeapon)
        .with_range("20/60")
        .with_hit_bonus(4)
        .with_damage("1d4 + 1", "Piercing");
    dagger_attack.notes = Some("Finesse, Light, Thrown".to_string());
    let fire_bolt = Action::new("Fire Bolt", ActionKind::SpellAttack)
        .with_range("120ft")
        .with_hit_bonus(5)
        .with_damage("2d10", "Fire");
    character.actions = vec![dagger_attack, fire_bolt];

    character.spells = vec![
        spell(
            "Mage Hand",
            0,
            "Conjuration",
            "1 Action",
            "30ft",
            "V, S",
            "1 Minute",
            "A spectral, floating hand appears at a point you choose within range.",
        ),
        spell(
            "Magic Missile",
            1,
            "Evocation",
            "1 Action",
            "120ft",
            "V, S",
            "Instantaneous",
            "You create three glowing darts of magical force.",
        ),
        spell(
            "Shield",
            1,
            "Abjuration",
            "1 Reaction",
            "Self",
            "V, S",
            "1 Round",
            "+5 to AC until start of next turn.",
        ),
        spell(
            "Fireball",
            3,
            "Evocation",
            "1 Action",
            "150ft",
            "V, S, M",
            "Instantaneous",
            "A bright streak flashes from your pointing finger to a point you choose...",
        ),
    ];

    character.spell_slots.insert(1, SlotState::full(4));
    character.spell_slots.insert(2, SlotState::full(3));
    character.spell_slots.insert(3, SlotState::full(3));

    let mut dagger = Item::new("Dagger").with_weight(1.0);
    dagger.equipped = true;
    let mut focus = Item::new("Arcane Focus (Orb)").with_weight(3.0);
    focus.equipped = true;
    character.inventory = vec![
        dagger,
        focus,
        Item::new("Backpack").with_weight(5.0),
        Item::new("Rations (1 day)").with_quantity(10).with_weight(2.0),
    ];

    character.wealth = Wealth {
        cp: 0,
        sp: 15,
        ep: 0,
        gp: 120,
        pp: 0,
    };

    character.features = vec![
        Feature {
            name: "Font of Magic".to_string(),
            source: "Class".to_string(),
            level: 2,
            text: "You tap into a deep wellspring of magic within yourself. You have 6 sorcery points.".to_string(),
            consumes: None,
        },
        Feature {
            name: "Metamagic: Quickened Spell".to_string(),
            source: "Class".to_string(),
            level: 3,
            text: "When you cast a spell that has a casting time of 1 action, you can spend 2 sorcery points to change the casting time to 1 bonus action.".to_string(),
            consumes: None,
        },
    ];

    let mut sorcery_points =
        TrackedResource::new("Sorcery Points", ResourceFormula::SorceryPointsStandard);
    sorcery_points.max = 6;
    sorcery_points.current = 6;
    character.resources = vec![sorcery_points];

    character
}

#[allow(clippy::too_many_arguments)]
fn spell(
    name: &str,
    level: u8,
    school: &str,
    casting_time: &str,
    range: &str,
    components: &str,
    duration: &str,
    description: &str,
) -> Spell {
    let mut spell = Spell::new(name, level);
    spell.school = school.to_string();
    spell.casting_time = casting_time.to_string();
    spell.range = range.to_string();
    spell.components = components.to_string();
    spell.duration = duration.to_string();
    spell.description = description.to_string();
    spell.prepared = true;
    spell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    #[test]
    fn test_sample_sorcerer_is_consistent() {
        let character = create_sample_sorcerer();

        assert_eq!(character.name, "Leo & Orion");
        assert_eq!(character.level, 6);
        assert_eq!(character.abilities.constitution.total, 17);
        assert_eq!(character.abilities.charisma.modifier, 2);

        // Stored numbers agree with the calculators.
        assert_eq!(
            character.vitals.hp.max,
            stats::max_hp(
                character.level,
                character.abilities.constitution.modifier,
                &character.class_name
            )
        );
        assert_eq!(
            character.vitals.proficiency_bonus,
            stats::proficiency_bonus(character.level)
        );
        let slots = stats::spell_slots(character.level, &character.class_name);
        assert_eq!(slots.get(&1), Some(&4));
        assert_eq!(slots.get(&3), Some(&3));
    }

    #[test]
    fn test_sample_sorcerer_save_proficiencies() {
        let character = create_sample_sorcerer();
        assert!(character.abilities.constitution.save_proficiency);
        assert!(character.abilities.charisma.save_proficiency);
        assert!(!character.abilities.strength.save_proficiency);

        // CON +3 with proficiency +3, CHA +2 with proficiency +3.
        assert_eq!(character.save_modifier(Ability::Constitution), 6);
        assert_eq!(character.save_modifier(Ability::Charisma), 5);
        assert_eq!(character.save_modifier(Ability::Strength), -1);
    }

    #[test]
    fn test_sample_sorcerer_skills() {
        let character = create_sample_sorcerer();
        assert_eq!(
            character.skill_proficiency(Skill::Arcana),
            ProficiencyLevel::Proficient
        );
        // INT +2 plus proficiency +3.
        assert_eq!(character.skill_modifier(Skill::Arcana), 5);
        // WIS -1, no proficiency.
        assert_eq!(character.skill_modifier(Skill::Perception), -1);
    }

    #[test]
    fn test_recording_notifier_captures_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.deliver(&RollEntry::new("First", 12, "12", "d20", true));
        notifier.deliver(&RollEntry::new("Second", 7, "(3 + 4)", "d6", true));

        let delivered = notifier.delivered();
        assert_eq!(notifier.count(), 2);
        assert_eq!(delivered[0].label, "First");
        assert_eq!(delivered[1].result, 7);
    }
}
