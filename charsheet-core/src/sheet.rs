//! CharacterSheet - the primary public API for working with a character.
//!
//! This module wraps a character record, the derived-stat calculators,
//! dice rolling, roll notification, and persistence into a single
//! interface. Mutations go through the sheet so derived fields are
//! always recomputed and the autosave dirty flag stays accurate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::classes::{next_level_xp, CharacterClass};
use crate::dice::{self, Advantage, RollOutcome};
use crate::model::{
    Ability, Character, Item, ModifierKind, ModifierParseError, RollEntry, Skill, SlotState,
    StatModifier,
};
use crate::notify::RollNotifier;
use crate::persist::{PersistError, SavedCharacter};
use crate::resources::ResourceContext;
use crate::stats::{self, ResolvedArmorClass};

/// A character sheet.
///
/// Owns the character record plus an optional roll notifier and
/// autosave path. Every mutator recomputes the derived fields, so the
/// record read through [`CharacterSheet::character`] is always
/// internally consistent.
pub struct CharacterSheet {
    character: Character,
    notifier: Option<Arc<dyn RollNotifier>>,
    autosave_path: Option<PathBuf>,
    dirty: bool,
}

impl CharacterSheet {
    /// Wrap a character record, recomputing all derived fields.
    pub fn new(character: Character) -> Self {
        let mut sheet = Self {
            character,
            notifier: None,
            autosave_path: None,
            dirty: false,
        };
        sheet.recalculate();
        sheet
    }

    /// Attach a notifier that receives rolls when the character's
    /// Discord toggle is on.
    pub fn with_notifier(mut self, notifier: Arc<dyn RollNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the path `autosave` writes to.
    pub fn with_autosave_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.autosave_path = Some(path.into());
        self
    }

    /// Get a reference to the character record.
    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Get a mutable reference to the character record.
    ///
    /// Use with caution - direct modifications bypass recalculation
    /// and the dirty flag. Call [`CharacterSheet::recalculate`]
    /// afterwards.
    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute every derived field from the current record.
    ///
    /// Ability totals, AC, max HP, proficiency bonus, initiative, hit
    /// dice, spell-slot maxima, passive senses, XP threshold, and
    /// resource maxima are all refreshed; tracked currents are clamped
    /// into their new ranges. Running this twice changes nothing.
    pub fn recalculate(&mut self) {
        let character = &mut self.character;

        character.abilities = stats::resolve(&character.abilities, &character.inventory);

        let dex_modifier = character.abilities.dexterity.modifier;
        let con_modifier = character.abilities.constitution.modifier;

        character.vitals.proficiency_bonus = stats::proficiency_bonus(character.level);
        character.vitals.initiative = dex_modifier;
        character.vitals.ac = stats::resolve_ac(dex_modifier, &character.inventory).total;

        let max_hp = stats::max_hp(character.level, con_modifier, &character.class_name);
        character.vitals.hp.max = max_hp;
        character.vitals.hp.current = character.vitals.hp.current.min(max_hp);

        let hit_die = CharacterClass::from_name(&character.class_name)
            .map(|class| class.hit_die())
            .unwrap_or(8);
        character.vitals.hit_dice.max = character.level;
        character.vitals.hit_dice.current =
            character.vitals.hit_dice.current.min(character.level);
        character.vitals.hit_dice.face = format!("d{hit_die}");

        let maxima = stats::spell_slots(character.level, &character.class_name);
        let mut slots = BTreeMap::new();
        for (&slot_level, &max) in &maxima {
            // Newly gained slot levels start full.
            let current = character
                .spell_slots
                .get(&slot_level)
                .map(|s| s.current.min(max))
                .unwrap_or(max);
            slots.insert(slot_level, SlotState { current, max });
        }
        character.spell_slots = slots;

        character.senses.passive_perception = 10 + character.skill_modifier(Skill::Perception);
        character.senses.passive_investigation =
            10 + character.skill_modifier(Skill::Investigation);
        character.senses.passive_insight = 10 + character.skill_modifier(Skill::Insight);

        character.xp.max = next_level_xp(character.level);

        let ctx = ResourceContext {
            level: character.level,
            con_modifier,
            proficiency_bonus: character.vitals.proficiency_bonus,
            max_slots: &maxima,
        };
        for resource in &mut character.resources {
            resource.recompute(&ctx);
        }
    }

    /// The current armor class with the lines explaining it.
    pub fn armor_class(&self) -> ResolvedArmorClass {
        stats::resolve_ac(
            self.character.abilities.dexterity.modifier,
            &self.character.inventory,
        )
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Set the base value of an ability score.
    pub fn set_base_score(&mut self, ability: Ability, base: i32) {
        self.character.abilities.get_mut(ability).base = base;
        self.touch();
    }

    /// Set the character level.
    pub fn set_level(&mut self, level: u32) {
        self.character.level = level;
        self.touch();
    }

    /// Set the class name.
    pub fn set_class_name(&mut self, name: impl Into<String>) {
        self.character.class_name = name.into();
        self.touch();
    }

    /// Add an item to the inventory.
    pub fn add_item(&mut self, item: Item) {
        self.character.inventory.push(item);
        self.touch();
    }

    /// Remove an item by id, returning it if present.
    pub fn remove_item(&mut self, id: Uuid) -> Option<Item> {
        let index = self.character.inventory.iter().position(|i| i.id == id)?;
        let item = self.character.inventory.remove(index);
        self.touch();
        Some(item)
    }

    /// Equip or unequip an item. Returns false for an unknown id.
    pub fn set_equipped(&mut self, id: Uuid, equipped: bool) -> bool {
        match self.character.item_mut(id) {
            Some(item) => {
                item.equipped = equipped;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Attune or unattune an item. Returns false for an unknown id.
    pub fn set_attuned(&mut self, id: Uuid, attuned: bool) -> bool {
        match self.character.item_mut(id) {
            Some(item) => {
                item.is_attuned = attuned;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Add a manual modifier to an ability from a raw value string.
    ///
    /// Non-numeric input is rejected rather than treated as zero.
    pub fn add_manual_modifier(
        &mut self,
        ability: Ability,
        source: &str,
        raw_value: &str,
        kind: ModifierKind,
    ) -> Result<(), ModifierParseError> {
        let modifier = StatModifier::from_input(source, raw_value, kind)?;
        self.character
            .abilities
            .get_mut(ability)
            .manual_modifiers
            .push(modifier);
        self.touch();
        Ok(())
    }

    /// Remove a manual modifier by id. Returns false if not found.
    pub fn remove_manual_modifier(&mut self, ability: Ability, id: &str) -> bool {
        let modifiers = &mut self.character.abilities.get_mut(ability).manual_modifiers;
        let before = modifiers.len();
        modifiers.retain(|m| m.id != id);
        let removed = modifiers.len() < before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Step a skill through none -> proficient -> expertise -> none.
    pub fn cycle_skill_proficiency(&mut self, skill: Skill) {
        if let Some(state) = self
            .character
            .skills
            .iter_mut()
            .find(|s| s.skill == skill)
        {
            state.proficiency = state.proficiency.cycle();
            self.touch();
        }
    }

    /// Set saving-throw proficiency for an ability.
    pub fn set_save_proficiency(&mut self, ability: Ability, proficient: bool) {
        self.character.abilities.get_mut(ability).save_proficiency = proficient;
        self.touch();
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.recalculate();
    }

    // ------------------------------------------------------------------
    // Rolls
    // ------------------------------------------------------------------

    /// Evaluate a dice formula, record it in the roll history, and
    /// notify the configured sink when the Discord toggle is on.
    pub fn roll(&mut self, label: &str, formula: &str, mode: Advantage) -> RollOutcome {
        let outcome = dice::evaluate(formula, mode);
        let entry = RollEntry::new(
            format!("{label}{}", mode.label_suffix()),
            outcome.total,
            outcome.details.clone(),
            outcome.dice_type.clone(),
            self.character.send_rolls_to_discord,
        );

        if entry.send_to_discord {
            if let Some(notifier) = &self.notifier {
                notifier.deliver(&entry);
            }
        }

        self.character.roll_history.push(entry);
        self.dirty = true;
        outcome
    }

    /// Roll a d20 ability check using the current modifier.
    pub fn ability_check(&mut self, ability: Ability, mode: Advantage) -> RollOutcome {
        let modifier = self.character.abilities.get(ability).modifier;
        self.modifier_roll(&format!("{} Check", ability.name()), modifier, mode)
    }

    /// Roll a d20 saving throw, including save proficiency.
    pub fn saving_throw(&mut self, ability: Ability, mode: Advantage) -> RollOutcome {
        let modifier = self.character.save_modifier(ability);
        self.modifier_roll(&format!("{} Save", ability.name()), modifier, mode)
    }

    /// Roll a d20 skill check, including proficiency or expertise.
    pub fn skill_check(&mut self, skill: Skill, mode: Advantage) -> RollOutcome {
        let modifier = self.character.skill_modifier(skill);
        self.modifier_roll(&format!("{} Check", skill.name()), modifier, mode)
    }

    /// Roll initiative.
    pub fn initiative_roll(&mut self, mode: Advantage) -> RollOutcome {
        let modifier = self.character.vitals.initiative;
        self.modifier_roll("Initiative", modifier, mode)
    }

    fn modifier_roll(&mut self, label: &str, modifier: i32, mode: Advantage) -> RollOutcome {
        let formula = if modifier >= 0 {
            format!("1d20 + {modifier}")
        } else {
            format!("1d20 - {}", -modifier)
        };
        self.roll(label, &formula, mode)
    }

    // ------------------------------------------------------------------
    // Spell slots
    // ------------------------------------------------------------------

    /// Spend one spell slot of the given level. Returns false if no
    /// slot of that level remains.
    pub fn use_spell_slot(&mut self, slot_level: u8) -> bool {
        let spent = self
            .character
            .spell_slots
            .get_mut(&slot_level)
            .map(|slot| slot.spend())
            .unwrap_or(false);
        if spent {
            self.dirty = true;
        }
        spent
    }

    /// Restore every spell slot to its maximum, as on a long rest.
    pub fn recover_slots(&mut self) {
        for slot in self.character.spell_slots.values_mut() {
            slot.recover_all();
        }
        self.dirty = true;
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save the character to a JSON file and clear the dirty flag.
    pub async fn save(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        SavedCharacter::new(self.character.clone())
            .save_json(path)
            .await?;
        self.dirty = false;
        Ok(())
    }

    /// Load a character from a JSON file into a fresh sheet.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let saved = SavedCharacter::load_json(path).await?;
        Ok(Self::new(saved.character))
    }

    /// Persist to the configured autosave path if there are unsaved
    /// changes. Returns true when a write happened.
    pub async fn autosave(&mut self) -> Result<bool, PersistError> {
        if !self.dirty {
            return Ok(false);
        }
        let Some(path) = self.autosave_path.clone() else {
            return Ok(false);
        };
        SavedCharacter::new(self.character.clone())
            .save_json(&path)
            .await?;
        self.dirty = false;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_sample_sorcerer, RecordingNotifier};

    #[test]
    fn test_new_refreshes_stale_derived_fields() {
        // The sample ships with a stored AC of 12 from an older sheet;
        // unarmored with +1 DEX it recomputes to 11.
        let sheet = CharacterSheet::new(create_sample_sorcerer());
        assert_eq!(sheet.character().vitals.ac, 11);
        assert_eq!(
            sheet.armor_class().breakdown,
            vec!["Unarmored: 10", "Dexterity: +1"]
        );

        // Everything else already agreed with the calculators.
        assert_eq!(sheet.character().vitals.hp.max, 44);
        assert_eq!(sheet.character().vitals.proficiency_bonus, 3);
        assert_eq!(sheet.character().vitals.initiative, 1);
        assert_eq!(sheet.character().xp.max, 23000);
        assert_eq!(sheet.character().senses.passive_perception, 9);
        assert_eq!(sheet.character().senses.passive_investigation, 12);
        assert_eq!(sheet.character().senses.passive_insight, 12);
        assert!(!sheet.is_dirty());
    }

    #[test]
    fn test_recalculate_is_idempotent() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        let first = sheet.character().clone();
        sheet.recalculate();
        assert_eq!(sheet.character(), &first);
    }

    #[test]
    fn test_set_level_cascades() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        sheet.set_level(7);

        let character = sheet.character();
        assert_eq!(character.vitals.proficiency_bonus, 3);
        // d6 class, CON +3: 9 at level 1, +7 for each of 6 more levels.
        assert_eq!(character.vitals.hp.max, 51);
        assert_eq!(character.vitals.hit_dice.max, 7);
        assert_eq!(character.xp.max, 34000);
        // Level 7 gains a 4th-level slot, which starts full.
        assert_eq!(character.spell_slots.get(&4).map(|s| s.current), Some(1));
        assert!(sheet.is_dirty());
    }

    #[test]
    fn test_equip_armor_updates_ac() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        let mut armor = crate::items::standard_armor("Studded Leather")
            .expect("catalog armor");
        armor.equipped = true;
        let armor_id = armor.id;
        sheet.add_item(armor);
        assert_eq!(sheet.character().vitals.ac, 13);

        sheet.set_equipped(armor_id, false);
        assert_eq!(sheet.character().vitals.ac, 11);
    }

    #[test]
    fn test_attunement_override_cascades_to_hp() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        let amulet = crate::items::magic_item("Amulet of Health").expect("catalog item");
        let amulet_id = amulet.id;
        sheet.add_item(amulet);

        // Carried but not attuned: nothing changes.
        assert_eq!(sheet.character().abilities.constitution.total, 17);

        sheet.set_attuned(amulet_id, true);
        assert_eq!(sheet.character().abilities.constitution.total, 19);
        // CON +4 raises max HP; current stays where it was.
        assert_eq!(sheet.character().vitals.hp.max, 50);
        assert_eq!(sheet.character().vitals.hp.current, 44);

        sheet.set_attuned(amulet_id, false);
        assert_eq!(sheet.character().vitals.hp.max, 44);
        assert_eq!(sheet.character().vitals.hp.current, 44);
    }

    #[test]
    fn test_manual_modifier_rejects_garbage() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        let result =
            sheet.add_manual_modifier(Ability::Strength, "Blessing", "three", ModifierKind::Bonus);
        assert!(result.is_err());
        assert!(sheet.character().abilities.strength.manual_modifiers.is_empty());

        sheet
            .add_manual_modifier(Ability::Strength, "Blessing", "3", ModifierKind::Bonus)
            .expect("numeric value");
        assert_eq!(sheet.character().abilities.strength.total, 11);
    }

    #[test]
    fn test_remove_manual_modifier_by_id() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        sheet
            .add_manual_modifier(Ability::Charisma, "Wish", "2", ModifierKind::Bonus)
            .expect("numeric value");
        assert_eq!(sheet.character().abilities.charisma.total, 17);

        let id = sheet.character().abilities.charisma.manual_modifiers[0]
            .id
            .clone();
        assert!(sheet.remove_manual_modifier(Ability::Charisma, &id));
        assert_eq!(sheet.character().abilities.charisma.total, 15);
        assert!(!sheet.remove_manual_modifier(Ability::Charisma, &id));
    }

    #[test]
    fn test_cycle_proficiency_updates_passives() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        assert_eq!(sheet.character().senses.passive_perception, 9);

        sheet.cycle_skill_proficiency(Skill::Perception);
        assert_eq!(sheet.character().senses.passive_perception, 12);

        sheet.cycle_skill_proficiency(Skill::Perception);
        assert_eq!(sheet.character().senses.passive_perception, 15);

        sheet.cycle_skill_proficiency(Skill::Perception);
        assert_eq!(sheet.character().senses.passive_perception, 9);
    }

    #[test]
    fn test_roll_appends_history_with_label_suffix() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        let outcome = sheet.roll("Fireball", "8d6", Advantage::Advantage);

        let history = &sheet.character().roll_history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].label, "Fireball (Adv)");
        assert_eq!(history[0].result, outcome.total);
        assert_eq!(history[0].dice_type, "d6");
        assert!(sheet.is_dirty());
    }

    #[test]
    fn test_roll_notifies_only_when_toggled() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mut character = create_sample_sorcerer();
        character.send_rolls_to_discord = true;

        let mut sheet = CharacterSheet::new(character).with_notifier(notifier.clone());
        sheet.roll("Attack", "1d20 + 4", Advantage::Normal);
        assert_eq!(notifier.count(), 1);
        assert_eq!(notifier.delivered()[0].label, "Attack");

        sheet.character_mut().send_rolls_to_discord = false;
        sheet.roll("Attack", "1d20 + 4", Advantage::Normal);
        assert_eq!(notifier.count(), 1);
        assert_eq!(sheet.character().roll_history.len(), 2);
    }

    #[test]
    fn test_saving_throw_uses_proficiency() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        // CON save is +6; totals stay inside 1d20 + 6.
        for _ in 0..50 {
            let outcome = sheet.saving_throw(Ability::Constitution, Advantage::Normal);
            assert!((7..=26).contains(&outcome.total));
        }
        let last = sheet.character().roll_history.last().expect("history entry");
        assert_eq!(last.label, "Constitution Save");
    }

    #[test]
    fn test_skill_check_label_and_range() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        // Arcana is INT +2 with proficiency +3.
        let outcome = sheet.skill_check(Skill::Arcana, Advantage::Disadvantage);
        assert!((6..=25).contains(&outcome.total));
        let last = sheet.character().roll_history.last().expect("history entry");
        assert_eq!(last.label, "Arcana Check (Dis)");
    }

    #[test]
    fn test_spell_slot_tracking() {
        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        assert!(sheet.use_spell_slot(1));
        assert!(sheet.use_spell_slot(1));
        assert_eq!(
            sheet.character().spell_slots.get(&1).map(|s| s.current),
            Some(2)
        );

        // No 5th-level slots at level 6.
        assert!(!sheet.use_spell_slot(5));

        sheet.recover_slots();
        assert_eq!(
            sheet.character().spell_slots.get(&1).map(|s| s.current),
            Some(4)
        );
    }

    #[tokio::test]
    async fn test_autosave_only_when_dirty() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("autosave.json");

        let mut sheet =
            CharacterSheet::new(create_sample_sorcerer()).with_autosave_path(&path);

        // Clean sheet: no write.
        assert!(!sheet.autosave().await.expect("autosave should succeed"));
        assert!(!path.exists());

        sheet.set_level(7);
        assert!(sheet.autosave().await.expect("autosave should succeed"));
        assert!(path.exists());

        // Nothing changed since: no write.
        assert!(!sheet.autosave().await.expect("autosave should succeed"));
    }

    #[tokio::test]
    async fn test_save_load_round_trip_preserves_history() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("leo.json");

        let mut sheet = CharacterSheet::new(create_sample_sorcerer());
        sheet.roll("Fire Bolt", "2d10", Advantage::Normal);
        sheet.save(&path).await.expect("save should succeed");
        assert!(!sheet.is_dirty());

        let restored = CharacterSheet::load(&path).await.expect("load should succeed");
        assert_eq!(restored.character().name, "Leo & Orion");
        assert_eq!(restored.character().roll_history.len(), 1);
        assert_eq!(restored.character().roll_history[0].label, "Fire Bolt");
    }
}
