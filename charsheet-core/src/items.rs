//! Standard item reference data.
//!
//! Predefined armor, magic items, and adventuring gear that can be
//! added to a sheet by name. Catalog entries are templates; every
//! lookup hands back a copy with its own id so duplicates in one
//! inventory never collide.

use uuid::Uuid;

use crate::model::{Ability, Item};

/// Get a standard armor piece or shield by name.
pub fn standard_armor(name: &str) -> Option<Item> {
    let name_lower = name.to_lowercase();
    STANDARD_ARMOR
        .iter()
        .find(|i| i.name.to_lowercase() == name_lower)
        .map(fresh)
}

/// Get a magic item by name.
pub fn magic_item(name: &str) -> Option<Item> {
    let name_lower = name.to_lowercase();
    MAGIC_ITEMS
        .iter()
        .find(|i| i.name.to_lowercase() == name_lower)
        .map(fresh)
}

/// Get a piece of mundane adventuring gear by name.
pub fn adventuring_gear(name: &str) -> Option<Item> {
    let name_lower = name.to_lowercase();
    ADVENTURING_GEAR
        .iter()
        .find(|i| i.name.to_lowercase() == name_lower)
        .map(fresh)
}

/// Try to find any catalog item by name.
pub fn find_item(name: &str) -> Option<Item> {
    standard_armor(name)
        .or_else(|| magic_item(name))
        .or_else(|| adventuring_gear(name))
}

fn fresh(item: &Item) -> Item {
    let mut item = item.clone();
    item.id = Uuid::new_v4();
    item
}

// ============================================================================
// Armor
// ============================================================================

lazy_static::lazy_static! {
    /// Standard armor and shields.
    pub static ref STANDARD_ARMOR: Vec<Item> = vec![
        // Light Armor
        Item::armor("Padded Armor", "LA", 11).with_weight(8.0),
        Item::armor("Leather Armor", "LA", 11).with_weight(10.0),
        Item::armor("Studded Leather", "LA", 12).with_weight(13.0),

        // Medium Armor
        Item::armor("Hide Armor", "MA", 12).with_weight(12.0),
        Item::armor("Chain Shirt", "MA", 13).with_weight(20.0),
        Item::armor("Scale Mail", "MA", 14).with_weight(45.0),
        Item::armor("Breastplate", "MA", 14).with_weight(20.0),
        Item::armor("Half Plate", "MA", 15).with_weight(40.0),

        // Heavy Armor
        Item::armor("Ring Mail", "HA", 14).with_weight(40.0),
        Item::armor("Chain Mail", "HA", 16).with_weight(55.0),
        Item::armor("Splint Armor", "HA", 17).with_weight(60.0),
        Item::armor("Plate Armor", "HA", 18).with_weight(65.0),

        // Shields
        Item::armor("Shield", "S", 2).with_weight(6.0),
    ];

    /// Magic items that modify stats or AC.
    pub static ref MAGIC_ITEMS: Vec<Item> = vec![
        Item::armor("Studded Leather +1", "LA", 12)
            .with_weight(13.0)
            .with_bonus_ac(1),
        Item::armor("Plate Armor +1", "HA", 18)
            .with_weight(65.0)
            .with_bonus_ac(1),
        Item::armor("Shield +1", "S", 3).with_weight(6.0),
        Item::new("Ring of Protection")
            .requires_attunement()
            .with_bonus_ac(1),
        Item::new("Cloak of Protection")
            .with_weight(1.0)
            .requires_attunement()
            .with_bonus_ac(1),
        Item::new("Gauntlets of Ogre Power")
            .with_weight(2.0)
            .requires_attunement()
            .with_ability_override(Ability::Strength, 19),
        Item::new("Headband of Intellect")
            .requires_attunement()
            .with_ability_override(Ability::Intelligence, 19),
        Item::new("Amulet of Health")
            .with_weight(1.0)
            .requires_attunement()
            .with_ability_override(Ability::Constitution, 19),
        Item::new("Belt of Hill Giant Strength")
            .requires_attunement()
            .with_ability_override(Ability::Strength, 21),
    ];

    /// Mundane adventuring gear.
    pub static ref ADVENTURING_GEAR: Vec<Item> = vec![
        Item::new("Backpack").with_weight(5.0),
        Item::new("Bedroll").with_weight(7.0),
        Item::new("Rations (1 day)").with_weight(2.0),
        Item::new("Waterskin").with_weight(5.0),
        Item::new("Torch").with_weight(1.0),
        Item::new("Rope (50 feet)").with_weight(10.0),
        Item::new("Tinderbox").with_weight(1.0),
        Item::new("Arcane Focus (Orb)")
            .with_weight(3.0)
            .with_notes("A crystal orb used as a spellcasting focus."),
        Item::new("Component Pouch").with_weight(2.0),
        Item::new("Thieves' Tools")
            .with_weight(1.0)
            .with_notes("Required for picking locks and disarming traps."),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArmorCategory;

    #[test]
    fn test_standard_armor_lookup() {
        let plate = standard_armor("Plate Armor").unwrap();
        assert_eq!(plate.ac, Some(18));
        assert_eq!(plate.armor_category(), Some(ArmorCategory::Heavy));

        // Case insensitive
        let leather = standard_armor("studded leather").unwrap();
        assert_eq!(leather.ac, Some(12));
    }

    #[test]
    fn test_shield_entry() {
        let shield = standard_armor("Shield").unwrap();
        assert_eq!(shield.armor_category(), Some(ArmorCategory::Shield));
        assert_eq!(shield.ac, Some(2));
    }

    #[test]
    fn test_magic_item_overrides() {
        let gauntlets = magic_item("Gauntlets of Ogre Power").unwrap();
        assert!(gauntlets.req_attune);
        assert_eq!(gauntlets.ability_override(Ability::Strength), Some(19));

        let ring = magic_item("Ring of Protection").unwrap();
        assert_eq!(ring.bonus_ac, Some(1));
    }

    #[test]
    fn test_find_item_searches_all_lists() {
        assert!(find_item("Chain Mail").is_some());
        assert!(find_item("Amulet of Health").is_some());
        assert!(find_item("Backpack").is_some());
        assert!(find_item("Vorpal Sword").is_none());
    }

    #[test]
    fn test_lookups_return_fresh_ids() {
        let first = standard_armor("Shield").unwrap();
        let second = standard_armor("Shield").unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.name, second.name);
    }
}
