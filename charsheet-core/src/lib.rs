//! D&D 5e character sheet engine.
//!
//! This crate provides:
//! - A permissive dice formula engine with advantage and disadvantage
//! - Ability score resolution with item bonuses and overrides
//! - Derived statistics: armor class, hit points, proficiency bonus,
//!   spell slots, passive senses, and class resource pools
//! - Guided character creation with standard array, point buy, and
//!   rolled scores
//! - Versioned JSON persistence
//! - Optional roll delivery to a Discord webhook
//!
//! # Quick Start
//!
//! ```ignore
//! use charsheet_core::{Advantage, CharacterBuilder, CharacterClass, CharacterSheet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let character = CharacterBuilder::new()
//!         .name("Astra")
//!         .class(CharacterClass::Sorcerer)
//!         .standard_array([8, 12, 14, 10, 13, 15])
//!         .build()?;
//!
//!     let mut sheet = CharacterSheet::new(character);
//!     let outcome = sheet.roll("Fire Bolt", "2d10", Advantage::Normal);
//!     println!("{}", outcome);
//!
//!     sheet.save("astra.json").await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod classes;
pub mod dice;
pub mod items;
pub mod model;
pub mod notify;
pub mod persist;
pub mod resources;
pub mod sheet;
pub mod stats;
pub mod testing;

// Primary public API
pub use builder::{AbilityMethod, BuilderError, CharacterBuilder};
pub use classes::CharacterClass;
pub use dice::{Advantage, DiceFormula, RollOutcome};
pub use model::{Ability, Character, Item, RollEntry, Skill};
pub use notify::{DiscordWebhook, RollNotifier};
pub use persist::{PersistError, SavedCharacter};
pub use sheet::CharacterSheet;
pub use stats::ResolvedArmorClass;
