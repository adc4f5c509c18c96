//! Tracked class resources.
//!
//! Spendable pools such as sorcery points, shown alongside spell
//! slots. Each pool carries a formula describing how its maximum is
//! derived from the rest of the sheet; recalculation refreshes the
//! maximum and clamps the current value into range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a resource's maximum is derived when the sheet recalculates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceFormula {
    /// Standard sorcery points: one per level, starting at level 2.
    SorceryPointsStandard,
    /// Homebrew sorcery points: level plus the point value of every
    /// spell slot on the table.
    SorceryPointsHomebrew,
    /// Homebrew core strain: constitution modifier plus proficiency
    /// bonus, never below 1.
    CoreStrain,
    /// User-entered maximum, left alone by recalculation.
    Manual,
}

/// Point value of a spell slot when converting slots into sorcery
/// points under the homebrew rules.
pub fn slot_point_value(slot_level: u8) -> u32 {
    match slot_level {
        1 => 2,
        2 => 3,
        3 => 5,
        4 => 6,
        5 => 7,
        6 => 9,
        7 => 10,
        8 => 11,
        9 => 13,
        _ => 0,
    }
}

/// Sheet values a resource formula can draw on.
#[derive(Debug, Clone, Copy)]
pub struct ResourceContext<'a> {
    pub level: u32,
    pub con_modifier: i32,
    pub proficiency_bonus: i32,
    /// Maximum spell slots per slot level.
    pub max_slots: &'a BTreeMap<u8, u8>,
}

impl ResourceFormula {
    /// The maximum this formula yields, or `None` for manual pools.
    pub fn max_value(&self, ctx: &ResourceContext) -> Option<u32> {
        match self {
            ResourceFormula::SorceryPointsStandard => {
                Some(if ctx.level >= 2 { ctx.level } else { 0 })
            }
            ResourceFormula::SorceryPointsHomebrew => {
                let from_slots: u32 = ctx
                    .max_slots
                    .iter()
                    .map(|(slot_level, count)| slot_point_value(*slot_level) * u32::from(*count))
                    .sum();
                Some(ctx.level + from_slots)
            }
            ResourceFormula::CoreStrain => {
                Some((ctx.con_modifier + ctx.proficiency_bonus).max(1) as u32)
            }
            ResourceFormula::Manual => None,
        }
    }
}

/// A spendable pool tracked on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedResource {
    pub name: String,
    pub current: u32,
    pub max: u32,
    pub formula: ResourceFormula,
}

impl TrackedResource {
    pub fn new(name: impl Into<String>, formula: ResourceFormula) -> Self {
        TrackedResource {
            name: name.into(),
            current: 0,
            max: 0,
            formula,
        }
    }

    /// A pool with a fixed, user-entered maximum, starting full.
    pub fn manual(name: impl Into<String>, max: u32) -> Self {
        TrackedResource {
            name: name.into(),
            current: max,
            max,
            formula: ResourceFormula::Manual,
        }
    }

    /// Refresh `max` from the formula and keep `current` within it.
    pub fn recompute(&mut self, ctx: &ResourceContext) {
        if let Some(max) = self.formula.max_value(ctx) {
            self.max = max;
        }
        self.current = self.current.min(self.max);
    }

    /// Spend points from the pool; returns false if there are not
    /// enough left, without changing anything.
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn recover_all(&mut self) {
        self.current = self.max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(max_slots: &BTreeMap<u8, u8>) -> ResourceContext<'_> {
        ResourceContext {
            level: 6,
            con_modifier: 3,
            proficiency_bonus: 3,
            max_slots,
        }
    }

    fn sorcerer_slots() -> BTreeMap<u8, u8> {
        // Level 6 full caster: 4 / 3 / 3.
        let mut slots = BTreeMap::new();
        slots.insert(1, 4);
        slots.insert(2, 3);
        slots.insert(3, 3);
        slots
    }

    #[test]
    fn test_standard_sorcery_points_track_level() {
        let slots = BTreeMap::new();
        let mut ctx = context(&slots);

        ctx.level = 1;
        assert_eq!(
            ResourceFormula::SorceryPointsStandard.max_value(&ctx),
            Some(0)
        );
        ctx.level = 2;
        assert_eq!(
            ResourceFormula::SorceryPointsStandard.max_value(&ctx),
            Some(2)
        );
        ctx.level = 20;
        assert_eq!(
            ResourceFormula::SorceryPointsStandard.max_value(&ctx),
            Some(20)
        );
    }

    #[test]
    fn test_homebrew_sorcery_points_include_slot_values() {
        let slots = sorcerer_slots();
        let ctx = context(&slots);
        // 6 + 4x2 + 3x3 + 3x5 = 38.
        assert_eq!(
            ResourceFormula::SorceryPointsHomebrew.max_value(&ctx),
            Some(38)
        );
    }

    #[test]
    fn test_core_strain_floor_of_one() {
        let slots = BTreeMap::new();
        let mut ctx = context(&slots);
        assert_eq!(ResourceFormula::CoreStrain.max_value(&ctx), Some(6));

        ctx.con_modifier = -4;
        ctx.proficiency_bonus = 2;
        assert_eq!(ResourceFormula::CoreStrain.max_value(&ctx), Some(1));
    }

    #[test]
    fn test_manual_pool_is_left_alone() {
        let slots = sorcerer_slots();
        let ctx = context(&slots);
        let mut pool = TrackedResource::manual("Luck Points", 3);
        pool.spend(1);
        pool.recompute(&ctx);
        assert_eq!(pool.max, 3);
        assert_eq!(pool.current, 2);
    }

    #[test]
    fn test_recompute_clamps_current() {
        let slots = BTreeMap::new();
        let mut ctx = context(&slots);
        ctx.level = 6;
        let mut pool = TrackedResource::new("Sorcery Points", ResourceFormula::SorceryPointsStandard);
        pool.recompute(&ctx);
        pool.recover_all();
        assert_eq!(pool.current, 6);

        ctx.level = 4;
        pool.recompute(&ctx);
        assert_eq!(pool.max, 4);
        assert_eq!(pool.current, 4);
    }

    #[test]
    fn test_spend_refuses_overdraft() {
        let mut pool = TrackedResource::manual("Sorcery Points", 2);
        assert!(pool.spend(2));
        assert!(!pool.spend(1));
        assert_eq!(pool.current, 0);
        pool.recover_all();
        assert_eq!(pool.current, 2);
    }
}
