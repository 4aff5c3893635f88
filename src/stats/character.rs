//! Character base stats
//!
//! `CharacterStats` is the contract the aggregator writes equipment bonuses
//! through. `CharacterSheet` is a reference model with base attributes, an
//! equipment bonus layer, and derived values.

use serde::{Deserialize, Serialize};

use crate::items::{StatBonuses, StatChannel};

/// Stat model owned by the character, mutated by equipment changes
pub trait CharacterStats {
    /// Set the equipment bonus for one channel
    fn modify_stat(&mut self, channel: StatChannel, value: i32);

    /// Recompute derived values (attack, defense, max HP, ...) from base
    /// stats plus bonuses
    fn recalculate_derived(&mut self);

    fn max_hp(&self) -> i32;

    fn current_hp(&self) -> i32;

    fn set_current_hp(&mut self, hp: i32);
}

/// Core RPG attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Strength - physical damage
    pub strength: i32,
    /// Dexterity - speed, dodge, crit
    pub dexterity: i32,
    /// Intelligence - magic damage, mana
    pub intelligence: i32,
    /// Vitality - HP, defense
    pub vitality: i32,
}

impl Attributes {
    pub fn new(str: i32, dex: i32, int: i32, vit: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            intelligence: int,
            vitality: vit,
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(10, 10, 10, 10)
    }
}

/// Derived combat values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derived {
    pub attack: i32,
    pub defense: i32,
    pub max_hp: i32,
    pub max_mp: i32,
}

/// Health pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }
}

/// Reference character model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub base: Attributes,
    /// Equipment layer written by the aggregator
    pub bonuses: StatBonuses,
    pub derived: Derived,
    pub health: Health,
    /// Lowest max HP the formulas may produce
    pub max_hp_floor: i32,
}

impl CharacterSheet {
    pub fn new(base: Attributes) -> Self {
        let mut sheet = Self {
            base,
            bonuses: StatBonuses::new(),
            derived: Derived::default(),
            health: Health::new(1),
            max_hp_floor: 1,
        };
        sheet.recalculate_derived();
        sheet.health = Health::new(sheet.derived.max_hp);
        sheet
    }

    pub fn with_max_hp_floor(mut self, floor: i32) -> Self {
        self.max_hp_floor = floor.max(1);
        self.recalculate_derived();
        self
    }

    /// Attribute including equipment bonus
    pub fn effective(&self, channel: StatChannel) -> i32 {
        let base = match channel {
            StatChannel::Strength => self.base.strength,
            StatChannel::Dexterity => self.base.dexterity,
            StatChannel::Intelligence => self.base.intelligence,
            StatChannel::Vitality => self.base.vitality,
            _ => 0,
        };
        base + self.bonuses.get(channel)
    }

    /// Max HP from vitality: 50 + VIT * 5, plus flat bonuses
    pub fn max_hp_formula(vitality: i32, flat: i32) -> i32 {
        50 + vitality * 5 + flat
    }

    /// Max MP from intelligence: 20 + INT * 3, plus flat bonuses
    pub fn max_mp_formula(intelligence: i32, flat: i32) -> i32 {
        20 + intelligence * 3 + flat
    }
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self::new(Attributes::default())
    }
}

impl CharacterStats for CharacterSheet {
    fn modify_stat(&mut self, channel: StatChannel, value: i32) {
        self.bonuses.set(channel, value);
    }

    fn recalculate_derived(&mut self) {
        let strength = self.effective(StatChannel::Strength);
        let vitality = self.effective(StatChannel::Vitality);
        let intelligence = self.effective(StatChannel::Intelligence);

        self.derived = Derived {
            // Base 2 + STR/2
            attack: 2 + strength / 2 + self.bonuses.get(StatChannel::Attack),
            defense: vitality / 4 + self.bonuses.get(StatChannel::Defense),
            max_hp: Self::max_hp_formula(vitality, self.bonuses.get(StatChannel::MaxHp))
                .max(self.max_hp_floor),
            max_mp: Self::max_mp_formula(intelligence, self.bonuses.get(StatChannel::MaxMp)).max(0),
        };
        self.health.max = self.derived.max_hp;
    }

    fn max_hp(&self) -> i32 {
        self.health.max
    }

    fn current_hp(&self) -> i32 {
        self.health.current
    }

    fn set_current_hp(&mut self, hp: i32) {
        self.health.current = hp;
    }
}
