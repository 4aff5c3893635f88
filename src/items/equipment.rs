//! Equipment system
//!
//! Functional and cosmetic slot maps, the weapon conflict table, and bonus
//! totals over equipped items.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::item::{CosmeticSlot, FunctionalSlot, ItemSnapshot, SlotKey, StatBonuses, WeaponFamily};

/// Items currently equipped, one per slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    functional: BTreeMap<FunctionalSlot, ItemSnapshot>,
    cosmetic: BTreeMap<CosmeticSlot, ItemSnapshot>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get item in a slot
    pub fn get(&self, slot: SlotKey) -> Option<&ItemSnapshot> {
        match slot {
            SlotKey::Functional(s) => self.functional.get(&s),
            SlotKey::Cosmetic(s) => self.cosmetic.get(&s),
        }
    }

    /// Check if a slot is empty
    pub fn is_empty(&self, slot: SlotKey) -> bool {
        self.get(slot).is_none()
    }

    /// Check if nothing at all is equipped
    pub fn is_bare(&self) -> bool {
        self.functional.is_empty() && self.cosmetic.is_empty()
    }

    /// Put an item into a slot, returning what was there
    pub(crate) fn place(&mut self, slot: SlotKey, item: ItemSnapshot) -> Option<ItemSnapshot> {
        match slot {
            SlotKey::Functional(s) => self.functional.insert(s, item),
            SlotKey::Cosmetic(s) => self.cosmetic.insert(s, item),
        }
    }

    /// Empty a slot, returning its item
    pub(crate) fn take(&mut self, slot: SlotKey) -> Option<ItemSnapshot> {
        match slot {
            SlotKey::Functional(s) => self.functional.remove(&s),
            SlotKey::Cosmetic(s) => self.cosmetic.remove(&s),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.functional.clear();
        self.cosmetic.clear();
    }

    /// Occupied functional slots in slot order
    pub fn functional(&self) -> &BTreeMap<FunctionalSlot, ItemSnapshot> {
        &self.functional
    }

    /// Occupied cosmetic slots in slot order
    pub fn cosmetic(&self) -> &BTreeMap<CosmeticSlot, ItemSnapshot> {
        &self.cosmetic
    }

    /// Weapon family of whichever weapon slot is occupied
    pub fn active_weapon_family(&self) -> Option<WeaponFamily> {
        self.functional.keys().find_map(|slot| slot.weapon_family())
    }

    /// Check that no slot conflicts with another occupied slot
    pub fn is_consistent(&self) -> bool {
        self.functional.keys().all(|slot| {
            slot.conflicts().iter().all(|other| !self.functional.contains_key(other))
        })
    }

    /// Sum of bonuses over functional slots. Cosmetics never count, and
    /// items missing from the catalog add nothing.
    pub fn total_bonuses(&self, catalog: &dyn Catalog) -> StatBonuses {
        let mut total = StatBonuses::new();
        for item in self.functional.values() {
            if let Some(def) = catalog.definition(&item.item_id) {
                total.accumulate(&def.bonuses);
            }
        }
        total
    }
}

/// Functional slot display info and conflict table
impl FunctionalSlot {
    pub fn name(&self) -> &'static str {
        match self {
            FunctionalSlot::Head => "Head",
            FunctionalSlot::Body => "Body",
            FunctionalSlot::Feet => "Feet",
            FunctionalSlot::MeleeWeapon => "Melee Weapon",
            FunctionalSlot::RangedWeapon => "Ranged Weapon",
            FunctionalSlot::OffHand => "Off Hand",
            FunctionalSlot::Ring => "Ring",
            FunctionalSlot::Necklace => "Necklace",
            FunctionalSlot::Bracelet => "Bracelet",
        }
    }

    /// Get all slots in display order
    pub fn all() -> &'static [FunctionalSlot] {
        &[
            FunctionalSlot::Head,
            FunctionalSlot::Body,
            FunctionalSlot::Feet,
            FunctionalSlot::MeleeWeapon,
            FunctionalSlot::RangedWeapon,
            FunctionalSlot::OffHand,
            FunctionalSlot::Ring,
            FunctionalSlot::Necklace,
            FunctionalSlot::Bracelet,
        ]
    }

    /// Slots that must be empty while this one is occupied
    pub fn conflicts(&self) -> &'static [FunctionalSlot] {
        match self {
            FunctionalSlot::MeleeWeapon => &[FunctionalSlot::RangedWeapon],
            FunctionalSlot::RangedWeapon => &[FunctionalSlot::MeleeWeapon],
            _ => &[],
        }
    }

    pub fn weapon_family(&self) -> Option<WeaponFamily> {
        match self {
            FunctionalSlot::MeleeWeapon => Some(WeaponFamily::Melee),
            FunctionalSlot::RangedWeapon => Some(WeaponFamily::Ranged),
            _ => None,
        }
    }
}

/// Cosmetic slot display info
impl CosmeticSlot {
    pub fn name(&self) -> &'static str {
        match self {
            CosmeticSlot::Head => "Head",
            CosmeticSlot::Body => "Body",
            CosmeticSlot::Feet => "Feet",
            CosmeticSlot::Weapon => "Weapon",
            CosmeticSlot::Hair => "Hair",
            CosmeticSlot::Face => "Face",
            CosmeticSlot::Cape => "Cape",
        }
    }

    /// Cosmetic counterpart of a functional slot, if it has one
    pub fn for_functional(slot: FunctionalSlot) -> Option<CosmeticSlot> {
        match slot {
            FunctionalSlot::Head => Some(CosmeticSlot::Head),
            FunctionalSlot::Body => Some(CosmeticSlot::Body),
            FunctionalSlot::Feet => Some(CosmeticSlot::Feet),
            FunctionalSlot::MeleeWeapon | FunctionalSlot::RangedWeapon => {
                Some(CosmeticSlot::Weapon)
            }
            _ => None,
        }
    }
}

impl SlotKey {
    pub fn name(&self) -> &'static str {
        match self {
            SlotKey::Functional(s) => s.name(),
            SlotKey::Cosmetic(s) => s.name(),
        }
    }

    pub fn is_cosmetic(&self) -> bool {
        matches!(self, SlotKey::Cosmetic(_))
    }

    /// Weapon family for functional weapon slots
    pub fn weapon_family(&self) -> Option<WeaponFamily> {
        match self {
            SlotKey::Functional(s) => s.weapon_family(),
            SlotKey::Cosmetic(_) => None,
        }
    }

    /// Slots that must be vacated before this one is filled
    pub fn conflicts(&self) -> Vec<SlotKey> {
        match self {
            SlotKey::Functional(s) => {
                s.conflicts().iter().copied().map(SlotKey::Functional).collect()
            }
            SlotKey::Cosmetic(_) => Vec::new(),
        }
    }
}
