//! Item definitions
//!
//! Static item definitions, stat channels, slot keys, and the stack model.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Catalog identifier of an item
pub type ItemId = String;

/// Main item kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Equipment,
    Consumable,
    Material,
    QuestItem,
}

impl ItemKind {
    /// Check if items of this kind can go into an equip slot
    pub fn is_equippable(&self) -> bool {
        matches!(self, ItemKind::Equipment)
    }
}

/// Functional equipment slots (contribute stat bonuses)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionalSlot {
    Head,
    Body,
    Feet,
    MeleeWeapon,
    RangedWeapon,
    OffHand,
    Ring,
    Necklace,
    Bracelet,
}

/// Cosmetic slots (appearance only, never contribute stats)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CosmeticSlot {
    Head,
    Body,
    Feet,
    Weapon,
    Hair,
    Face,
    Cape,
}

/// Either kind of slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKey {
    Functional(FunctionalSlot),
    Cosmetic(CosmeticSlot),
}

impl From<FunctionalSlot> for SlotKey {
    fn from(slot: FunctionalSlot) -> Self {
        SlotKey::Functional(slot)
    }
}

impl From<CosmeticSlot> for SlotKey {
    fn from(slot: CosmeticSlot) -> Self {
        SlotKey::Cosmetic(slot)
    }
}

/// Which weapon family is currently in hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponFamily {
    Melee,
    Ranged,
}

/// Stat channels an item can add to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatChannel {
    // Attributes
    Strength,
    Dexterity,
    Intelligence,
    Vitality,

    // Pools
    MaxHp,
    MaxMp,

    // Combat
    Attack,
    Defense,
}

impl StatChannel {
    /// All channels in display order
    pub fn all() -> &'static [StatChannel] {
        &[
            StatChannel::Strength,
            StatChannel::Dexterity,
            StatChannel::Intelligence,
            StatChannel::Vitality,
            StatChannel::MaxHp,
            StatChannel::MaxMp,
            StatChannel::Attack,
            StatChannel::Defense,
        ]
    }
}

/// Per-channel stat values. Missing channels read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatBonuses(BTreeMap<StatChannel, i32>);

impl StatBonuses {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style setter
    pub fn with(mut self, channel: StatChannel, value: i32) -> Self {
        self.set(channel, value);
        self
    }

    pub fn get(&self, channel: StatChannel) -> i32 {
        self.0.get(&channel).copied().unwrap_or(0)
    }

    pub fn set(&mut self, channel: StatChannel, value: i32) {
        if value == 0 {
            self.0.remove(&channel);
        } else {
            self.0.insert(channel, value);
        }
    }

    /// Add every channel of `other` into this one
    pub fn accumulate(&mut self, other: &StatBonuses) {
        for (&channel, &value) in &other.0 {
            self.set(channel, self.get(channel) + value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-zero channels
    pub fn iter(&self) -> impl Iterator<Item = (StatChannel, i32)> + '_ {
        self.0.iter().map(|(&c, &v)| (c, v))
    }
}

fn default_max_stack() -> u32 {
    1
}

fn default_disposable() -> bool {
    true
}

/// Static definition of an item, owned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Most units one stack may hold
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    /// Functional slot this item fits
    #[serde(default)]
    pub slot: Option<FunctionalSlot>,
    /// Cosmetic items go to a cosmetic slot instead of `slot`
    #[serde(default)]
    pub cosmetic: bool,
    /// Explicit cosmetic slot, for cosmetics with no functional counterpart
    #[serde(default)]
    pub cosmetic_slot: Option<CosmeticSlot>,
    #[serde(default)]
    pub bonuses: StatBonuses,
    /// Whether the player may throw this item away
    #[serde(default = "default_disposable")]
    pub disposable: bool,
}

impl ItemDefinition {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            max_stack: 1,
            slot: None,
            cosmetic: false,
            cosmetic_slot: None,
            bonuses: StatBonuses::new(),
            disposable: true,
        }
    }

    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack;
        self
    }

    pub fn with_slot(mut self, slot: FunctionalSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_bonus(mut self, channel: StatChannel, value: i32) -> Self {
        self.bonuses.set(channel, value);
        self
    }

    /// Mark as cosmetic, optionally pinning the cosmetic slot
    pub fn as_cosmetic(mut self, slot: Option<CosmeticSlot>) -> Self {
        self.cosmetic = true;
        self.cosmetic_slot = slot;
        self
    }

    pub fn undisposable(mut self) -> Self {
        self.disposable = false;
        self
    }

    /// Resolve the slot this item equips into, if any
    pub fn target_slot(&self) -> Option<SlotKey> {
        if !self.kind.is_equippable() {
            return None;
        }
        if self.cosmetic {
            self.cosmetic_slot
                .or_else(|| self.slot.and_then(CosmeticSlot::for_functional))
                .map(SlotKey::Cosmetic)
        } else {
            self.slot.map(SlotKey::Functional)
        }
    }
}

/// A group of identical items in one inventory slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stack {
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(default)]
    pub equipped: bool,
}

/// Full item snapshot held by an equip slot and written to saves.
/// Shares its shape with an inventory stack.
pub type ItemSnapshot = Stack;

impl Stack {
    pub fn new(item_id: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            equipped: false,
        }
    }

    /// A single equipped unit of `item_id`
    pub fn equipped_unit(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            quantity: 1,
            equipped: true,
        }
    }
}
