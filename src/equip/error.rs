//! Equip and inventory error types

use std::fmt;

use thiserror::Error;

use crate::items::{ItemId, SlotKey};

/// What a `NotFound` error could not find
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// Item not owned, or unknown to the catalog
    Item(ItemId),
    /// Slot has nothing equipped
    Slot(SlotKey),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Item(id) => write!(f, "item `{}`", id),
            Missing::Slot(slot) => write!(f, "{} slot item", slot.name()),
        }
    }
}

/// Expected failures of an equip or unequip transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("`{0}` has no slot it can be equipped in")]
    InvalidSlot(ItemId),
    #[error("no inventory room for `{0}`")]
    Capacity(ItemId),
    #[error("`{0}` is already equipped")]
    AlreadyEquipped(ItemId),
}

impl EquipError {
    pub fn item_not_found(id: &str) -> Self {
        EquipError::NotFound(Missing::Item(id.to_string()))
    }

    pub fn slot_empty(slot: SlotKey) -> Self {
        EquipError::NotFound(Missing::Slot(slot))
    }
}

/// Inventory error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Item not owned or unknown
    #[error("item `{0}` not found")]
    NotFound(ItemId),
    /// Not enough items
    #[error("not enough items: need {needed}, have {have}")]
    NotEnough {
        needed: u64,
        have: u64,
    },
    /// Item may not be thrown away
    #[error("`{0}` cannot be discarded")]
    NotDisposable(ItemId),
}
