//! Kitbag - inventory and equipment core for real-time RPGs
//!
//! A stacking inventory, functional and cosmetic equip slots, equipment
//! stat aggregation, and a save/load snapshot. Items move between the
//! inventory and equipment atomically through a `Loadout`.

pub mod config;
pub mod items;
pub mod stats;
pub mod events;
pub mod equip;
pub mod save;

// Re-export commonly used types
pub use config::LoadoutConfig;
pub use equip::{Loadout, EquipError, InventoryError};
pub use events::{EventBus, ItemEvent, Topic};
pub use items::{
    Catalog, CosmeticSlot, FunctionalSlot, ItemCatalog, ItemDefinition, ItemKind, ItemSnapshot,
    SlotKey, Stack,
};
pub use save::{Snapshot, LoadReport};
pub use stats::{CharacterStats, CharacterSheet, Attributes};
