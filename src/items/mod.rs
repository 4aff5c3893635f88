//! Item system

pub mod item;
pub mod catalog;
pub mod inventory;
pub mod equipment;

pub use item::{
    CosmeticSlot, FunctionalSlot, ItemDefinition, ItemId, ItemKind, ItemSnapshot, SlotKey,
    StatBonuses, StatChannel, Stack, WeaponFamily,
};
pub use catalog::{Catalog, ItemCatalog, CatalogError};
pub use inventory::Inventory;
pub use equipment::Equipment;
