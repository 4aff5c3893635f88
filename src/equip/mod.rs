//! Equip transactions
//!
//! `Loadout` owns one session's inventory, equipment, and character and
//! moves items between them atomically.

pub mod error;
pub mod coordinator;

pub use error::{EquipError, InventoryError, Missing};
pub use coordinator::Loadout;
