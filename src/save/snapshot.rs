//! Loadout save/load
//!
//! Converts a `Loadout`'s inventory and equipment to and from a plain
//! serializable snapshot. Encryption and file handling belong to the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::equip::Loadout;
use crate::events::ItemEvent;
use crate::items::{CosmeticSlot, FunctionalSlot, ItemId, ItemSnapshot, SlotKey, Stack};
use crate::stats::CharacterStats;

/// Snapshot format version for compatibility checking
pub const SNAPSHOT_VERSION: u32 = 1;

/// Inventory and equipment at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub inventory: Vec<ItemSnapshot>,
    #[serde(default)]
    pub equipment: BTreeMap<FunctionalSlot, ItemSnapshot>,
    #[serde(default)]
    pub cosmetics: BTreeMap<CosmeticSlot, ItemSnapshot>,
}

/// Save error types
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            inventory: Vec::new(),
            equipment: BTreeMap::new(),
            cosmetics: BTreeMap::new(),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON, rejecting other format versions
    pub fn from_json(data: &str) -> Result<Self, SaveError> {
        let snapshot: Snapshot = serde_json::from_str(data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}

/// Why a snapshot record was dropped on load
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityIssue {
    #[error("unknown item")]
    UnknownItem,
    #[error("zero quantity")]
    ZeroQuantity,
    #[error("item does not fit the {} slot", .0.name())]
    WrongSlot(SlotKey),
    #[error("inventory full")]
    NoRoom,
    #[error("conflicts with the {} slot", .0.name())]
    SlotConflict(SlotKey),
}

/// A skipped snapshot record. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("skipped `{item_id}`: {issue}")]
pub struct IntegrityWarning {
    pub item_id: ItemId,
    pub issue: IntegrityIssue,
}

/// Outcome of `Loadout::load_snapshot`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub warnings: Vec<IntegrityWarning>,
    /// Stacks placed in the inventory
    pub stacks: usize,
    /// Slots filled, functional and cosmetic
    pub slots: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn skip(&mut self, item_id: &str, issue: IntegrityIssue) {
        let warning = IntegrityWarning { item_id: item_id.to_string(), issue };
        log::warn!("Snapshot load: {}", warning);
        self.warnings.push(warning);
    }
}

impl<S: CharacterStats> Loadout<S> {
    /// Capture inventory and equipment
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            inventory: self.inventory.all_items(),
            equipment: self.equipment.functional().clone(),
            cosmetics: self.equipment.cosmetic().clone(),
        }
    }

    /// Replace inventory and equipment with the snapshot's contents.
    ///
    /// Invalid records are skipped and reported. Stats are recalculated
    /// once after the rebuild and the combat mode is announced once.
    pub fn load_snapshot(&mut self, snapshot: &Snapshot) -> LoadReport {
        let mut report = LoadReport::default();
        self.equipment.clear();
        self.inventory.clear();

        for record in &snapshot.inventory {
            let Some(max_stack) = self.catalog.max_stack(&record.item_id) else {
                report.skip(&record.item_id, IntegrityIssue::UnknownItem);
                continue;
            };
            if record.quantity == 0 {
                report.skip(&record.item_id, IntegrityIssue::ZeroQuantity);
                continue;
            }
            // Oversized records are split into full stacks
            let mut remaining = record.quantity;
            while remaining > 0 {
                let size = remaining.min(max_stack);
                let stack = Stack {
                    item_id: record.item_id.clone(),
                    quantity: size,
                    equipped: record.equipped,
                };
                if !self.inventory.restore_stack(stack) {
                    report.skip(&record.item_id, IntegrityIssue::NoRoom);
                    break;
                }
                report.stacks += 1;
                remaining -= size;
            }
        }

        let mut slot_events = Vec::new();
        let functional = snapshot
            .equipment
            .iter()
            .map(|(&slot, item)| (SlotKey::Functional(slot), item));
        let cosmetic = snapshot
            .cosmetics
            .iter()
            .map(|(&slot, item)| (SlotKey::Cosmetic(slot), item));
        for (slot, item) in functional.chain(cosmetic) {
            let Some(def) = self.catalog.definition(&item.item_id) else {
                report.skip(&item.item_id, IntegrityIssue::UnknownItem);
                continue;
            };
            if def.target_slot() != Some(slot) {
                report.skip(&item.item_id, IntegrityIssue::WrongSlot(slot));
                continue;
            }
            // First record wins; a later conflicting one is dropped
            let occupied = slot
                .conflicts()
                .into_iter()
                .find(|other| !self.equipment.is_empty(*other));
            if let Some(other) = occupied {
                report.skip(&item.item_id, IntegrityIssue::SlotConflict(other));
                continue;
            }
            let restored = ItemSnapshot::equipped_unit(item.item_id.as_str());
            self.equipment.place(slot, restored.clone());
            slot_events.push(ItemEvent::slot_changed(slot, Some(restored)));
            report.slots += 1;
        }

        self.recalculate_stats();

        let mut events = vec![ItemEvent::InventoryChanged];
        events.extend(slot_events);
        events.push(ItemEvent::CombatModeChanged(self.equipment.active_weapon_family()));
        self.events.publish_all(events);

        log::info!(
            "Loaded snapshot: {} stacks, {} equipped, {} skipped",
            report.stacks, report.slots, report.warnings.len()
        );
        report
    }
}
