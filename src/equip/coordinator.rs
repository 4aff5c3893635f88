//! Equip transaction coordinator
//!
//! Every mutation runs to completion on the caller's thread. Equip reserves
//! a unit from the inventory, vacates the target slot and any conflicting
//! slot, then commits. A failure at any step drops the transaction guard,
//! which puts the inventory and equipment back exactly as they were.
//! Notifications are queued during the transaction and published after it
//! commits.

use std::sync::Arc;

use crate::config::LoadoutConfig;
use crate::events::{EventBus, ItemEvent, SubscriberId};
use crate::items::{
    Catalog, Equipment, Inventory, ItemKind, ItemSnapshot, SlotKey, Stack, StatBonuses,
};
use crate::stats::{Attributes, CharacterSheet, CharacterStats, StatAggregator};

use super::error::{EquipError, InventoryError};

/// Scoped rollback over inventory and equipment
struct Transaction<'a> {
    inventory: &'a mut Inventory,
    equipment: &'a mut Equipment,
    saved: Option<(Vec<Stack>, Equipment)>,
}

impl<'a> Transaction<'a> {
    fn begin(inventory: &'a mut Inventory, equipment: &'a mut Equipment) -> Self {
        let saved = Some((inventory.all_items(), equipment.clone()));
        Self { inventory, equipment, saved }
    }

    fn commit(mut self) {
        self.saved = None;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if let Some((stacks, equipment)) = self.saved.take() {
            self.inventory.restore_stacks(stacks);
            *self.equipment = equipment;
            log::debug!("Equip transaction rolled back");
        }
    }
}

/// One character's items for one session
pub struct Loadout<S: CharacterStats = CharacterSheet> {
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) inventory: Inventory,
    pub(crate) equipment: Equipment,
    pub(crate) character: S,
    pub(crate) events: EventBus,
}

impl Loadout<CharacterSheet> {
    /// Session with the reference character model
    pub fn with_sheet(catalog: Arc<dyn Catalog>, config: &LoadoutConfig, base: Attributes) -> Self {
        let sheet = CharacterSheet::new(base).with_max_hp_floor(config.max_hp_floor);
        Self::new(catalog, config, sheet)
    }
}

impl<S: CharacterStats> Loadout<S> {
    /// Create a session with an empty inventory and nothing equipped
    pub fn new(catalog: Arc<dyn Catalog>, config: &LoadoutConfig, character: S) -> Self {
        let inventory = Inventory::new(Arc::clone(&catalog), config.capacity);
        let mut loadout = Self {
            catalog,
            inventory,
            equipment: Equipment::new(),
            character,
            events: EventBus::new(),
        };
        loadout.recalculate_stats();
        loadout
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn character(&self) -> &S {
        &self.character
    }

    /// Mutable access to the character (damage, healing, level ups).
    /// Call `recalculate_stats` after changing base stats.
    pub fn character_mut(&mut self) -> &mut S {
        &mut self.character
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Receive every notification
    pub fn subscribe(&mut self, callback: impl FnMut(&ItemEvent) + 'static) -> SubscriberId {
        self.events.subscribe(callback)
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    /// Add units to the inventory; all-or-nothing
    pub fn add_item(&mut self, item_id: &str, quantity: u32) -> bool {
        if !self.inventory.add_item(item_id, quantity) {
            return false;
        }
        self.events.publish_all(vec![
            ItemEvent::ItemAdded(Stack::new(item_id, quantity)),
            ItemEvent::InventoryChanged,
        ]);
        true
    }

    /// Remove units from the inventory; fails with no change if short
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        if !self.inventory.remove_item(item_id, quantity) {
            return false;
        }
        self.events.publish_all(vec![
            ItemEvent::ItemRemoved(Stack::new(item_id, quantity)),
            ItemEvent::InventoryChanged,
        ]);
        true
    }

    /// Throw items away. Quest items and other undisposable items refuse.
    pub fn discard_item(&mut self, item_id: &str, quantity: u32) -> Result<(), InventoryError> {
        let def = self.catalog.definition(item_id)
            .ok_or_else(|| InventoryError::NotFound(item_id.to_string()))?;
        let have = self.inventory.quantity(item_id);
        if have == 0 {
            return Err(InventoryError::NotFound(item_id.to_string()));
        }
        if !def.disposable {
            return Err(InventoryError::NotDisposable(item_id.to_string()));
        }
        if !self.remove_item(item_id, quantity) {
            return Err(InventoryError::NotEnough { needed: u64::from(quantity), have });
        }
        log::debug!("Discarded {} x{}", item_id, quantity);
        Ok(())
    }

    pub fn quantity(&self, item_id: &str) -> u64 {
        self.inventory.quantity(item_id)
    }

    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.inventory.has_item(item_id, quantity)
    }

    pub fn items_by_kind(&self, kind: ItemKind) -> Vec<Stack> {
        self.inventory.items_by_kind(kind)
    }

    pub fn all_items(&self) -> Vec<Stack> {
        self.inventory.all_items()
    }

    // ------------------------------------------------------------------
    // Equipment
    // ------------------------------------------------------------------

    /// Move one unit of `item_id` from the inventory into its slot.
    ///
    /// Whatever occupies the target slot, and any slot that conflicts with
    /// it, goes back to the inventory first. Returns the slot filled.
    pub fn equip(&mut self, item_id: &str) -> Result<SlotKey, EquipError> {
        let def = self.catalog.definition(item_id)
            .ok_or_else(|| EquipError::item_not_found(item_id))?;
        if self.inventory.quantity(item_id) == 0 {
            return Err(EquipError::item_not_found(item_id));
        }
        if !self.inventory.has_unequipped(item_id) {
            return Err(EquipError::AlreadyEquipped(item_id.to_string()));
        }
        let slot = def.target_slot()
            .ok_or_else(|| EquipError::InvalidSlot(item_id.to_string()))?;
        if self.equipment.get(slot).is_some_and(|held| held.item_id == item_id) {
            return Err(EquipError::AlreadyEquipped(item_id.to_string()));
        }

        // Target slot first, then its conflict table entries
        let mut vacate = vec![slot];
        vacate.extend(slot.conflicts());

        let mut inventory_events = Vec::new();
        let mut slot_events = Vec::new();
        let mut weapon_touched = slot.weapon_family().is_some();

        let mut txn = Transaction::begin(&mut self.inventory, &mut self.equipment);

        // Reserve
        if !txn.inventory.take_unit(item_id) {
            return Err(EquipError::Capacity(item_id.to_string()));
        }
        inventory_events.push(ItemEvent::ItemRemoved(Stack::new(item_id, 1)));

        // Vacate
        for key in vacate {
            let Some(occupant) = txn.equipment.take(key) else {
                continue;
            };
            if !txn.inventory.add_item(&occupant.item_id, 1) {
                log::debug!(
                    "Cannot equip {}: no room to unequip {} from {}",
                    item_id, occupant.item_id, key.name()
                );
                return Err(EquipError::Capacity(occupant.item_id));
            }
            inventory_events.push(ItemEvent::ItemAdded(Stack::new(occupant.item_id.as_str(), 1)));
            if key != slot {
                slot_events.push(ItemEvent::slot_changed(key, None));
            }
            weapon_touched |= key.weapon_family().is_some();
        }

        // Commit
        let snapshot = ItemSnapshot::equipped_unit(item_id);
        txn.equipment.place(slot, snapshot.clone());
        txn.commit();

        if !slot.is_cosmetic() {
            self.recalculate_stats();
        }
        log::debug!("Equipped {} in {}", item_id, slot.name());

        let mut events = inventory_events;
        events.push(ItemEvent::InventoryChanged);
        events.extend(slot_events);
        events.push(ItemEvent::slot_changed(slot, Some(snapshot)));
        if weapon_touched {
            events.push(ItemEvent::CombatModeChanged(self.equipment.active_weapon_family()));
        }
        self.events.publish_all(events);
        Ok(slot)
    }

    /// Move the item in `slot` back into the inventory
    pub fn unequip(&mut self, slot: impl Into<SlotKey>) -> Result<ItemSnapshot, EquipError> {
        let slot = slot.into();
        let mut item = self.equipment.take(slot).ok_or_else(|| EquipError::slot_empty(slot))?;
        if !self.inventory.add_item(&item.item_id, 1) {
            let item_id = item.item_id.clone();
            self.equipment.place(slot, item);
            log::debug!("Cannot unequip {}: inventory full", item_id);
            return Err(EquipError::Capacity(item_id));
        }
        item.equipped = false;

        if !slot.is_cosmetic() {
            self.recalculate_stats();
        }
        log::debug!("Unequipped {} from {}", item.item_id, slot.name());

        let mut events = vec![
            ItemEvent::ItemAdded(Stack::new(item.item_id.as_str(), 1)),
            ItemEvent::InventoryChanged,
            ItemEvent::slot_changed(slot, None),
        ];
        if slot.weapon_family().is_some() {
            events.push(ItemEvent::CombatModeChanged(self.equipment.active_weapon_family()));
        }
        self.events.publish_all(events);
        Ok(item)
    }

    /// Rewrite equipment bonuses into the character, keeping its HP deficit
    pub fn recalculate_stats(&mut self) -> StatBonuses {
        StatAggregator::recalculate(&self.equipment, self.catalog.as_ref(), &mut self.character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::equip::error::Missing;
    use crate::save::Snapshot;
    use crate::items::{CosmeticSlot, FunctionalSlot, ItemCatalog, ItemDefinition, StatChannel, WeaponFamily};

    fn catalog() -> Arc<dyn Catalog> {
        let defs = vec![
            ItemDefinition::new("sword_01", "Sword", ItemKind::Equipment)
                .with_slot(FunctionalSlot::MeleeWeapon)
                .with_bonus(StatChannel::Attack, 5),
            ItemDefinition::new("bow_01", "Bow", ItemKind::Equipment)
                .with_slot(FunctionalSlot::RangedWeapon)
                .with_bonus(StatChannel::Attack, 3),
            ItemDefinition::new("helm_hp", "Helm", ItemKind::Equipment)
                .with_slot(FunctionalSlot::Head)
                .with_bonus(StatChannel::MaxHp, 20),
            ItemDefinition::new("cap", "Cap", ItemKind::Equipment)
                .with_slot(FunctionalSlot::Head)
                .with_bonus(StatChannel::MaxHp, 5),
            ItemDefinition::new("ring", "Ring", ItemKind::Equipment)
                .with_slot(FunctionalSlot::Ring)
                .with_max_stack(5),
            ItemDefinition::new("wig", "Wig", ItemKind::Equipment)
                .as_cosmetic(Some(CosmeticSlot::Hair)),
            ItemDefinition::new("potion", "Potion", ItemKind::Consumable).with_max_stack(10),
            ItemDefinition::new("ore", "Ore", ItemKind::Material).with_max_stack(10),
            ItemDefinition::new("idol", "Idol", ItemKind::QuestItem).undisposable(),
        ];
        let mut catalog = ItemCatalog::new();
        for def in defs {
            catalog.insert(def).unwrap();
        }
        Arc::new(catalog)
    }

    fn loadout(capacity: usize) -> Loadout {
        let config = LoadoutConfig::default().with_capacity(capacity);
        Loadout::with_sheet(catalog(), &config, Attributes::default())
    }

    fn record(loadout: &mut Loadout) -> Rc<RefCell<Vec<ItemEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        loadout.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    #[test]
    fn test_equip_moves_one_unit() {
        let mut lo = loadout(5);
        lo.add_item("ring", 3);

        assert_eq!(lo.equip("ring"), Ok(SlotKey::Functional(FunctionalSlot::Ring)));
        assert_eq!(lo.quantity("ring"), 2);
        let held = lo.equipment().get(FunctionalSlot::Ring.into()).unwrap();
        assert_eq!(held, &ItemSnapshot::equipped_unit("ring"));
    }

    #[test]
    fn test_equip_then_unequip_restores() {
        let mut lo = loadout(5);
        lo.add_item("ring", 3);
        let before = lo.quantity("ring");

        lo.equip("ring").unwrap();
        let item = lo.unequip(FunctionalSlot::Ring).unwrap();

        assert!(!item.equipped);
        assert_eq!(lo.quantity("ring"), before);
        assert!(lo.equipment().is_bare());
    }

    #[test]
    fn test_equip_errors() {
        let mut lo = loadout(5);
        lo.add_item("potion", 1);

        assert_eq!(lo.equip("sword_01"), Err(EquipError::NotFound(Missing::Item("sword_01".into()))));
        assert_eq!(lo.equip("nonexistent"), Err(EquipError::item_not_found("nonexistent")));
        assert_eq!(lo.equip("potion"), Err(EquipError::InvalidSlot("potion".into())));
        assert_eq!(lo.quantity("potion"), 1);
    }

    #[test]
    fn test_equip_same_item_twice() {
        let mut lo = loadout(5);
        lo.add_item("ring", 2);
        lo.equip("ring").unwrap();

        assert_eq!(lo.equip("ring"), Err(EquipError::AlreadyEquipped("ring".into())));
        assert_eq!(lo.quantity("ring"), 1);
    }

    #[test]
    fn test_equip_refuses_equipped_flagged_stack() {
        let mut snapshot = Snapshot::empty();
        snapshot.inventory.push(ItemSnapshot::equipped_unit("sword_01"));
        let mut lo = loadout(5);
        lo.load_snapshot(&snapshot);

        let stacks = lo.all_items();
        let sheet = lo.character().clone();
        let seen = record(&mut lo);

        assert_eq!(lo.equip("sword_01"), Err(EquipError::AlreadyEquipped("sword_01".into())));
        assert_eq!(lo.all_items(), stacks);
        assert!(lo.equipment().is_bare());
        assert_eq!(lo.character(), &sheet);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_weapon_swap() {
        let mut lo = loadout(5);
        lo.add_item("sword_01", 1);
        lo.add_item("bow_01", 1);

        lo.equip("sword_01").unwrap();
        assert_eq!(lo.quantity("sword_01"), 0);

        lo.equip("bow_01").unwrap();
        assert_eq!(lo.quantity("sword_01"), 1);
        assert_eq!(lo.quantity("bow_01"), 0);
        assert!(lo.equipment().is_empty(FunctionalSlot::MeleeWeapon.into()));
        assert_eq!(lo.equipment().active_weapon_family(), Some(WeaponFamily::Ranged));
        assert_eq!(lo.character().derived.attack, 7 + 3);
    }

    #[test]
    fn test_same_slot_swap_in_full_inventory() {
        // The reserved helm frees its slot, which makes room for the cap
        let mut lo = loadout(2);
        lo.add_item("cap", 1);
        lo.add_item("helm_hp", 1);
        lo.equip("cap").unwrap();
        lo.add_item("ore", 1);
        assert!(lo.inventory().is_full());

        lo.equip("helm_hp").unwrap();
        assert_eq!(lo.quantity("cap"), 1);
        assert_eq!(lo.character().max_hp(), 120);
    }

    #[test]
    fn test_forced_unequip_failure_rolls_back() {
        // Two bows in one stack: reserving one leaves the stack in place,
        // so the displaced sword has nowhere to go
        let config = LoadoutConfig::default().with_capacity(2);
        let catalog = {
            let mut c = ItemCatalog::new();
            c.insert(ItemDefinition::new("sword_01", "Sword", ItemKind::Equipment)
                .with_slot(FunctionalSlot::MeleeWeapon)
                .with_bonus(StatChannel::Attack, 5)).unwrap();
            c.insert(ItemDefinition::new("arrows", "Throwing Knives", ItemKind::Equipment)
                .with_slot(FunctionalSlot::RangedWeapon)
                .with_max_stack(20)).unwrap();
            c.insert(ItemDefinition::new("ore", "Ore", ItemKind::Material).with_max_stack(10)).unwrap();
            Arc::new(c) as Arc<dyn Catalog>
        };
        let mut lo = Loadout::with_sheet(catalog, &config, Attributes::default());
        lo.add_item("sword_01", 1);
        lo.equip("sword_01").unwrap();
        lo.add_item("arrows", 5);
        lo.add_item("ore", 3);
        assert!(lo.inventory().is_full());

        let stacks = lo.all_items();
        let equipment = lo.equipment().clone();
        let sheet = lo.character().clone();
        let seen = record(&mut lo);

        assert_eq!(lo.equip("arrows"), Err(EquipError::Capacity("sword_01".into())));
        assert_eq!(lo.all_items(), stacks);
        assert_eq!(lo.equipment(), &equipment);
        assert_eq!(lo.character(), &sheet);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_unequip_empty_slot() {
        let mut lo = loadout(5);
        lo.add_item("potion", 2);
        let stacks = lo.all_items();
        let seen = record(&mut lo);

        assert_eq!(
            lo.unequip(FunctionalSlot::Head),
            Err(EquipError::slot_empty(SlotKey::Functional(FunctionalSlot::Head)))
        );
        assert_eq!(lo.all_items(), stacks);
        assert!(lo.equipment().is_bare());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_unequip_blocked_by_capacity() {
        let mut lo = loadout(1);
        lo.add_item("helm_hp", 1);
        lo.equip("helm_hp").unwrap();
        lo.add_item("potion", 1);
        let seen = record(&mut lo);

        assert_eq!(lo.unequip(FunctionalSlot::Head), Err(EquipError::Capacity("helm_hp".into())));
        assert!(lo.equipment().get(FunctionalSlot::Head.into()).is_some());
        assert_eq!(lo.quantity("potion"), 1);
        assert_eq!(lo.character().max_hp(), 120);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_equip_keeps_hp_deficit() {
        let mut lo = loadout(5);
        lo.add_item("helm_hp", 1);
        lo.character_mut().set_current_hp(60);

        lo.equip("helm_hp").unwrap();
        assert_eq!(lo.character().max_hp(), 120);
        assert_eq!(lo.character().current_hp(), 80);

        lo.unequip(FunctionalSlot::Head).unwrap();
        assert_eq!(lo.character().max_hp(), 100);
        assert_eq!(lo.character().current_hp(), 60);
    }

    #[test]
    fn test_full_health_stays_full() {
        let mut lo = loadout(5);
        lo.add_item("helm_hp", 1);

        lo.equip("helm_hp").unwrap();
        assert_eq!(lo.character().current_hp(), 120);
        lo.unequip(FunctionalSlot::Head).unwrap();
        assert_eq!(lo.character().current_hp(), 100);
    }

    #[test]
    fn test_cosmetic_equip_skips_stats() {
        let mut lo = loadout(5);
        lo.add_item("wig", 1);
        let seen = record(&mut lo);

        assert_eq!(lo.equip("wig"), Ok(SlotKey::Cosmetic(CosmeticSlot::Hair)));
        assert_eq!(lo.character().max_hp(), 100);
        assert!(seen.borrow().contains(&ItemEvent::CosmeticChanged {
            slot: CosmeticSlot::Hair,
            item: Some(ItemSnapshot::equipped_unit("wig")),
        }));
        assert!(!seen.borrow().iter().any(|e| matches!(e, ItemEvent::CombatModeChanged(_))));
    }

    #[test]
    fn test_swap_event_order() {
        let mut lo = loadout(5);
        lo.add_item("sword_01", 1);
        lo.add_item("bow_01", 1);
        lo.equip("sword_01").unwrap();
        let seen = record(&mut lo);

        lo.equip("bow_01").unwrap();
        assert_eq!(*seen.borrow(), vec![
            ItemEvent::ItemRemoved(Stack::new("bow_01", 1)),
            ItemEvent::ItemAdded(Stack::new("sword_01", 1)),
            ItemEvent::InventoryChanged,
            ItemEvent::EquipmentChanged { slot: FunctionalSlot::MeleeWeapon, item: None },
            ItemEvent::EquipmentChanged {
                slot: FunctionalSlot::RangedWeapon,
                item: Some(ItemSnapshot::equipped_unit("bow_01")),
            },
            ItemEvent::CombatModeChanged(Some(WeaponFamily::Ranged)),
        ]);
    }

    #[test]
    fn test_unequip_weapon_goes_unarmed() {
        let mut lo = loadout(5);
        lo.add_item("sword_01", 1);
        lo.equip("sword_01").unwrap();
        let seen = record(&mut lo);

        lo.unequip(FunctionalSlot::MeleeWeapon).unwrap();
        assert_eq!(seen.borrow().last(), Some(&ItemEvent::CombatModeChanged(None)));
    }

    #[test]
    fn test_add_and_remove_notify() {
        let mut lo = loadout(1);
        let seen = record(&mut lo);

        assert!(lo.add_item("potion", 4));
        assert!(!lo.add_item("ore", 1));
        assert!(lo.remove_item("potion", 1));
        assert!(!lo.remove_item("potion", 9));

        assert_eq!(*seen.borrow(), vec![
            ItemEvent::ItemAdded(Stack::new("potion", 4)),
            ItemEvent::InventoryChanged,
            ItemEvent::ItemRemoved(Stack::new("potion", 1)),
            ItemEvent::InventoryChanged,
        ]);
    }

    #[test]
    fn test_discard() {
        let mut lo = loadout(5);
        lo.add_item("potion", 3);
        lo.add_item("idol", 1);

        assert_eq!(lo.discard_item("idol", 1), Err(InventoryError::NotDisposable("idol".into())));
        assert_eq!(lo.discard_item("potion", 5), Err(InventoryError::NotEnough { needed: 5, have: 3 }));
        assert_eq!(lo.discard_item("ore", 1), Err(InventoryError::NotFound("ore".into())));
        assert_eq!(lo.discard_item("potion", 2), Ok(()));
        assert_eq!(lo.quantity("potion"), 1);
        assert_eq!(lo.quantity("idol"), 1);
    }
}
