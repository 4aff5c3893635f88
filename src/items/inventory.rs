//! Inventory system
//!
//! Manages the player's owned items as an ordered list of stacks bounded by
//! a fixed slot count.

use std::fmt;
use std::sync::Arc;

use super::catalog::Catalog;
use super::item::{ItemKind, Stack};

/// Stacking item container
#[derive(Clone)]
pub struct Inventory {
    catalog: Arc<dyn Catalog>,
    /// Stacks in insertion order
    stacks: Vec<Stack>,
    /// Maximum number of stacks
    capacity: usize,
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("stacks", &self.stacks)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl PartialEq for Inventory {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.stacks == other.stacks
    }
}

impl Inventory {
    /// Create an empty inventory with `capacity` stack slots
    pub fn new(catalog: Arc<dyn Catalog>, capacity: usize) -> Self {
        Self {
            catalog,
            stacks: Vec::new(),
            capacity,
        }
    }

    /// Get total slot capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current number of stacks
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.stacks.len())
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    /// How many more units of `item_id` fit, counting both top-ups of
    /// existing stacks and fresh stacks in free slots
    pub fn space_for(&self, item_id: &str) -> u64 {
        let Some(max_stack) = self.catalog.max_stack(item_id) else {
            return 0;
        };
        let top_up = self
            .fillable(item_id)
            .map(|s| u64::from(max_stack.saturating_sub(s.quantity)))
            .fold(0u64, u64::saturating_add);
        let fresh = u64::try_from(self.free_slots())
            .unwrap_or(u64::MAX)
            .saturating_mul(u64::from(max_stack));
        top_up.saturating_add(fresh)
    }

    /// Add `quantity` units of `item_id`.
    ///
    /// Tops up existing stacks first, in order, then opens new stacks.
    /// All-or-nothing: returns false without changing anything if the
    /// units do not all fit or the item is unknown.
    pub fn add_item(&mut self, item_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        let Some(max_stack) = self.catalog.max_stack(item_id) else {
            log::debug!("Rejected add of unknown item {}", item_id);
            return false;
        };
        if self.space_for(item_id) < u64::from(quantity) {
            log::debug!("No room for {} x{}", item_id, quantity);
            return false;
        }

        let mut remaining = quantity;
        for stack in self.stacks.iter_mut() {
            if remaining == 0 {
                break;
            }
            if stack.item_id == item_id && !stack.equipped && stack.quantity < max_stack {
                let moved = remaining.min(max_stack - stack.quantity);
                stack.quantity += moved;
                remaining -= moved;
            }
        }
        while remaining > 0 {
            let size = remaining.min(max_stack);
            self.stacks.push(Stack::new(item_id, size));
            remaining -= size;
        }
        true
    }

    /// Remove `quantity` units of `item_id`, newest stacks first.
    /// Fails without changing anything if fewer are owned.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        self.remove_matching(item_id, quantity, false)
    }

    /// Remove one unit from an unequipped stack of `item_id`
    pub(crate) fn take_unit(&mut self, item_id: &str) -> bool {
        self.remove_matching(item_id, 1, true)
    }

    fn remove_matching(&mut self, item_id: &str, quantity: u32, unequipped_only: bool) -> bool {
        if quantity == 0 {
            return false;
        }
        let matches = |s: &Stack| s.item_id == item_id && !(unequipped_only && s.equipped);
        let owned: u64 = self
            .stacks
            .iter()
            .filter(|s| matches(*s))
            .map(|s| u64::from(s.quantity))
            .sum();
        if owned < u64::from(quantity) {
            return false;
        }

        let mut remaining = quantity;
        for stack in self.stacks.iter_mut().rev() {
            if remaining == 0 {
                break;
            }
            if matches(&*stack) {
                let taken = remaining.min(stack.quantity);
                stack.quantity -= taken;
                remaining -= taken;
            }
        }
        self.stacks.retain(|s| s.quantity > 0);
        true
    }

    /// Total owned units of `item_id`
    pub fn quantity(&self, item_id: &str) -> u64 {
        self.stacks
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| u64::from(s.quantity))
            .sum()
    }

    /// Check if at least `quantity` units are owned
    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.quantity(item_id) >= u64::from(quantity)
    }

    /// Check for an unequipped stack of `item_id`
    pub fn has_unequipped(&self, item_id: &str) -> bool {
        self.stacks.iter().any(|s| s.item_id == item_id && !s.equipped)
    }

    /// Copies of stacks whose definition is of `kind`
    pub fn items_by_kind(&self, kind: ItemKind) -> Vec<Stack> {
        self.stacks
            .iter()
            .filter(|s| {
                self.catalog
                    .definition(&s.item_id)
                    .is_some_and(|d| d.kind == kind)
            })
            .cloned()
            .collect()
    }

    /// Owned copy of every stack
    pub fn all_items(&self) -> Vec<Stack> {
        self.stacks.clone()
    }

    /// Borrowed view of the stacks
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Drop every stack
    pub fn clear(&mut self) {
        self.stacks.clear();
    }

    /// Put back a stack list captured with `all_items`
    pub(crate) fn restore_stacks(&mut self, stacks: Vec<Stack>) {
        self.stacks = stacks;
    }

    /// Append a stack verbatim (snapshot restore). Returns false when the
    /// inventory is full or the stack breaks the quantity bounds.
    pub(crate) fn restore_stack(&mut self, stack: Stack) -> bool {
        let Some(max_stack) = self.catalog.max_stack(&stack.item_id) else {
            return false;
        };
        if self.is_full() || stack.quantity == 0 || stack.quantity > max_stack {
            return false;
        }
        self.stacks.push(stack);
        true
    }

    fn fillable<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a Stack> + 'a {
        self.stacks.iter().filter(move |s| s.item_id == item_id && !s.equipped)
    }
}
