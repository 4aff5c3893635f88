//! Change notifications
//!
//! Synchronous subscriber list. Transactions collect their events locally
//! and hand them to the bus only after they commit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::items::{CosmeticSlot, FunctionalSlot, ItemSnapshot, SlotKey, Stack, WeaponFamily};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Stack additions and removals
    Inventory,
    /// Functional and cosmetic slot changes
    Equipment,
    /// Active weapon family changes
    Combat,
}

/// Something observable changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemEvent {
    /// Units added; `quantity` is the amount added
    ItemAdded(Stack),
    /// Units removed; `quantity` is the amount removed
    ItemRemoved(Stack),
    /// Fired once after any batch of inventory changes
    InventoryChanged,
    EquipmentChanged {
        slot: FunctionalSlot,
        item: Option<ItemSnapshot>,
    },
    CosmeticChanged {
        slot: CosmeticSlot,
        item: Option<ItemSnapshot>,
    },
    /// The weapon family in hand, None when unarmed
    CombatModeChanged(Option<WeaponFamily>),
}

impl ItemEvent {
    /// Slot notification for `slot` now holding `item`
    pub fn slot_changed(slot: SlotKey, item: Option<ItemSnapshot>) -> Self {
        match slot {
            SlotKey::Functional(slot) => ItemEvent::EquipmentChanged { slot, item },
            SlotKey::Cosmetic(slot) => ItemEvent::CosmeticChanged { slot, item },
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            ItemEvent::ItemAdded(_) | ItemEvent::ItemRemoved(_) | ItemEvent::InventoryChanged => {
                Topic::Inventory
            }
            ItemEvent::EquipmentChanged { .. } | ItemEvent::CosmeticChanged { .. } => {
                Topic::Equipment
            }
            ItemEvent::CombatModeChanged(_) => Topic::Combat,
        }
    }
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct SubscriberId(u64);

struct Subscriber {
    id: SubscriberId,
    topic: Option<Topic>,
    callback: Box<dyn FnMut(&ItemEvent)>,
}

/// Ordered list of event subscribers
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&mut self, callback: impl FnMut(&ItemEvent) + 'static) -> SubscriberId {
        self.add(None, Box::new(callback))
    }

    /// Receive only events of one topic
    pub fn subscribe_topic(
        &mut self,
        topic: Topic,
        callback: impl FnMut(&ItemEvent) + 'static,
    ) -> SubscriberId {
        self.add(Some(topic), Box::new(callback))
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver one event to matching subscribers in subscription order
    pub fn publish(&mut self, event: &ItemEvent) {
        let topic = event.topic();
        for subscriber in self.subscribers.iter_mut() {
            if subscriber.topic.map_or(true, |t| t == topic) {
                (subscriber.callback)(event);
            }
        }
    }

    /// Deliver a committed batch in order
    pub fn publish_all(&mut self, events: Vec<ItemEvent>) {
        for event in &events {
            self.publish(event);
        }
    }

    fn add(&mut self, topic: Option<Topic>, callback: Box<dyn FnMut(&ItemEvent)>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, topic, callback });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_in_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        bus.publish_all(vec![
            ItemEvent::ItemAdded(Stack::new("ore", 2)),
            ItemEvent::InventoryChanged,
        ]);

        assert_eq!(
            *seen.borrow(),
            vec![ItemEvent::ItemAdded(Stack::new("ore", 2)), ItemEvent::InventoryChanged]
        );
    }

    #[test]
    fn test_topic_filter() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        bus.subscribe_topic(Topic::Combat, move |_| *sink.borrow_mut() += 1);

        bus.publish(&ItemEvent::InventoryChanged);
        bus.publish(&ItemEvent::CombatModeChanged(Some(WeaponFamily::Melee)));

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
