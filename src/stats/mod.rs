//! Character stats and equipment bonus aggregation

pub mod character;
pub mod aggregator;

pub use character::{CharacterStats, CharacterSheet, Attributes, Derived, Health};
pub use aggregator::{StatAggregator, preserve_hp};
