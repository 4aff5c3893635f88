//! Save/load system
//!
//! Snapshot capture and restore for a loadout.

pub mod snapshot;

pub use snapshot::{
    Snapshot, SaveError, LoadReport, IntegrityWarning, IntegrityIssue,
    SNAPSHOT_VERSION,
};
