//! Equipment stat aggregation
//!
//! Sums functional slot bonuses into the character's stat model and keeps
//! the HP deficit stable across max HP changes.

use crate::items::{Catalog, Equipment, StatBonuses, StatChannel};
use super::character::CharacterStats;

/// New current HP after max HP moved from `old_max` to `new_max`.
///
/// A full character stays full. A wounded one keeps the same absolute
/// deficit, clamped to `1..=new_max`.
pub fn preserve_hp(old_max: i32, old_current: i32, new_max: i32) -> i32 {
    let new_max = new_max.max(1);
    if old_current >= old_max {
        return new_max;
    }
    let deficit = old_max - old_current;
    (new_max - deficit).clamp(1, new_max)
}

/// Recomputes equipment-derived stats
#[derive(Debug, Clone, Copy, Default)]
pub struct StatAggregator;

impl StatAggregator {
    /// Write the current equipment totals into `character`, rerun its
    /// derived formulas, and apply the HP preservation policy.
    /// Returns the totals that were written.
    pub fn recalculate(
        equipment: &Equipment,
        catalog: &dyn Catalog,
        character: &mut dyn CharacterStats,
    ) -> StatBonuses {
        let totals = equipment.total_bonuses(catalog);
        let old_max = character.max_hp();
        let old_current = character.current_hp();

        // Every channel is written so removed bonuses drop back to zero
        for &channel in StatChannel::all() {
            character.modify_stat(channel, totals.get(channel));
        }
        character.recalculate_derived();

        let new_max = character.max_hp();
        let new_current = preserve_hp(old_max, old_current, new_max);
        character.set_current_hp(new_current);

        log::debug!(
            "Stats recalculated: HP {}/{} -> {}/{}",
            old_current, old_max, new_current, new_max
        );
        totals
    }
}
