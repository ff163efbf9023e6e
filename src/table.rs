// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    hash::primary_index,
    slot::{KEY_DELETED, KEY_FREE},
    Config, Key, Payload, SecondaryHash, Slot, SlotId, Stats,
};

/// What a query should do when it finds (or does not find) the key
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QueryMode {
    /// Find the key, do not insert
    Lookup,

    /// Find the key, insert if absent
    Add,

    /// Find the key, remove if present
    Delete,
}

/// Outcome of a [`Table::query`]
///
/// The four meaningful combinations:
///
/// | `found` | `slot`    | Meaning                                         |
/// |---------|-----------|-------------------------------------------------|
/// | `true`  | `Some(_)` | key was present (slot is a tombstone after `Delete`) |
/// | `false` | `Some(_)` | key was absent, `Add` inserted it here          |
/// | `false` | `None`    | key is absent; for `Add`: insertion rejected    |
/// | `true`  | `None`    | never produced                                  |
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct QueryResult {
    /// Whether the key was already present
    pub found: bool,

    /// Slot affected by the query, if any
    pub slot: Option<SlotId>,
}

/// A fixed-capacity open-addressing hash table using Brent's variation
///
/// See the [crate docs](crate) for the full story. Not thread-safe; even
/// lookups may mutate the table (tombstone compaction), so concurrent use
/// requires external synchronization over all operations.
pub struct Table {
    slots: Box<[Slot]>,
    secondary_hash: SecondaryHash,
}

impl Table {
    pub(crate) fn from_config(config: Config) -> Self {
        let (capacity, secondary_hash) = config.into_parts();

        Self {
            slots: vec![Slot::default(); capacity].into_boxed_slice(),
            secondary_hash,
        }
    }

    /// Returns the number of slots.
    ///
    /// Fixed for the life of the table.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the active secondary hash strategy.
    #[must_use]
    pub fn secondary_hash(&self) -> SecondaryHash {
        self.secondary_hash
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_occupied()).count()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of tombstones.
    ///
    /// Tombstones only ever disappear by being overwritten through a
    /// compaction or relocation move, so this can reach
    /// `capacity - len()`.
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_deleted()).count()
    }

    /// Returns the payload stored in the given slot.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this table.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn payload(&self, id: SlotId) -> Payload {
        self.slots
            .get(id.get())
            .expect("slot handle should belong to this table")
            .payload
    }

    /// Overwrites the payload stored in the given slot.
    ///
    /// The payload travels with its key through any future compaction or
    /// relocation move.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this table.
    #[allow(clippy::expect_used)]
    pub fn set_payload(&mut self, id: SlotId, payload: Payload) {
        self.slots
            .get_mut(id.get())
            .expect("slot handle should belong to this table")
            .payload = payload;
    }

    #[doc(hidden)]
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn slot(&self, id: SlotId) -> &Slot {
        self.slots
            .get(id.get())
            .expect("slot handle should belong to this table")
    }

    #[doc(hidden)]
    pub fn slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter()
    }

    fn slot_ref(&self, index: usize) -> &Slot {
        // SAFETY: all probe indices are reduced modulo the table length
        #[allow(unsafe_code)]
        unsafe {
            self.slots.get_unchecked(index)
        }
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot {
        // SAFETY: all probe indices are reduced modulo the table length
        #[allow(unsafe_code)]
        unsafe {
            self.slots.get_unchecked_mut(index)
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn handle(index: usize) -> SlotId {
        SlotId(index as u32)
    }

    /// Looks up, inserts or deletes a key.
    ///
    /// The one operation the table exposes; `mode` selects what happens on
    /// a hit or miss. `stats`, when supplied, accumulates probe counters
    /// for this call; it never influences behavior.
    ///
    /// Note that `Lookup` is *not* read-only: running into a tombstone
    /// triggers a compaction scan that may move the found entry forward
    /// into the tombstone slot.
    ///
    /// Insertion is rejected (`found: false`, `slot: None`) if the key is
    /// one of the two sentinel values, or if placing it would need more
    /// than `capacity - 2` probes. The latter is a bounded-worst-case
    /// policy, not a full-table detector: free slots may still exist
    /// elsewhere.
    #[allow(clippy::too_many_lines)]
    pub fn query(
        &mut self,
        key: Key,
        mode: QueryMode,
        mut stats: Option<&mut Stats>,
    ) -> QueryResult {
        let capacity = self.capacity();
        let primary = primary_index(key, capacity);
        let step = self.secondary_hash.step_of(key, capacity);

        // Starts at -1 so it ends up exactly at (capacity - 2) after a
        // full unsuccessful cycle, which the probe bound check below
        // rejects.
        let mut probes_taken: isize = -1;
        let mut index = primary;

        if let Some(stats) = stats.as_deref_mut() {
            stats.mark_call();
        }

        loop {
            if let Some(stats) = stats.as_deref_mut() {
                stats.mark_probe();
            }

            let this_key = self.slot_ref(index).key;

            if this_key == KEY_FREE {
                // Empty slot ends the search.
                break;
            } else if this_key == KEY_DELETED {
                // Tombstone: scan forward along the key's own step for
                // either the key itself or a free slot.
                if let Some(stats) = stats.as_deref_mut() {
                    stats.mark_compaction_attempt();
                }

                let mut scan = index;
                let mut dead_end = false;

                loop {
                    if let Some(stats) = stats.as_deref_mut() {
                        stats.mark_compaction_probe();
                    }

                    scan = (scan + step) % capacity;
                    let scan_key = self.slot_ref(scan).key;

                    // Free slot or a complete cycle of the table means
                    // the key cannot be further along this sequence.
                    if scan_key == KEY_FREE || scan == primary {
                        dead_end = true;
                        break;
                    }

                    if scan_key == key && scan_key != KEY_DELETED {
                        break;
                    }
                }

                if dead_end {
                    break;
                }

                // Key found past the tombstone. Pull it into the tombstone
                // slot so the next search takes fewer probes (unless we are
                // deleting it anyway), and tombstone its old position.
                if mode != QueryMode::Delete {
                    let moved = *self.slot_ref(scan);
                    *self.slot_mut(index) = moved;

                    if let Some(stats) = stats.as_deref_mut() {
                        stats.mark_compaction_move();
                    }

                    log::trace!("compacted key={key} from slot {scan} into tombstone {index}");
                }

                self.slot_mut(scan).mark_deleted();

                return QueryResult {
                    found: true,
                    slot: Some(Self::handle(index)),
                };
            } else if this_key == key {
                if mode == QueryMode::Delete {
                    self.slot_mut(index).mark_deleted();
                }

                return QueryResult {
                    found: true,
                    slot: Some(Self::handle(index)),
                };
            } else {
                probes_taken += 1;
                index = (index + step) % capacity;

                if index == primary {
                    // Full cycle, nothing found.
                    break;
                }
            }
        }

        // The key is not in the table. Return unless an entry must be
        // made; this also rejects sentinel keys and insertions past the
        // probe bound.
        #[allow(clippy::cast_possible_wrap)]
        let within_bound = probes_taken <= (capacity - 2) as isize;

        if !(mode == QueryMode::Add && within_bound && key != KEY_FREE && key != KEY_DELETED) {
            return QueryResult {
                found: false,
                slot: None,
            };
        }

        if probes_taken <= 0 {
            // Found a usable slot on the primary position or one step
            // beyond; no point in shuffling anything around.
            let slot = self.slot_mut(index);
            slot.key = key;
            slot.payload = Payload::default();

            return QueryResult {
                found: false,
                slot: Some(Self::handle(index)),
            };
        }

        if let Some(slot) = self.relocate(key, primary, step, probes_taken, stats.as_deref_mut()) {
            return QueryResult {
                found: false,
                slot: Some(slot),
            };
        }

        // No relocation opportunity; fall back to the slot the main scan
        // stopped at. It cannot have become occupied in the meantime.
        let slot = self.slot_mut(index);
        assert!(
            !slot.is_occupied(),
            "fallback insertion slot must not be occupied",
        );
        slot.key = key;
        slot.payload = Payload::default();

        QueryResult {
            found: false,
            slot: Some(Self::handle(index)),
        }
    }

    /// Brent's relocation: try to place `key` closer to its primary index
    /// by displacing an entry on its probe path.
    ///
    /// The entry at offset `c` on the new key's path can move `d` steps
    /// along *its own* probe sequence; if that lands on a non-occupied
    /// slot, the displaced entry still resolves correctly while the new
    /// key takes over the shorter-probe position. Candidates are tried
    /// with outer `c` ascending and inner `d` ascending, first hit wins;
    /// the enumeration order decides the final layout and is part of the
    /// table's observable behavior.
    #[allow(clippy::cast_sign_loss)]
    fn relocate(
        &mut self,
        key: Key,
        primary: usize,
        step: usize,
        probes_taken: isize,
        mut stats: Option<&mut Stats>,
    ) -> Option<SlotId> {
        let capacity = self.capacity();

        // Offset into Brent's classic indexing: the occupied prefix of the
        // new key's path is c = 0..=s-2, the free slot sits at s-1.
        let s = (probes_taken + 2) as usize;

        if let Some(stats) = stats.as_deref_mut() {
            stats.mark_relocation_attempt();
        }

        for c in 0..=(s - 2) {
            let h_c = (primary + c * step) % capacity;

            // Necessarily occupied, otherwise the main scan would have
            // ended here.
            let occupant_key = self.slot_ref(h_c).key;
            let occupant_step = self.secondary_hash.step_of(occupant_key, capacity);

            for d in 1..=(s - c - 1) {
                if let Some(stats) = stats.as_deref_mut() {
                    stats.mark_relocation_probe();
                }

                let target = (h_c + d * occupant_step) % capacity;

                if !self.slot_ref(target).is_occupied() {
                    if let Some(stats) = stats.as_deref_mut() {
                        stats.mark_relocation_move();
                    }

                    log::trace!(
                        "relocating key={occupant_key} from slot {h_c} to {target}, inserting key={key} at {h_c}",
                    );

                    let moved = *self.slot_ref(h_c);
                    *self.slot_mut(target) = moved;

                    let slot = self.slot_mut(h_c);
                    slot.key = key;
                    slot.payload = Payload::default();

                    return Some(Self::handle(h_c));
                }
            }
        }

        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_log::test;

    fn tiny_table() -> Table {
        Config::new().capacity(7).build().unwrap()
    }

    fn occupied_keys(table: &Table) -> Vec<Key> {
        table
            .slots()
            .map(|slot| if slot.is_occupied() { slot.key() } else { 0 })
            .collect()
    }

    #[test]
    fn query_add_direct() {
        let mut table = tiny_table();

        // 7 % 7 == 0
        let res = table.query(7, QueryMode::Add, None);
        assert!(!res.found);
        assert_eq!(Some(SlotId(0)), res.slot);

        let res = table.query(7, QueryMode::Lookup, None);
        assert!(res.found);
        assert_eq!(Some(SlotId(0)), res.slot);
    }

    #[test]
    fn query_add_triggers_relocation() {
        // All keys are multiples of 7, so they all hash to primary index 0
        // with steps |key| % 5 + 1.
        let mut table = tiny_table();
        let mut stats = Stats::default();

        for key in [7, 14, 21, 28, 35, 42] {
            let res = table.query(key, QueryMode::Add, Some(&mut stats));
            assert!(!res.found);
            assert!(res.slot.is_some());
        }

        assert_eq!(0, stats.relocation_attempts);
        assert_eq!(&[7, 35, 21, 42, 28, 14, 0], &*occupied_keys(&table));

        // Key 49 (step 5) walks 0 -> 5 -> 3 -> 1 -> 6 (free), which is
        // 3 slots past the bound for a direct insert. Brent relocation
        // moves key 7 (step 3) from slot 0 to slot 6 and claims slot 0.
        let mut stats = Stats::default();
        let res = table.query(49, QueryMode::Add, Some(&mut stats));
        assert!(!res.found);
        assert_eq!(Some(SlotId(0)), res.slot);

        assert_eq!(1, stats.relocation_attempts);
        assert_eq!(2, stats.relocation_probes);
        assert_eq!(1, stats.relocation_moves);
        assert_eq!(5, stats.probes);

        assert_eq!(&[49, 35, 21, 42, 28, 14, 7], &*occupied_keys(&table));

        // The relocated key is still reachable along its own sequence.
        let res = table.query(7, QueryMode::Lookup, None);
        assert!(res.found);
        assert_eq!(Some(SlotId(6)), res.slot);

        // And the new key now resolves in a single probe.
        let mut stats = Stats::default();
        let res = table.query(49, QueryMode::Lookup, Some(&mut stats));
        assert!(res.found);
        assert_eq!(Some(SlotId(0)), res.slot);
        assert_eq!(1, stats.probes);
    }

    #[test]
    fn query_relocation_preserves_payload() {
        let mut table = tiny_table();

        for key in [7, 14, 21, 28, 35, 42] {
            let res = table.query(key, QueryMode::Add, None);
            table.set_payload(res.slot.unwrap(), u64::from(key.unsigned_abs()) * 100);
        }

        table.query(49, QueryMode::Add, None);

        // Key 7 was displaced to slot 6; its payload must have moved along.
        let res = table.query(7, QueryMode::Lookup, None);
        assert!(res.found);
        assert_eq!(700, table.payload(res.slot.unwrap()));
    }

    #[test]
    fn query_lookup_compacts_over_tombstone() {
        let mut table = tiny_table();

        // 7: slot 0; 21 collides at 0, lands at slot 2.
        table.query(7, QueryMode::Add, None);
        table.query(21, QueryMode::Add, None);
        table.query(7, QueryMode::Delete, None);

        let mut stats = Stats::default();
        let res = table.query(21, QueryMode::Lookup, Some(&mut stats));
        assert!(res.found);

        // 21 was pulled forward into the tombstone at its primary index.
        assert_eq!(Some(SlotId(0)), res.slot);
        assert_eq!(21, table.slot(SlotId(0)).key());
        assert!(table.slot(SlotId(2)).is_deleted());

        assert_eq!(1, stats.compaction_attempts);
        assert_eq!(1, stats.compaction_probes);
        assert_eq!(1, stats.compaction_moves);
    }

    #[test]
    fn query_delete_through_tombstone_does_not_move() {
        let mut table = tiny_table();

        table.query(7, QueryMode::Add, None);
        table.query(21, QueryMode::Add, None);
        table.query(7, QueryMode::Delete, None);

        let mut stats = Stats::default();
        let res = table.query(21, QueryMode::Delete, Some(&mut stats));
        assert!(res.found);

        // Both the original tombstone and the deleted entry's slot are
        // tombstones now; nothing was copied.
        assert!(table.slot(SlotId(0)).is_deleted());
        assert!(table.slot(SlotId(2)).is_deleted());
        assert_eq!(0, stats.compaction_moves);
        assert_eq!(0, table.len());
    }

    #[test]
    fn query_add_reclaims_tombstone() {
        let mut table = tiny_table();

        table.query(7, QueryMode::Add, None);
        table.query(7, QueryMode::Delete, None);
        assert_eq!(1, table.tombstone_count());

        // 35 also hashes to primary 0; its compaction scan dead-ends on a
        // free slot, so the insert overwrites the tombstone itself.
        let mut stats = Stats::default();
        let res = table.query(35, QueryMode::Add, Some(&mut stats));
        assert!(!res.found);
        assert_eq!(Some(SlotId(0)), res.slot);

        assert_eq!(0, table.tombstone_count());
        assert_eq!(1, stats.compaction_attempts);
        assert_eq!(1, stats.compaction_probes);
    }

    #[test]
    fn query_rejects_sentinel_keys() {
        let mut table = tiny_table();

        for key in [0, -1] {
            let res = table.query(key, QueryMode::Add, None);
            assert!(!res.found);
            assert_eq!(None, res.slot);
        }

        assert!(table.is_empty());
    }

    #[test]
    fn query_rejects_when_saturated() {
        let mut table = tiny_table();

        for key in 1..=7 {
            let res = table.query(key, QueryMode::Add, None);
            assert!(res.slot.is_some());
        }
        assert_eq!(7, table.len());

        let res = table.query(8, QueryMode::Add, None);
        assert!(!res.found);
        assert_eq!(None, res.slot);

        let res = table.query(8, QueryMode::Lookup, None);
        assert!(!res.found);
        assert_eq!(None, res.slot);
    }

    #[test]
    fn query_lookup_and_delete_missing() {
        let mut table = tiny_table();

        let res = table.query(3, QueryMode::Lookup, None);
        assert!(!res.found);
        assert_eq!(None, res.slot);

        let res = table.query(3, QueryMode::Delete, None);
        assert!(!res.found);
        assert_eq!(None, res.slot);

        assert!(table.is_empty());
    }

    #[test]
    fn query_negative_keys() {
        let mut table = tiny_table();

        let res = table.query(-7, QueryMode::Add, None);
        assert!(!res.found);
        assert!(res.slot.is_some());

        let res = table.query(-7, QueryMode::Lookup, None);
        assert!(res.found);

        // -7 and 7 are distinct keys that happen to share a probe sequence.
        let res = table.query(7, QueryMode::Lookup, None);
        assert!(!res.found);
    }

    #[test]
    fn query_stats_optional() {
        let mut with_stats = tiny_table();
        let mut without_stats = tiny_table();
        let mut stats = Stats::default();

        for key in [7, 14, 21, 28, 35, 42, 49] {
            let a = with_stats.query(key, QueryMode::Add, Some(&mut stats));
            let b = without_stats.query(key, QueryMode::Add, None);
            assert_eq!(a, b);
        }

        assert_eq!(occupied_keys(&with_stats), occupied_keys(&without_stats));
        assert_eq!(7, stats.calls);
    }
}
