// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{Key, Payload};

/// Sentinel key of a slot that has never held data.
pub(crate) const KEY_FREE: Key = 0;

/// Sentinel key of a tombstone (deleted slot).
///
/// Tombstones still obstruct probe sequences. They are never reset to
/// free; they can only be overwritten by a compaction or relocation move.
pub(crate) const KEY_DELETED: Key = -1;

/// Validated index of a slot inside a [`Table`](crate::Table)
///
/// Handles are plain indices, not references; they stay cheap to copy and
/// never dangle, but a handle returned by a `Delete` query points at a slot
/// that has already become a tombstone.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotId(pub(crate) u32);

impl SlotId {
    /// Returns the raw slot index.
    #[must_use]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single table slot
///
/// The slot's state is encoded in its key: `0` means free, `-1` means
/// deleted, anything else means occupied.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Slot {
    pub(crate) key: Key,
    pub(crate) payload: Payload,
}

impl Slot {
    /// Returns the stored key (may be a sentinel).
    #[must_use]
    pub fn key(&self) -> Key {
        self.key
    }

    /// Returns the stored payload.
    #[must_use]
    pub fn payload(&self) -> Payload {
        self.payload
    }

    /// Whether this slot has never held data.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.key == KEY_FREE
    }

    /// Whether this slot is a tombstone.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.key == KEY_DELETED
    }

    /// Whether this slot currently holds an entry.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        !(self.is_free() || self.is_deleted())
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.key = KEY_DELETED;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_states() {
        let mut slot = Slot::default();
        assert!(slot.is_free());
        assert!(!slot.is_deleted());
        assert!(!slot.is_occupied());

        slot.key = 5;
        assert!(slot.is_occupied());

        slot.mark_deleted();
        assert!(slot.is_deleted());
        assert!(!slot.is_free());
        assert!(!slot.is_occupied());
    }

    #[test]
    fn slot_sentinels_are_not_occupied() {
        assert!(!Slot { key: KEY_FREE, payload: 0 }.is_occupied());
        assert!(!Slot {
            key: KEY_DELETED,
            payload: 0
        }
        .is_occupied());
    }
}
