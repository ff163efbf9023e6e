// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::Key;

// NOTE: We take the absolute value in the unsigned domain, so i32::MIN
// maps to 2^31 instead of overflowing.
/// Calculates the first probe index for the given key.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn primary_index(key: Key, capacity: usize) -> usize {
    (key.unsigned_abs() as usize) % capacity
}

/// Secondary hash strategy
///
/// The secondary hash turns a key into the probe step, a value in
/// `[1, capacity - 2]`. The step may be any key-dependent function in that
/// range; which one is chosen affects the probe-length distribution but
/// never correctness.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SecondaryHash {
    /// `|key| % (capacity - 2) + 1`
    ///
    /// Degenerates when the key sequence shares a common factor with the
    /// capacity (e.g. keys that are multiples of it): all such keys collide
    /// on the same primary index with a small set of steps.
    #[default]
    Modulo,

    /// Bit-reversal permutation of the key, then the same modulo-and-increment
    ///
    /// Scrambles low-bit structure in the key sequence, which breaks up the
    /// clustering the plain modulo suffers on arithmetic key sequences.
    BitReversal,
}

impl SecondaryHash {
    /// Calculates the probe step for the given key.
    ///
    /// Guaranteed non-zero and `< capacity - 1`, so with a prime capacity
    /// the probe sequence visits every slot.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn step_of(self, key: Key, capacity: usize) -> usize {
        let mixed = match self {
            Self::Modulo => key.unsigned_abs(),
            Self::BitReversal => (key as u32).reverse_bits(),
        };
        (mixed as usize) % (capacity - 2) + 1
    }
}

impl std::fmt::Display for SecondaryHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
