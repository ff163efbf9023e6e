// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{Error, SecondaryHash, Table};

/// Default table capacity
///
/// Small enough to make probe-bound rejection observable in tests, large
/// enough to be a realistic symbol-table size.
pub const DEFAULT_CAPACITY: usize = 127;

/// Capacities below this leave no valid secondary-hash range.
const MIN_CAPACITY: usize = 5;

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }

    let mut d = 3;

    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }

    true
}

/// Table configuration
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Number of slots, must be prime
    capacity: usize,

    /// Step-derivation strategy
    secondary_hash: SecondaryHash,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            secondary_hash: SecondaryHash::default(),
        }
    }
}

impl Config {
    /// Initializes a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table capacity.
    ///
    /// Must be a prime number >= 5; anything else is rejected by
    /// [`Config::build`]. The capacity is fixed for the life of the table,
    /// there is no resizing.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the secondary hash strategy.
    ///
    /// Affects the probe-length distribution, never correctness.
    #[must_use]
    pub fn secondary_hash(mut self, strategy: SecondaryHash) -> Self {
        self.secondary_hash = strategy;
        self
    }

    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity is not a prime >= 5.
    pub fn build(self) -> crate::Result<Table> {
        if self.capacity < MIN_CAPACITY {
            return Err(Error::CapacityTooSmall(self.capacity));
        }
        if !is_prime(self.capacity) {
            return Err(Error::CapacityNotPrime(self.capacity));
        }

        log::debug!(
            "creating table with capacity={} secondary_hash={}",
            self.capacity,
            self.secondary_hash,
        );

        Ok(Table::from_config(self))
    }

    pub(crate) fn into_parts(self) -> (usize, SecondaryHash) {
        (self.capacity, self.secondary_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_accepts_primes() {
        for p in [5, 7, 11, 127, 131, 8191] {
            assert!(Config::new().capacity(p).build().is_ok(), "{p}");
        }
    }

    #[test]
    fn config_rejects_composites() {
        for n in [6, 9, 100, 128, 129] {
            assert_eq!(
                Err(Error::CapacityNotPrime(n)),
                Config::new().capacity(n).build().map(|_| ()),
            );
        }
    }

    #[test]
    fn config_rejects_tiny_capacities() {
        for n in [0, 1, 2, 3, 4] {
            assert_eq!(
                Err(Error::CapacityTooSmall(n)),
                Config::new().capacity(n).build().map(|_| ()),
            );
        }
    }
}
