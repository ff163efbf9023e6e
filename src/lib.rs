// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A K.I.S.S. fixed-capacity hash table using Brent's variation of
//! open addressing.
//!
//! ##### About
//!
//! This crate exports a [`Table`]: a fixed-length array of slots, indexed by
//! double hashing, that actively relocates existing entries during insertion
//! to keep worst-case probe lengths short (R. P. Brent, "Reducing the
//! retrieval time of scatter storage techniques", CACM 16(2), 1973).
//!
//! The table never grows. Its capacity is a prime `P`, fixed at
//! construction, and every probe sequence `primary + i * step (mod P)`
//! visits all `P` slots because the step is drawn from `[1, P-2]`.
//! Insertions that would need more than `P - 2` probes are rejected rather
//! than degrading the table, even if free slots remain elsewhere.
//!
//! Deletion leaves a tombstone. Tombstones obstruct probe sequences, so
//! searches that run into one opportunistically *compact*: the matching
//! entry, if found further along the sequence, is pulled into the tombstone
//! slot. This means even a lookup may mutate the table; the table is
//! single-threaded by design and callers must serialize access themselves.
//!
//! Keys are `i32` values excluding `0` and `-1` (the free/tombstone
//! sentinels). Payloads are opaque `u64`s that travel with their key
//! through every move.
//!
//! ```
//! use brent_table::{Config, QueryMode, Stats};
//!
//! let mut table = Config::new().build()?;
//! let mut stats = Stats::default();
//!
//! let res = table.query(42, QueryMode::Add, Some(&mut stats));
//! assert!(!res.found);
//! assert!(res.slot.is_some());
//!
//! let res = table.query(42, QueryMode::Lookup, Some(&mut stats));
//! assert!(res.found);
//! # Ok::<(), brent_table::Error>(())
//! ```

#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod config;
mod error;
mod hash;
mod slot;
mod stats;
mod table;

/// Key type stored in the table.
///
/// The values `0` and `-1` are reserved as the free/tombstone sentinels
/// and are rejected on insertion.
pub type Key = i32;

/// Opaque payload carried alongside each key.
pub type Payload = u64;

pub use {
    config::Config,
    error::{Error, Result},
    hash::SecondaryHash,
    slot::SlotId,
    stats::Stats,
    table::{QueryMode, QueryResult, Table},
};

#[doc(hidden)]
pub use slot::Slot;
