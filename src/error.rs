// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Represents errors that can occur when constructing a table
///
/// Queries themselves are infallible: rejected insertions are reported
/// through [`QueryResult`](crate::QueryResult), not through this type.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The requested capacity is not a prime number
    ///
    /// The probe sequence only covers the whole table if the capacity is
    /// prime, so this is rejected outright.
    CapacityNotPrime(usize),

    /// The requested capacity is too small
    ///
    /// Capacities below 5 leave no valid range for the secondary hash
    /// (which is taken modulo `capacity - 2`).
    CapacityTooSmall(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BrentTableError: {self:?}")
    }
}

impl std::error::Error for Error {}

/// Table result
pub type Result<T> = std::result::Result<T, Error>;
