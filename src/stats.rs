// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Probe statistics
///
/// Purely observational counters describing how much work queries did.
/// The caller owns the block and passes it per call; passing `None`
/// instead never changes table behavior. Counters only grow, except
/// through [`Stats::reset`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of queries performed
    pub calls: u64,

    /// Number of slots inspected by the main probe loop
    pub probes: u64,

    /// Number of tombstone-triggered compaction scans
    pub compaction_attempts: u64,

    /// Number of forward steps taken by compaction scans
    pub compaction_probes: u64,

    /// Number of entries pulled into a tombstone slot
    pub compaction_moves: u64,

    /// Number of insertions that tried to relocate an existing entry
    pub relocation_attempts: u64,

    /// Number of candidate slot pairs examined during relocation
    pub relocation_probes: u64,

    /// Number of entries displaced to make room for a shorter probe path
    pub relocation_moves: u64,
}

#[allow(clippy::cast_precision_loss)]
impl Stats {
    /// Resets all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Folds another counter block into this one.
    pub fn add(&mut self, other: &Self) -> &mut Self {
        self.calls += other.calls;
        self.probes += other.probes;
        self.compaction_attempts += other.compaction_attempts;
        self.compaction_probes += other.compaction_probes;
        self.compaction_moves += other.compaction_moves;
        self.relocation_attempts += other.relocation_attempts;
        self.relocation_probes += other.relocation_probes;
        self.relocation_moves += other.relocation_moves;
        self
    }

    /// Average number of main-loop probes per query (0.0 if no calls yet).
    ///
    /// The headline number for comparing secondary hash strategies.
    #[must_use]
    pub fn probes_per_call(&self) -> f64 {
        if self.calls == 0 {
            return 0.0;
        }
        self.probes as f64 / self.calls as f64
    }

    pub(crate) fn mark_call(&mut self) {
        self.calls += 1;
    }

    pub(crate) fn mark_probe(&mut self) {
        self.probes += 1;
    }

    pub(crate) fn mark_compaction_attempt(&mut self) {
        self.compaction_attempts += 1;
    }

    pub(crate) fn mark_compaction_probe(&mut self) {
        self.compaction_probes += 1;
    }

    pub(crate) fn mark_compaction_move(&mut self) {
        self.compaction_moves += 1;
    }

    pub(crate) fn mark_relocation_attempt(&mut self) {
        self.relocation_attempts += 1;
    }

    pub(crate) fn mark_relocation_probe(&mut self) {
        self.relocation_probes += 1;
    }

    pub(crate) fn mark_relocation_move(&mut self) {
        self.relocation_moves += 1;
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "calls: {} probes: {} compaction: {}/{}/{} relocation: {}/{}/{}",
            self.calls,
            self.probes,
            self.compaction_attempts,
            self.compaction_probes,
            self.compaction_moves,
            self.relocation_attempts,
            self.relocation_probes,
            self.relocation_moves,
        )
    }
}
