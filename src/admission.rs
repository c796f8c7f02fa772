//! Admission control for the calculation cache
//!
//! Many calculations are requested once (e.g. an incidental recompute during
//! a UI re-render) and never again. Gating admission behind repeated demand
//! keeps cache capacity for fingerprints that are actually reused.

use ahash::AHashMap;

use crate::fingerprint::Fingerprint;

/// Default number of storage attempts before a fingerprint is admitted
pub const DEFAULT_ADMISSION_THRESHOLD: u32 = 3;

/// Tracks how many times each fingerprint has been offered for storage
#[derive(Debug)]
pub struct FrequencyGate {
    counts: AHashMap<Fingerprint, u32>,
    threshold: u32,
}

impl FrequencyGate {
    /// Create a gate with the given admission threshold
    pub fn new(threshold: u32) -> Self {
        Self {
            counts: AHashMap::new(),
            threshold,
        }
    }

    /// Record a storage attempt for a fingerprint.
    ///
    /// Returns whether the fingerprint has now reached the admission
    /// threshold. Counts only grow until [`reset`](Self::reset); eviction of
    /// a cache entry does not remove its counter, so a previously hot key
    /// stays admittable after transient eviction.
    pub fn record_attempt(&mut self, fingerprint: Fingerprint) -> bool {
        let count = self.counts.entry(fingerprint).or_insert(0);
        *count += 1;
        *count >= self.threshold
    }

    /// Clear all counters. Used only by a full cache clear.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Change the admission threshold for subsequent attempts
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    /// Get the current admission threshold
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Number of fingerprints with recorded attempts
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no attempts have been recorded
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Default for FrequencyGate {
    fn default() -> Self {
        Self::new(DEFAULT_ADMISSION_THRESHOLD)
    }
}
