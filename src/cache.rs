//! Thread-safe LRU cache for calculation results
//!
//! Storage is admission-gated: a result is only cached once the same
//! fingerprint has been offered repeatedly, so one-off calculations never
//! displace entries that are actually reused.

use lru::LruCache;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::admission::FrequencyGate;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fingerprint::Fingerprint;
use crate::perf::{PerfRecorder, PerfReport};
use crate::stats::{CacheStats, StatsSnapshot};

/// Entry stored in the cache
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached calculation result
    pub value: V,
    /// When this entry was last accessed
    pub last_accessed: Instant,
    /// Number of times this entry was served
    pub hit_count: u64,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            last_accessed: Instant::now(),
            hit_count: 0,
        }
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    /// Time since this entry was last accessed
    pub fn idle(&self) -> Duration {
        self.last_accessed.elapsed()
    }
}

struct Inner<V> {
    store: LruCache<Fingerprint, CacheEntry<V>>,
    gate: FrequencyGate,
}

/// Thread-safe, admission-gated LRU cache for calculation results
pub struct CalculationCache<V> {
    /// Bounded store and admission counters, guarded as a unit
    inner: RwLock<Inner<V>>,
    /// Bypass flag; when off, lookups report absent and stores are no-ops
    enabled: AtomicBool,
    /// Hit/miss/eviction accounting
    stats: CacheStats,
    /// Timing capture and performance log
    perf: PerfRecorder,
}

impl<V> CalculationCache<V>
where
    V: Clone + Serialize,
{
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(Inner {
                store: LruCache::new(capacity),
                gate: FrequencyGate::new(config.admission_threshold),
            }),
            enabled: AtomicBool::new(config.enabled),
            stats: CacheStats::new(),
            perf: PerfRecorder::new(config.max_log_entries),
        }
    }

    /// Create a cache with default configuration
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Check if caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable the cache.
    ///
    /// While disabled, lookups report absent and stores are no-ops without
    /// touching admission counters or statistics.
    pub fn enable(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Look up a result by parameter record.
    ///
    /// Derives the fingerprint and performs a timed lookup. Fails only if
    /// the parameter record cannot be fingerprinted.
    pub fn lookup<P: Serialize>(&self, params: &P) -> Result<Option<V>> {
        let fingerprint = Fingerprint::from_params(params)?;
        Ok(self.get(fingerprint))
    }

    /// Offer a computed result for storage, subject to admission gating.
    ///
    /// Fails only if the parameter record cannot be fingerprinted; gating
    /// itself is not an error.
    pub fn store<P: Serialize>(&self, params: &P, value: V) -> Result<()> {
        let fingerprint = Fingerprint::from_params(params)?;
        self.put(fingerprint, value);
        Ok(())
    }

    /// Look up a result, computing and offering it on absence.
    ///
    /// The computation runs outside any cache lock. The computed value is
    /// offered to the gated store, so early calls recompute until the
    /// fingerprint proves hot.
    pub fn lookup_or_compute<P, F>(&self, params: &P, compute: F) -> Result<V>
    where
        P: Serialize,
        F: FnOnce() -> V,
    {
        let fingerprint = Fingerprint::from_params(params)?;
        if let Some(value) = self.get(fingerprint) {
            return Ok(value);
        }

        let value = compute();
        self.put(fingerprint, value.clone());
        Ok(value)
    }

    /// Get an entry by fingerprint, refreshing its recency on a hit.
    ///
    /// Lookups never touch admission counters; only storage attempts do.
    pub fn get(&self, fingerprint: Fingerprint) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }

        let started = Instant::now();
        let result = {
            let mut inner = self.inner.write();
            inner.store.get_mut(&fingerprint).map(|entry| {
                entry.touch();
                entry.hit_count += 1;
                entry.value.clone()
            })
        };

        // Stats and log updates happen after the store lock is released
        if result.is_some() {
            self.stats.record_hit();
            tracing::debug!(%fingerprint, "cache hit");
        } else {
            self.stats.record_miss();
        }
        self.perf.record_lookup(fingerprint, result.is_some(), started);

        result
    }

    /// Offer a value for storage under a fingerprint.
    ///
    /// Records an admission attempt; below the threshold the store is left
    /// untouched. At or above it, the entry is inserted or updated and made
    /// most recently used, evicting the least recently used entry if a new
    /// key would exceed capacity.
    pub fn put(&self, fingerprint: Fingerprint, value: V) {
        if !self.is_enabled() {
            return;
        }

        let started = Instant::now();
        let (admitted, evicted, len) = {
            let mut inner = self.inner.write();
            let admitted = inner.gate.record_attempt(fingerprint);
            let mut evicted = None;
            if admitted {
                // push displaces the LRU pair when inserting a new key at
                // capacity; a same-key update returns the old entry instead
                if let Some((old, _)) = inner.store.push(fingerprint, CacheEntry::new(value)) {
                    if old != fingerprint {
                        evicted = Some(old);
                    }
                }
            }
            (admitted, evicted, inner.store.len())
        };

        if let Some(old) = evicted {
            self.stats.record_eviction();
            tracing::debug!(fingerprint = %old, "evicted least recently used entry");
        }
        if admitted {
            self.stats.set_entry_count(len as u64);
            tracing::debug!(%fingerprint, "cache store");
        }
        self.perf.record_store(fingerprint, started);
    }

    /// Empty the store and the admission counters together, and zero the
    /// statistics counters. The retained performance log is kept.
    pub fn clear(&self) {
        {
            let mut inner = self.inner.write();
            inner.store.clear();
            inner.gate.reset();
        }

        self.stats.reset();
        self.stats.set_entry_count(0);
    }

    /// Change the maximum number of entries.
    ///
    /// Shrinking below the current occupancy evicts least recently used
    /// entries immediately. Rejects a capacity below 1, leaving the prior
    /// capacity in place.
    pub fn set_max_size(&self, max_entries: usize) -> Result<()> {
        let capacity = NonZeroUsize::new(max_entries).ok_or_else(|| {
            CacheError::InvalidConfiguration("cache size must be at least 1".to_string())
        })?;

        let (evicted, len) = {
            let mut inner = self.inner.write();
            let before = inner.store.len();
            inner.store.resize(capacity);
            (before - inner.store.len(), inner.store.len())
        };

        for _ in 0..evicted {
            self.stats.record_eviction();
        }
        self.stats.set_entry_count(len as u64);
        Ok(())
    }

    /// Change the admission threshold for subsequent storage attempts
    pub fn set_admission_threshold(&self, threshold: u32) {
        self.inner.write().gate.set_threshold(threshold);
    }

    /// Apply a configuration at runtime.
    ///
    /// Validates the capacity first; on rejection the prior configuration is
    /// fully retained. The retained-log length binds at construction and is
    /// not affected.
    pub fn configure(&self, config: &CacheConfig) -> Result<()> {
        self.set_max_size(config.max_entries)?;
        self.set_admission_threshold(config.admission_threshold);
        self.enable(config.enabled);
        Ok(())
    }

    /// Snapshot of hit/miss counts, occupancy, capacity, and the enabled
    /// flag, reflecting state at the moment of the call
    pub fn stats(&self) -> StatsSnapshot {
        let (size, max_size) = {
            let inner = self.inner.read();
            (inner.store.len(), inner.store.cap().get())
        };
        StatsSnapshot {
            hits: self.stats.hits(),
            misses: self.stats.misses(),
            hit_ratio: self.stats.hit_rate(),
            size,
            max_size,
            enabled: self.is_enabled(),
        }
    }

    /// Raw hit/miss/eviction counters
    pub fn counters(&self) -> &CacheStats {
        &self.stats
    }

    /// Turn performance logging on or off, optionally mirroring entries to
    /// an append-only CSV sink (created or truncated up front)
    pub fn enable_logging(&self, enabled: bool, sink: Option<&Path>) -> Result<()> {
        self.perf.enable(enabled, sink)
    }

    /// Derive a performance report from the retained log, or `None` when
    /// nothing has been logged
    pub fn performance_report(&self) -> Option<PerfReport> {
        self.perf.report()
    }

    /// Export the retained performance log as CSV
    pub fn export_log(&self, path: &Path) -> Result<()> {
        self.perf.export(path)
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.inner.read().store.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().store.is_empty()
    }

    /// Get the configured maximum number of entries
    pub fn max_size(&self) -> usize {
        self.inner.read().store.cap().get()
    }

    /// Get the current admission threshold
    pub fn admission_threshold(&self) -> u32 {
        self.inner.read().gate.threshold()
    }
}

impl<V> Default for CalculationCache<V>
where
    V: Clone + Serialize,
{
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<V> fmt::Debug for CalculationCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("CalculationCache")
            .field("enabled", &self.enabled.load(Ordering::Relaxed))
            .field("max_entries", &inner.store.cap().get())
            .field("current_entries", &inner.store.len())
            .field("admission_threshold", &inner.gate.threshold())
            .finish()
    }
}
