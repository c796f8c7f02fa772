//! Calculation Result Cache
//!
//! This crate provides a thread-safe, admission-gated LRU cache for
//! memoizing expensive engineering calculation results behind a fingerprint
//! derived from the calculation's parameter record.
//!
//! # Features
//!
//! - **Deterministic Fingerprints**: Parameter records hash to the same key
//!   regardless of field order
//! - **Admission Gating**: Results are cached only once the same fingerprint
//!   has been requested repeatedly, so one-off calculations never take up
//!   capacity
//! - **LRU Eviction**: Least recently used entries are evicted when capacity
//!   is reached
//! - **Thread-Safe**: Safe for concurrent access from worker threads
//! - **Instrumentation**: Hit/miss statistics plus a timed performance log
//!   with an exportable CSV report quantifying what caching saves
//!
//! # Example
//!
//! ```ignore
//! use calc_cache::{CacheConfig, CalculationCache};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(CalculationCache::new(CacheConfig::default()));
//!
//! // Check cache before running the calculation
//! if let Some(result) = cache.lookup(&params)? {
//!     return Ok(result);
//! }
//!
//! // Run the calculation and offer the result for storage
//! let result = voltage_drop(&params);
//! cache.store(&params, result.clone())?;
//! ```

pub mod admission;
pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod perf;
pub mod stats;

pub use admission::{FrequencyGate, DEFAULT_ADMISSION_THRESHOLD};
pub use cache::{CacheEntry, CalculationCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use fingerprint::Fingerprint;
pub use perf::{Operation, PerfLogEntry, PerfRecorder, PerfReport, LOG_HEADER};
pub use stats::{CacheStats, StatsSnapshot};
