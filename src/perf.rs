//! Performance instrumentation for the calculation cache
//!
//! Keeps a bounded in-memory log of timed cache operations, optionally
//! mirrored to an append-only CSV file, and derives a report comparing the
//! average cost of hits versus misses to quantify what caching saves.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::Result;
use crate::fingerprint::Fingerprint;

/// Header row written to every CSV sink and export
pub const LOG_HEADER: &str = "timestamp,operation,duration_ms,cached";

/// Operation kinds recorded in the performance log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A lookup that found a cached value
    Hit,
    /// A lookup that found nothing
    Miss,
    /// A storage attempt
    Store,
}

impl Operation {
    /// The name used in the CSV log
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Hit => "hit",
            Operation::Miss => "miss",
            Operation::Store => "store",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed cache operation
#[derive(Debug, Clone, Serialize)]
pub struct PerfLogEntry {
    /// When the operation completed
    pub timestamp: DateTime<Utc>,
    /// Fingerprint the operation was performed for
    pub fingerprint: Fingerprint,
    /// What kind of operation this was
    pub operation: Operation,
    /// Wall-clock duration in fractional milliseconds
    pub duration_ms: f64,
    /// Whether the operation was served from the cache
    pub cached: bool,
}

impl PerfLogEntry {
    fn csv_line(&self) -> String {
        format!(
            "{},{},{:.3},{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.operation,
            self.duration_ms,
            self.cached
        )
    }
}

/// Performance report derived from the retained log
#[derive(Debug, Clone, Serialize)]
pub struct PerfReport {
    /// Total number of logged operations, stores included
    pub total_operations: usize,
    /// Number of logged hits
    pub hit_count: usize,
    /// Number of logged misses
    pub miss_count: usize,
    /// Average hit duration in milliseconds
    pub avg_hit_time_ms: f64,
    /// Average miss duration in milliseconds
    pub avg_miss_time_ms: f64,
    /// Estimated total time saved by hits, in milliseconds
    pub time_saved_ms: f64,
    /// hit_count / (hit_count + miss_count), or 0 with no lookups
    pub hit_ratio: f64,
    /// Average miss duration divided by average hit duration, or 0 when the
    /// average hit duration is 0
    pub performance_improvement: f64,
}

/// Records timed cache operations and derives performance reports
pub struct PerfRecorder {
    log: RwLock<VecDeque<PerfLogEntry>>,
    max_entries: usize,
    enabled: AtomicBool,
    sink: Mutex<Option<File>>,
    sink_error_reported: AtomicBool,
}

impl PerfRecorder {
    /// Create a recorder retaining at most `max_entries` log entries
    pub fn new(max_entries: usize) -> Self {
        Self {
            log: RwLock::new(VecDeque::new()),
            max_entries,
            enabled: AtomicBool::new(false),
            sink: Mutex::new(None),
            sink_error_reported: AtomicBool::new(false),
        }
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turn logging on or off.
    ///
    /// Enabling with a sink path (re)creates the file and writes the header
    /// row before any entries are appended. Disabling drops the sink. Fails
    /// with an IO error if the sink cannot be created, in which case the
    /// previous logging state is retained.
    pub fn enable(&self, enabled: bool, sink: Option<&Path>) -> Result<()> {
        if enabled {
            if let Some(path) = sink {
                let mut file = File::create(path)?;
                writeln!(file, "{LOG_HEADER}")?;
                *self.sink.lock() = Some(file);
                self.sink_error_reported.store(false, Ordering::Relaxed);
            }
        } else {
            *self.sink.lock() = None;
        }
        self.enabled.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// Record a timed lookup outcome
    pub fn record_lookup(&self, fingerprint: Fingerprint, hit: bool, started: Instant) {
        let operation = if hit { Operation::Hit } else { Operation::Miss };
        self.record(fingerprint, operation, started);
    }

    /// Record a timed storage attempt
    pub fn record_store(&self, fingerprint: Fingerprint, started: Instant) {
        self.record(fingerprint, Operation::Store, started);
    }

    fn record(&self, fingerprint: Fingerprint, operation: Operation, started: Instant) {
        if !self.is_enabled() {
            return;
        }

        let entry = PerfLogEntry {
            timestamp: Utc::now(),
            fingerprint,
            operation,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            cached: operation == Operation::Hit,
        };
        let line = entry.csv_line();

        {
            let mut log = self.log.write();
            log.push_back(entry);
            while log.len() > self.max_entries {
                log.pop_front();
            }
        }

        self.write_to_sink(&line);
    }

    /// Append one line to the sink, if one is installed.
    ///
    /// A failed write is reported once per sink session and the line dropped,
    /// never retried, so a slow or unavailable destination cannot stall
    /// calculation threads.
    fn write_to_sink(&self, line: &str) {
        let mut sink = self.sink.lock();
        if let Some(file) = sink.as_mut() {
            if let Err(err) = writeln!(file, "{line}") {
                if !self.sink_error_reported.swap(true, Ordering::Relaxed) {
                    tracing::warn!(error = %err, "failed to write performance log line");
                }
            }
        }
    }

    /// Derive a performance report from the retained log.
    ///
    /// Returns `None` when no operations have been logged, as distinct from
    /// a report full of zeroes.
    pub fn report(&self) -> Option<PerfReport> {
        let log = self.log.read();
        if log.is_empty() {
            return None;
        }

        let mut hit_total = 0.0;
        let mut hit_count = 0usize;
        let mut miss_total = 0.0;
        let mut miss_count = 0usize;
        for entry in log.iter() {
            match entry.operation {
                Operation::Hit => {
                    hit_total += entry.duration_ms;
                    hit_count += 1;
                }
                Operation::Miss => {
                    miss_total += entry.duration_ms;
                    miss_count += 1;
                }
                Operation::Store => {}
            }
        }

        let avg_hit_time_ms = if hit_count > 0 {
            hit_total / hit_count as f64
        } else {
            0.0
        };
        let avg_miss_time_ms = if miss_count > 0 {
            miss_total / miss_count as f64
        } else {
            0.0
        };
        // A negative saving is meaningful: cache overhead currently exceeds
        // recomputation cost for this workload.
        let time_saved_per_hit = avg_miss_time_ms - avg_hit_time_ms;
        let lookups = hit_count + miss_count;

        Some(PerfReport {
            total_operations: log.len(),
            hit_count,
            miss_count,
            avg_hit_time_ms,
            avg_miss_time_ms,
            time_saved_ms: time_saved_per_hit * hit_count as f64,
            hit_ratio: if lookups > 0 {
                hit_count as f64 / lookups as f64
            } else {
                0.0
            },
            performance_improvement: if avg_hit_time_ms > 0.0 {
                avg_miss_time_ms / avg_hit_time_ms
            } else {
                0.0
            },
        })
    }

    /// Write the full retained log as CSV to the given destination
    pub fn export(&self, path: &Path) -> Result<()> {
        let entries: Vec<PerfLogEntry> = self.log.read().iter().cloned().collect();

        let mut file = File::create(path)?;
        writeln!(file, "{LOG_HEADER}")?;
        for entry in &entries {
            writeln!(file, "{}", entry.csv_line())?;
        }
        Ok(())
    }

    /// Number of retained log entries
    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }
}

impl fmt::Debug for PerfRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerfRecorder")
            .field("enabled", &self.is_enabled())
            .field("max_entries", &self.max_entries)
            .field("retained", &self.len())
            .finish()
    }
}
