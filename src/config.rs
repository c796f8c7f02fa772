//! Cache configuration options

use crate::admission::DEFAULT_ADMISSION_THRESHOLD;

/// Configuration for the calculation cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache
    pub max_entries: usize,
    /// Number of storage attempts before a fingerprint is admitted
    pub admission_threshold: u32,
    /// Whether caching is enabled
    pub enabled: bool,
    /// Maximum number of retained performance log entries
    pub max_log_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            admission_threshold: DEFAULT_ADMISSION_THRESHOLD,
            enabled: true,
            max_log_entries: 1000,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with custom settings
    pub fn new(max_entries: usize, admission_threshold: u32) -> Self {
        Self {
            max_entries,
            admission_threshold,
            ..Default::default()
        }
    }

    /// Create a disabled cache configuration
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the admission threshold
    pub fn with_admission_threshold(mut self, admission_threshold: u32) -> Self {
        self.admission_threshold = admission_threshold;
        self
    }

    /// Enable or disable the cache
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the maximum number of retained performance log entries
    pub fn with_max_log_entries(mut self, max_log_entries: usize) -> Self {
        self.max_log_entries = max_log_entries;
        self
    }
}
