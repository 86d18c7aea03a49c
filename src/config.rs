//! Configuration for the channel pipeline.

use crate::types::Platform;
use crate::{Result, SudsError};

/// Settings for a [`Putaway`](crate::Putaway) run.
///
/// ```
/// use suds_rs::{Platform, PutawayConfig};
///
/// let config = PutawayConfig::new()
///     .with_buffer_bytes(400_000)
///     .with_gap_threshold(1.5)
///     .with_output_format("sparc")
///     .unwrap();
/// assert_eq!(config.capacity, 100_000);
/// assert_eq!(config.target, Platform::Sparc);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PutawayConfig {
    /// Assembly buffer capacity in samples.
    pub capacity: usize,
    /// Gap tolerance in sample periods.
    pub gap_threshold: f64,
    /// Platform the output will be read on.
    pub target: Platform,
    /// Platform the structures are laid out for before normalization.
    pub source: Platform,
}

impl PutawayConfig {
    /// Create a configuration with defaults.
    ///
    /// Defaults: 1 Mi samples, tolerance of 1 sample period, native source
    /// and target platform.
    pub fn new() -> Self {
        Self {
            capacity: 1 << 20,
            gap_threshold: 1.0,
            target: Platform::native(),
            source: Platform::native(),
        }
    }

    /// Set the buffer capacity in samples.
    pub fn with_capacity(mut self, samples: usize) -> Self {
        self.capacity = samples;
        self
    }

    /// Set the buffer capacity from a byte budget (4 bytes per sample).
    pub fn with_buffer_bytes(mut self, bytes: usize) -> Self {
        self.capacity = bytes / 4;
        self
    }

    pub fn with_gap_threshold(mut self, periods: f64) -> Self {
        self.gap_threshold = periods;
        self
    }

    pub fn with_target(mut self, target: Platform) -> Self {
        self.target = target;
        self
    }

    /// Set the target from its configuration name (`"intel"` or `"sparc"`).
    pub fn with_output_format(mut self, name: &str) -> Result<Self> {
        self.target = name.parse()?;
        Ok(self)
    }

    pub fn with_source(mut self, source: Platform) -> Self {
        self.source = source;
        self
    }

    /// Check the settings before any buffer is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SudsError::InvalidArgument(
                "buffer capacity must be positive".into(),
            ));
        }
        if !self.gap_threshold.is_finite() || self.gap_threshold < 0.0 {
            return Err(SudsError::InvalidArgument(format!(
                "gap threshold {} must be a non-negative number of sample periods",
                self.gap_threshold
            )));
        }
        Ok(())
    }
}

impl Default for PutawayConfig {
    fn default() -> Self {
        Self::new()
    }
}
