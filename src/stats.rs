//! Trace statistics for the SUDS trace descriptor.

/// Number of leading samples averaged into the noise estimate.
pub const NOISE_WINDOW: usize = 200;

/// Minimum, maximum, and noise estimate of an assembled trace.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraceStats {
    pub min: i32,
    pub max: i32,
    /// Mean of the first [`NOISE_WINDOW`] samples.
    pub noise: f32,
}

impl TraceStats {
    /// Compute statistics over the whole buffer, fill zeros included.
    ///
    /// An empty buffer yields all zeros.
    pub fn compute(samples: &[i32]) -> Self {
        let Some(&first) = samples.first() else {
            return Self::default();
        };

        let (min, max) = samples
            .iter()
            .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));

        let head = &samples[..samples.len().min(NOISE_WINDOW)];
        let total: i64 = head.iter().map(|&s| i64::from(s)).sum();
        let noise = (total as f64 / head.len() as f64) as f32;

        Self { min, max, noise }
    }
}
