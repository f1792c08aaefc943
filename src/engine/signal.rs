//! Signal type and level measurements
//!
//! A `Signal` is a mono sequence of real samples at a fixed sample rate.
//! It is produced by the I/O adapter, consumed and produced by the filter
//! engine, and never shared between filter invocations.

use serde::Serialize;

use crate::error::{Result, TapisError};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns `f64::NEG_INFINITY` for zero input.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Root mean square of a sample slice (0.0 for an empty slice)
pub fn calculate_rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f64).sqrt()
}

/// Largest absolute sample value
pub fn calculate_peak(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max)
}

// ============================================================================
// Signal
// ============================================================================

/// Mono audio signal at a fixed sample rate
///
/// # Example
/// ```
/// use tapis::engine::Signal;
///
/// let signal = Signal::new(vec![0.0; 44100], 44100).unwrap();
/// assert_eq!(signal.len(), 44100);
/// assert_eq!(signal.duration_secs(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    /// Create a signal, enforcing a positive sample rate and at least one sample
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(TapisError::InvalidSignal {
                reason: "sample rate must be greater than 0".to_string(),
            });
        }
        if samples.is_empty() {
            return Err(TapisError::InvalidSignal {
                reason: "signal contains no samples".to_string(),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build the output of a filter: same sample rate as `self`, new samples.
    ///
    /// Filters preserve length, so the invariants of `self` carry over.
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), self.samples.len());
        Self {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    #[inline]
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Half the sample rate, in Hz
    #[inline]
    pub fn nyquist(&self) -> f64 {
        0.5 * self.sample_rate as f64
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the signal holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Check every sample is finite (no NaN/Inf)
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Summary levels for display and reports
    pub fn stats(&self) -> SignalStats {
        let rms = calculate_rms(&self.samples);
        let peak = calculate_peak(&self.samples);
        SignalStats {
            sample_rate: self.sample_rate,
            num_samples: self.samples.len(),
            duration_secs: self.duration_secs(),
            rms_db: linear_to_db(rms),
            peak_db: linear_to_db(peak),
        }
    }
}

/// Level summary of a signal
#[derive(Debug, Clone, Serialize)]
pub struct SignalStats {
    pub sample_rate: u32,
    pub num_samples: usize,
    pub duration_secs: f64,
    pub rms_db: f64,
    pub peak_db: f64,
}

impl SignalStats {
    /// Generate a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "Duration: {:.3}s | {} samples @ {} Hz\nRMS: {:.1} dBFS | Peak: {:.1} dBFS",
            self.duration_secs, self.num_samples, self.sample_rate, self.rms_db, self.peak_db
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_zero_sample_rate() {
        let err = Signal::new(vec![0.0; 10], 0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SIGNAL");
    }

    #[test]
    fn test_rejects_empty_samples() {
        let err = Signal::new(Vec::new(), 44100).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SIGNAL");
    }

    #[test]
    fn test_nyquist_and_duration() {
        let signal = Signal::new(vec![0.0; 22050], 44100).unwrap();
        assert_relative_eq!(signal.nyquist(), 22050.0);
        assert_relative_eq!(signal.duration_secs(), 0.5);
    }

    #[test]
    fn test_db_conversions() {
        assert_relative_eq!(linear_to_db(1.0), 0.0);
        assert_relative_eq!(db_to_linear(-20.0), 0.1, epsilon = 1e-12);
        assert_eq!(linear_to_db(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_stats_of_full_scale_square() {
        let samples: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let stats = Signal::new(samples, 1000).unwrap().stats();
        assert_relative_eq!(stats.rms_db, 0.0, epsilon = 1e-9);
        assert_relative_eq!(stats.peak_db, 0.0, epsilon = 1e-9);
        assert_eq!(stats.num_samples, 100);
    }
}
