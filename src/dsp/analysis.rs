//! Filter and signal diagnostics.
//!
//! The series behind the usual filter-bank plots: magnitude spectrum of a
//! signal, impulse response and frequency response of a designed filter.

use std::f64::consts::PI;

use num_traits::Zero;
use rustfft::{num_complex::Complex64, FftPlanner};
use serde::Serialize;

use crate::engine::{calculate_rms, linear_to_db, Signal};
use crate::error::Result;

use super::lfilter::lfilter;
use super::types::Coefficients;

/// Default number of `freqz` points
pub const DEFAULT_RESPONSE_POINTS: usize = 8000;

/// Default impulse response length for recursive filters
pub const DEFAULT_IMPULSE_LEN: usize = 50;

/// Magnitude against frequency in Hz
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Frequency of the largest magnitude
    pub fn peak_frequency(&self) -> Option<f64> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| self.frequencies[i])
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// `B(e^{jw}) / A(e^{jw})` at `freq` Hz
pub fn freqz_at(b: &[f64], a: &[f64], freq: f64, sample_rate: f64) -> Complex64 {
    let w = 2.0 * PI * freq / sample_rate;
    let eval = |coeffs: &[f64]| -> Complex64 {
        coeffs
            .iter()
            .enumerate()
            .fold(Complex64::zero(), |acc, (k, &c)| {
                acc + Complex64::from_polar(c, -w * k as f64)
            })
    };
    eval(b) / eval(a)
}

/// Magnitude response on `n_points` equally spaced frequencies in `[0, fs/2)`
pub fn frequency_response(b: &[f64], a: &[f64], n_points: usize, sample_rate: u32) -> Spectrum {
    let fs = sample_rate as f64;
    let frequencies: Vec<f64> = (0..n_points)
        .map(|k| 0.5 * fs * k as f64 / n_points as f64)
        .collect();
    let magnitudes = frequencies
        .iter()
        .map(|&f| freqz_at(b, a, f, fs).norm())
        .collect();
    Spectrum {
        frequencies,
        magnitudes,
    }
}

/// Impulse response: the taps themselves for FIR, `len` samples of the
/// recursion for IIR
pub fn impulse_response(coefficients: &Coefficients, len: usize) -> Result<Vec<f64>> {
    match coefficients {
        Coefficients::Fir { taps } => Ok(taps.clone()),
        Coefficients::Iir { b, a } => {
            let mut impulse = vec![0.0; len];
            if let Some(first) = impulse.first_mut() {
                *first = 1.0;
            }
            lfilter(b, a, &impulse)
        }
    }
}

/// Unnormalized `|FFT|` over the positive half of the spectrum
///
/// Bin `k` sits at `k * fs / N`.
pub fn magnitude_spectrum(signal: &Signal) -> Spectrum {
    let n = signal.len();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex64> = signal
        .samples()
        .iter()
        .map(|&s| Complex64::new(s, 0.0))
        .collect();
    fft.process(&mut buffer);

    let bin_hz = signal.sample_rate() as f64 / n as f64;
    let (frequencies, magnitudes) = buffer
        .iter()
        .take(n / 2)
        .enumerate()
        .map(|(k, c)| (k as f64 * bin_hz, c.norm()))
        .unzip();

    Spectrum {
        frequencies,
        magnitudes,
    }
}

/// RMS of `output` relative to `input`, in dB
pub fn band_gain_db(input: &Signal, output: &Signal) -> f64 {
    let rms_in = calculate_rms(input.samples());
    let rms_out = calculate_rms(output.samples());
    if rms_in == 0.0 {
        return f64::NEG_INFINITY;
    }
    linear_to_db(rms_out / rms_in)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_test_tone;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_unity_system_is_flat() {
        let response = frequency_response(&[1.0], &[1.0], 64, 44100);
        assert_eq!(response.len(), 64);
        assert_eq!(response.frequencies[0], 0.0);
        assert!(response.frequencies[63] < 22050.0);
        for m in &response.magnitudes {
            assert_abs_diff_eq!(*m, 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_default_response_grid() {
        let response = frequency_response(&[0.5, 0.5], &[1.0], DEFAULT_RESPONSE_POINTS, 8000);
        assert_eq!(response.len(), 8000);
        assert_abs_diff_eq!(response.frequencies[1], 0.5, epsilon = 1e-12);
        // Two-tap average: |cos(w/2)|
        assert_abs_diff_eq!(response.magnitudes[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(response.magnitudes[4000], (PI / 4.0).cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_freqz_of_one_pole() {
        // H(z) = 1 / (1 - 0.5 z^-1): gain 2 at DC, 2/3 at Nyquist
        assert_abs_diff_eq!(freqz_at(&[1.0], &[1.0, -0.5], 0.0, 100.0).norm(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            freqz_at(&[1.0], &[1.0, -0.5], 50.0, 100.0).norm(),
            2.0 / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_impulse_response() {
        let fir = Coefficients::Fir {
            taps: vec![0.25, 0.5, 0.25],
        };
        assert_eq!(impulse_response(&fir, DEFAULT_IMPULSE_LEN).unwrap(), vec![0.25, 0.5, 0.25]);

        let iir = Coefficients::Iir {
            b: vec![1.0],
            a: vec![1.0, -0.5],
        };
        let h = impulse_response(&iir, DEFAULT_IMPULSE_LEN).unwrap();
        assert_eq!(h.len(), 50);
        assert_abs_diff_eq!(h[3], 0.125, epsilon = 1e-15);
        assert!(impulse_response(&iir, 0).unwrap().is_empty());
    }

    #[test]
    fn test_spectrum_peak_on_tone_bin() {
        // 1 s at 8 kHz puts bins exactly 1 Hz apart
        let tone = generate_test_tone(440.0, 1.0, 8000).unwrap();
        let spectrum = magnitude_spectrum(&tone);
        assert_eq!(spectrum.len(), 4000);
        assert_abs_diff_eq!(spectrum.peak_frequency().unwrap(), 440.0, epsilon = 1e-9);
        // Unnormalized: a unit sine peaks at N / 2
        assert_abs_diff_eq!(spectrum.magnitudes[440], 4000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_band_gain_db() {
        let tone = generate_test_tone(100.0, 0.5, 8000).unwrap();
        let half = tone.with_samples(tone.samples().iter().map(|s| s * 0.5).collect());
        assert_abs_diff_eq!(band_gain_db(&tone, &half), -6.0206, epsilon = 1e-3);
        assert_abs_diff_eq!(band_gain_db(&tone, &tone), 0.0, epsilon = 1e-12);
    }
}
