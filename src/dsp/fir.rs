//! FIR filter design and application.
//!
//! Windowed-sinc design: an ideal band response is built from differences of
//! sinc kernels, tapered by a window and scaled to unit gain at a reference
//! frequency of the first passband.
//!
//! - `low`: passband starts at 0 Hz (`pass_zero = true`)
//! - `band`: two cutoffs, `pass_zero = false`
//! - `high`: one cutoff, `pass_zero = false`, so the passband reaches Nyquist

use std::f64::consts::PI;

use crate::engine::Signal;
use crate::error::{Result, TapisError};

use super::lfilter::convolve_causal;
use super::types::{Coefficients, FirSpec, WindowKind};
use super::window::window;

/// Design the taps for `spec` at `sample_rate` Hz
///
/// Cutoffs are given in Hz and normalized by the Nyquist frequency here.
pub fn design_fir(spec: &FirSpec, sample_rate: u32) -> Result<Vec<f64>> {
    if sample_rate == 0 {
        return Err(TapisError::design("sample rate must be greater than 0"));
    }
    spec.cutoff.check_shape(spec.pass_type)?;

    let nyquist = 0.5 * sample_rate as f64;
    let normalized: Vec<f64> = spec
        .cutoff
        .frequencies()
        .iter()
        .map(|&c| c / nyquist)
        .collect();

    firwin(
        spec.num_taps,
        &normalized,
        spec.window,
        spec.pass_type.pass_zero(),
    )
}

/// Windowed-sinc FIR design on Nyquist-normalized cutoffs
///
/// # Errors
/// * `DesignError` - If `num_taps` is 0, a cutoff is outside (0, 1), cutoffs
///   are not strictly increasing, or the response passes Nyquist with an even
///   number of taps
pub fn firwin(
    num_taps: usize,
    cutoffs: &[f64],
    window_kind: WindowKind,
    pass_zero: bool,
) -> Result<Vec<f64>> {
    if num_taps == 0 {
        return Err(TapisError::design("number of taps must be greater than 0"));
    }
    if cutoffs.is_empty() {
        return Err(TapisError::design("at least one cutoff frequency is required"));
    }
    for &c in cutoffs {
        if !(c > 0.0 && c < 1.0) {
            return Err(TapisError::design(format!(
                "normalized cutoff {} must lie strictly between 0 and 1 (Nyquist)",
                c
            )));
        }
    }
    if cutoffs.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(TapisError::design(
            "cutoff frequencies must be strictly increasing",
        ));
    }

    let pass_nyquist = (cutoffs.len() % 2 == 1) ^ pass_zero;
    if pass_nyquist && num_taps % 2 == 0 {
        return Err(TapisError::design(format!(
            "a filter passing Nyquist needs an odd number of taps, got {}",
            num_taps
        )));
    }

    let mut edges = Vec::with_capacity(cutoffs.len() + 2);
    if pass_zero {
        edges.push(0.0);
    }
    edges.extend_from_slice(cutoffs);
    if pass_nyquist {
        edges.push(1.0);
    }

    let alpha = 0.5 * (num_taps - 1) as f64;
    let m: Vec<f64> = (0..num_taps).map(|n| n as f64 - alpha).collect();

    let mut h = vec![0.0; num_taps];
    for band in edges.chunks_exact(2) {
        let (left, right) = (band[0], band[1]);
        for (hn, &mn) in h.iter_mut().zip(&m) {
            *hn += right * sinc(right * mn) - left * sinc(left * mn);
        }
    }

    for (hn, wn) in h.iter_mut().zip(window(window_kind, num_taps)) {
        *hn *= wn;
    }

    // Unit gain at DC, at Nyquist, or at the centre of the first band
    let (left, right) = (edges[0], edges[1]);
    let scale_frequency = if left == 0.0 {
        0.0
    } else if right == 1.0 {
        1.0
    } else {
        0.5 * (left + right)
    };
    let gain: f64 = h
        .iter()
        .zip(&m)
        .map(|(hn, mn)| hn * (PI * mn * scale_frequency).cos())
        .sum();
    if gain == 0.0 || !gain.is_finite() {
        return Err(TapisError::design("FIR response has zero gain in its passband"));
    }
    for hn in h.iter_mut() {
        *hn /= gain;
    }

    Ok(h)
}

/// Design the FIR filter for the signal's sample rate and convolve causally
///
/// Returns the filtered signal (same length, leading transient, no delay
/// compensation) and the taps.
pub fn apply_fir_filter(signal: &Signal, spec: &FirSpec) -> Result<(Signal, Coefficients)> {
    let taps = design_fir(spec, signal.sample_rate())?;
    let filtered = convolve_causal(&taps, signal.samples())?;
    Ok((signal.with_samples(filtered), Coefficients::Fir { taps }))
}

/// Normalized sinc: sin(pi x) / (pi x)
#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}
