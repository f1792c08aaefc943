//! IIR filter design and application.
//!
//! Classical design: analog lowpass prototype, frequency transformation to
//! the requested pass type, bilinear transform, then expansion into `b`/`a`
//! polynomials.
//!
//! Frequencies are normalized to Nyquist (`Wn` in (0, 1)) and prewarped with
//! `4 * tan(pi * Wn / 2)`, which places the digital cutoff exactly at `Wn`
//! after a bilinear transform at a design rate of 2.

use std::f64::consts::PI;

use log::debug;
use num_traits::One;
use rustfft::num_complex::Complex64;

use crate::engine::Signal;
use crate::error::{Result, TapisError};

use super::lfilter::lfilter;
use super::poly::{poly_from_roots, real_part};
use super::prototype::{besselap, buttap, cheb1ap, ellipap, Zpk};
use super::types::{Coefficients, Cutoff, IirFamily, IirSpec, PassType};

/// Sample rate used for the bilinear transform of normalized frequencies
const DESIGN_RATE: f64 = 2.0;

/// Cutoffs in Hz divided by Nyquist
///
/// # Errors
/// * `DesignError` - If a normalized cutoff is not strictly inside (0, 1)
pub fn normalize_cutoff(cutoff: &Cutoff, sample_rate: u32) -> Result<Vec<f64>> {
    if sample_rate == 0 {
        return Err(TapisError::design("sample rate must be greater than 0"));
    }
    let nyquist = 0.5 * sample_rate as f64;
    cutoff
        .frequencies()
        .into_iter()
        .map(|f| {
            let wn = f / nyquist;
            if wn > 0.0 && wn < 1.0 {
                Ok(wn)
            } else {
                Err(TapisError::design(format!(
                    "cutoff {} Hz must lie strictly between 0 and Nyquist ({} Hz)",
                    f, nyquist
                )))
            }
        })
        .collect()
}

/// Analog prototype for a family at the given order
fn prototype(family: IirFamily, order: usize) -> Result<Zpk> {
    match family {
        IirFamily::Butterworth => buttap(order),
        IirFamily::Chebyshev { rp } => cheb1ap(order, rp),
        IirFamily::Elliptic { rp, rs } => ellipap(order, rp, rs),
        IirFamily::Bessel => besselap(order),
    }
}

/// Design `b`/`a` coefficients for `spec` at `sample_rate` Hz
///
/// Low and high pass give `order + 1` coefficients each; band-pass doubles
/// the order. `a[0]` is always 1.
pub fn design_iir(spec: &IirSpec, sample_rate: u32) -> Result<(Vec<f64>, Vec<f64>)> {
    if spec.order == 0 {
        return Err(TapisError::design("filter order must be greater than 0"));
    }
    spec.cutoff.check_shape(spec.pass_type)?;
    let wn = normalize_cutoff(&spec.cutoff, sample_rate)?;

    let analog = prototype(spec.family, spec.order)?;

    let warped: Vec<f64> = wn
        .iter()
        .map(|w| 2.0 * DESIGN_RATE * (PI * w / DESIGN_RATE).tan())
        .collect();

    let transformed = match spec.pass_type {
        PassType::Low => lp2lp_zpk(&analog, warped[0]),
        PassType::High => lp2hp_zpk(&analog, warped[0]),
        PassType::Band => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            lp2bp_zpk(&analog, wo, bw)
        }
    };

    let digital = bilinear_zpk(&transformed, DESIGN_RATE);
    let (b, a) = zpk2tf(&digital);
    check_finite(&b, &a)?;

    debug!(
        "Designed {} {}-pass order {} at {} Hz: {} zeros, {} poles",
        spec.family,
        spec.pass_type,
        spec.order,
        sample_rate,
        digital.zeros.len(),
        digital.poles.len()
    );

    Ok((b, a))
}

/// Reject coefficient sets carrying NaN or infinity
fn check_finite(b: &[f64], a: &[f64]) -> Result<()> {
    if b.iter().chain(a).all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(TapisError::design("filter coefficients are not finite"))
    }
}

/// Design the IIR filter for the signal's sample rate and run it causally
pub fn apply_iir_filter(signal: &Signal, spec: &IirSpec) -> Result<(Signal, Coefficients)> {
    let (b, a) = design_iir(spec, signal.sample_rate())?;
    let filtered = lfilter(&b, &a, signal.samples())?;
    Ok((signal.with_samples(filtered), Coefficients::Iir { b, a }))
}

fn product(values: impl Iterator<Item = Complex64>) -> Complex64 {
    values.fold(Complex64::one(), |acc, v| acc * v)
}

/// Scale a unit-cutoff lowpass to cutoff `wo`
pub fn lp2lp_zpk(zpk: &Zpk, wo: f64) -> Zpk {
    let degree = zpk.degree();
    Zpk {
        zeros: zpk.zeros.iter().map(|&z| z * wo).collect(),
        poles: zpk.poles.iter().map(|&p| p * wo).collect(),
        gain: zpk.gain * wo.powi(degree as i32),
    }
}

/// Unit-cutoff lowpass to highpass at `wo` (s -> wo / s)
pub fn lp2hp_zpk(zpk: &Zpk, wo: f64) -> Zpk {
    let degree = zpk.degree();
    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|&z| wo / z).collect();
    let poles = zpk.poles.iter().map(|&p| wo / p).collect();
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    let ratio = product(zpk.zeros.iter().map(|&z| -z)) / product(zpk.poles.iter().map(|&p| -p));
    Zpk {
        zeros,
        poles,
        gain: zpk.gain * ratio.re,
    }
}

/// Unit-cutoff lowpass to bandpass centred on `wo` with width `bw`
pub fn lp2bp_zpk(zpk: &Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = zpk.degree();
    let split = |roots: &[Complex64]| -> Vec<Complex64> {
        let scaled: Vec<Complex64> = roots.iter().map(|&r| r * (bw / 2.0)).collect();
        let offsets: Vec<Complex64> = scaled.iter().map(|&r| (r * r - wo * wo).sqrt()).collect();
        scaled
            .iter()
            .zip(&offsets)
            .map(|(&r, &d)| r + d)
            .chain(scaled.iter().zip(&offsets).map(|(&r, &d)| r - d))
            .collect()
    };

    let mut zeros = split(&zpk.zeros);
    let poles = split(&zpk.poles);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles,
        gain: zpk.gain * bw.powi(degree as i32),
    }
}

/// Bilinear transform of an analog filter at sample rate `fs`
///
/// Zeros at infinity map to Nyquist (`z = -1`).
pub fn bilinear_zpk(zpk: &Zpk, fs: f64) -> Zpk {
    let degree = zpk.degree();
    let fs2 = 2.0 * fs;

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
    let poles = zpk.poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    let ratio = product(zpk.zeros.iter().map(|&z| fs2 - z))
        / product(zpk.poles.iter().map(|&p| fs2 - p));
    Zpk {
        zeros,
        poles,
        gain: zpk.gain * ratio.re,
    }
}

/// Expand zeros and poles into real `b`/`a` polynomials
pub fn zpk2tf(zpk: &Zpk) -> (Vec<f64>, Vec<f64>) {
    let b = real_part(&poly_from_roots(&zpk.zeros))
        .into_iter()
        .map(|c| c * zpk.gain)
        .collect();
    let a = real_part(&poly_from_roots(&zpk.poles));
    (b, a)
}
