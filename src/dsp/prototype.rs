//! Analog lowpass prototypes (cutoff 1 rad/s) in zero/pole/gain form.
//!
//! - Butterworth (maximally flat magnitude)
//! - Chebyshev Type I (equiripple passband)
//! - Elliptic/Cauer (equiripple passband and stopband)
//! - Bessel-Thomson (maximally flat group delay, phase-normalized)

use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use num_traits::{One, Zero};
use rustfft::num_complex::Complex64;

use crate::error::{Result, TapisError};

use super::elliptic::{arc_jac_sc1, ellipdeg, ellipj, ellipk};
use super::poly::aberth;

/// Threshold below which a pole or zero component is treated as zero
const EPSILON: f64 = 2e-16;

/// Highest Bessel order whose poles converge in double-double precision
pub const MAX_BESSEL_ORDER: usize = 32;

/// Relative step at which the Bessel pole iteration is considered settled
const BESSEL_TOLERANCE: f64 = 1e-12;

/// Magnitude past which the Bessel recurrence terms are rescaled
const BESSEL_RESCALE: f64 = 1e100;

/// Transfer function as zeros, poles and gain
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    /// Number of poles in excess of zeros
    pub fn degree(&self) -> usize {
        self.poles.len().saturating_sub(self.zeros.len())
    }
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(TapisError::design("filter order must be greater than 0"));
    }
    Ok(())
}

/// `prod(-r)`
fn neg_product(r: &[Complex64]) -> Complex64 {
    r.iter().fold(Complex64::one(), |acc, &v| acc * -v)
}

/// Butterworth prototype: poles evenly spaced on the left half unit circle
pub fn buttap(order: usize) -> Result<Zpk> {
    check_order(order)?;
    let n = order as f64;
    let poles = (0..order)
        .map(|i| {
            let m = -(order as f64) + 1.0 + 2.0 * i as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();
    Ok(Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    })
}

/// Chebyshev Type I prototype with `rp` dB of passband ripple
///
/// Odd orders have unit DC gain; even orders sit at the bottom of the
/// ripple band at DC.
pub fn cheb1ap(order: usize, rp: f64) -> Result<Zpk> {
    check_order(order)?;
    if !(rp > 0.0) {
        return Err(TapisError::design(format!(
            "passband ripple rp must be > 0 dB, got {}",
            rp
        )));
    }

    let n = order as f64;
    let eps = (10.0_f64.powf(0.1 * rp) - 1.0).sqrt();
    let mu = (1.0 / eps).asinh() / n;

    let poles: Vec<Complex64> = (0..order)
        .map(|i| {
            let m = -n + 1.0 + 2.0 * i as f64;
            let theta = PI * m / (2.0 * n);
            -Complex64::new(mu, theta).sinh()
        })
        .collect();

    let mut gain = neg_product(&poles).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }

    Ok(Zpk {
        zeros: Vec::new(),
        poles,
        gain,
    })
}

/// Elliptic (Cauer) prototype with `rp` dB passband ripple and `rs` dB
/// stopband attenuation
pub fn ellipap(order: usize, rp: f64, rs: f64) -> Result<Zpk> {
    check_order(order)?;
    if !(rp > 0.0) {
        return Err(TapisError::design(format!(
            "passband ripple rp must be > 0 dB, got {}",
            rp
        )));
    }
    if !(rs > 0.0) {
        return Err(TapisError::design(format!(
            "stopband attenuation rs must be > 0 dB, got {}",
            rs
        )));
    }

    if order == 1 {
        let p = -(1.0 / (10.0_f64.powf(0.1 * rp) - 1.0)).sqrt();
        return Ok(Zpk {
            zeros: Vec::new(),
            poles: vec![Complex64::new(p, 0.0)],
            gain: -p,
        });
    }

    let eps_sq = 10.0_f64.powf(0.1 * rp) - 1.0;
    let eps = eps_sq.sqrt();
    let ck1_sq = eps_sq / (10.0_f64.powf(0.1 * rs) - 1.0);
    if ck1_sq == 0.0 || !ck1_sq.is_finite() {
        return Err(TapisError::design(
            "cannot design an elliptic filter with the given rp and rs",
        ));
    }

    let k_ck1 = ellipk(ck1_sq);
    let m = ellipdeg(order, ck1_sq);
    let capk = ellipk(m);

    // Half the zeros/poles; the rest are conjugates
    let first = 1 - order % 2;
    let jacobi: Vec<(f64, f64, f64)> = (first..order)
        .step_by(2)
        .map(|j| {
            let (s, c, d, _) = ellipj(j as f64 * capk / order as f64, m);
            (s, c, d)
        })
        .collect();

    let mut zeros: Vec<Complex64> = jacobi
        .iter()
        .filter(|(s, _, _)| s.abs() > EPSILON)
        .map(|(s, _, _)| Complex64::new(0.0, 1.0 / (m.sqrt() * s)))
        .collect();
    let conj_zeros: Vec<Complex64> = zeros.iter().map(|z| z.conj()).collect();
    zeros.extend(conj_zeros);

    let r = arc_jac_sc1(1.0 / eps, ck1_sq)?;
    let v0 = capk * r / (order as f64 * k_ck1);
    let (sv, cv, dv, _) = ellipj(v0, 1.0 - m);

    let mut poles: Vec<Complex64> = jacobi
        .iter()
        .map(|&(s, c, d)| {
            -Complex64::new(c * d * sv * cv, s * dv) / (1.0 - (d * sv).powi(2))
        })
        .collect();

    let conj_poles: Vec<Complex64> = if order % 2 == 1 {
        let scale: f64 = poles.iter().map(|p| p.norm_sqr()).sum::<f64>().sqrt();
        poles
            .iter()
            .filter(|p| p.im.abs() > EPSILON * scale)
            .map(|p| p.conj())
            .collect()
    } else {
        poles.iter().map(|p| p.conj()).collect()
    };
    poles.extend(conj_poles);

    let mut gain = (neg_product(&poles) / neg_product(&zeros)).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps_sq).sqrt();
    }

    Ok(Zpk { zeros, poles, gain })
}

/// Coefficients of the reverse Bessel polynomial, highest power first
///
/// `a_k = (2N - k)! / (2^(N-k) k! (N-k)!)`, built by the ratio
/// `a_k = a_{k+1} (2N - k)(k + 1) / (2 (N - k))` from `a_N = 1`.
fn reverse_bessel_coefficients(order: usize) -> Vec<f64> {
    let n = order as f64;
    let mut ascending = vec![0.0; order + 1];
    ascending[order] = 1.0;
    for k in (0..order).rev() {
        let kf = k as f64;
        ascending[k] = ascending[k + 1] * (2.0 * n - kf) * (kf + 1.0) / (2.0 * (n - kf));
    }
    ascending.reverse();
    ascending
}

/// Double-double value `hi + lo`, about 32 significant digits
#[derive(Debug, Clone, Copy)]
struct Wide {
    hi: f64,
    lo: f64,
}

impl Wide {
    fn new(value: f64) -> Self {
        Wide { hi: value, lo: 0.0 }
    }

    fn renormalize(sum: f64, err: f64) -> Self {
        let hi = sum + err;
        Wide {
            hi,
            lo: err - (hi - sum),
        }
    }

    fn value(self) -> f64 {
        self.hi + self.lo
    }
}

impl Add for Wide {
    type Output = Wide;

    fn add(self, other: Wide) -> Wide {
        let sum = self.hi + other.hi;
        let back = sum - self.hi;
        let err = (self.hi - (sum - back)) + (other.hi - back) + self.lo + other.lo;
        Wide::renormalize(sum, err)
    }
}

impl Sub for Wide {
    type Output = Wide;

    fn sub(self, other: Wide) -> Wide {
        self + Wide {
            hi: -other.hi,
            lo: -other.lo,
        }
    }
}

impl Mul for Wide {
    type Output = Wide;

    fn mul(self, other: Wide) -> Wide {
        let product = self.hi * other.hi;
        let err = self.hi.mul_add(other.hi, -product) + self.hi * other.lo + self.lo * other.hi;
        Wide::renormalize(product, err)
    }
}

/// Complex number over `Wide` parts
#[derive(Debug, Clone, Copy)]
struct WideComplex {
    re: Wide,
    im: Wide,
}

impl WideComplex {
    fn scale(self, factor: f64) -> Self {
        let factor = Wide::new(factor);
        WideComplex {
            re: self.re * factor,
            im: self.im * factor,
        }
    }

    fn to_complex(self) -> Complex64 {
        Complex64::new(self.re.value(), self.im.value())
    }
}

impl From<Complex64> for WideComplex {
    fn from(z: Complex64) -> Self {
        WideComplex {
            re: Wide::new(z.re),
            im: Wide::new(z.im),
        }
    }
}

impl Add for WideComplex {
    type Output = WideComplex;

    fn add(self, other: WideComplex) -> WideComplex {
        WideComplex {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
}

impl Sub for WideComplex {
    type Output = WideComplex;

    fn sub(self, other: WideComplex) -> WideComplex {
        WideComplex {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }
}

impl Mul for WideComplex {
    type Output = WideComplex;

    fn mul(self, other: WideComplex) -> WideComplex {
        WideComplex {
            re: self.re * other.re - self.im * other.im,
            im: self.re * other.im + self.im * other.re,
        }
    }
}

/// Newton correction `theta_N(s) / theta_N'(s)` of the reverse Bessel polynomial
///
/// Uses `theta_k = (2k - 1) theta_{k-1} + s^2 theta_{k-2}` and
/// `theta_N' = theta_N - s theta_{N-1}` in double-double arithmetic. Near
/// a root the terms cancel far below `f64` resolution once N passes 15.
fn bessel_newton_ratio(order: usize, s: Complex64) -> Complex64 {
    let s_wide = WideComplex::from(s);
    let s2 = s_wide * s_wide;
    let mut prev = WideComplex::from(Complex64::one());
    let mut curr = s_wide + prev;
    for k in 2..=order {
        let next = curr.scale((2 * k - 1) as f64) + s2 * prev;
        prev = curr;
        curr = next;
        let size = curr.to_complex().norm();
        if size > BESSEL_RESCALE {
            prev = prev.scale(1.0 / size);
            curr = curr.scale(1.0 / size);
        }
    }
    let value = curr.to_complex();
    if value.is_zero() {
        return value;
    }
    value / (curr - s_wide * prev).to_complex()
}

/// Bessel prototype, phase-normalized
///
/// Poles are the roots of the reverse Bessel polynomial scaled by
/// `a_0^(-1/N)`, so the high-frequency asymptote matches Butterworth and
/// the DC gain is 1.
///
/// # Errors
/// * `DesignError` - If `order` is 0 or above `MAX_BESSEL_ORDER`
pub fn besselap(order: usize) -> Result<Zpk> {
    check_order(order)?;
    if order > MAX_BESSEL_ORDER {
        return Err(TapisError::design(format!(
            "Bessel order {} exceeds the supported maximum of {}",
            order, MAX_BESSEL_ORDER
        )));
    }
    let coeffs = reverse_bessel_coefficients(order);
    let radius = coeffs[order].powf(1.0 / order as f64);

    let poles = aberth(order, radius, BESSEL_TOLERANCE, |s| {
        bessel_newton_ratio(order, s)
    })?
    .into_iter()
    .map(|p| {
        // Exactly real roots come back with rounding noise in the imaginary part
        let p = if p.im.abs() < 1e-12 * p.norm() {
            Complex64::new(p.re, 0.0)
        } else {
            p
        };
        p / radius
    })
    .collect();

    Ok(Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    })
}
