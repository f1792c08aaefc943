//! Elliptic integrals and Jacobi elliptic functions for Cauer filter design.
//!
//! All functions use the parameter convention `m = k^2`.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use crate::error::{Result, TapisError};

const MAX_AGM_ITERATIONS: usize = 64;
const MAX_LANDEN_ITERATIONS: usize = 10;
const ELLIPDEG_TERMS: usize = 7;

/// Arithmetic-geometric mean of `a` and `b`
fn agm(mut a: f64, mut b: f64) -> f64 {
    for _ in 0..MAX_AGM_ITERATIONS {
        if (a - b).abs() <= f64::EPSILON * a.abs() {
            break;
        }
        let next_a = 0.5 * (a + b);
        b = (a * b).sqrt();
        a = next_a;
    }
    a
}

/// Complete elliptic integral of the first kind, K(m)
pub fn ellipk(m: f64) -> f64 {
    if m >= 1.0 {
        return f64::INFINITY;
    }
    PI / (2.0 * agm(1.0, (1.0 - m).sqrt()))
}

/// K(1 - p), accurate when `p` is small
pub fn ellipkm1(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::INFINITY;
    }
    PI / (2.0 * agm(1.0, p.sqrt()))
}

/// Jacobi elliptic functions at real argument `u`
///
/// Returns `(sn, cn, dn, phi)` where `phi` is the amplitude. Uses the
/// descending Landen (AGM) recurrence, with series expansions near `m = 0`
/// and `m = 1`.
pub fn ellipj(u: f64, m: f64) -> (f64, f64, f64, f64) {
    if m < 1e-9 {
        let t = u.sin();
        let b = u.cos();
        let ai = 0.25 * m * (u - t * b);
        return (t - ai * b, b + ai * t, 1.0 - 0.5 * m * t * t, u - ai);
    }

    if m >= 0.9999999999 {
        let ai = 0.25 * (1.0 - m);
        let b = u.cosh();
        let t = u.tanh();
        let phi = 1.0 / b;
        let twon = b * u.sinh();
        let sn = t + ai * (twon - u) / (b * b);
        let ph = 2.0 * u.exp().atan() - PI / 2.0 + ai * (twon - u) / b;
        let ai = ai * t * phi;
        let cn = phi - ai * (twon - u);
        let dn = phi + ai * (twon + u);
        return (sn, cn, dn, ph);
    }

    let mut a = [0.0_f64; 9];
    let mut c = [0.0_f64; 9];
    a[0] = 1.0;
    c[0] = m.sqrt();
    let mut b = (1.0 - m).sqrt();
    let mut twon = 1.0;
    let mut i = 0;

    while (c[i] / a[i]).abs() > f64::EPSILON && i < 8 {
        let ai = a[i];
        i += 1;
        c[i] = 0.5 * (ai - b);
        let t = (ai * b).sqrt();
        a[i] = 0.5 * (ai + b);
        b = t;
        twon *= 2.0;
    }

    let mut phi = twon * a[i] * u;
    let mut prev = phi;
    while i > 0 {
        let t = c[i] * phi.sin() / a[i];
        prev = phi;
        phi = 0.5 * (t.asin() + phi);
        i -= 1;
    }

    let sn = phi.sin();
    let cn = phi.cos();
    let dn = cn / (phi - prev).cos();
    (sn, cn, dn, phi)
}

/// Solve the degree equation: the modulus `m` such that a filter of order
/// `n` reaches the selectivity implied by `m1`
///
/// Uses the nome series truncated after a handful of terms.
pub fn ellipdeg(n: usize, m1: f64) -> f64 {
    let k1 = ellipk(m1);
    let k1p = ellipkm1(m1);
    let q1 = (-PI * k1p / k1).exp();
    let q = q1.powf(1.0 / n as f64);

    let num: f64 = (0..=ELLIPDEG_TERMS)
        .map(|i| q.powi((i * (i + 1)) as i32))
        .sum();
    let den: f64 = 1.0
        + 2.0
            * (1..=ELLIPDEG_TERMS + 1)
                .map(|i| q.powi((i * i) as i32))
                .sum::<f64>();

    16.0 * q * (num / den).powi(4)
}

fn complement(kx: Complex64) -> Complex64 {
    ((Complex64::new(1.0, 0.0) - kx) * (Complex64::new(1.0, 0.0) + kx)).sqrt()
}

/// Inverse Jacobi `sn` at complex argument, by ascending Landen transform
pub fn arc_jac_sn(w: Complex64, m: f64) -> Result<Complex64> {
    let k = m.sqrt();
    if !(0.0..=1.0).contains(&k) {
        return Err(TapisError::design(format!(
            "elliptic modulus {} outside [0, 1]",
            k
        )));
    }
    if k == 1.0 {
        return Ok(w.atanh());
    }

    let mut ks = vec![k];
    while *ks.last().unwrap_or(&0.0) != 0.0 {
        if ks.len() > MAX_LANDEN_ITERATIONS {
            return Err(TapisError::design(
                "Landen transformation did not converge",
            ));
        }
        let k_last = ks[ks.len() - 1];
        let kp = ((1.0 - k_last) * (1.0 + k_last)).sqrt();
        ks.push((1.0 - kp) / (1.0 + kp));
    }

    let capk: f64 = ks[1..].iter().map(|kn| 1.0 + kn).product::<f64>() * PI / 2.0;

    let mut wn = w;
    for pair in ks.windows(2) {
        let (kn, knext) = (pair[0], pair[1]);
        wn = 2.0 * wn / ((1.0 + knext) * (Complex64::new(1.0, 0.0) + complement(kn * wn)));
    }

    let u = 2.0 / PI * wn.asin();
    Ok(capk * u)
}

/// Real inverse of Jacobi `sc`: solves `sc(z, m) = w` for real `w`
pub fn arc_jac_sc1(w: f64, m: f64) -> Result<f64> {
    let z = arc_jac_sn(Complex64::new(0.0, w), m)?;
    if z.re.abs() > 1e-14 {
        return Err(TapisError::design(
            "inverse sc has a non-zero real part",
        ));
    }
    Ok(z.im)
}
