//! Polynomial helpers for transfer-function conversion and pole finding.
//!
//! Coefficients are stored highest power first, matching the `b`/`a` layout
//! of a transfer function in `z^-1`.

use num_traits::{One, Zero};
use rustfft::num_complex::Complex64;

use crate::error::{Result, TapisError};

const MAX_ROOT_ITERATIONS: usize = 500;

/// Expand `prod(x - r)` into monic coefficients, highest power first
pub fn poly_from_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::one()];
    for &root in roots {
        let mut next = vec![Complex64::zero(); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

/// Real parts of polynomial coefficients
///
/// Roots that come in conjugate pairs give real coefficients up to rounding.
pub fn real_part(coeffs: &[Complex64]) -> Vec<f64> {
    coeffs.iter().map(|c| c.re).collect()
}

/// Aberth–Ehrlich simultaneous iteration for `degree` roots
///
/// `newton` returns the Newton correction `p(z) / p'(z)`. Iteration stops once
/// every relative step is below `tolerance`.
///
/// # Errors
/// * `DesignError` - If a step is not finite or the roots have not settled
///   after `MAX_ROOT_ITERATIONS` sweeps
pub(crate) fn aberth<F>(
    degree: usize,
    radius: f64,
    tolerance: f64,
    newton: F,
) -> Result<Vec<Complex64>>
where
    F: Fn(Complex64) -> Complex64,
{
    let mut z: Vec<Complex64> = (0..degree)
        .map(|k| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 / degree as f64 + 0.4;
            Complex64::from_polar(radius, angle)
        })
        .collect();

    for _ in 0..MAX_ROOT_ITERATIONS {
        let mut max_step = 0.0_f64;
        for i in 0..degree {
            let ratio = newton(z[i]);
            if ratio.is_zero() {
                continue;
            }
            let repulsion: Complex64 = (0..degree)
                .filter(|&j| j != i)
                .map(|j| Complex64::one() / (z[i] - z[j]))
                .sum();
            let step = ratio / (Complex64::one() - ratio * repulsion);
            if !step.is_finite() {
                return Err(TapisError::design("polynomial root finding diverged"));
            }
            z[i] -= step;
            max_step = max_step.max(step.norm() / z[i].norm().max(1.0));
        }
        if max_step < tolerance {
            return Ok(z);
        }
    }

    Err(TapisError::design(format!(
        "polynomial root finding did not converge after {} iterations",
        MAX_ROOT_ITERATIONS
    )))
}
