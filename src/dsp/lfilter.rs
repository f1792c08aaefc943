//! Causal direct-form linear filtering.
//!
//! ```text
//! y[n] = (1/a[0]) * (sum_k b[k]*x[n-k] - sum_{k>0} a[k]*y[n-k])
//! ```
//!
//! Implemented as Direct Form II transposed with zero initial state, so the
//! output has the same length as the input and starts with the filter's
//! transient. Pole stability is the caller's concern.

use crate::error::{Result, TapisError};

/// Filter `x` through the rational transfer function `b / a`
///
/// # Errors
/// * `DesignError` - If `b` or `a` is empty, or `a[0]` is zero
pub fn lfilter(b: &[f64], a: &[f64], x: &[f64]) -> Result<Vec<f64>> {
    if b.is_empty() || a.is_empty() {
        return Err(TapisError::design("filter coefficients cannot be empty"));
    }

    let a0 = a[0];
    if a0 == 0.0 {
        return Err(TapisError::design(
            "leading denominator coefficient a[0] cannot be zero",
        ));
    }

    let nfilt = b.len().max(a.len());
    let mut b_norm = vec![0.0; nfilt];
    let mut a_norm = vec![0.0; nfilt];
    for (dst, &src) in b_norm.iter_mut().zip(b) {
        *dst = src / a0;
    }
    for (dst, &src) in a_norm.iter_mut().zip(a) {
        *dst = src / a0;
    }

    // z[k] holds the delayed partial sums; one shorter than the filter
    let mut z = vec![0.0; nfilt - 1];
    let mut y = Vec::with_capacity(x.len());

    for &xn in x {
        let yn = b_norm[0] * xn + z.first().copied().unwrap_or(0.0);
        for k in 1..nfilt {
            let carry = if k < nfilt - 1 { z[k] } else { 0.0 };
            z[k - 1] = b_norm[k] * xn + carry - a_norm[k] * yn;
        }
        y.push(yn);
    }

    Ok(y)
}

/// FIR convolution: `lfilter(taps, [1.0], x)`
pub fn convolve_causal(taps: &[f64], x: &[f64]) -> Result<Vec<f64>> {
    lfilter(taps, &[1.0], x)
}
