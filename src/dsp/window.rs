//! Symmetric window functions for FIR design.
//!
//! Windows are symmetric (the filter-design convention), so `w[n] == w[N-1-n]`
//! and a window of length 1 is `[1.0]`.

use std::f64::consts::PI;

use super::types::WindowKind;

/// Generate a symmetric window of `len` points
pub fn window(kind: WindowKind, len: usize) -> Vec<f64> {
    match len {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }

    let denom = (len - 1) as f64;
    (0..len)
        .map(|n| {
            let x = 2.0 * PI * n as f64 / denom;
            match kind {
                WindowKind::Hamming => 0.54 - 0.46 * x.cos(),
                WindowKind::Hann => 0.5 - 0.5 * x.cos(),
                WindowKind::Boxcar => 1.0,
                WindowKind::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
            }
        })
        .collect()
}
