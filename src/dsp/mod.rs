//! Filter Engine
//!
//! Coefficient synthesis and causal filtering for the filter bank:
//! - FIR: windowed-sinc design, applied by direct convolution
//! - IIR: analog prototype, frequency transform and bilinear transform,
//!   applied by a direct-form II transposed recursion
//!
//! Every design and apply call is a pure function of its inputs.

pub mod analysis;
pub mod elliptic;
pub mod fir;
pub mod iir;
pub mod lfilter;
pub mod poly;
pub mod prototype;
pub mod types;
pub mod window;

pub use analysis::{
    band_gain_db, frequency_response, freqz_at, impulse_response, magnitude_spectrum, Spectrum,
    DEFAULT_IMPULSE_LEN, DEFAULT_RESPONSE_POINTS,
};
pub use fir::{apply_fir_filter, design_fir, firwin};
pub use iir::{apply_iir_filter, design_iir, normalize_cutoff};
pub use lfilter::{convolve_causal, lfilter};
pub use prototype::Zpk;
pub use types::{
    Coefficients, Cutoff, FilterSpec, FirSpec, IirFamily, IirSpec, PassType, WindowKind,
};
pub use window::window;
