//! Tapis - FIR/IIR Filter Bank for WAV Audio
//!
//! Loads a WAV file, runs it through a battery of digital filters and writes
//! each result back to disk.
//!
//! # Architecture
//!
//! - `engine`: mono `Signal` and WAV I/O at the native sample rate
//! - `dsp`: windowed-sinc FIR and classical IIR (Butterworth, Chebyshev I,
//!   elliptic, Bessel) design, causal filtering and diagnostics
//! - `sweep`: the filter bank driver, config, reports and run manifest
//! - `cli`: command-line front end

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod sweep;

pub use error::{Result, TapisError};
