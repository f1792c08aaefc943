//! CLI Module
//!
//! Command-line interface for the Tapis filter bank.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dsp::{Cutoff, PassType, WindowKind};

/// Tapis - FIR and IIR filter bank for WAV audio
#[derive(Parser, Debug)]
#[command(name = "tapis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full filter bank over one file
    #[command(name = "sweep")]
    Sweep {
        /// Input WAV file
        input: PathBuf,

        /// Directory for the filtered files
        output_dir: PathBuf,

        /// JSON sweep configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// FIR tap count
        #[arg(long)]
        taps: Option<usize>,

        /// IIR order
        #[arg(long)]
        order: Option<usize>,

        /// Low cutoff in Hz (low-pass, lower band edge)
        #[arg(long)]
        low: Option<f64>,

        /// High cutoff in Hz (high-pass, upper band edge)
        #[arg(long)]
        high: Option<f64>,

        /// Write a JSON report per output and a manifest
        #[arg(long)]
        reports: bool,
    },

    /// Apply one windowed-sinc FIR filter
    #[command(name = "fir")]
    Fir {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Pass type: low, band or high
        #[arg(short, long)]
        pass: PassType,

        /// Cutoff in Hz, or LOW,HIGH for band-pass
        #[arg(short, long)]
        cutoff: Cutoff,

        /// Window: hamming, hann, boxcar or blackman
        #[arg(short, long, default_value = "hamming")]
        window: WindowKind,

        /// Number of taps
        #[arg(short, long, default_value_t = 101)]
        taps: usize,

        /// Output bit depth: 16, 24 or 32 (float)
        #[arg(long, default_value_t = 16)]
        bit_depth: u16,
    },

    /// Apply one classical IIR filter
    #[command(name = "iir")]
    Iir {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Pass type: low, band or high
        #[arg(short, long)]
        pass: PassType,

        /// Cutoff in Hz, or LOW,HIGH for band-pass
        #[arg(short, long)]
        cutoff: Cutoff,

        /// Family: butterworth, chebyshev, elliptic or bessel
        #[arg(short, long)]
        family: String,

        /// Filter order
        #[arg(short, long, default_value_t = 4)]
        order: usize,

        /// Passband ripple in dB (chebyshev, elliptic)
        #[arg(long, default_value_t = 1.0)]
        rp: f64,

        /// Stopband attenuation in dB (elliptic)
        #[arg(long, default_value_t = 40.0)]
        rs: f64,

        /// Output bit depth: 16, 24 or 32 (float)
        #[arg(long, default_value_t = 16)]
        bit_depth: u16,
    },

    /// Print sample rate, length and levels of a WAV file
    #[command(name = "inspect")]
    Inspect {
        /// Input WAV file
        input: PathBuf,
    },
}
