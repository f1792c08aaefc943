//! Audio Engine Module
//!
//! Signal representation and the audio I/O adapter:
//! - Mono `Signal` with level measurements
//! - WAV read/write at the native sample rate

pub mod io;
pub mod signal;

pub use io::{
    file_sha256, generate_test_tone, generate_tone_mix, read_audio, save_audio, ExportFormat,
};
pub use signal::{calculate_peak, calculate_rms, db_to_linear, linear_to_db, Signal, SignalStats};
