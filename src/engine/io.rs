//! Audio file I/O for Tapis
//!
//! Reads and writes PCM WAV files. Input is decoded to 64-bit float at its
//! native sample rate (no resampling) and downmixed to mono by averaging the
//! channels of each frame.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;
use sha2::{Digest, Sha256};

use crate::engine::signal::Signal;
use crate::error::{Result, TapisError};

/// Export format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// Bit depth: 16, 24, or 32 (float). Default 16.
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat { bit_depth: 16 }
    }
}

impl ExportFormat {
    /// Create a new export format with the given bit depth
    pub fn new(bit_depth: u16) -> Self {
        ExportFormat { bit_depth }
    }

    /// 32-bit float output, lossless for filter results in [-1, 1]
    pub fn float() -> Self {
        ExportFormat { bit_depth: 32 }
    }

    /// Check the bit depth is one `save_audio` can write
    pub fn validate(&self) -> Result<()> {
        self.wav_spec(1).map(|_| ())
    }

    fn wav_spec(&self, sample_rate: u32) -> Result<WavSpec> {
        let sample_format = match self.bit_depth {
            16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            other => {
                return Err(TapisError::UnsupportedFormat {
                    format: format!("{}-bit audio (only 16, 24, 32 supported)", other),
                })
            }
        };
        Ok(WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: self.bit_depth,
            sample_format,
        })
    }
}

/// Read an audio file into a mono `Signal`
///
/// # Errors
/// * `FileNotFound` - If the path does not resolve
/// * `DecodeError` - If the file is not a decodable WAV file or has no frames
pub fn read_audio(path: &Path) -> Result<Signal> {
    if !path.exists() {
        return Err(TapisError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| decode_error(path, "failed to open WAV file", e))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(TapisError::DecodeError {
            path: path.display().to_string(),
            reason: "header declares zero channels".to_string(),
            source: None,
        });
    }

    let interleaved = read_samples_as_f64(reader, path, spec.bits_per_sample, spec.sample_format)?;
    let mono = downmix(&interleaved, channels);

    if mono.is_empty() {
        return Err(TapisError::DecodeError {
            path: path.display().to_string(),
            reason: "file contains no audio frames".to_string(),
            source: None,
        });
    }

    let signal = Signal::new(mono, spec.sample_rate)?;
    info!(
        "Audio file loaded: {} ({} samples @ {} Hz, {} ch)",
        path.display(),
        signal.len(),
        signal.sample_rate(),
        channels
    );
    Ok(signal)
}

/// Write a `Signal` as a mono WAV file at its own sample rate
///
/// Missing parent directories are created and an existing file at `path`
/// is overwritten. Integer formats clip to full scale.
pub fn save_audio(path: &Path, signal: &Signal, format: ExportFormat) -> Result<()> {
    let spec = format.wav_spec(signal.sample_rate())?;
    if !signal.is_finite() {
        return Err(TapisError::InvalidSignal {
            reason: format!("refusing to write NaN or infinite samples to {}", path.display()),
        });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let write_error = |e: hound::Error| TapisError::WriteError {
        path: path.display().to_string(),
        source: e,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_error)?;

    match format.bit_depth {
        16 => {
            for &sample in signal.samples() {
                let scaled = (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(write_error)?;
            }
        }
        24 => {
            for &sample in signal.samples() {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).round().clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(write_error)?;
            }
        }
        _ => {
            for &sample in signal.samples() {
                writer.write_sample(sample as f32).map_err(write_error)?;
            }
        }
    }

    writer.finalize().map_err(write_error)?;
    info!("Audio file saved: {}", path.display());
    Ok(())
}

/// Hex-encoded SHA-256 of a file's contents
pub fn file_sha256(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

/// Generate a test tone (sine wave, amplitude 1.0)
pub fn generate_test_tone(frequency: f64, duration_secs: f64, sample_rate: u32) -> Result<Signal> {
    generate_tone_mix(&[frequency], duration_secs, sample_rate)
}

/// Generate the equal-amplitude sum of several sines, normalized to peak <= 1.0
pub fn generate_tone_mix(frequencies: &[f64], duration_secs: f64, sample_rate: u32) -> Result<Signal> {
    let num_samples = (duration_secs * sample_rate as f64).round() as usize;
    let scale = 1.0 / frequencies.len().max(1) as f64;

    let samples = (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            frequencies
                .iter()
                .map(|f| (2.0 * std::f64::consts::PI * f * t).sin())
                .sum::<f64>()
                * scale
        })
        .collect();

    Signal::new(samples, sample_rate)
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn decode_error(path: &Path, what: &str, e: hound::Error) -> TapisError {
    TapisError::DecodeError {
        path: path.display().to_string(),
        reason: format!("{}: {}", what, e),
        source: Some(e),
    }
}

/// Read samples from WAV reader and convert to f64 in [-1, 1)
fn read_samples_as_f64<R: std::io::Read>(
    mut reader: WavReader<R>,
    path: &Path,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f64>> {
    let read_failed = |e| decode_error(path, "failed to read samples", e);

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(read_failed),
        SampleFormat::Int => {
            let full_scale = int_full_scale(bits_per_sample);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / full_scale))
                .collect::<std::result::Result<Vec<f64>, _>>()
                .map_err(read_failed)
        }
    }
}

/// Magnitude of the most negative sample at an integer bit depth
fn int_full_scale(bits_per_sample: u16) -> f64 {
    2.0_f64.powi(i32::from(bits_per_sample.saturating_sub(1)))
}

/// Average interleaved frames down to one channel
fn downmix(interleaved: &[f64], channels: usize) -> Vec<f64> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
