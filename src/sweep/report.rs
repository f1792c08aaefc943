//! Diagnostics reports and the run manifest
//!
//! A report carries the data behind the usual per-filter plots (impulse
//! response, frequency response, spectrum peaks) next to the WAV it
//! describes. The manifest lists every output with its SHA-256.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dsp::{
    band_gain_db, frequency_response, impulse_response, magnitude_spectrum, Coefficients,
    FilterSpec, Spectrum,
};
use crate::engine::{file_sha256, Signal, SignalStats};
use crate::error::Result;

use super::config::SweepConfig;

/// Per-output diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct FilterReport {
    pub generated_at: DateTime<Utc>,
    pub filter: FilterSpec,
    pub output_file: String,
    pub coefficients: Coefficients,
    pub input: SignalStats,
    pub output: SignalStats,
    pub input_peak_hz: Option<f64>,
    pub output_peak_hz: Option<f64>,
    /// Output RMS relative to input RMS
    pub gain_db: f64,
    pub impulse_response: Vec<f64>,
    pub frequency_response: Spectrum,
}

impl FilterReport {
    /// Build the report for one filtered output
    ///
    /// `input_peak_hz` is passed in so the input spectrum is computed once
    /// per sweep.
    pub fn build(
        spec: &FilterSpec,
        output_path: &Path,
        input: &Signal,
        input_peak_hz: Option<f64>,
        filtered: &Signal,
        coefficients: Coefficients,
        config: &SweepConfig,
    ) -> Result<Self> {
        let impulse = impulse_response(&coefficients, config.impulse_len)?;
        let response = frequency_response(
            coefficients.numerator(),
            coefficients.denominator(),
            config.response_points,
            filtered.sample_rate(),
        );

        Ok(Self {
            generated_at: Utc::now(),
            filter: spec.clone(),
            output_file: output_path.display().to_string(),
            input: input.stats(),
            output: filtered.stats(),
            input_peak_hz,
            output_peak_hz: magnitude_spectrum(filtered).peak_frequency(),
            gain_db: band_gain_db(input, filtered),
            impulse_response: impulse,
            frequency_response: response,
            coefficients,
        })
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

/// One file in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub sha256: String,
    pub filter: FilterSpec,
}

/// Record of a finished sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub input: PathBuf,
    pub input_sha256: String,
    pub sample_rate: u32,
    pub config: SweepConfig,
    pub outputs: Vec<ManifestEntry>,
}

impl RunManifest {
    /// Hash the input and every output
    pub fn build(
        input: &Path,
        sample_rate: u32,
        config: &SweepConfig,
        outputs: &[(PathBuf, FilterSpec)],
    ) -> Result<Self> {
        let entries = outputs
            .iter()
            .map(|(path, spec)| {
                Ok(ManifestEntry {
                    path: path.clone(),
                    sha256: file_sha256(path)?,
                    filter: spec.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            input: input.to_path_buf(),
            input_sha256: file_sha256(input)?,
            sample_rate,
            config: config.clone(),
            outputs: entries,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{Cutoff, FirSpec, PassType, WindowKind};
    use crate::engine::{generate_test_tone, save_audio, ExportFormat};
    use tempfile::TempDir;

    fn lowpass() -> FilterSpec {
        FilterSpec::Fir(FirSpec {
            num_taps: 31,
            cutoff: Cutoff::Single(1000.0),
            pass_type: PassType::Low,
            window: WindowKind::Hamming,
        })
    }

    #[test]
    fn test_report_contents() {
        let config = SweepConfig {
            response_points: 256,
            ..SweepConfig::default()
        };
        let tone = generate_test_tone(200.0, 0.25, 8000).unwrap();
        let spec = lowpass();
        let (filtered, coeffs) = spec.apply(&tone).unwrap();

        let report = FilterReport::build(
            &spec,
            Path::new("out.wav"),
            &tone,
            Some(200.0),
            &filtered,
            coeffs,
            &config,
        )
        .unwrap();

        assert_eq!(report.impulse_response.len(), 31);
        assert_eq!(report.frequency_response.len(), 256);
        assert_eq!(report.output_peak_hz, Some(200.0));
        assert!(report.gain_db.abs() < 0.5);
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        let tone = generate_test_tone(440.0, 0.1, 8000).unwrap();
        save_audio(&input, &tone, ExportFormat::default()).unwrap();
        save_audio(&output, &tone, ExportFormat::default()).unwrap();

        let manifest = RunManifest::build(
            &input,
            8000,
            &SweepConfig::default(),
            &[(output.clone(), lowpass())],
        )
        .unwrap();
        // Same samples, same encoding
        assert_eq!(manifest.input_sha256, manifest.outputs[0].sha256);

        let path = dir.path().join("manifest.json");
        manifest.save(&path).unwrap();
        let loaded: RunManifest =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded.outputs, manifest.outputs);
        assert_eq!(loaded.config, SweepConfig::default());
    }
}
