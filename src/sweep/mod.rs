//! Filter-bank sweep
//!
//! Runs every configured filter over one input file:
//! for each pass type, one FIR per window and then one IIR per family.
//! Each result is written as `filtered_<window-or-family>_<pass>_<fir|iir>.wav`.
//!
//! The whole plan is parsed before the input is read, so an unknown name
//! never leaves partial output. A design failure part-way through aborts the
//! sweep and keeps the files already written.

mod config;
mod report;

pub use config::SweepConfig;
pub use report::{FilterReport, ManifestEntry, RunManifest};

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::dsp::magnitude_spectrum;
use crate::engine::{read_audio, save_audio};
use crate::error::Result;

/// File name of the run manifest inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// What a finished sweep produced
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    /// Filtered WAV files, in sweep order
    pub outputs: Vec<PathBuf>,
    /// JSON reports, when enabled
    pub reports: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Filter `input` with every configuration and write the results to
/// `output_dir`
pub fn run_sweep(input: &Path, output_dir: &Path, config: &SweepConfig) -> Result<SweepSummary> {
    let plan = config.plan()?;
    info!("Sweep plan: {} configurations", plan.len());

    let signal = read_audio(input)?;
    fs::create_dir_all(output_dir)?;

    let format = config.export_format();
    let input_peak_hz = if config.write_reports {
        magnitude_spectrum(&signal).peak_frequency()
    } else {
        None
    };

    let mut summary = SweepSummary::default();
    let mut written = Vec::with_capacity(plan.len());

    for spec in &plan {
        let (filtered, coefficients) = match spec.apply(&signal) {
            Ok(result) => result,
            Err(e) => {
                error!(
                    "Sweep stopped at {} after {} files",
                    spec,
                    summary.outputs.len()
                );
                return Err(e);
            }
        };

        let output_path = output_dir.join(spec.output_file_name());
        save_audio(&output_path, &filtered, format)?;
        info!(
            "Filtered {} signal saved to: {}",
            spec.kind().to_uppercase(),
            output_path.display()
        );

        if config.write_reports {
            let report_path = output_path.with_extension("json");
            FilterReport::build(
                spec,
                &output_path,
                &signal,
                input_peak_hz,
                &filtered,
                coefficients,
                config,
            )?
            .save(&report_path)?;
            summary.reports.push(report_path);
        }

        written.push((output_path.clone(), spec.clone()));
        summary.outputs.push(output_path);
    }

    if config.write_reports {
        let manifest_path = output_dir.join(MANIFEST_FILE);
        RunManifest::build(input, signal.sample_rate(), config, &written)?.save(&manifest_path)?;
        info!("Manifest saved to: {}", manifest_path.display());
        summary.manifest = Some(manifest_path);
    }

    info!("Sweep complete: {} files written", summary.outputs.len());
    Ok(summary)
}
