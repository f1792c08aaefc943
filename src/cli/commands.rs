//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;

use crate::dsp::{Cutoff, FilterSpec, FirSpec, IirFamily, IirSpec, PassType, WindowKind};
use crate::engine::{read_audio, save_audio, ExportFormat};
use crate::error::Result;
use crate::sweep::{run_sweep, SweepConfig};

/// Command-line overrides applied on top of a sweep config
#[derive(Debug, Clone, Default)]
pub struct SweepOverrides {
    pub taps: Option<usize>,
    pub order: Option<usize>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub reports: bool,
}

impl SweepOverrides {
    fn apply(&self, config: &mut SweepConfig) {
        if let Some(taps) = self.taps {
            config.num_taps = taps;
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        if let Some(low) = self.low {
            config.low_cutoff = low;
        }
        if let Some(high) = self.high {
            config.high_cutoff = high;
        }
        if self.reports {
            config.write_reports = true;
        }
    }
}

/// Run the full filter bank.
pub fn sweep(
    input: &Path,
    output_dir: &Path,
    config_path: Option<&Path>,
    overrides: &SweepOverrides,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading sweep config: {}", path.display());
            SweepConfig::load(path)?
        }
        None => SweepConfig::default(),
    };
    overrides.apply(&mut config);

    let summary = run_sweep(input, output_dir, &config)?;

    println!(
        "Wrote {} filtered files to {}",
        summary.outputs.len(),
        output_dir.display()
    );
    if let Some(manifest) = &summary.manifest {
        println!("Manifest: {}", manifest.display());
    }

    Ok(())
}

/// Apply a single FIR filter.
pub fn fir(
    input: &Path,
    output: &Path,
    pass_type: PassType,
    cutoff: Cutoff,
    window: WindowKind,
    num_taps: usize,
    format: ExportFormat,
) -> Result<()> {
    let spec = FilterSpec::Fir(FirSpec {
        num_taps,
        cutoff,
        pass_type,
        window,
    });
    filter_file(input, output, &spec, format)
}

/// Apply a single IIR filter.
#[allow(clippy::too_many_arguments)]
pub fn iir(
    input: &Path,
    output: &Path,
    pass_type: PassType,
    cutoff: Cutoff,
    family: &str,
    order: usize,
    rp: f64,
    rs: f64,
    format: ExportFormat,
) -> Result<()> {
    let spec = FilterSpec::Iir(IirSpec {
        cutoff,
        pass_type,
        family: IirFamily::from_name(family, Some(rp), Some(rs))?,
        order,
    });
    filter_file(input, output, &spec, format)
}

fn filter_file(input: &Path, output: &Path, spec: &FilterSpec, format: ExportFormat) -> Result<()> {
    format.validate()?;
    let signal = read_audio(input)?;

    info!("Applying {}", spec);
    let (filtered, coefficients) = spec.apply(&signal)?;
    save_audio(output, &filtered, format)?;

    println!("{}", spec);
    println!(
        "Coefficients: {} numerator, {} denominator",
        coefficients.numerator().len(),
        coefficients.denominator().len()
    );
    println!("Saved: {}", output.display());

    Ok(())
}

/// Print a summary of an audio file.
pub fn inspect(input: &Path) -> Result<()> {
    info!("Inspecting: {}", input.display());

    let signal = read_audio(input)?;
    println!("File: {}", input.display());
    println!("{}", signal.stats().summary());

    Ok(())
}
