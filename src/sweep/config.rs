//! Sweep configuration
//!
//! Loaded from an optional JSON file; every field falls back to the filter
//! bank's stock parameters. Window, family and pass-type names stay strings
//! here and are parsed by `plan`, so an unknown name surfaces as
//! `UnsupportedFilterType` rather than a JSON error.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::{Cutoff, FilterSpec, FirSpec, IirFamily, IirSpec, PassType, WindowKind};
use crate::engine::ExportFormat;
use crate::error::{Result, TapisError};

/// Parameters of one filter-bank sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// FIR tap count
    pub num_taps: usize,
    /// Low-pass cutoff and lower band edge, Hz
    pub low_cutoff: f64,
    /// High-pass cutoff and upper band edge, Hz
    pub high_cutoff: f64,
    pub windows: Vec<String>,
    pub families: Vec<String>,
    pub pass_types: Vec<String>,
    /// IIR order (band-pass designs end up twice this)
    pub order: usize,
    /// Passband ripple, dB
    pub rp: f64,
    /// Stopband attenuation, dB
    pub rs: f64,
    /// Output WAV bit depth
    pub bit_depth: u16,
    /// Write a JSON diagnostics report per output plus a run manifest
    pub write_reports: bool,
    /// `freqz` points in each report
    pub response_points: usize,
    /// Impulse response length for IIR reports
    pub impulse_len: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            num_taps: 101,
            low_cutoff: 1200.0,
            high_cutoff: 3600.0,
            windows: names(&["hamming", "hann", "boxcar", "blackman"]),
            families: names(&["chebyshev", "butterworth", "elliptic", "bessel"]),
            pass_types: names(&["low", "band", "high"]),
            order: 4,
            rp: 1.0,
            rs: 40.0,
            bit_depth: 16,
            write_reports: false,
            response_points: 8000,
            impulse_len: 50,
        }
    }
}

impl SweepConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TapisError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| TapisError::Config {
            reason: format!("{}: {}", path.display(), e),
        })
    }

    pub fn export_format(&self) -> ExportFormat {
        ExportFormat::new(self.bit_depth)
    }

    /// Cutoff used for a pass type: low and high take their own edge, band
    /// takes both
    pub fn cutoff_for(&self, pass_type: PassType) -> Cutoff {
        match pass_type {
            PassType::Low => Cutoff::Single(self.low_cutoff),
            PassType::Band => Cutoff::Band(self.low_cutoff, self.high_cutoff),
            PassType::High => Cutoff::Single(self.high_cutoff),
        }
    }

    /// Expand the config into filter specs, in sweep order
    ///
    /// For each pass type: one FIR per window, then one IIR per family.
    /// Every name is parsed before anything is returned.
    pub fn plan(&self) -> Result<Vec<FilterSpec>> {
        self.check_counts()?;
        self.export_format().validate()?;

        let pass_types = self
            .pass_types
            .iter()
            .map(|s| s.parse::<PassType>())
            .collect::<Result<Vec<_>>>()?;
        let windows = self
            .windows
            .iter()
            .map(|s| s.parse::<WindowKind>())
            .collect::<Result<Vec<_>>>()?;
        let families = self
            .families
            .iter()
            .map(|s| IirFamily::from_name(s, Some(self.rp), Some(self.rs)))
            .collect::<Result<Vec<_>>>()?;

        let mut specs = Vec::with_capacity(pass_types.len() * (windows.len() + families.len()));
        for &pass_type in &pass_types {
            let cutoff = self.cutoff_for(pass_type);
            cutoff.check_shape(pass_type)?;

            specs.extend(windows.iter().map(|&window| {
                FilterSpec::Fir(FirSpec {
                    num_taps: self.num_taps,
                    cutoff,
                    pass_type,
                    window,
                })
            }));
            specs.extend(families.iter().map(|&family| {
                FilterSpec::Iir(IirSpec {
                    cutoff,
                    pass_type,
                    family,
                    order: self.order,
                })
            }));
        }

        Ok(specs)
    }

    fn check_counts(&self) -> Result<()> {
        let checks = [
            (self.num_taps, "num_taps"),
            (self.order, "order"),
            (self.response_points, "response_points"),
            (self.impulse_len, "impulse_len"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(TapisError::Config {
                    reason: format!("{} must be greater than 0", name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_plan_order_and_count() {
        let plan = SweepConfig::default().plan().unwrap();
        assert_eq!(plan.len(), 24);

        let names: Vec<String> = plan.iter().map(|s| s.output_file_name()).collect();
        assert_eq!(names[0], "filtered_hamming_low_fir.wav");
        assert_eq!(names[4], "filtered_chebyshev_low_iir.wav");
        assert_eq!(names[8], "filtered_hamming_band_fir.wav");
        assert_eq!(names[23], "filtered_bessel_high_iir.wav");
    }

    #[test]
    fn test_cutoff_selection() {
        let config = SweepConfig::default();
        assert_eq!(config.cutoff_for(PassType::Low), Cutoff::Single(1200.0));
        assert_eq!(config.cutoff_for(PassType::Band), Cutoff::Band(1200.0, 3600.0));
        assert_eq!(config.cutoff_for(PassType::High), Cutoff::Single(3600.0));
    }

    #[test]
    fn test_unknown_family_fails_plan() {
        let config = SweepConfig {
            families: vec!["butterworth".to_string(), "gaussian".to_string()],
            ..SweepConfig::default()
        };
        let err = config.plan().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FILTER_TYPE");
    }

    #[test]
    fn test_bad_bit_depth_fails_plan() {
        let config = SweepConfig {
            bit_depth: 12,
            ..SweepConfig::default()
        };
        assert_eq!(config.plan().unwrap_err().error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_zero_taps_fails_plan() {
        let config = SweepConfig {
            num_taps: 0,
            ..SweepConfig::default()
        };
        assert_eq!(config.plan().unwrap_err().error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_load_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweep.json");
        std::fs::write(&path, r#"{ "num_taps": 51, "windows": ["hann"], "write_reports": true }"#)
            .unwrap();

        let config = SweepConfig::load(&path).unwrap();
        assert_eq!(config.num_taps, 51);
        assert_eq!(config.windows, vec!["hann".to_string()]);
        assert!(config.write_reports);
        assert_eq!(config.order, 4);
        assert_eq!(config.families.len(), 4);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let missing = SweepConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_NOT_FOUND");

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(SweepConfig::load(&path).unwrap_err().error_code(), "CONFIG_ERROR");
    }
}
