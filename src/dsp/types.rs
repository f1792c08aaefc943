//! Filter specification types
//!
//! Closed enums for every choice a filter configuration makes. Names coming
//! from the command line or a config file are parsed once at the boundary;
//! unknown names fail with `UnsupportedFilterType`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::Signal;
use crate::error::{Result, TapisError};

use super::{fir, iir};

// ============================================================================
// Pass type
// ============================================================================

/// Which part of the spectrum the filter keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassType {
    /// Keep content below the cutoff
    Low,
    /// Keep content between two cutoffs
    Band,
    /// Keep content above the cutoff
    High,
}

impl PassType {
    pub const ALL: [PassType; 3] = [PassType::Low, PassType::Band, PassType::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassType::Low => "low",
            PassType::Band => "band",
            PassType::High => "high",
        }
    }

    /// Whether the response at 0 Hz is in the passband
    pub fn pass_zero(&self) -> bool {
        matches!(self, PassType::Low)
    }
}

impl fmt::Display for PassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassType {
    type Err = TapisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "lowpass" => Ok(PassType::Low),
            "band" | "bandpass" => Ok(PassType::Band),
            "high" | "highpass" => Ok(PassType::High),
            _ => Err(TapisError::UnsupportedFilterType {
                kind: "pass type",
                name: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Cutoff
// ============================================================================

/// Cutoff frequency or band edges, in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cutoff {
    Single(f64),
    Band(f64, f64),
}

impl Cutoff {
    /// Cutoff frequencies in ascending order of declaration
    pub fn frequencies(&self) -> Vec<f64> {
        match *self {
            Cutoff::Single(f) => vec![f],
            Cutoff::Band(low, high) => vec![low, high],
        }
    }

    /// Check the cutoff shape agrees with the pass type
    ///
    /// Low and high need one frequency; band needs two with low < high.
    pub fn check_shape(&self, pass_type: PassType) -> Result<()> {
        match (pass_type, *self) {
            (PassType::Low | PassType::High, Cutoff::Single(_)) => Ok(()),
            (PassType::Band, Cutoff::Band(low, high)) if low < high => Ok(()),
            (PassType::Band, Cutoff::Band(low, high)) => Err(TapisError::design(format!(
                "band edges must satisfy low < high, got {} >= {}",
                low, high
            ))),
            (PassType::Band, Cutoff::Single(f)) => Err(TapisError::design(format!(
                "band-pass needs two cutoffs, got only {} Hz",
                f
            ))),
            (pass, Cutoff::Band(..)) => Err(TapisError::design(format!(
                "{}-pass needs a single cutoff, got a band",
                pass
            ))),
        }
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cutoff::Single(c) => write!(f, "{} Hz", c),
            Cutoff::Band(low, high) => write!(f, "{}-{} Hz", low, high),
        }
    }
}

impl FromStr for Cutoff {
    type Err = TapisError;

    /// Parse `"1200"` or `"1200,3600"`
    fn from_str(s: &str) -> Result<Self> {
        let parsed: std::result::Result<Vec<f64>, _> =
            s.split(',').map(|part| part.trim().parse::<f64>()).collect();
        match parsed.as_deref() {
            Ok([f]) => Ok(Cutoff::Single(*f)),
            Ok([low, high]) => Ok(Cutoff::Band(*low, *high)),
            _ => Err(TapisError::design(format!(
                "cutoff must be 'HZ' or 'LOW,HIGH', got '{}'",
                s
            ))),
        }
    }
}

// ============================================================================
// Window kind
// ============================================================================

/// Tapering window for windowed-sinc FIR design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Hamming,
    Hann,
    Boxcar,
    Blackman,
}

impl WindowKind {
    pub const ALL: [WindowKind; 4] = [
        WindowKind::Hamming,
        WindowKind::Hann,
        WindowKind::Boxcar,
        WindowKind::Blackman,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Hamming => "hamming",
            WindowKind::Hann => "hann",
            WindowKind::Boxcar => "boxcar",
            WindowKind::Blackman => "blackman",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKind {
    type Err = TapisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hamming" => Ok(WindowKind::Hamming),
            "hann" | "hanning" => Ok(WindowKind::Hann),
            "boxcar" | "rectangular" | "rect" => Ok(WindowKind::Boxcar),
            "blackman" => Ok(WindowKind::Blackman),
            _ => Err(TapisError::UnsupportedFilterType {
                kind: "window",
                name: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// IIR family
// ============================================================================

/// Classical IIR design family, carrying the ripple parameters it needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum IirFamily {
    /// Maximally flat passband
    Butterworth,
    /// Type I: equiripple passband of `rp` dB
    Chebyshev { rp: f64 },
    /// Equiripple passband (`rp` dB) and stopband (`rs` dB down)
    Elliptic { rp: f64, rs: f64 },
    /// Maximally flat group delay, phase-normalized
    Bessel,
}

impl IirFamily {
    /// Build a family from its name and the ripple parameters on hand
    ///
    /// Ripple parameters a family does not use are ignored; a missing
    /// required one is a `DesignError`.
    pub fn from_name(name: &str, rp: Option<f64>, rs: Option<f64>) -> Result<Self> {
        let require = |value: Option<f64>, what: &str| {
            value.ok_or_else(|| TapisError::design(format!("{} filter requires {}", name, what)))
        };

        match name.trim().to_ascii_lowercase().as_str() {
            "butterworth" | "butter" => Ok(IirFamily::Butterworth),
            "chebyshev" | "cheby1" | "chebyshev1" => Ok(IirFamily::Chebyshev {
                rp: require(rp, "passband ripple rp")?,
            }),
            "elliptic" | "ellip" | "cauer" => Ok(IirFamily::Elliptic {
                rp: require(rp, "passband ripple rp")?,
                rs: require(rs, "stopband attenuation rs")?,
            }),
            "bessel" => Ok(IirFamily::Bessel),
            _ => Err(TapisError::UnsupportedFilterType {
                kind: "IIR family",
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IirFamily::Butterworth => "butterworth",
            IirFamily::Chebyshev { .. } => "chebyshev",
            IirFamily::Elliptic { .. } => "elliptic",
            IirFamily::Bessel => "bessel",
        }
    }
}

impl fmt::Display for IirFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Filter specifications
// ============================================================================

/// Windowed-sinc FIR filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirSpec {
    pub num_taps: usize,
    pub cutoff: Cutoff,
    pub pass_type: PassType,
    pub window: WindowKind,
}

/// Classical IIR filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IirSpec {
    pub cutoff: Cutoff,
    pub pass_type: PassType,
    pub family: IirFamily,
    pub order: usize,
}

/// One filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    Fir(FirSpec),
    Iir(IirSpec),
}

impl FilterSpec {
    pub fn pass_type(&self) -> PassType {
        match self {
            FilterSpec::Fir(spec) => spec.pass_type,
            FilterSpec::Iir(spec) => spec.pass_type,
        }
    }

    /// Window name for FIR, family name for IIR
    pub fn label(&self) -> &'static str {
        match self {
            FilterSpec::Fir(spec) => spec.window.as_str(),
            FilterSpec::Iir(spec) => spec.family.name(),
        }
    }

    /// `"fir"` or `"iir"`
    pub fn kind(&self) -> &'static str {
        match self {
            FilterSpec::Fir(_) => "fir",
            FilterSpec::Iir(_) => "iir",
        }
    }

    /// Deterministic output name: `filtered_<label>_<pass>_<kind>.wav`
    pub fn output_file_name(&self) -> String {
        format!(
            "filtered_{}_{}_{}.wav",
            self.label(),
            self.pass_type(),
            self.kind()
        )
    }

    /// Synthesize coefficients for a signal sampled at `sample_rate` Hz
    pub fn design(&self, sample_rate: u32) -> Result<Coefficients> {
        match self {
            FilterSpec::Fir(spec) => Ok(Coefficients::Fir {
                taps: fir::design_fir(spec, sample_rate)?,
            }),
            FilterSpec::Iir(spec) => {
                let (b, a) = iir::design_iir(spec, sample_rate)?;
                Ok(Coefficients::Iir { b, a })
            }
        }
    }

    /// Design and apply in one step
    pub fn apply(&self, signal: &Signal) -> Result<(Signal, Coefficients)> {
        match self {
            FilterSpec::Fir(spec) => fir::apply_fir_filter(signal, spec),
            FilterSpec::Iir(spec) => iir::apply_iir_filter(signal, spec),
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Fir(spec) => write!(
                f,
                "FIR {}-pass {} ({} window, {} taps)",
                spec.pass_type, spec.cutoff, spec.window, spec.num_taps
            ),
            FilterSpec::Iir(spec) => write!(
                f,
                "IIR {}-pass {} ({}, order {})",
                spec.pass_type, spec.cutoff, spec.family, spec.order
            ),
        }
    }
}

// ============================================================================
// Coefficients
// ============================================================================

const UNIT_DENOMINATOR: [f64; 1] = [1.0];

/// Designed filter coefficients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Coefficients {
    /// Tap sequence; the denominator is implicitly `[1.0]`
    Fir { taps: Vec<f64> },
    /// Rational transfer function `b(z) / a(z)`
    Iir { b: Vec<f64>, a: Vec<f64> },
}

impl Coefficients {
    pub fn numerator(&self) -> &[f64] {
        match self {
            Coefficients::Fir { taps } => taps,
            Coefficients::Iir { b, .. } => b,
        }
    }

    pub fn denominator(&self) -> &[f64] {
        match self {
            Coefficients::Fir { .. } => &UNIT_DENOMINATOR,
            Coefficients::Iir { a, .. } => a,
        }
    }
}
