//! Integration Tests
//!
//! End-to-end tests for the Tapis filter bank: WAV in, filtered WAVs out.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use approx::assert_abs_diff_eq;
use hound::{SampleFormat, WavSpec, WavWriter};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use test_case::test_case;

use tapis::dsp::{
    analysis::band_gain_db, design_fir, design_iir, lfilter, normalize_cutoff, Cutoff,
    FilterSpec, FirSpec, IirFamily, IirSpec, PassType, WindowKind,
};
use tapis::engine::{generate_test_tone, read_audio, save_audio, ExportFormat, Signal};
use tapis::sweep::{run_sweep, RunManifest, SweepConfig};
use tapis::TapisError;

/// Helper to write a stereo 24-bit WAV with different tones per channel
fn write_stereo_wav(path: &Path, sample_rate: u32, duration_secs: f64) {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let full_scale = (1 << 23) as f64 - 1.0;
    let frames = (duration_secs * sample_rate as f64) as usize;
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let left = 0.5 * (2.0 * std::f64::consts::PI * 300.0 * t).sin();
        let right = 0.5 * (2.0 * std::f64::consts::PI * 6000.0 * t).sin();
        writer.write_sample((left * full_scale) as i32).unwrap();
        writer.write_sample((right * full_scale) as i32).unwrap();
    }
    writer.finalize().unwrap();
}

fn expected_names() -> Vec<String> {
    let mut names = Vec::new();
    for pass in ["low", "band", "high"] {
        for window in ["hamming", "hann", "boxcar", "blackman"] {
            names.push(format!("filtered_{}_{}_fir.wav", window, pass));
        }
        for family in ["chebyshev", "butterworth", "elliptic", "bessel"] {
            names.push(format!("filtered_{}_{}_iir.wav", family, pass));
        }
    }
    names
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

// === Full Sweep Tests ===

#[test]
fn test_full_sweep_from_stereo_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("song.wav");
    write_stereo_wav(&input, 22050, 0.5);

    let out = dir.path().join("FilteredFull");
    let summary = run_sweep(&input, &out, &SweepConfig::default()).unwrap();

    assert_eq!(file_names(&summary.outputs), expected_names());
    for path in &summary.outputs {
        let filtered = read_audio(path).unwrap();
        assert_eq!(filtered.sample_rate(), 22050);
        assert_eq!(filtered.len(), 11025);
        assert!(filtered.is_finite());
    }
}

#[test]
fn test_sweep_separates_channels_by_band() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("song.wav");
    write_stereo_wav(&input, 22050, 0.5);
    let source = read_audio(&input).unwrap();

    let config = SweepConfig {
        windows: vec!["blackman".to_string()],
        families: vec!["butterworth".to_string()],
        ..SweepConfig::default()
    };
    let out = dir.path().join("out");
    run_sweep(&input, &out, &config).unwrap();

    // Downmixed input is half 300 Hz, half 6000 Hz: each lone tone carries
    // half the power, so a filter that keeps one of them sits near -3 dB
    for name in ["filtered_blackman_low_fir.wav", "filtered_butterworth_low_iir.wav"] {
        let low = read_audio(&out.join(name)).unwrap();
        assert_abs_diff_eq!(band_gain_db(&source, &low), -3.0, epsilon = 0.5);
    }
    for name in ["filtered_blackman_high_fir.wav", "filtered_butterworth_high_iir.wav"] {
        let high = read_audio(&out.join(name)).unwrap();
        assert_abs_diff_eq!(band_gain_db(&source, &high), -3.0, epsilon = 0.5);
    }
}

#[test]
fn test_sweep_with_reports() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("song.wav");
    write_stereo_wav(&input, 16000, 0.25);

    let config = SweepConfig {
        write_reports: true,
        response_points: 512,
        ..SweepConfig::default()
    };
    let out = dir.path().join("out");
    let summary = run_sweep(&input, &out, &config).unwrap();
    assert_eq!(summary.reports.len(), 24);

    let manifest: RunManifest =
        serde_json::from_reader(fs::File::open(summary.manifest.unwrap()).unwrap()).unwrap();
    assert_eq!(manifest.outputs.len(), 24);
    assert_eq!(manifest.sample_rate, 16000);
    assert_eq!(manifest.input_sha256, tapis::engine::file_sha256(&input).unwrap());
    for entry in &manifest.outputs {
        assert_eq!(entry.sha256, tapis::engine::file_sha256(&entry.path).unwrap());
    }
}

#[test]
fn test_unsupported_family_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("song.wav");
    write_stereo_wav(&input, 22050, 0.1);
    let out = dir.path().join("out");

    let config = SweepConfig {
        families: vec![
            "chebyshev".to_string(),
            "butterworth".to_string(),
            "gaussian".to_string(),
        ],
        ..SweepConfig::default()
    };
    match run_sweep(&input, &out, &config) {
        Err(TapisError::UnsupportedFilterType { kind, name }) => {
            assert_eq!(kind, "IIR family");
            assert_eq!(name, "gaussian");
        }
        other => panic!("Expected UnsupportedFilterType, got: {:?}", other),
    }
    assert!(!out.exists());
}

#[test]
fn test_cutoff_above_nyquist_aborts_sweep() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("song.wav");
    // Nyquist at 4000 Hz: the 1200 Hz low-pass works, 3600-5000 Hz cannot
    write_stereo_wav(&input, 8000, 0.1);
    let out = dir.path().join("out");

    let config = SweepConfig {
        high_cutoff: 5000.0,
        ..SweepConfig::default()
    };
    let err = run_sweep(&input, &out, &config).unwrap_err();
    assert_eq!(err.error_code(), "DESIGN_ERROR");
    // Earlier configurations stay on disk
    assert!(out.join("filtered_bessel_low_iir.wav").exists());
    assert!(!out.join("filtered_hamming_band_fir.wav").exists());
}

// === Audio I/O Tests ===

#[test_case(16)]
#[test_case(24)]
#[test_case(32)]
fn test_round_trip_preserves_rate_and_length(bit_depth: u16) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    let tone = generate_test_tone(1000.0, 0.3, 48000).unwrap();
    save_audio(&path, &tone, ExportFormat::new(bit_depth)).unwrap();

    let loaded = read_audio(&path).unwrap();
    assert_eq!(loaded.sample_rate(), 48000);
    assert_eq!(loaded.len(), tone.len());
    for (a, b) in loaded.samples().iter().zip(tone.samples()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-4);
    }
}

#[test]
fn test_missing_input_is_not_found() {
    let err = read_audio(Path::new("/definitely/not/here.wav")).unwrap_err();
    assert_eq!(err.error_code(), "FILE_NOT_FOUND");
}

// === Filter Engine Properties ===

#[test_case(PassType::Low, Cutoff::Single(1200.0))]
#[test_case(PassType::Band, Cutoff::Band(1200.0, 3600.0))]
#[test_case(PassType::High, Cutoff::Single(3600.0))]
fn test_fir_returns_requested_taps(pass_type: PassType, cutoff: Cutoff) {
    for num_taps in [11, 51, 101] {
        let spec = FirSpec {
            num_taps,
            cutoff,
            pass_type,
            window: WindowKind::Hann,
        };
        assert_eq!(design_fir(&spec, 44100).unwrap().len(), num_taps);
    }
}

#[test]
fn test_output_length_matches_input_for_every_filter() {
    let config = SweepConfig::default();
    for len in [1, 7, 1000] {
        let signal = Signal::new(vec![0.25; len], 44100).unwrap();
        for spec in config.plan().unwrap() {
            let (filtered, _) = spec.apply(&signal).unwrap();
            assert_eq!(filtered.len(), len, "{}", spec);
        }
    }
}

#[test]
fn test_lfilter_any_valid_pair_keeps_length() {
    let x: Vec<f64> = (0..257).map(|i| (i as f64 * 0.1).sin()).collect();
    let y = lfilter(&[0.1, 0.2, 0.3, 0.4, 0.5], &[2.0, 0.3], &x).unwrap();
    assert_eq!(y.len(), x.len());
}

#[test]
fn test_bessel_order_past_maximum_fails_sweep_cleanly() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("song.wav");
    write_stereo_wav(&input, 22050, 0.1);
    let out = dir.path().join("out");

    let config = SweepConfig {
        windows: vec![],
        families: vec!["bessel".to_string()],
        order: 60,
        ..SweepConfig::default()
    };
    let err = run_sweep(&input, &out, &config).unwrap_err();
    assert_eq!(err.error_code(), "DESIGN_ERROR");
    assert!(!out.join("filtered_bessel_low_iir.wav").exists());
}

#[test]
fn test_nyquist_cutoff_rejected() {
    let err = normalize_cutoff(&Cutoff::Single(22050.0), 44100).unwrap_err();
    assert_eq!(err.error_code(), "DESIGN_ERROR");
}

#[test]
fn test_designs_are_idempotent() {
    for spec in SweepConfig::default().plan().unwrap() {
        assert_eq!(spec.design(44100).unwrap(), spec.design(44100).unwrap());
    }
}

#[test]
fn test_fir_lowpass_scenario() {
    let signal = generate_test_tone(440.0, 1.0, 44100).unwrap();
    let spec = FilterSpec::Fir(FirSpec {
        num_taps: 101,
        cutoff: Cutoff::Single(1200.0),
        pass_type: PassType::Low,
        window: WindowKind::Hamming,
    });
    let (filtered, coefficients) = spec.apply(&signal).unwrap();

    assert_eq!(filtered.len(), 44100);
    assert_eq!(coefficients.numerator().len(), 101);
    assert!(filtered.is_finite());
    // Leading transient starts from silence, then tracks the passband tone
    assert!(filtered.samples()[..10].iter().all(|s| s.abs() < 0.01));
    assert!(filtered.samples()[200..].iter().any(|s| s.abs() > 0.9));
}

#[test]
fn test_iir_bandpass_scenario() {
    let spec = IirSpec {
        cutoff: Cutoff::Band(1200.0, 3600.0),
        pass_type: PassType::Band,
        family: IirFamily::Butterworth,
        order: 4,
    };
    let (b, a) = design_iir(&spec, 44100).unwrap();
    assert_eq!(b.len(), 9);
    assert_eq!(a.len(), 9);

    let pass = generate_test_tone(2400.0, 1.0, 44100).unwrap();
    let stop = generate_test_tone(200.0, 1.0, 44100).unwrap();
    let filter = FilterSpec::Iir(spec);
    let (pass_out, _) = filter.apply(&pass).unwrap();
    let (stop_out, _) = filter.apply(&stop).unwrap();

    let pass_gain = band_gain_db(&pass, &pass_out);
    let stop_gain = band_gain_db(&stop, &stop_out);
    assert!(pass_gain > -1.0, "passband gain {} dB", pass_gain);
    assert!(stop_gain < -30.0, "stopband gain {} dB", stop_gain);
}

// === CLI Tests ===

#[test]
fn test_cli_reports_failure_once() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_tapis"))
        .arg("sweep")
        .arg("/definitely/missing.wav")
        .arg(dir.path().join("out"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("File not found").count(), 1, "{}", stderr);
    assert!(stderr.contains("FILE_NOT_FOUND"), "{}", stderr);
    assert!(stderr.contains("Check the input path is correct"), "{}", stderr);
}
