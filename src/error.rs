//! Error handling for Tapis
//!
//! Every failure in the pipeline maps to one `TapisError` variant. The engine
//! only returns errors; logging happens at the driver boundary.

use thiserror::Error;

/// Result type alias for Tapis operations
pub type Result<T> = std::result::Result<T, TapisError>;

/// Main error type for Tapis operations
#[derive(Error, Debug)]
pub enum TapisError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Failed to decode audio file {path}: {reason}")]
    DecodeError {
        path: String,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Failed to write audio file: {path}")]
    WriteError {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Signal Errors
    #[error("Invalid signal: {reason}")]
    InvalidSignal { reason: String },

    // Filter Errors
    #[error("Unsupported {kind}: '{name}'")]
    UnsupportedFilterType { kind: &'static str, name: String },

    #[error("Filter design failed: {reason}")]
    DesignError { reason: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TapisError {
    /// Shorthand for a `DesignError` with a formatted reason
    pub fn design(reason: impl Into<String>) -> Self {
        TapisError::DesignError {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            TapisError::FileNotFound { .. } => "FILE_NOT_FOUND",
            TapisError::DecodeError { .. } => "DECODE_ERROR",
            TapisError::WriteError { .. } => "IO_ERROR",
            TapisError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            TapisError::InvalidSignal { .. } => "INVALID_SIGNAL",
            TapisError::UnsupportedFilterType { .. } => "UNSUPPORTED_FILTER_TYPE",
            TapisError::DesignError { .. } => "DESIGN_ERROR",
            TapisError::Config { .. } => "CONFIG_ERROR",
            TapisError::Io(_) => "IO_ERROR",
            TapisError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TapisError::FileNotFound { .. } => vec![
                "Check the input path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            TapisError::DecodeError { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the file as PCM WAV",
            ],
            TapisError::UnsupportedFilterType { .. } => vec![
                "Pass types: low, band, high",
                "Windows: hamming, hann, boxcar, blackman",
                "IIR families: butterworth, chebyshev, elliptic, bessel",
            ],
            TapisError::DesignError { .. } => vec![
                "Cutoffs must lie strictly between 0 Hz and half the sample rate",
                "Band-pass cutoffs must be given as low,high with low < high",
                "Chebyshev needs rp; elliptic needs rp and rs",
                "Bessel designs support orders up to 32",
            ],
            TapisError::WriteError { .. } | TapisError::Io(_) => vec![
                "Check the output directory is writable",
                "Free up disk space",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = TapisError::FileNotFound {
            path: "test.wav".to_string(),
            source: None,
        };
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");

        let err = TapisError::UnsupportedFilterType {
            kind: "IIR family",
            name: "gaussian".to_string(),
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_FILTER_TYPE");
        assert_eq!(err.to_string(), "Unsupported IIR family: 'gaussian'");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = TapisError::design("cutoff at Nyquist");
        assert_eq!(err.error_code(), "DESIGN_ERROR");
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TapisError = io.into();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
