//! Unified error hierarchy for vitalrs
//!
//! Every failure mode degrades to a single user-visible message. Field-level
//! coercion failures never surface here; they become absent values.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all vitalrs operations
#[derive(Debug, Error)]
pub enum VitalRsError {
    /// Raw CSV text could not be obtained
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Text was obtained but is structurally unusable
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Rendering or writing a report failed
    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text retrieval failures
#[derive(Debug, Error)]
pub enum LoadError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File exists but could not be read as text
    #[error("Unable to read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// No sample dataset configured under this key
    #[error("Unknown dataset: {key}")]
    UnknownDataset { key: String },
}

/// Structural parse failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Input has no header line
    #[error("No header line found")]
    MissingHeader,
}

/// Result type alias for vitalrs operations
pub type Result<T> = std::result::Result<T, VitalRsError>;

impl VitalRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VitalRsError::Load(LoadError::UnknownDataset { .. }) => ErrorSeverity::Warning,
            VitalRsError::Load(_) => ErrorSeverity::Error,
            VitalRsError::Parse(_) => ErrorSeverity::Warning,
            VitalRsError::Configuration(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            VitalRsError::Load(LoadError::FileNotFound { path }) => {
                format!("Could not find sample file: {}", path.display())
            }
            VitalRsError::Load(LoadError::UnknownDataset { key }) => {
                format!("No sample dataset named '{}'. Run `vitalrs datasets` to list them.", key)
            }
            VitalRsError::Load(_) => {
                "Could not load sample CSV. Make sure the data folder is deployed.".to_string()
            }
            VitalRsError::Parse(_) => {
                "Unable to parse CSV. Please check column headers.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that leaves the previous state usable
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
