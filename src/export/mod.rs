use crate::dashboard::DashboardView;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

pub mod csv;
pub mod json;
pub mod text;

/// Report output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Chart rendering error: {0}")]
    Chart(String),
}

impl From<::csv::Error> for ExportError {
    fn from(err: ::csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

/// Write a dashboard view to any writer in the chosen format
pub fn render_view<W: Write>(
    view: &DashboardView,
    format: ExportFormat,
    writer: &mut W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Text => text::write_report(view, writer),
        ExportFormat::Json => json::write_view(view, writer),
    }
}

/// Write a dashboard view to a file
pub fn export_view<P: AsRef<Path>>(
    view: &DashboardView,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path.as_ref())?;
    render_view(view, format, &mut file)?;

    tracing::info!(
        path = %output_path.as_ref().display(),
        format = ?format,
        "Report exported"
    );
    Ok(())
}
