use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::{LoadError, Result};
use crate::models::Sample;

pub mod csv;

/// Text-retrieval collaborator that yields raw CSV for one dataset
pub trait SampleSource {
    /// Fetch the raw CSV text in one shot
    fn read_text(&self) -> std::result::Result<String, LoadError>;

    /// Human-readable description for status messages
    fn describe(&self) -> String;
}

/// CSV file on the local filesystem
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for FileSource {
    fn read_text(&self) -> std::result::Result<String, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::FileNotFound {
                path: self.path.clone(),
            });
        }

        std::fs::read_to_string(&self.path).map_err(|e| LoadError::Unreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Named sample dataset resolved through the configuration
pub struct DatasetSource {
    key: String,
    display_name: String,
    file: Option<FileSource>,
}

impl DatasetSource {
    pub fn new(key: &str, config: &AppConfig) -> Self {
        let file = config
            .datasets
            .get(key)
            .map(|dataset| FileSource::new(config.resolve_path(&dataset.path)));

        Self {
            key: key.to_string(),
            display_name: config.athlete_display_name(key).unwrap_or(key).to_string(),
            file,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Configured display name, or the key when none is configured
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl SampleSource for DatasetSource {
    fn read_text(&self) -> std::result::Result<String, LoadError> {
        match &self.file {
            Some(file) => file.read_text(),
            None => Err(LoadError::UnknownDataset {
                key: self.key.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        match &self.file {
            Some(file) => format!("{} ({})", self.key, file.describe()),
            None => self.key.clone(),
        }
    }
}

/// Retrieve and parse a full record set from a source
pub fn load_samples(source: &dyn SampleSource) -> Result<Vec<Sample>> {
    tracing::info!(source = %source.describe(), "Loading samples");

    let text = source.read_text()?;
    let samples = csv::parse_samples(&text)?;

    tracing::info!(
        source = %source.describe(),
        count = samples.len(),
        "Loaded samples"
    );

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, VitalRsError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_source_roundtrip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,heart_rate").unwrap();
        writeln!(file, "2024-06-03 07:00:00,70").unwrap();

        let samples = load_samples(&FileSource::new(file.path())).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].heart_rate, Some(70.0));
    }

    #[test]
    fn test_missing_file() {
        let source = FileSource::new("/definitely/not/here.csv");
        match load_samples(&source) {
            Err(VitalRsError::Load(LoadError::FileNotFound { path })) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.csv"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_is_parse_error() {
        let file = NamedTempFile::new().unwrap();
        match load_samples(&FileSource::new(file.path())) {
            Err(VitalRsError::Parse(ParseError::MissingHeader)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_dataset_display_name() {
        let mut config = AppConfig::with_sample_datasets();
        if let Some(dataset) = config.datasets.get_mut("jordan") {
            dataset.name = "Jordan Lee".to_string();
        }

        assert_eq!(DatasetSource::new("jordan", &config).display_name(), "Jordan Lee");
        assert_eq!(DatasetSource::new("alex", &config).display_name(), "Alex");
        assert_eq!(DatasetSource::new("casey", &config).display_name(), "casey");
    }

    #[test]
    fn test_unknown_dataset() {
        let config = AppConfig::default();
        let source = DatasetSource::new("nobody", &config);
        assert!(matches!(
            source.read_text(),
            Err(LoadError::UnknownDataset { .. })
        ));
    }
}
