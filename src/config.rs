use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;
use crate::models::Role;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General dashboard settings
    pub settings: DashboardSettings,

    /// Sample datasets selectable by athlete key
    pub datasets: BTreeMap<String, DatasetConfig>,

    /// Clinical and coaching cutoffs
    pub thresholds: Thresholds,

    /// Logging output
    pub logging: LogConfig,
}

/// General dashboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Role used when none is given on the command line
    pub default_role: Role,

    /// Athlete dataset key used when no file is given
    pub default_athlete: String,

    /// Base directory for relative dataset paths
    pub data_root: PathBuf,

    /// Where chart images are written
    pub chart_dir: PathBuf,
}

/// A bundled or user-provided sample dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Display name used when the CSV rows carry no athlete name
    pub name: String,

    /// CSV path, relative to `settings.data_root` unless absolute
    pub path: PathBuf,
}

/// Threshold table shared by the note and alert engines
///
/// The first block holds the global cutoffs. The second holds cutoffs local
/// to a single role note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Average heart rate considered high (bpm)
    pub hr_high: f64,
    /// Average SpO2 considered low (%)
    pub spo2_low: f64,
    pub stress_high: f64,
    /// Systolic pressure considered hypertensive (mmHg)
    pub systolic_high: f64,
    /// Diastolic pressure considered hypertensive (mmHg)
    pub diastolic_high: f64,
    /// Apnea events per window considered frequent
    pub apnea_events_high: f64,
    pub body_fat_high: f64,
    pub energy_low: f64,
    pub antioxidant_low: f64,
    /// Latest heart rate that raises a clinical alert (bpm)
    pub alert_heart_rate: f64,

    pub coach_steps_high: f64,
    pub coach_hr_elevated: f64,
    pub lean_body_fat: f64,
    pub trainer_active_minutes_high: f64,
    pub trainer_spo2_low: f64,
    /// Deep-sleep share of staged samples below which heavy sessions are avoided (%)
    pub trainer_deep_sleep_pct: f64,
    pub trainer_muscle_mass_kg: f64,
    pub doctor_steps_high: f64,
    pub athlete_steps_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            hr_high: 100.0,
            spo2_low: 92.0,
            stress_high: 70.0,
            systolic_high: 140.0,
            diastolic_high: 90.0,
            apnea_events_high: 5.0,
            body_fat_high: 20.0,
            energy_low: 60.0,
            antioxidant_low: 40.0,
            alert_heart_rate: 110.0,

            coach_steps_high: 12000.0,
            coach_hr_elevated: 90.0,
            lean_body_fat: 14.0,
            trainer_active_minutes_high: 90.0,
            trainer_spo2_low: 95.0,
            trainer_deep_sleep_pct: 18.0,
            trainer_muscle_mass_kg: 60.0,
            doctor_steps_high: 15000.0,
            athlete_steps_high: 12000.0,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            default_role: Role::default(),
            default_athlete: "alex".to_string(),
            data_root: PathBuf::from("."),
            chart_dir: PathBuf::from("./charts"),
        }
    }
}

impl AppConfig {
    /// Configuration with the bundled sample datasets registered
    pub fn with_sample_datasets() -> Self {
        let mut config = AppConfig::default();
        config.datasets.insert(
            "alex".to_string(),
            DatasetConfig {
                name: "Alex".to_string(),
                path: PathBuf::from("data/athlete_alex.csv"),
            },
        );
        config.datasets.insert(
            "jordan".to_string(),
            DatasetConfig {
                name: "Jordan".to_string(),
                path: PathBuf::from("data/athlete_jordan.csv"),
            },
        );
        config
    }

    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vitalrs")
            .join("config.toml")
    }

    /// Load the configuration for a run
    ///
    /// An explicit path must exist and parse. Without one, the default path
    /// is read when present and the bundled defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_implicit(&Self::default_config_path()),
        }
    }

    fn load_implicit(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::with_sample_datasets());
        }
        Self::load_from_file(path)
    }

    /// Resolve a dataset path against the data root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.settings.data_root.join(path)
        }
    }

    /// Display name configured for an athlete key
    pub fn athlete_display_name(&self, key: &str) -> Option<&str> {
        self.datasets.get(key).map(|dataset| dataset.name.as_str())
    }
}
