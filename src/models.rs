use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sleep stages in the order they are charted
pub const SLEEP_STAGES: [&str; 4] = ["awake", "light", "deep", "rem"];

/// One timestamped biometric observation
///
/// Numeric fields are `None` when the source cell was missing or failed
/// coercion. Absent values never count as zero in aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sortable date-time string, date part before the first space
    pub timestamp: String,

    pub athlete_name: String,

    pub steps: Option<f64>,

    /// Energy expenditure in kcal
    pub calories: Option<f64>,

    pub active_minutes: Option<f64>,

    /// Heart rate in beats per minute
    pub heart_rate: Option<f64>,

    /// Free-text ECG status, "normal" (any case) means healthy
    pub ecg: String,

    /// Blood oxygen saturation percentage (0-100)
    pub spo2: Option<f64>,

    pub menstrual_phase: Option<String>,

    /// Perceived stress on a 0-100 scale
    pub stress_level: Option<f64>,

    pub body_fat_pct: Option<f64>,

    pub muscle_mass_kg: Option<f64>,

    /// Lowercase sleep stage (awake, light, deep, rem)
    pub sleep_stage: Option<String>,

    pub sleep_apnea_events: Option<f64>,

    /// Systolic blood pressure in mmHg
    pub systolic_bp: Option<f64>,

    /// Diastolic blood pressure in mmHg
    pub diastolic_bp: Option<f64>,

    /// Readiness score on a 0-100 scale
    pub energy_score: Option<f64>,

    /// Antioxidant index on a 0-100 scale
    pub antioxidant_index: Option<f64>,

    pub fall_detected: bool,
}

impl Sample {
    /// Date portion of the timestamp (substring before the first space)
    pub fn date_part(&self) -> Option<&str> {
        date_part(&self.timestamp)
    }

    /// Calendar date of the sample, if the date part is ISO formatted
    pub fn date(&self) -> Option<NaiveDate> {
        self.date_part()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// True when an ECG status is recorded and it is not "normal"
    pub fn ecg_flagged(&self) -> bool {
        let ecg = self.ecg.trim();
        !ecg.is_empty() && !ecg.eq_ignore_ascii_case("normal")
    }
}

/// Date portion of a timestamp string
pub fn date_part(timestamp: &str) -> Option<&str> {
    timestamp.split(' ').next().filter(|d| !d.is_empty())
}

/// Audience the dashboard is tailored for
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Coach,
    Trainer,
    Doctor,
    Athlete,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Coach, Role::Trainer, Role::Doctor, Role::Athlete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coach => "coach",
            Role::Trainer => "trainer",
            Role::Doctor => "doctor",
            Role::Athlete => "athlete",
        }
    }

    /// One-line description of what the view focuses on
    pub fn description(&self) -> &'static str {
        match self {
            Role::Coach => {
                "Summary of physical load, readiness, and recovery to support training decisions."
            }
            Role::Trainer => {
                "Focus on workload, body composition, and recovery balance to guide conditioning."
            }
            Role::Doctor => {
                "Clinical red flags across vitals, sleep apnea, ECG, and fall detection."
            }
            Role::Athlete => {
                "Personal snapshot of readiness, stress, and recovery with clear guidance."
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coach" => Ok(Role::Coach),
            "trainer" => Ok(Role::Trainer),
            "doctor" => Ok(Role::Doctor),
            "athlete" => Ok(Role::Athlete),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Alert priority tier, used for display emphasis only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Clinical alert raised against the current data window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

impl Alert {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2024-06-03 07:15:00"), Some("2024-06-03"));
        assert_eq!(date_part("2024-06-03"), Some("2024-06-03"));
        assert_eq!(date_part(""), None);
        assert_eq!(date_part(" 07:15"), None);
    }

    #[test]
    fn test_sample_date() {
        let sample = Sample {
            timestamp: "2024-06-03 07:15:00".to_string(),
            ..Sample::default()
        };
        assert_eq!(sample.date(), NaiveDate::from_ymd_opt(2024, 6, 3));

        let sample = Sample {
            timestamp: "yesterday 07:15".to_string(),
            ..Sample::default()
        };
        assert_eq!(sample.date_part(), Some("yesterday"));
        assert_eq!(sample.date(), None);
    }

    #[test]
    fn test_ecg_flagged() {
        let mut sample = Sample::default();
        assert!(!sample.ecg_flagged());

        sample.ecg = "NORMAL".to_string();
        assert!(!sample.ecg_flagged());

        sample.ecg = "irregular".to_string();
        assert!(sample.ecg_flagged());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(" athlete ".parse::<Role>().unwrap(), Role::Athlete);
        assert!("physio".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Coach);
    }
}
