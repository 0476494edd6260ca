//! Clinical alert engine
//!
//! Rules run in a fixed order against the latest sample and the window
//! summary. Each rule fires independently; none suppresses another. A rule
//! whose input field is absent is skipped.

use crate::config::Thresholds;
use crate::models::{Alert, Sample, Severity};
use crate::summary::{summarize, Summary};

/// Menstrual phase value that flags a high symptom burden
pub const LUTEAL_HIGH_SYMPTOMS: &str = "luteal_high_symptoms";

/// Message shown when the window raises no alerts
pub const NO_ALERTS_MESSAGE: &str =
    "No critical alerts from current data window. Continue routine monitoring.";

type AlertRule = fn(&Summary, &Thresholds) -> Option<Alert>;

const RULES: [AlertRule; 9] = [
    heart_rate_rule,
    spo2_rule,
    blood_pressure_rule,
    ecg_rule,
    apnea_rule,
    fall_rule,
    energy_rule,
    antioxidant_rule,
    menstrual_rule,
];

/// Evaluate every clinical rule against a window of samples
///
/// An empty window yields an empty list.
pub fn clinical_alerts(samples: &[Sample], thresholds: &Thresholds) -> Vec<Alert> {
    summarize(samples)
        .map(|summary| alerts_for_summary(&summary, thresholds))
        .unwrap_or_default()
}

/// Evaluate every clinical rule against an existing summary
pub fn alerts_for_summary(summary: &Summary, thresholds: &Thresholds) -> Vec<Alert> {
    let alerts: Vec<Alert> = RULES
        .iter()
        .filter_map(|rule| rule(summary, thresholds))
        .collect();

    if !alerts.is_empty() {
        tracing::info!(count = alerts.len(), "Clinical alerts raised");
    }

    alerts
}

fn bp_reading(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn heart_rate_rule(summary: &Summary, t: &Thresholds) -> Option<Alert> {
    let hr = summary.latest.heart_rate.filter(|hr| *hr > t.alert_heart_rate)?;
    Some(Alert::new(
        Severity::High,
        format!(
            "Resting heart rate {} bpm; consider evaluation for infection, dehydration, or overtraining.",
            hr
        ),
    ))
}

fn spo2_rule(summary: &Summary, t: &Thresholds) -> Option<Alert> {
    let spo2 = summary.avg_spo2.filter(|spo2| *spo2 < t.spo2_low)?;
    Some(Alert::new(
        Severity::High,
        format!(
            "Average SpO2 {:.1}% is below the {}% threshold; recommend medical assessment.",
            spo2, t.spo2_low
        ),
    ))
}

fn blood_pressure_rule(summary: &Summary, t: &Thresholds) -> Option<Alert> {
    let latest = &summary.latest;
    let systolic_high = latest.systolic_bp.is_some_and(|v| v > t.systolic_high);
    let diastolic_high = latest.diastolic_bp.is_some_and(|v| v > t.diastolic_high);

    (systolic_high || diastolic_high).then(|| {
        Alert::new(
            Severity::High,
            format!(
                "Blood pressure {}/{} mmHg is in the hypertensive range for an athlete.",
                bp_reading(latest.systolic_bp),
                bp_reading(latest.diastolic_bp)
            ),
        )
    })
}

fn ecg_rule(summary: &Summary, _: &Thresholds) -> Option<Alert> {
    let latest = &summary.latest;
    latest.ecg_flagged().then(|| {
        Alert::new(
            Severity::High,
            format!(
                "ECG flagged as \"{}\"; review trace and consider cardiology referral.",
                latest.ecg.trim()
            ),
        )
    })
}

fn apnea_rule(summary: &Summary, t: &Thresholds) -> Option<Alert> {
    let events = summary.apnea_events.filter(|events| *events > t.apnea_events_high)?;
    Some(Alert::new(
        Severity::Medium,
        format!(
            "Sleep apnea events in window: {}, above threshold; consider sleep clinic discussion.",
            events
        ),
    ))
}

fn fall_rule(summary: &Summary, _: &Thresholds) -> Option<Alert> {
    summary.latest.fall_detected.then(|| {
        Alert::new(
            Severity::High,
            "Fall detected in recent session; confirm concussion and musculoskeletal assessment were completed.",
        )
    })
}

fn energy_rule(summary: &Summary, t: &Thresholds) -> Option<Alert> {
    let energy = summary.latest.energy_score.filter(|e| *e < t.energy_low)?;
    Some(Alert::new(
        Severity::Medium,
        format!(
            "Energy score {} is low; screen for illness, under-fueling, and overtraining.",
            energy
        ),
    ))
}

fn antioxidant_rule(summary: &Summary, t: &Thresholds) -> Option<Alert> {
    let index = summary
        .latest
        .antioxidant_index
        .filter(|a| *a < t.antioxidant_low)?;
    Some(Alert::new(
        Severity::Low,
        format!(
            "Antioxidant index {}; consider nutrition review for recovery support.",
            index
        ),
    ))
}

fn menstrual_rule(summary: &Summary, _: &Thresholds) -> Option<Alert> {
    let phase = summary.latest.menstrual_phase.as_deref()?;
    phase.trim().eq_ignore_ascii_case(LUTEAL_HIGH_SYMPTOMS).then(|| {
        Alert::new(
            Severity::Medium,
            "Reported luteal phase with high symptom burden; coordinate individualized training and medical support.",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged_sample() -> Sample {
        Sample {
            timestamp: "2024-06-03 07:00:00".to_string(),
            heart_rate: Some(115.0),
            spo2: Some(90.0),
            systolic_bp: Some(150.0),
            diastolic_bp: Some(95.0),
            ecg: "irregular".to_string(),
            sleep_apnea_events: Some(7.0),
            fall_detected: true,
            energy_score: Some(50.0),
            antioxidant_index: Some(30.0),
            menstrual_phase: Some("luteal_high_symptoms".to_string()),
            ..Sample::default()
        }
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let alerts = clinical_alerts(&[flagged_sample()], &Thresholds::default());
        let severities: Vec<Severity> = alerts.iter().map(|a| a.severity).collect();

        assert_eq!(
            severities,
            vec![
                Severity::High,
                Severity::High,
                Severity::High,
                Severity::High,
                Severity::Medium,
                Severity::High,
                Severity::Medium,
                Severity::Low,
                Severity::Medium,
            ]
        );
        assert!(alerts[0].message.contains("115 bpm"));
        assert!(alerts[1].message.contains("90.0%"));
        assert!(alerts[2].message.contains("150/95 mmHg"));
        assert!(alerts[3].message.contains("\"irregular\""));
        assert!(alerts[4].message.contains("7"));
    }

    #[test]
    fn test_empty_window_has_no_alerts() {
        assert!(clinical_alerts(&[], &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_healthy_sample_has_no_alerts() {
        let sample = Sample {
            timestamp: "2024-06-03 07:00:00".to_string(),
            heart_rate: Some(62.0),
            spo2: Some(98.0),
            systolic_bp: Some(118.0),
            diastolic_bp: Some(76.0),
            ecg: "Normal".to_string(),
            sleep_apnea_events: Some(0.0),
            energy_score: Some(80.0),
            antioxidant_index: Some(65.0),
            menstrual_phase: Some("follicular".to_string()),
            ..Sample::default()
        };
        assert!(clinical_alerts(&[sample], &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_absent_fields_skip_rules() {
        let sample = Sample {
            timestamp: "2024-06-03 07:00:00".to_string(),
            ..Sample::default()
        };
        assert!(clinical_alerts(&[sample], &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_zero_readings_are_evaluated() {
        let sample = Sample {
            timestamp: "2024-06-03 07:00:00".to_string(),
            energy_score: Some(0.0),
            antioxidant_index: Some(0.0),
            ..Sample::default()
        };
        let alerts = clinical_alerts(&[sample], &Thresholds::default());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert_eq!(alerts[1].severity, Severity::Low);
    }

    #[test]
    fn test_diastolic_alone_triggers_bp() {
        let sample = Sample {
            timestamp: "2024-06-03 07:00:00".to_string(),
            diastolic_bp: Some(92.0),
            ..Sample::default()
        };
        let alerts = clinical_alerts(&[sample], &Thresholds::default());
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("?/92 mmHg"));
    }

    #[test]
    fn test_apnea_uses_window_total() {
        let samples: Vec<Sample> = (0..3)
            .map(|night| Sample {
                timestamp: format!("2024-06-0{} 02:00:00", night + 1),
                sleep_apnea_events: Some(2.0),
                ..Sample::default()
            })
            .collect();
        let alerts = clinical_alerts(&samples, &Thresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Medium);
    }

    #[test]
    fn test_point_in_time_rules_use_latest() {
        let mut earlier = flagged_sample();
        earlier.timestamp = "2024-06-02 07:00:00".to_string();
        let later = Sample {
            timestamp: "2024-06-03 07:00:00".to_string(),
            ..Sample::default()
        };

        let alerts = clinical_alerts(&[earlier, later], &Thresholds::default());
        // Only window-level rules survive: average SpO2 and apnea total
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].message.starts_with("Average SpO2"));
        assert!(alerts[1].message.starts_with("Sleep apnea"));
    }
}
