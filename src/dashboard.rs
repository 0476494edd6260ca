//! Session state and the derived dashboard view
//!
//! A `Session` is an immutable snapshot of what the user has selected: the
//! role, the athlete, the loaded record set, the date window and an optional
//! comparison date. Every action returns a new snapshot, and
//! `Session::view` recomputes everything from the current record set.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::alerts::{alerts_for_summary, NO_ALERTS_MESSAGE};
use crate::charts::ChartData;
use crate::comparison::{format_comparison, format_delta, format_optional, Comparison, PLACEHOLDER};
use crate::config::Thresholds;
use crate::error::Result;
use crate::import::{load_samples, SampleSource};
use crate::models::{Alert, Role, Sample};
use crate::notes::{role_notes, RoleNotes};
use crate::summary::{summarize, Summary};
use crate::window::{date_label, samples_on, DateRange};

/// Status line shown when no record set is loaded
pub const NO_DATA_MESSAGE: &str = "No data loaded. Provide a CSV file or use a sample dataset.";

/// Snapshot of the user's selections and the loaded record set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub role: Role,

    /// Display name used when the samples carry no athlete name
    pub athlete: String,

    /// Every parsed sample of the current load
    pub all_samples: Vec<Sample>,

    pub window: DateRange,

    pub comparison_date: Option<NaiveDate>,
}

impl Session {
    pub fn new(role: Role, athlete: impl Into<String>) -> Self {
        Session {
            role,
            athlete: athlete.into(),
            ..Session::default()
        }
    }

    /// Replace the record set wholesale and reset the window to its span
    pub fn with_samples(self, samples: Vec<Sample>) -> Self {
        let window = DateRange::spanning(&samples);
        Session {
            all_samples: samples,
            window,
            ..self
        }
    }

    /// Load a fresh record set from a source
    ///
    /// On failure the error is returned and the current snapshot stays
    /// usable as it was.
    pub fn load_from(&self, source: &dyn SampleSource) -> Result<Self> {
        let samples = load_samples(source)?;
        Ok(self.clone().with_samples(samples))
    }

    pub fn with_role(self, role: Role) -> Self {
        Session { role, ..self }
    }

    pub fn with_athlete(self, athlete: impl Into<String>) -> Self {
        Session {
            athlete: athlete.into(),
            ..self
        }
    }

    /// Narrow the window; `None` bounds stay open-ended
    pub fn with_window(self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Session {
            window: DateRange::new(from, to),
            ..self
        }
    }

    /// Reset the window to the span of the loaded samples
    pub fn clear_window(self) -> Self {
        let window = DateRange::spanning(&self.all_samples);
        Session { window, ..self }
    }

    pub fn with_comparison(self, date: Option<NaiveDate>) -> Self {
        Session {
            comparison_date: date,
            ..self
        }
    }

    /// Samples inside the current window
    ///
    /// A window that matches nothing falls back to the full record set.
    pub fn samples(&self) -> Vec<Sample> {
        let filtered = self.window.filter(&self.all_samples);
        if filtered.is_empty() && !self.all_samples.is_empty() {
            tracing::debug!(
                from = ?self.window.from,
                to = ?self.window.to,
                "Window matched no samples, using the full record set"
            );
            return self.all_samples.clone();
        }
        filtered
    }

    /// Recompute the full dashboard for the current snapshot
    pub fn view(&self, today: NaiveDate, thresholds: &Thresholds) -> DashboardView {
        let samples = self.samples();
        let summary = summarize(&samples);

        let comparison = self.comparison_date.and_then(|date| {
            summarize(&samples_on(&samples, date)).map(|summary| ComparisonWindow {
                date,
                label: date_label(date, today),
                summary,
            })
        });

        let alerts = match (self.role, summary.as_ref()) {
            (Role::Doctor, Some(summary)) => AlertPanel::from_alerts(alerts_for_summary(summary, thresholds)),
            (Role::Doctor, None) => AlertPanel::Clear {
                message: NO_ALERTS_MESSAGE.to_string(),
            },
            _ => AlertPanel::Hidden,
        };

        tracing::debug!(
            role = %self.role,
            window = samples.len(),
            total = self.all_samples.len(),
            comparison = comparison.is_some(),
            "Built dashboard view"
        );

        DashboardView {
            role: self.role,
            role_description: self.role.description().to_string(),
            status: self.status_line(&samples),
            window: self.window,
            cards: build_cards(summary.as_ref(), comparison.as_ref()),
            notes: role_notes(self.role, summary.as_ref(), thresholds),
            alerts,
            charts: ChartData::from_window(&samples, summary.as_ref()),
            comparison_label: comparison.as_ref().map(|c| c.label.clone()),
            summary,
        }
    }

    fn status_line(&self, samples: &[Sample]) -> String {
        let (first, last) = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return NO_DATA_MESSAGE.to_string(),
        };

        let athlete = if first.athlete_name.trim().is_empty() {
            capitalize(&self.athlete)
        } else {
            first.athlete_name.trim().to_string()
        };

        format!(
            "{} - {} samples from {} to {}. View tailored for {}.",
            athlete,
            samples.len(),
            first.date_part().unwrap_or(PLACEHOLDER),
            last.date_part().unwrap_or(PLACEHOLDER),
            self.role
        )
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Athlete".to_string(),
    }
}

/// Summary of the single comparison date inside the window
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonWindow {
    pub date: NaiveDate,
    pub label: String,
    pub summary: Summary,
}

/// Clinical alert panel state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AlertPanel {
    /// Not shown for this role
    Hidden,
    /// Shown, nothing fired
    Clear { message: String },
    /// Shown, with alerts in rule order
    Alerts { alerts: Vec<Alert> },
}

impl AlertPanel {
    pub fn from_alerts(alerts: Vec<Alert>) -> Self {
        if alerts.is_empty() {
            AlertPanel::Clear {
                message: NO_ALERTS_MESSAGE.to_string(),
            }
        } else {
            AlertPanel::Alerts { alerts }
        }
    }
}

/// One summary card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub key: String,
    pub title: String,

    /// Current-window value, or the placeholder
    pub value: String,

    /// Present when a comparison date is selected and both sides have data
    pub comparison: Option<Comparison>,
}

impl MetricCard {
    fn new(key: &str, title: &str, value: String, comparison: Option<Comparison>) -> Self {
        MetricCard {
            key: key.to_string(),
            title: title.to_string(),
            value,
            comparison,
        }
    }

    fn placeholder(key: &str, title: &str) -> Self {
        Self::new(key, title, PLACEHOLDER.to_string(), None)
    }
}

/// Everything a renderer needs for one screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub role: Role,
    pub role_description: String,
    pub status: String,
    pub window: DateRange,
    pub summary: Option<Summary>,
    pub cards: Vec<MetricCard>,
    pub notes: RoleNotes,
    pub alerts: AlertPanel,
    pub charts: ChartData,
    pub comparison_label: Option<String>,
}

/// Numeric card definition: how to read the value from a summary
struct NumericCard {
    key: &'static str,
    title: &'static str,
    unit: &'static str,
    precision: usize,
    value: fn(&Summary) -> Option<f64>,
}

const NUMERIC_CARDS: [NumericCard; 10] = [
    NumericCard {
        key: "steps",
        title: "Steps / day",
        unit: "",
        precision: 0,
        value: |s| s.avg_steps_per_day.or(s.total_steps),
    },
    NumericCard {
        key: "active_minutes",
        title: "Active minutes / day",
        unit: "min",
        precision: 0,
        value: |s| s.avg_active_minutes_per_day.or(s.total_active_minutes),
    },
    NumericCard {
        key: "heart_rate",
        title: "Avg heart rate",
        unit: "bpm",
        precision: 0,
        value: |s| s.avg_heart_rate,
    },
    NumericCard {
        key: "spo2",
        title: "Avg SpO2",
        unit: "%",
        precision: 1,
        value: |s| s.avg_spo2,
    },
    NumericCard {
        key: "deep_sleep",
        title: "Deep sleep",
        unit: "%",
        precision: 0,
        value: |s| s.deep_sleep_pct(),
    },
    NumericCard {
        key: "apnea_events",
        title: "Apnea events / night",
        unit: "",
        precision: 1,
        value: |s| s.avg_apnea_per_night.or(s.apnea_events),
    },
    NumericCard {
        key: "body_fat",
        title: "Body fat",
        unit: "%",
        precision: 1,
        value: |s| s.latest.body_fat_pct,
    },
    NumericCard {
        key: "energy_score",
        title: "Energy score",
        unit: "/100",
        precision: 0,
        value: |s| s.latest.energy_score.or(s.avg_energy),
    },
    NumericCard {
        key: "stress",
        title: "Avg stress",
        unit: "/100",
        precision: 0,
        value: |s| s.avg_stress,
    },
    NumericCard {
        key: "antioxidant_index",
        title: "Antioxidant index",
        unit: "/100",
        precision: 0,
        value: |s| s.latest.antioxidant_index.or(s.avg_antioxidant),
    },
];

/// Build the summary cards, with comparison deltas when available
pub fn build_cards(summary: Option<&Summary>, comparison: Option<&ComparisonWindow>) -> Vec<MetricCard> {
    let summary = match summary {
        Some(summary) => summary,
        None => {
            let mut cards: Vec<MetricCard> = NUMERIC_CARDS
                .iter()
                .map(|card| MetricCard::placeholder(card.key, card.title))
                .collect();
            cards.push(MetricCard::placeholder("blood_pressure", "Blood pressure"));
            cards.push(MetricCard::placeholder("ecg", "ECG"));
            return cards;
        }
    };

    let mut cards: Vec<MetricCard> = NUMERIC_CARDS
        .iter()
        .map(|card| {
            let current = (card.value)(summary);
            let compared = comparison.and_then(|c| {
                format_comparison(
                    current,
                    (card.value)(&c.summary),
                    card.unit,
                    card.precision,
                    Some(&c.label),
                )
            });
            MetricCard::new(
                card.key,
                card.title,
                format_optional(current, card.unit, card.precision),
                compared,
            )
        })
        .collect();

    cards.push(blood_pressure_card(summary, comparison));
    cards.push(ecg_card(summary, comparison));
    cards
}

fn blood_pressure_card(summary: &Summary, comparison: Option<&ComparisonWindow>) -> MetricCard {
    let reading = |s: &Summary| s.latest.systolic_bp.zip(s.latest.diastolic_bp);
    let pair = |(sys, dia): (f64, f64)| {
        format!("{}/{}", format_optional(Some(sys), "", 0), format_optional(Some(dia), "", 0))
    };

    let current = reading(summary);
    let value = current
        .map(|bp| format!("{} mmHg", pair(bp)))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let compared = comparison.and_then(|c| {
        let ((sys, dia), (c_sys, c_dia)) = (current?, reading(&c.summary)?);
        Some(Comparison {
            baseline: format!("{} mmHg", pair((sys, dia))),
            comparison: format!("{} mmHg", pair((c_sys, c_dia))),
            delta: format!("{}/{}", format_delta(c_sys - sys, 0), format_delta(c_dia - dia, 0)),
            label: c.label.clone(),
        })
    });

    MetricCard::new("blood_pressure", "Blood pressure", value, compared)
}

fn ecg_card(summary: &Summary, comparison: Option<&ComparisonWindow>) -> MetricCard {
    let status = |s: &Sample| {
        if s.ecg_flagged() {
            s.ecg.trim().to_string()
        } else {
            "Normal".to_string()
        }
    };

    let current = status(&summary.latest);
    let compared = comparison.and_then(|c| {
        let recorded = c.summary.latest.ecg.trim();
        if recorded.is_empty() {
            return None;
        }
        let changed = !recorded.eq_ignore_ascii_case(&current);
        Some(Comparison {
            baseline: current.clone(),
            comparison: recorded.to_string(),
            delta: if changed { "changed" } else { "unchanged" }.to_string(),
            label: c.label.clone(),
        })
    });

    MetricCard::new("ecg", "ECG", current, compared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn sample(ts: &str, hr: f64) -> Sample {
        Sample {
            timestamp: ts.to_string(),
            athlete_name: "Alex".to_string(),
            heart_rate: Some(hr),
            spo2: Some(97.0),
            systolic_bp: Some(120.0),
            diastolic_bp: Some(78.0),
            ecg: "normal".to_string(),
            ..Sample::default()
        }
    }

    fn loaded() -> Session {
        Session::new(Role::Coach, "alex").with_samples(vec![
            sample("2024-06-01 07:00:00", 60.0),
            sample("2024-06-02 07:00:00", 70.0),
            sample("2024-06-03 07:00:00", 80.0),
        ])
    }

    fn card<'a>(view: &'a DashboardView, key: &str) -> &'a MetricCard {
        view.cards.iter().find(|c| c.key == key).unwrap()
    }

    #[test]
    fn test_load_resets_window_to_span() {
        let session = loaded();
        assert_eq!(session.window, DateRange::new(Some(day(1)), Some(day(3))));
        assert_eq!(session.samples().len(), 3);
    }

    #[test]
    fn test_empty_session_view() {
        let view = Session::new(Role::Doctor, "alex").view(day(10), &Thresholds::default());
        assert!(view.summary.is_none());
        assert_eq!(view.status, NO_DATA_MESSAGE);
        assert!(view.notes.is_empty());
        assert!(view.cards.iter().all(|c| c.value == PLACEHOLDER));
        assert!(matches!(view.alerts, AlertPanel::Clear { .. }));
    }

    #[test]
    fn test_window_narrows_summary() {
        let view = loaded()
            .with_window(Some(day(2)), None)
            .view(day(10), &Thresholds::default());
        assert_eq!(card(&view, "heart_rate").value, "75 bpm");
        assert!(view.status.contains("2 samples from 2024-06-02 to 2024-06-03"));
    }

    #[test]
    fn test_empty_window_falls_back_to_all_samples() {
        let view = loaded()
            .with_window(Some(day(20)), Some(day(21)))
            .view(day(10), &Thresholds::default());

        assert_eq!(view.summary.as_ref().unwrap().sample_count, 3);
        assert_ne!(view.status, NO_DATA_MESSAGE);
        assert!(view.status.contains("3 samples from 2024-06-01 to 2024-06-03"));
        assert_eq!(card(&view, "heart_rate").value, "70 bpm");
    }

    #[test]
    fn test_comparison_cards() {
        let view = loaded()
            .with_comparison(Some(day(3)))
            .view(day(10), &Thresholds::default());

        let hr = card(&view, "heart_rate");
        assert_eq!(hr.value, "70 bpm");
        let comparison = hr.comparison.as_ref().unwrap();
        assert_eq!(comparison.comparison, "80 bpm");
        assert_eq!(comparison.delta, "+10");
        assert_eq!(comparison.label, "Jun 3");
        assert_eq!(view.comparison_label.as_deref(), Some("Jun 3"));

        let bp = card(&view, "blood_pressure").comparison.as_ref().unwrap();
        assert_eq!(bp.delta, "+0/+0");

        let ecg = card(&view, "ecg").comparison.as_ref().unwrap();
        assert_eq!(ecg.delta, "unchanged");
    }

    #[test]
    fn test_comparison_date_outside_window() {
        let view = loaded()
            .with_window(Some(day(1)), Some(day(2)))
            .with_comparison(Some(day(3)))
            .view(day(10), &Thresholds::default());
        assert!(view.comparison_label.is_none());
        assert!(view.cards.iter().all(|c| c.comparison.is_none()));
    }

    #[test]
    fn test_alert_panel_only_for_doctor() {
        let mut samples = loaded().all_samples;
        samples[2].fall_detected = true;

        let coach = Session::new(Role::Coach, "alex").with_samples(samples.clone());
        assert_eq!(coach.view(day(10), &Thresholds::default()).alerts, AlertPanel::Hidden);

        let doctor = coach.with_role(Role::Doctor);
        match doctor.view(day(10), &Thresholds::default()).alerts {
            AlertPanel::Alerts { alerts } => assert_eq!(alerts.len(), 1),
            other => panic!("unexpected panel: {:?}", other),
        }
    }

    #[test]
    fn test_status_falls_back_to_athlete_key() {
        let mut samples = loaded().all_samples;
        for s in &mut samples {
            s.athlete_name.clear();
        }
        let view = Session::new(Role::Athlete, "jordan")
            .with_samples(samples)
            .view(day(10), &Thresholds::default());
        assert!(view.status.starts_with("Jordan - 3 samples"));
        assert!(view.status.ends_with("View tailored for athlete."));
    }

    #[test]
    fn test_ecg_card_flags_abnormal() {
        let mut samples = loaded().all_samples;
        samples[2].ecg = "AFib suspected".to_string();
        let view = Session::new(Role::Doctor, "alex")
            .with_samples(samples)
            .with_comparison(Some(day(2)))
            .view(day(10), &Thresholds::default());

        let ecg = card(&view, "ecg");
        assert_eq!(ecg.value, "AFib suspected");
        assert_eq!(ecg.comparison.as_ref().unwrap().delta, "changed");
    }
}
