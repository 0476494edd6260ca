//! Window aggregation over biometric samples
//!
//! Every average divides by the number of *present* values for that field.
//! Absent values never enter a sum or a count, so `[72, absent, 80]`
//! averages to 76.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::Sample;

/// Running sum and count of present values for one field
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldStats {
    pub sum: f64,
    pub count: usize,
}

impl FieldStats {
    /// Accumulate one field across a record set
    pub fn collect<'a, I, F>(samples: I, field: F) -> Self
    where
        I: IntoIterator<Item = &'a Sample>,
        F: Fn(&Sample) -> Option<f64>,
    {
        samples
            .into_iter()
            .filter_map(|s| field(s))
            .fold(FieldStats::default(), |acc, value| FieldStats {
                sum: acc.sum + value,
                count: acc.count + 1,
            })
    }

    /// Sum of present values, absent when nothing was present
    pub fn total(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Aggregate statistics over a window of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Last sample in the window as given, for point-in-time fields
    pub latest: Sample,

    pub sample_count: usize,

    /// Date part of the first sample in the window
    pub first_date: Option<String>,

    /// Date part of the last sample in the window
    pub last_date: Option<String>,

    /// Distinct calendar days, never less than 1
    pub days: usize,

    pub total_steps: Option<f64>,
    pub total_active_minutes: Option<f64>,
    pub total_calories: Option<f64>,

    pub avg_steps_per_day: Option<f64>,
    pub avg_active_minutes_per_day: Option<f64>,

    pub avg_heart_rate: Option<f64>,
    pub avg_spo2: Option<f64>,
    pub avg_stress: Option<f64>,
    pub avg_energy: Option<f64>,
    pub avg_antioxidant: Option<f64>,

    /// Occurrences per lowercase sleep stage
    pub sleep_stage_counts: BTreeMap<String, usize>,

    pub apnea_events: Option<f64>,
    pub avg_apnea_per_night: Option<f64>,
}

impl Summary {
    /// Number of samples carrying a sleep stage
    pub fn sleep_sample_total(&self) -> usize {
        self.sleep_stage_counts.values().sum()
    }

    pub fn sleep_stage_count(&self, stage: &str) -> usize {
        self.sleep_stage_counts.get(stage).copied().unwrap_or(0)
    }

    /// Share of staged samples in deep sleep, absent without sleep data
    pub fn deep_sleep_pct(&self) -> Option<f64> {
        let total = self.sleep_sample_total();
        (total > 0).then(|| self.sleep_stage_count("deep") as f64 / total as f64 * 100.0)
    }
}

/// Number of distinct date prefixes, at least 1
pub fn distinct_days(samples: &[Sample]) -> usize {
    samples
        .iter()
        .filter_map(Sample::date_part)
        .collect::<BTreeSet<_>>()
        .len()
        .max(1)
}

/// Summarize a window of samples
///
/// Returns `None` for an empty window. The input order is trusted: the last
/// element is taken as the latest sample without re-sorting.
pub fn summarize(samples: &[Sample]) -> Option<Summary> {
    let latest = samples.last()?;
    let days = distinct_days(samples);

    let stats = |field: fn(&Sample) -> Option<f64>| FieldStats::collect(samples, field);

    let total_steps = stats(|s| s.steps).total();
    let total_active_minutes = stats(|s| s.active_minutes).total();
    let total_calories = stats(|s| s.calories).total();
    let apnea_events = stats(|s| s.sleep_apnea_events).total();

    let mut sleep_stage_counts = BTreeMap::new();
    for stage in samples.iter().filter_map(|s| s.sleep_stage.as_deref()) {
        let stage = stage.trim().to_lowercase();
        if stage.is_empty() {
            continue;
        }
        *sleep_stage_counts.entry(stage).or_insert(0) += 1;
    }

    let per_day = |total: Option<f64>| total.map(|t| t / days as f64);

    let summary = Summary {
        latest: latest.clone(),
        sample_count: samples.len(),
        first_date: samples.first().and_then(Sample::date_part).map(str::to_string),
        last_date: latest.date_part().map(str::to_string),
        days,
        total_steps,
        total_active_minutes,
        total_calories,
        avg_steps_per_day: per_day(total_steps),
        avg_active_minutes_per_day: per_day(total_active_minutes),
        avg_heart_rate: stats(|s| s.heart_rate).mean(),
        avg_spo2: stats(|s| s.spo2).mean(),
        avg_stress: stats(|s| s.stress_level).mean(),
        avg_energy: stats(|s| s.energy_score).mean(),
        avg_antioxidant: stats(|s| s.antioxidant_index).mean(),
        sleep_stage_counts,
        apnea_events,
        avg_apnea_per_night: per_day(apnea_events),
    };

    tracing::trace!(
        samples = summary.sample_count,
        days = summary.days,
        "Summarized window"
    );

    Some(summary)
}
