//! Chart data for the heart-rate trend and the sleep-stage distribution
//!
//! Series are always computed. Drawing them to PNG needs the `charts`
//! feature.

use serde::{Deserialize, Serialize};

use crate::models::{Sample, SLEEP_STAGES};
use crate::summary::Summary;

/// Heart rate reading over time; gaps stay in the series as `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRatePoint {
    pub timestamp: String,
    pub bpm: Option<f64>,
}

/// Count of samples in one sleep stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSlice {
    pub stage: String,
    pub count: usize,
}

/// Data behind both dashboard charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub heart_rate: Vec<HeartRatePoint>,
    pub sleep_distribution: Vec<SleepSlice>,
}

impl ChartData {
    pub fn from_window(samples: &[Sample], summary: Option<&Summary>) -> Self {
        ChartData {
            heart_rate: heart_rate_series(samples),
            sleep_distribution: sleep_distribution(summary),
        }
    }
}

/// One point per sample, in window order
pub fn heart_rate_series(samples: &[Sample]) -> Vec<HeartRatePoint> {
    samples
        .iter()
        .map(|s| HeartRatePoint {
            timestamp: s.timestamp.clone(),
            bpm: s.heart_rate,
        })
        .collect()
}

/// Awake, light, deep and REM counts, zero-filled
pub fn sleep_distribution(summary: Option<&Summary>) -> Vec<SleepSlice> {
    SLEEP_STAGES
        .iter()
        .map(|stage| SleepSlice {
            stage: stage.to_string(),
            count: summary.map_or(0, |s| s.sleep_stage_count(stage)),
        })
        .collect()
}

#[cfg(feature = "charts")]
pub use render::{render_charts, render_heart_rate_chart, render_sleep_chart};

#[cfg(feature = "charts")]
mod render {
    use super::{ChartData, HeartRatePoint, SleepSlice};
    use crate::export::ExportError;
    use plotters::prelude::*;
    use std::path::{Path, PathBuf};

    type DrawResult = Result<(), Box<dyn std::error::Error>>;

    const HEART_RATE_COLOR: RGBColor = RGBColor(96, 165, 250);
    const STAGE_COLORS: [RGBColor; 4] = [
        RGBColor(75, 85, 99),
        RGBColor(56, 189, 248),
        RGBColor(34, 197, 94),
        RGBColor(168, 85, 247),
    ];

    /// Write both charts into `dir`, returning the written paths
    pub fn render_charts(data: &ChartData, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir)?;

        let heart_rate_path = dir.join("heart_rate.png");
        render_heart_rate_chart(&data.heart_rate, &heart_rate_path)?;

        let sleep_path = dir.join("sleep_stages.png");
        render_sleep_chart(&data.sleep_distribution, &sleep_path)?;

        tracing::info!(dir = %dir.display(), "Charts written");
        Ok(vec![heart_rate_path, sleep_path])
    }

    /// Line chart of heart rate over the window
    pub fn render_heart_rate_chart(
        points: &[HeartRatePoint],
        path: &Path,
    ) -> Result<(), ExportError> {
        draw_heart_rate(points, path).map_err(|e| ExportError::Chart(e.to_string()))
    }

    /// Bar chart of the sleep-stage distribution
    pub fn render_sleep_chart(slices: &[SleepSlice], path: &Path) -> Result<(), ExportError> {
        draw_sleep(slices, path).map_err(|e| ExportError::Chart(e.to_string()))
    }

    fn draw_heart_rate(points: &[HeartRatePoint], path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, (900, 360)).into_drawing_area();
        root.fill(&WHITE)?;

        let readings: Vec<(usize, f64)> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.bpm.map(|bpm| (i, bpm)))
            .collect();

        let (low, high) = readings
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), (_, bpm)| (lo.min(*bpm), hi.max(*bpm)));
        let (low, high) = if readings.is_empty() {
            (40.0, 200.0)
        } else {
            (low - 5.0, high + 5.0)
        };

        let labels: Vec<&str> = points.iter().map(|p| p.timestamp.as_str()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Heart rate (bpm)", ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0usize..points.len().max(1), low..high)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(6)
            .x_label_formatter(&|i| labels.get(*i).map(|l| l.to_string()).unwrap_or_default())
            .y_desc("bpm")
            .draw()?;

        chart.draw_series(LineSeries::new(readings.iter().copied(), &HEART_RATE_COLOR))?;
        chart.draw_series(
            readings
                .iter()
                .map(|&(i, bpm)| Circle::new((i, bpm), 2, HEART_RATE_COLOR.filled())),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_sleep(slices: &[SleepSlice], path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, (600, 360)).into_drawing_area();
        root.fill(&WHITE)?;

        let max = slices.iter().map(|s| s.count).max().unwrap_or(0);
        let labels: Vec<String> = slices.iter().map(|s| display_stage(&s.stage)).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Sleep stage distribution", ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(
                (0usize..slices.len()).into_segmented(),
                0usize..max + max / 10 + 1,
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc("samples")
            .draw()?;

        for (i, slice) in slices.iter().enumerate() {
            let color = STAGE_COLORS[i % STAGE_COLORS.len()];
            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(20)
                    .data(std::iter::once((i, slice.count))),
            )?;
        }

        root.present()?;
        Ok(())
    }

    fn display_stage(stage: &str) -> String {
        match stage {
            "rem" => "REM".to_string(),
            other => {
                let mut chars = other.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

}
