use super::ExportError;
use crate::models::Sample;
use std::io::Write;
use std::path::Path;

/// Column order used when writing samples back out
pub const SAMPLE_COLUMNS: [&str; 19] = [
    "timestamp",
    "athlete_name",
    "steps",
    "calories",
    "active_minutes",
    "heart_rate",
    "ecg",
    "spo2",
    "menstrual_phase",
    "stress_level",
    "body_fat_pct",
    "muscle_mass_kg",
    "sleep_stage",
    "sleep_apnea_events",
    "systolic_bp",
    "diastolic_bp",
    "energy_score",
    "antioxidant_index",
    "fall_detected",
];

fn number(value: Option<f64>) -> String {
    value.map_or(String::new(), |v| v.to_string())
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn sample_row(sample: &Sample) -> [String; 19] {
    [
        sample.timestamp.clone(),
        sample.athlete_name.clone(),
        number(sample.steps),
        number(sample.calories),
        number(sample.active_minutes),
        number(sample.heart_rate),
        sample.ecg.clone(),
        number(sample.spo2),
        text(&sample.menstrual_phase),
        number(sample.stress_level),
        number(sample.body_fat_pct),
        number(sample.muscle_mass_kg),
        text(&sample.sleep_stage),
        number(sample.sleep_apnea_events),
        number(sample.systolic_bp),
        number(sample.diastolic_bp),
        number(sample.energy_score),
        number(sample.antioxidant_index),
        sample.fall_detected.to_string(),
    ]
}

/// Write samples as CSV with the standard header; absent values stay empty
pub fn write_samples<W: Write>(samples: &[Sample], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    csv_writer.write_record(SAMPLE_COLUMNS)?;

    for sample in samples {
        csv_writer.write_record(sample_row(sample))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export samples to a CSV file
pub fn export_samples<P: AsRef<Path>>(samples: &[Sample], output_path: P) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path.as_ref())?;
    write_samples(samples, file)?;

    tracing::info!(
        path = %output_path.as_ref().display(),
        count = samples.len(),
        "Samples exported"
    );
    Ok(())
}
