use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;

use crate::error::ParseError;
use crate::models::Sample;

/// CSV parser for biometric samples with by-name column lookup
pub struct CsvSampleParser {
    column_mapping: HashMap<String, String>,
}

impl CsvSampleParser {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations
        Self::add_mapping(
            &mut column_mapping,
            "timestamp",
            &["timestamp", "time", "date", "datetime", "date_time"],
        );
        Self::add_mapping(&mut column_mapping, "athlete_name", &["athlete_name", "athlete", "name"]);
        Self::add_mapping(&mut column_mapping, "heart_rate", &["heart_rate", "hr", "heartrate", "bpm"]);
        Self::add_mapping(&mut column_mapping, "spo2", &["spo2", "sp_o2", "oxygen_saturation"]);
        Self::add_mapping(&mut column_mapping, "stress_level", &["stress_level", "stress"]);
        Self::add_mapping(&mut column_mapping, "systolic_bp", &["systolic_bp", "systolic"]);
        Self::add_mapping(&mut column_mapping, "diastolic_bp", &["diastolic_bp", "diastolic"]);
        Self::add_mapping(&mut column_mapping, "fall_detected", &["fall_detected", "fall"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    /// Parse raw CSV text into samples, preserving row order
    ///
    /// Fails only when the text has no header line. Unknown columns are
    /// ignored, missing columns leave fields absent, and rows the reader
    /// cannot decode are skipped. Every physical line is read on its own, so
    /// an unbalanced quote stays confined to its row.
    pub fn parse(&self, text: &str) -> Result<Vec<Sample>, ParseError> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let headers = lines
            .next()
            .and_then(|line| read_line(line).ok().flatten())
            .ok_or(ParseError::MissingHeader)?;

        // First occurrence wins when a column name repeats
        let mut columns: HashMap<String, usize> = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            columns.entry(self.normalize_column_name(header)).or_insert(i);
        }

        let mut samples = Vec::new();
        let mut skipped = 0usize;

        for (row, line) in lines.enumerate() {
            let record = match read_line(line) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(row = row + 1, error = %e, "Skipping unreadable CSV row");
                    skipped += 1;
                    continue;
                }
            };

            if record.iter().all(str::is_empty) {
                continue;
            }

            samples.push(Self::sample_from_record(&record, &columns));
        }

        tracing::debug!(
            samples = samples.len(),
            skipped,
            columns = headers.len(),
            "Parsed sample CSV"
        );

        Ok(samples)
    }

    fn sample_from_record(record: &StringRecord, columns: &HashMap<String, usize>) -> Sample {
        let text = |key: &str| cell(record, columns, key);
        let num = |key: &str| parse_number(text(key));
        let optional_text = |key: &str| {
            let value = text(key);
            (!value.is_empty()).then(|| value.to_string())
        };

        Sample {
            timestamp: text("timestamp").to_string(),
            athlete_name: text("athlete_name").to_string(),
            steps: num("steps"),
            calories: num("calories"),
            active_minutes: num("active_minutes"),
            heart_rate: num("heart_rate"),
            ecg: text("ecg").to_string(),
            spo2: num("spo2"),
            menstrual_phase: optional_text("menstrual_phase"),
            stress_level: num("stress_level"),
            body_fat_pct: num("body_fat_pct"),
            muscle_mass_kg: num("muscle_mass_kg"),
            sleep_stage: optional_text("sleep_stage").map(|s| s.to_lowercase()),
            sleep_apnea_events: num("sleep_apnea_events"),
            systolic_bp: num("systolic_bp"),
            diastolic_bp: num("diastolic_bp"),
            energy_score: num("energy_score"),
            antioxidant_index: num("antioxidant_index"),
            fall_detected: parse_flag(text("fall_detected")),
        }
    }
}

impl Default for CsvSampleParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one physical line as a single record
fn read_line(line: &str) -> Result<Option<StringRecord>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    if reader.read_record(&mut record)? {
        Ok(Some(record))
    } else {
        Ok(None)
    }
}

fn cell<'a>(record: &'a StringRecord, columns: &HashMap<String, usize>, key: &str) -> &'a str {
    columns
        .get(key)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

/// Parse CSV text with the default column mapping
pub fn parse_samples(text: &str) -> Result<Vec<Sample>, ParseError> {
    CsvSampleParser::new().parse(text)
}

/// Coerce a cell to a finite float; anything else is absent
///
/// A leading numeric prefix is enough, so `98%` reads as 98 and `72 bpm`
/// as 72.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    cell[..numeric_prefix_len(cell)]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Byte length of the leading `[+-]digits[.digits][e[+-]digits]` run
fn numeric_prefix_len(cell: &str) -> usize {
    let bytes = cell.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits + frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits_from(end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }

    end
}

/// Only a case-insensitive "true" counts as set
pub fn parse_flag(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("true")
}
