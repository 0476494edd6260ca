use super::ExportError;
use crate::dashboard::DashboardView;
use std::io::Write;
use std::path::Path;

/// Write a dashboard view as pretty-printed JSON
pub fn write_view<W: Write>(view: &DashboardView, writer: &mut W) -> Result<(), ExportError> {
    write_json(view, writer)
}

/// Serialize any value as pretty-printed JSON into a writer
pub fn write_json<T, W>(data: &T, writer: &mut W) -> Result<(), ExportError>
where
    T: serde::Serialize,
    W: Write,
{
    let json_data = serde_json::to_string_pretty(data)
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;

    writer.write_all(json_data.as_bytes())?;
    writeln!(writer)?;
    Ok(())
}

/// Export any serializable data structure to a JSON file
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let mut file = std::fs::File::create(output_path)?;
    write_json(data, &mut file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::dashboard::Session;
    use crate::models::{Role, Sample};
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn view() -> DashboardView {
        let sample = Sample {
            timestamp: "2024-06-03 07:00:00".to_string(),
            athlete_name: "Alex".to_string(),
            heart_rate: Some(120.0),
            ..Sample::default()
        };
        Session::new(Role::Doctor, "alex")
            .with_samples(vec![sample])
            .view(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), &Thresholds::default())
    }

    #[test]
    fn test_view_json_shape() {
        let mut buffer = Vec::new();
        write_view(&view(), &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["role"], "doctor");
        assert_eq!(value["alerts"]["state"], "alerts");
        assert_eq!(value["alerts"]["alerts"][0]["severity"], "high");
        assert_eq!(value["summary"]["avg_heart_rate"], 120.0);
        assert!(value["summary"]["avg_spo2"].is_null());
        assert_eq!(value["cards"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn test_export_json_roundtrips_view() {
        let original = view();
        let temp_file = NamedTempFile::new().unwrap();
        export_json(&original, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let restored: DashboardView = serde_json::from_str(&content).unwrap();
        assert_eq!(restored, original);
    }
}
