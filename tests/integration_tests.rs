use chrono::NaiveDate;
use std::path::PathBuf;
use vitalrs::{AlertPanel, AppConfig, DatasetSource, FileSource, Role, Session, Severity, Thresholds};

/// Integration tests that run complete dashboard workflows

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use vitalrs::error::{LoadError, VitalRsError};
    use vitalrs::export::{self, ExportFormat};
    use vitalrs::import::{csv::parse_samples, load_samples};

    fn config() -> AppConfig {
        let mut config = AppConfig::with_sample_datasets();
        config.settings.data_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        config
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn dataset_session(key: &str, role: Role) -> Session {
        let config = config();
        Session::new(role, key)
            .load_from(&DatasetSource::new(key, &config))
            .unwrap()
    }

    /// The bundled datasets load and span four days
    #[test]
    fn test_bundled_datasets_load() {
        for key in ["alex", "jordan"] {
            let session = dataset_session(key, Role::Coach);
            assert_eq!(session.all_samples.len(), 48);
            assert_eq!(session.window.from, Some(day(1)));
            assert_eq!(session.window.to, Some(day(4)));

            let view = session.view(today(), &Thresholds::default());
            let summary = view.summary.unwrap();
            assert_eq!(summary.days, 4);
            assert_eq!(summary.sample_count, 48);
        }
    }

    /// The alert-free dataset shows the clear panel for doctors
    #[test]
    fn test_alex_doctor_view_is_clear() {
        let view = dataset_session("alex", Role::Doctor).view(today(), &Thresholds::default());
        assert!(matches!(view.alerts, AlertPanel::Clear { .. }));
    }

    /// The flagged dataset raises every point-in-time alert in rule order
    #[test]
    fn test_jordan_doctor_alerts() {
        let view = dataset_session("jordan", Role::Doctor).view(today(), &Thresholds::default());
        let alerts = match view.alerts {
            AlertPanel::Alerts { alerts } => alerts,
            other => panic!("expected alerts, got {:?}", other),
        };

        let severities: Vec<Severity> = alerts.iter().map(|a| a.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::High,
                Severity::High,
                Severity::High,
                Severity::High,
                Severity::Medium,
                Severity::Low,
                Severity::Medium,
            ]
        );
        assert!(alerts[0].message.contains("114 bpm"));
        assert!(alerts[1].message.contains("146/93 mmHg"));
        assert!(alerts[2].message.contains("irregular rhythm"));
    }

    /// Non-doctor roles never see the panel
    #[test]
    fn test_other_roles_hide_alerts() {
        for role in [Role::Coach, Role::Trainer, Role::Athlete] {
            let view = dataset_session("jordan", role).view(today(), &Thresholds::default());
            assert_eq!(view.alerts, AlertPanel::Hidden);
            assert!(!view.notes.is_empty());
        }
    }

    /// Switching roles keeps the record set and window
    #[test]
    fn test_role_switch_keeps_state() {
        let coach = dataset_session("alex", Role::Coach).with_window(Some(day(2)), Some(day(3)));
        let trainer = coach.clone().with_role(Role::Trainer);

        assert_eq!(coach.samples(), trainer.samples());
        assert_eq!(trainer.samples().len(), 24);
        assert_ne!(
            coach.view(today(), &Thresholds::default()).notes,
            trainer.view(today(), &Thresholds::default()).notes
        );
    }

    /// A failed load leaves the previous snapshot intact
    #[test]
    fn test_failed_load_keeps_previous_session() {
        let session = dataset_session("alex", Role::Coach);

        let missing = session.load_from(&FileSource::new("/no/such/file.csv"));
        assert!(matches!(
            missing,
            Err(VitalRsError::Load(LoadError::FileNotFound { .. }))
        ));

        let mut empty = NamedTempFile::new().unwrap();
        writeln!(empty).unwrap();
        let unparseable = session.load_from(&FileSource::new(empty.path()));
        assert!(matches!(unparseable, Err(VitalRsError::Parse(_))));

        assert_eq!(session.all_samples.len(), 48);
    }

    /// Unknown dataset keys surface as load errors
    #[test]
    fn test_unknown_dataset() {
        let config = config();
        let result = load_samples(&DatasetSource::new("casey", &config));
        match result {
            Err(err @ VitalRsError::Load(LoadError::UnknownDataset { .. })) => {
                assert!(err.user_message().contains("casey"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    /// Rows without an athlete name show the configured dataset name
    #[test]
    fn test_dataset_display_name_in_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casey.csv");
        std::fs::write(
            &path,
            "timestamp,heart_rate\n2024-07-01 08:00:00,70\n2024-07-02 08:00:00,74\n",
        )
        .unwrap();

        let mut config = config();
        config.datasets.insert(
            "casey".to_string(),
            vitalrs::config::DatasetConfig {
                name: "Casey Lee".to_string(),
                path,
            },
        );

        let source = DatasetSource::new("casey", &config);
        let view = Session::new(Role::Coach, source.display_name())
            .load_from(&source)
            .unwrap()
            .view(today(), &Thresholds::default());
        assert!(view.status.starts_with("Casey Lee - 2 samples from 2024-07-01 to 2024-07-02"));
    }

    /// A fresh load replaces the previous record set wholesale
    #[test]
    fn test_reload_replaces_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,athlete_name,heart_rate").unwrap();
        writeln!(file, "2024-07-01 08:00:00,Casey,72").unwrap();

        let session = dataset_session("alex", Role::Coach)
            .with_window(Some(day(2)), Some(day(2)))
            .load_from(&FileSource::new(file.path()))
            .unwrap();

        assert_eq!(session.all_samples.len(), 1);
        assert_eq!(session.samples().len(), 1);
        let view = session.view(today(), &Thresholds::default());
        assert!(view.status.starts_with("Casey - 1 samples from 2024-07-01 to 2024-07-01"));
    }

    /// Comparing against one day inside the window
    #[test]
    fn test_comparison_against_last_day() {
        let view = dataset_session("jordan", Role::Coach)
            .with_comparison(Some(day(4)))
            .view(today(), &Thresholds::default());

        assert_eq!(view.comparison_label.as_deref(), Some("today"));
        let heart_rate = view.cards.iter().find(|c| c.key == "heart_rate").unwrap();
        assert_eq!(heart_rate.value, "74 bpm");

        let comparison = heart_rate.comparison.as_ref().unwrap();
        assert_eq!(comparison.comparison, "79 bpm");
        assert_eq!(comparison.delta, "+5");
        assert_eq!(comparison.label, "today");
    }

    /// Window → CSV export → parse reproduces the same samples
    #[test]
    fn test_export_samples_roundtrip() {
        let session = dataset_session("jordan", Role::Coach).with_window(Some(day(3)), None);
        let samples = session.samples();

        let temp_file = NamedTempFile::new().unwrap();
        export::csv::export_samples(&samples, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(parse_samples(&content).unwrap(), samples);
    }

    /// Full report renders in both formats
    #[test]
    fn test_report_formats() {
        let view = dataset_session("jordan", Role::Doctor).view(today(), &Thresholds::default());

        let mut text = Vec::new();
        export::render_view(&view, ExportFormat::Text, &mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("Jordan - 48 samples from 2024-06-01 to 2024-06-04"));
        assert!(text.contains("CLINICAL ALERTS"));

        let mut json = Vec::new();
        export::render_view(&view, ExportFormat::Json, &mut json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["summary"]["sample_count"], 48);
        assert_eq!(value["alerts"]["alerts"].as_array().unwrap().len(), 7);
    }

    /// Thresholds from the config drive the alert engine
    #[test]
    fn test_custom_thresholds() {
        let thresholds = Thresholds {
            alert_heart_rate: 120.0,
            ..Thresholds::default()
        };
        let view = dataset_session("jordan", Role::Doctor).view(today(), &thresholds);
        match view.alerts {
            AlertPanel::Alerts { alerts } => {
                assert_eq!(alerts.len(), 6);
                assert!(!alerts[0].message.contains("bpm"));
            }
            other => panic!("expected alerts, got {:?}", other),
        }
    }
}
