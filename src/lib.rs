// Library interface for the vitalrs modules
// The binary and the integration tests both build on it

pub mod alerts;
pub mod charts;
pub mod comparison;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod models;
pub mod notes;
pub mod summary;
pub mod window;

// Re-export commonly used types for convenience
pub use alerts::clinical_alerts;
pub use comparison::{format_comparison, Comparison};
pub use config::{AppConfig, Thresholds};
pub use dashboard::{AlertPanel, DashboardView, MetricCard, Session};
pub use error::{LoadError, ParseError, Result, VitalRsError};
pub use import::{DatasetSource, FileSource, SampleSource};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use notes::{role_notes, RoleNotes};
pub use summary::{summarize, Summary};
pub use window::DateRange;
