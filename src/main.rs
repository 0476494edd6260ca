use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use vitalrs::alerts::clinical_alerts;
use vitalrs::config::AppConfig;
use vitalrs::dashboard::Session;
use vitalrs::error::{ErrorSeverity, VitalRsError};
use vitalrs::export::{self, ExportFormat};
use vitalrs::import::{DatasetSource, FileSource, SampleSource};
use vitalrs::logging::{init_logging, LogFormat, LogLevel};
use vitalrs::models::Role;

/// VitalRS - Athlete Biometrics Dashboard CLI
///
/// Summarizes wearable biometric samples over a date window and derives
/// role-tailored guidance and clinical alerts.
#[derive(Parser)]
#[command(name = "vitalrs")]
#[command(author = "VitalRS Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Athlete Biometrics Dashboard CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// Also write JSON logs to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the samples come from
#[derive(Args, Debug)]
struct SourceArgs {
    /// CSV file to load
    #[arg(short, long, conflicts_with = "athlete")]
    file: Option<PathBuf>,

    /// Configured sample dataset (e.g. alex, jordan)
    #[arg(short, long)]
    athlete: Option<String>,
}

/// Date window selection
#[derive(Args, Debug)]
struct WindowArgs {
    /// Window start (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Window end (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard for one athlete
    Report {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Viewer role (coach, trainer, doctor, athlete)
        #[arg(short, long)]
        role: Option<Role>,

        /// Compare the window against a single day (YYYY-MM-DD)
        #[arg(long)]
        compare: Option<NaiveDate>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: ExportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render PNG charts into this directory
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        charts: Option<Option<PathBuf>>,
    },

    /// List clinical alerts for the window
    Alerts {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// List the configured sample datasets
    Datasets,

    /// Write the parsed samples of the window back out as CSV
    ExportSamples {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show or initialize the configuration file
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match cli.command {
        Commands::Config { init: true, .. } => AppConfig::with_sample_datasets(),
        _ => AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?,
    };

    let mut log_config = config.logging.clone();
    if let Some(level) = LogLevel::from_verbosity(cli.verbose) {
        log_config.level = level;
    }
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    if cli.log_file.is_some() {
        log_config.file_path = cli.log_file.clone();
    }
    init_logging(&log_config).context("Failed to initialize logging")?;

    if cli.verbose > 0 {
        eprintln!("{}", format!("Log level: {:?}", log_config.level).dimmed());
    }

    match run(&cli, &config) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<VitalRsError>() {
            Some(err) => {
                match err.severity() {
                    ErrorSeverity::Error => tracing::error!(error = %err, "Command failed"),
                    ErrorSeverity::Warning => tracing::warn!(error = %err, "Command failed"),
                }
                eprintln!("{} {}", "Error:".red().bold(), err.user_message());
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    match &cli.command {
        Commands::Report {
            source,
            window,
            role,
            compare,
            format,
            output,
            charts,
        } => {
            let role = role.unwrap_or(config.settings.default_role);
            let session = load_session(config, source, window, role)?.with_comparison(*compare);
            let today = chrono::Local::now().date_naive();
            let view = session.view(today, &config.thresholds);

            match output {
                Some(path) => {
                    export::export_view(&view, *format, path)?;
                    println!("{} {}", "Report written to".green().bold(), path.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    export::render_view(&view, *format, &mut stdout.lock())?;
                }
            }

            if let Some(dir) = charts {
                let dir = dir.clone().unwrap_or_else(|| config.settings.chart_dir.clone());
                write_charts(&view, &dir)?;
            }
        }

        Commands::Alerts { source, window } => {
            let session = load_session(config, source, window, Role::Doctor)?;
            let alerts = clinical_alerts(&session.samples(), &config.thresholds);

            println!("{}", "Clinical alerts".red().bold());
            let stdout = std::io::stdout();
            export::text::write_alerts(&alerts, &mut stdout.lock())?;
        }

        Commands::Datasets => {
            println!("{}", "Sample datasets".cyan().bold());
            if config.datasets.is_empty() {
                println!("  (none configured)");
            }
            for (key, dataset) in &config.datasets {
                let path = config.resolve_path(&dataset.path);
                let marker = if path.exists() { "".normal() } else { " (missing)".red() };
                println!("  {:<10} {:<12} {}{}", key, dataset.name, path.display(), marker);
            }
        }

        Commands::ExportSamples {
            source,
            window,
            output,
        } => {
            let session = load_session(config, source, window, config.settings.default_role)?;
            let samples = session.samples();
            export::csv::export_samples(&samples, output)?;
            println!(
                "{} {} samples to {}",
                "Exported".green().bold(),
                samples.len(),
                output.display()
            );
        }

        Commands::Config { show, init } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            if *init {
                AppConfig::with_sample_datasets().save_to_file(&path)?;
                println!("{} {}", "Configuration written to".green().bold(), path.display());
            }

            if *show || !*init {
                let rendered = toml::to_string_pretty(config)
                    .context("Failed to serialize configuration")?;
                println!("{}", format!("# {}", path.display()).dimmed());
                println!("{}", rendered);
            }
        }
    }

    Ok(())
}

fn load_session(
    config: &AppConfig,
    source: &SourceArgs,
    window: &WindowArgs,
    role: Role,
) -> Result<Session> {
    let (athlete, sample_source) = match (&source.file, &source.athlete) {
        (Some(path), _) => {
            let file: Box<dyn SampleSource> = Box::new(FileSource::new(path));
            (athlete_key_for(path), file)
        }
        (None, athlete) => {
            let key = athlete
                .clone()
                .unwrap_or_else(|| config.settings.default_athlete.clone());
            let dataset = DatasetSource::new(&key, config);
            let athlete = dataset.display_name().to_string();
            let dataset: Box<dyn SampleSource> = Box::new(dataset);
            (athlete, dataset)
        }
    };

    let session = Session::new(role, athlete).load_from(sample_source.as_ref())?;

    let session = if window.from.is_some() || window.to.is_some() {
        let span = session.window;
        session.with_window(window.from.or(span.from), window.to.or(span.to))
    } else {
        session
    };

    Ok(session)
}

fn athlete_key_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.trim_start_matches("athlete_").to_string())
        .unwrap_or_default()
}

#[cfg(feature = "charts")]
fn write_charts(view: &vitalrs::dashboard::DashboardView, dir: &Path) -> Result<()> {
    let paths = vitalrs::charts::render_charts(&view.charts, dir)?;
    for path in paths {
        println!("{} {}", "Chart written to".green().bold(), path.display());
    }
    Ok(())
}

#[cfg(not(feature = "charts"))]
fn write_charts(_view: &vitalrs::dashboard::DashboardView, dir: &Path) -> Result<()> {
    tracing::warn!(dir = %dir.display(), "Chart rendering requested without the charts feature");
    eprintln!(
        "{}",
        "Charts are not available: rebuild with `--features charts`.".yellow()
    );
    Ok(())
}
