use super::ExportError;
use crate::comparison::PLACEHOLDER;
use crate::dashboard::{AlertPanel, DashboardView, MetricCard};
use crate::models::{Alert, Severity};
use colored::*;
use std::io::Write;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "Metric")]
    title: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Compared")]
    compared: String,
    #[tabled(rename = "Change")]
    delta: String,
}

impl From<&MetricCard> for CardRow {
    fn from(card: &MetricCard) -> Self {
        let (compared, delta) = match &card.comparison {
            Some(c) => (format!("{} ({})", c.comparison, c.label), c.delta.clone()),
            None => (String::new(), String::new()),
        };
        CardRow {
            title: card.title.clone(),
            value: card.value.clone(),
            compared,
            delta,
        }
    }
}

fn severity_tag(severity: Severity) -> ColoredString {
    let tag = format!("[{}]", severity.to_string().to_uppercase());
    match severity {
        Severity::High => tag.red().bold(),
        Severity::Medium => tag.yellow().bold(),
        Severity::Low => tag.cyan(),
    }
}

fn write_alert<W: Write>(writer: &mut W, alert: &Alert) -> Result<(), ExportError> {
    writeln!(writer, "  {} {}", severity_tag(alert.severity), alert.message)?;
    Ok(())
}

/// Render the dashboard as a terminal report
pub fn write_report<W: Write>(view: &DashboardView, writer: &mut W) -> Result<(), ExportError> {
    // Header
    writeln!(writer, "{}", "ATHLETE DASHBOARD".bold())?;
    writeln!(writer, "{}", view.status)?;
    writeln!(
        writer,
        "Role: {} ({})",
        view.role.to_string().cyan().bold(),
        view.role_description
    )?;
    writeln!(writer)?;

    if view.summary.is_none() {
        return Ok(());
    }

    // Summary cards
    writeln!(writer, "{}", "SUMMARY".bold())?;
    if let Some(label) = &view.comparison_label {
        writeln!(writer, "Compared with {}", label)?;
    }
    let rows: Vec<CardRow> = view.cards.iter().map(CardRow::from).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    writeln!(writer, "{}", table)?;
    writeln!(writer)?;

    // Role notes
    writeln!(writer, "{}", "NOTES".bold())?;
    for (topic, note) in view.notes.entries() {
        let note = if note.is_empty() { PLACEHOLDER } else { note };
        writeln!(writer, "  {:<15} {}", format!("{}:", topic), note)?;
    }
    writeln!(writer)?;

    // Sleep distribution, as plain counts when no chart is drawn
    let stages: Vec<String> = view
        .charts
        .sleep_distribution
        .iter()
        .map(|slice| format!("{} {}", slice.stage, slice.count))
        .collect();
    writeln!(writer, "Sleep stages: {}", stages.join(", "))?;
    writeln!(writer)?;

    match &view.alerts {
        AlertPanel::Hidden => {}
        AlertPanel::Clear { message } => {
            writeln!(writer, "{}", "CLINICAL ALERTS".bold())?;
            writeln!(writer, "  {}", message.green())?;
        }
        AlertPanel::Alerts { alerts } => {
            writeln!(writer, "{}", "CLINICAL ALERTS".bold())?;
            for alert in alerts {
                write_alert(writer, alert)?;
            }
        }
    }

    Ok(())
}

/// Render a bare alert list, one line each, or the no-alerts message
pub fn write_alerts<W: Write>(alerts: &[Alert], writer: &mut W) -> Result<(), ExportError> {
    if alerts.is_empty() {
        writeln!(writer, "{}", crate::alerts::NO_ALERTS_MESSAGE.green())?;
        return Ok(());
    }
    for alert in alerts {
        write_alert(writer, alert)?;
    }
    Ok(())
}
