use serde::{Deserialize, Serialize};

/// Placeholder shown for a metric with no value
pub const PLACEHOLDER: &str = "-";

/// Current-window value displayed next to a comparison-date value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Current window value, rounded, with unit
    pub baseline: String,

    /// Comparison date value, rounded, with unit
    pub comparison: String,

    /// Signed difference `comparison - baseline`
    pub delta: String,

    /// Human label of the comparison date
    pub label: String,
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} {} ({})",
            self.baseline, self.comparison, self.label, self.delta
        )
    }
}

/// Round half away from zero to `precision` decimals
pub fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid rendering "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Render a number with fixed precision and an optional unit
pub fn format_value(value: f64, unit: &str, precision: usize) -> String {
    let rounded = round_to(value, precision);
    if unit.is_empty() {
        format!("{:.*}", precision, rounded)
    } else {
        format!("{:.*} {}", precision, rounded, unit)
    }
}

/// Render an optional number, using the placeholder when absent
pub fn format_optional(value: Option<f64>, unit: &str, precision: usize) -> String {
    value
        .map(|v| format_value(v, unit, precision))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Signed delta with an explicit "+" for non-negative values
pub fn format_delta(delta: f64, precision: usize) -> String {
    let rounded = round_to(delta, precision);
    if rounded >= 0.0 {
        format!("+{:.*}", precision, rounded)
    } else {
        format!("{:.*}", precision, rounded)
    }
}

/// Build the three-part comparison display for one metric
///
/// Returns `None` when the baseline, the comparison value or the label is
/// absent; callers render the plain value instead.
pub fn format_comparison(
    baseline: Option<f64>,
    comparison: Option<f64>,
    unit: &str,
    precision: usize,
    label: Option<&str>,
) -> Option<Comparison> {
    let (baseline, comparison, label) = (baseline?, comparison?, label?);

    Some(Comparison {
        baseline: format_value(baseline, unit, precision),
        comparison: format_value(comparison, unit, precision),
        delta: format_delta(comparison - baseline, precision),
        label: label.to_string(),
    })
}
