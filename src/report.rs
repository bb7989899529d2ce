//! Result formatting for terminal display
//!
//! Renders a fitted model as a fixed-format summary block plus a row-aligned
//! residual table. Rows keep the input sample order, matching the alignment
//! guarantee of [`FitResult`].

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::model::FitResult;

/// A depletion target power derived from a fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepletionTarget {
    /// Fraction of W' to expend
    pub fraction: f64,
    /// Effort duration in seconds
    pub duration_s: f64,
    /// Required constant power in watts
    pub power_w: f64,
}

#[derive(Tabled)]
struct ResidualRow {
    #[tabled(rename = "Duration (s)")]
    duration: String,
    #[tabled(rename = "Mean Power (W)")]
    power: String,
    #[tabled(rename = "Residual (W)")]
    residual: String,
}

/// Render the fixed-format summary block
///
/// CP to 1 decimal, W' in kJ to 2 decimals, R² to 3 decimals (or "n/a" when
/// undefined), and one line per depletion target to 1 decimal.
pub fn summary(result: &FitResult, targets: &[DepletionTarget]) -> String {
    let r2_text = match result.r2 {
        Some(r2) => format!("{:.3}", r2),
        None => "n/a".to_string(),
    };

    let mut lines = vec![
        format!("CP:      {:.1} W", result.cp_w),
        format!("W':      {:.2} kJ", result.wprime_kj()),
        format!("Fit R²:  {}", r2_text),
    ];

    for target in targets {
        lines.push(format!(
            "Power for {:.0}% W' in {:.0} s: {:.1} W",
            target.fraction * 100.0,
            target.duration_s,
            target.power_w,
        ));
    }

    lines.join("\n")
}

/// Render the (duration, power, residual) table, rows in input order
pub fn residual_table(result: &FitResult) -> String {
    let rows: Vec<ResidualRow> = result
        .durations_s
        .iter()
        .zip(result.powers_w.iter())
        .zip(result.residuals_w.iter())
        .map(|((&duration, &power), &residual)| ResidualRow {
            duration: format!("{:.0}", duration),
            power: format!("{:.1}", power),
            residual: format!("{:+.2}", residual),
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}
