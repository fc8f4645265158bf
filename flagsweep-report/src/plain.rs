//! Plain Output
//!
//! One line per measurement: `label size seconds`. No header, no sorting.

use crate::report::Report;

/// Render measurements as space-separated lines in insertion order
pub fn generate_plain_report(report: &Report) -> String {
    let mut output = String::new();
    for measurement in &report.measurements {
        output.push_str(&measurement.to_string());
        output.push('\n');
    }
    output
}
