//! CSV Output

use crate::report::Report;

/// Generate a CSV table with one row per measurement
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::from("label,size_bytes,elapsed_secs\n");
    for m in &report.measurements {
        output.push_str(&format!(
            "{},{},{:?}\n",
            escape_field(&m.label),
            m.size_bytes,
            m.elapsed_secs
        ));
    }
    output
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
