#![warn(missing_docs)]
//! flagsweep Report - Sweep Reporting
//!
//! Renders the measurement list collected by a sweep:
//! - Plain (one `label size seconds` line per combination)
//! - JSON (full report with metadata)
//! - CSV (spreadsheet-compatible)

mod csv;
mod json;
mod plain;
mod report;

pub use csv::generate_csv_report;
pub use json::generate_json_report;
pub use plain::generate_plain_report;
pub use report::{Report, ReportConfig, ReportMeta, ReportSummary, SystemInfo};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Space-separated lines, one per measurement
    #[default]
    Plain,
    /// JSON with metadata and summary
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "lines" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("plain".parse(), Ok(OutputFormat::Plain));
        assert_eq!("JSON".parse(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse(), Ok(OutputFormat::Csv));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
