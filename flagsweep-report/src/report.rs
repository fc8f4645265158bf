//! Report Data Structures

use chrono::{DateTime, Utc};
use flagsweep_core::Measurement;
use serde::{Deserialize, Serialize};

/// Complete sweep report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// Measurements in enumeration order
    pub measurements: Vec<Measurement>,
    /// Totals for the run
    pub summary: ReportSummary,
}

impl Report {
    /// Assemble a report; the summary is derived from the measurements.
    pub fn new(
        meta: ReportMeta,
        measurements: Vec<Measurement>,
        total_duration_secs: f64,
    ) -> Self {
        let summary = ReportSummary {
            combinations: measurements.len(),
            total_duration_secs,
        };
        Self {
            meta,
            measurements,
            summary,
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// flagsweep version
    pub version: String,
    /// UTC time the report was generated
    pub timestamp: DateTime<Utc>,
    /// Commit of the working directory, when it is a git checkout
    pub git_commit: Option<String>,
    /// Branch of the working directory, when it is a git checkout
    pub git_branch: Option<String>,
    /// Host description
    pub system: SystemInfo,
    /// Sweep settings
    pub config: ReportConfig,
}

/// Sweep settings captured in report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Build type passed to the one-time setup
    pub build_type: String,
    /// Iteration count handed to the benchmark
    pub iterations: u64,
    /// Axis names in sweep order
    pub axes: Vec<String>,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// CPU model name
    pub cpu: String,
    /// Available cores
    pub cpu_cores: u32,
    /// Total memory
    pub memory_gb: f64,
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of measured combinations
    pub combinations: usize,
    /// Wall-clock duration of the whole sweep
    pub total_duration_secs: f64,
}
