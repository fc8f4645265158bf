#![warn(missing_docs)]
//! # flagsweep
//!
//! Rebuild a project across a matrix of compiler flags and record, for every
//! combination, the stripped library size and the benchmark's wall-clock
//! runtime.
//!
//! - **Flag groups**: each axis (optimization level, LTO, RTTI, ...) is a small
//!   ordered set of labeled, mutually exclusive build arguments
//! - **Cartesian sweep**: every combination is configured, compiled, run and
//!   measured in a fixed, repeatable order
//! - **Fail fast**: the first failing external command stops the sweep and its
//!   exit code becomes the process exit code
//! - **Reports**: `label size seconds` lines, JSON or CSV
//!
//! ## Quick Start
//!
//! ```ignore
//! use flagsweep::prelude::*;
//!
//! let config = SweepConfig::default();
//! let plan = build_plan(&config.axes, None);
//! let mut runner = SweepRunner::new(&config);
//! runner.run(&plan)?;
//! for m in runner.measurements() {
//!     println!("{m}");
//! }
//! ```

// Re-export core types
pub use flagsweep_core::{
    Axes, AxesError, Combination, Combinations, FlagChoice, FlagGroup, LABEL_SEPARATOR,
    Measurement,
};

// Re-export report types
pub use flagsweep_report::{
    OutputFormat, Report, ReportConfig, ReportMeta, ReportSummary, SystemInfo,
    generate_csv_report, generate_json_report, generate_plain_report,
};

// Re-export runner and configuration
pub use flagsweep_cli::{
    Cli, Commands, Step, SweepConfig, SweepError, SweepPlan, SweepRunner, ToolCommand,
    build_plan, default_axes, exit_code, run, run_with_cli,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Axes, FlagGroup, Measurement, SweepConfig, SweepError, SweepRunner, build_plan,
    };
}
