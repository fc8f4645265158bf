//! Sweep Runner
//!
//! Drives the external build tool through every planned combination and
//! records the stripped library size and benchmark runtime of each.
//!
//! ## Phases
//!
//! ```text
//! reset build dir ──► setup ──► ┌─────────────────────────────────────────────┐
//!                               │ configure ─► compile ─► benchmark ─► strip   │ × plan
//!                               └──────────────────────┬──────────────────────┘
//!                                                      ▼
//!                                            Vec<Measurement> (in order)
//! ```
//!
//! Every step is a blocking process call whose exit status is checked before
//! the next one starts. The first failure ends the sweep; nothing is skipped
//! and nothing is retried. Child stdout is sent to our stderr so that stdout
//! carries only the report.

use crate::config::{SweepConfig, ToolCommand};
use crate::planner::SweepPlan;
use flagsweep_core::{Combination, Measurement};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// External step of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One-time build directory setup
    Setup,
    /// Apply a combination's flags
    Configure,
    /// Build library and benchmark
    Compile,
    /// Timed benchmark run
    Benchmark,
    /// Strip the library in place
    Strip,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Setup => "setup",
            Step::Configure => "configure",
            Step::Compile => "compile",
            Step::Benchmark => "benchmark",
            Step::Strip => "strip",
        };
        f.write_str(name)
    }
}

/// Errors that end a sweep
#[derive(Debug, Error)]
pub enum SweepError {
    /// An external command exited non-zero or was killed
    #[error("{step} failed: {program} {}", describe_exit(.code))]
    CommandFailed {
        /// Failing step
        step: Step,
        /// Program that was run
        program: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
    },

    /// An external command could not be started
    #[error("{step} failed: could not start {program}: {source}")]
    Spawn {
        /// Failing step
        step: Step,
        /// Program that could not be started
        program: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The previous build directory could not be removed
    #[error("Failed to reset build directory {}: {source}", .path.display())]
    ResetBuildDir {
        /// Build directory
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The library artifact could not be inspected after stripping
    #[error("Failed to read artifact {}: {source}", .path.display())]
    Artifact {
        /// Library path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl SweepError {
    /// Process exit status to report for this error.
    ///
    /// A command that exited non-zero hands its own code through; anything
    /// else (signals, spawn and filesystem failures) maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            SweepError::CommandFailed {
                code: Some(code), ..
            } => *code,
            _ => 1,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Sweep state: resolved paths and tools plus the measurements collected so far
pub struct SweepRunner {
    source_dir: PathBuf,
    build_dir: PathBuf,
    build_type: String,
    build_tool: ToolCommand,
    compile_tool: Option<ToolCommand>,
    strip_tool: ToolCommand,
    library: PathBuf,
    benchmark: PathBuf,
    iterations: u64,
    show_progress: bool,
    measurements: Vec<Measurement>,
}

impl SweepRunner {
    /// Create a runner from configuration
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            source_dir: config.paths.source_dir.clone(),
            build_dir: config.paths.build_dir.clone(),
            build_type: config.tools.build_type.clone(),
            build_tool: config.tools.build.clone(),
            compile_tool: config.tools.compile.clone(),
            strip_tool: config.tools.strip.clone(),
            library: config.paths.library_path(),
            benchmark: config.paths.benchmark_path(),
            iterations: config.benchmark.iterations,
            show_progress: false,
            measurements: Vec::new(),
        }
    }

    /// Draw a progress bar on stderr while sweeping
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Measurements recorded so far, in plan order
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Consume the runner, returning its measurements
    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }

    /// Initialize, then build and measure every planned combination in order.
    pub fn run(&mut self, plan: &SweepPlan) -> Result<(), SweepError> {
        self.initialize()?;

        let pb = if self.show_progress {
            ProgressBar::new(plan.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        for combination in &plan.combinations {
            pb.set_message(combination.label.clone());
            if let Err(e) = self.build_and_measure(combination) {
                pb.abandon_with_message(format!("Failed at {}", combination.label));
                return Err(e);
            }
            pb.inc(1);
        }

        pb.finish_with_message("Complete");
        Ok(())
    }

    /// Remove the build directory and run the one-time setup into a fresh one
    pub fn initialize(&mut self) -> Result<(), SweepError> {
        self.reset_build_dir()?;

        info!(
            source = %self.source_dir.display(),
            build = %self.build_dir.display(),
            build_type = %self.build_type,
            "Setting up build directory"
        );

        let mut command = self.build_tool.command();
        command
            .arg("setup")
            .arg(format!("--buildtype={}", self.build_type))
            .arg(&self.source_dir)
            .arg(&self.build_dir);
        run_step(Step::Setup, command)
    }

    /// Reconfigure, compile, benchmark and measure one combination, then
    /// append the result.
    pub fn build_and_measure(&mut self, combination: &Combination) -> Result<(), SweepError> {
        info!(
            index = combination.index,
            label = %combination.label,
            "Building combination"
        );

        self.configure(&combination.args)?;
        self.compile()?;
        let elapsed_secs = self.measure_time()?;
        let size_bytes = self.library_size()?;

        debug!(
            label = %combination.label,
            size_bytes,
            elapsed_secs,
            "Measured combination"
        );
        self.measurements.push(Measurement::new(
            combination.label.clone(),
            size_bytes,
            elapsed_secs,
        ));
        Ok(())
    }

    fn reset_build_dir(&self) -> Result<(), SweepError> {
        match std::fs::remove_dir_all(&self.build_dir) {
            Ok(()) => {
                debug!(path = %self.build_dir.display(), "Removed previous build directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SweepError::ResetBuildDir {
                path: self.build_dir.clone(),
                source,
            }),
        }
    }

    fn configure(&self, args: &[String]) -> Result<(), SweepError> {
        let mut command = self.build_tool.command();
        command.arg("configure").arg(&self.build_dir).args(args);
        run_step(Step::Configure, command)
    }

    fn compile(&self) -> Result<(), SweepError> {
        let mut command = match &self.compile_tool {
            Some(tool) => tool.command(),
            None => {
                let mut command = self.build_tool.command();
                command.arg("compile");
                command
            }
        };
        command.arg("-C").arg(&self.build_dir);
        run_step(Step::Compile, command)
    }

    /// Wall-clock seconds of one benchmark run
    fn measure_time(&self) -> Result<f64, SweepError> {
        let mut command = Command::new(&self.benchmark);
        command.arg(self.iterations.to_string());
        prepare(Step::Benchmark, &mut command);

        let start = Instant::now();
        let status = wait(Step::Benchmark, &mut command)?;
        let elapsed = start.elapsed();

        check_status(Step::Benchmark, &command, status)?;
        Ok(elapsed.as_secs_f64())
    }

    /// Strip the library in place, then read its size
    fn library_size(&self) -> Result<u64, SweepError> {
        let mut command = self.strip_tool.command();
        command.arg(&self.library);
        run_step(Step::Strip, command)?;

        std::fs::metadata(&self.library)
            .map(|meta| meta.len())
            .map_err(|source| SweepError::Artifact {
                path: self.library.clone(),
                source,
            })
    }
}

fn run_step(step: Step, mut command: Command) -> Result<(), SweepError> {
    prepare(step, &mut command);
    let status = wait(step, &mut command)?;
    check_status(step, &command, status)
}

/// Child stdout goes to our stderr; stdout is reserved for the report.
fn prepare(step: Step, command: &mut Command) {
    debug!(%step, ?command, "Running");
    command.stdout(Stdio::from(io::stderr()));
}

fn wait(step: Step, command: &mut Command) -> Result<ExitStatus, SweepError> {
    command.status().map_err(|source| SweepError::Spawn {
        step,
        program: program_name(command),
        source,
    })
}

fn check_status(step: Step, command: &Command, status: ExitStatus) -> Result<(), SweepError> {
    if status.success() {
        Ok(())
    } else {
        Err(SweepError::CommandFailed {
            step,
            program: program_name(command),
            code: status.code(),
        })
    }
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}
