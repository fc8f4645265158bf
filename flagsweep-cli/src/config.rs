//! Configuration loading from sweep.toml
//!
//! A sweep can be described by a `sweep.toml` file in the project root. The
//! file is discovered by walking up from the current directory; every field
//! has a default, and the defaults reproduce the stock capypdf sweep.

use anyhow::Context;
use flagsweep_core::{Axes, FlagGroup};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// File name looked up by [`SweepConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "sweep.toml";

/// flagsweep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Source, build and artifact locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// External tools
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Benchmark invocation
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Flag groups swept, in order
    #[serde(default = "default_axes")]
    pub axes: Axes,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            tools: ToolsConfig::default(),
            benchmark: BenchmarkConfig::default(),
            output: OutputConfig::default(),
            axes: default_axes(),
        }
    }
}

/// Filesystem layout. `library` and `benchmark` are relative to `build_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Project source directory
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Build directory; deleted and recreated on every run
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    /// Shared library whose stripped size is measured
    #[serde(default = "default_library")]
    pub library: PathBuf,
    /// Benchmark executable
    #[serde(default = "default_benchmark")]
    pub benchmark: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            build_dir: default_build_dir(),
            library: default_library(),
            benchmark: default_benchmark(),
        }
    }
}

impl PathsConfig {
    /// Library artifact path as seen from the working directory
    pub fn library_path(&self) -> PathBuf {
        self.build_dir.join(&self.library)
    }

    /// Benchmark executable path as seen from the working directory
    pub fn benchmark_path(&self) -> PathBuf {
        self.build_dir.join(&self.benchmark)
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("capypdf")
}
fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}
fn default_library() -> PathBuf {
    PathBuf::from("src/libcapypdf.so.0.15.0")
}
fn default_benchmark() -> PathBuf {
    PathBuf::from("benchmark/loremipsum")
}

/// A tool given either as a program name or as a full argv prefix
/// (e.g. `["python3", "/opt/meson/meson.py"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolCommand {
    /// Program name or path
    Program(String),
    /// Program followed by leading arguments
    Argv(Vec<String>),
}

impl ToolCommand {
    /// Program to execute, `None` for an empty argv
    pub fn program(&self) -> Option<&str> {
        match self {
            ToolCommand::Program(program) => Some(program),
            ToolCommand::Argv(argv) => argv.first().map(String::as_str),
        }
    }

    /// Build a `Command` with the leading arguments already applied
    pub fn command(&self) -> Command {
        match self {
            ToolCommand::Program(program) => Command::new(program),
            ToolCommand::Argv(argv) => {
                let mut command = Command::new(argv.first().map_or("", String::as_str));
                command.args(argv.iter().skip(1));
                command
            }
        }
    }
}

impl From<&str> for ToolCommand {
    fn from(program: &str) -> Self {
        ToolCommand::Program(program.to_string())
    }
}

/// External tools invoked by the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Build tool providing `setup`, `configure` and `compile`
    #[serde(default = "default_build_tool")]
    pub build: ToolCommand,
    /// Dedicated compile tool run as `<tool> -C <build_dir>` (e.g. "ninja").
    /// When unset, `<build> compile -C <build_dir>` is used.
    #[serde(default)]
    pub compile: Option<ToolCommand>,
    /// Symbol stripper, rewrites the library in place
    #[serde(default = "default_strip_tool")]
    pub strip: ToolCommand,
    /// Build type for the one-time setup
    #[serde(default = "default_build_type")]
    pub build_type: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            build: default_build_tool(),
            compile: None,
            strip: default_strip_tool(),
            build_type: default_build_type(),
        }
    }
}

fn default_build_tool() -> ToolCommand {
    ToolCommand::from("meson")
}
fn default_strip_tool() -> ToolCommand {
    ToolCommand::from("strip")
}
fn default_build_type() -> String {
    "debugoptimized".to_string()
}

/// Benchmark invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Iteration count passed as the benchmark's only argument
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> u64 {
    100
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "plain", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Write the report here instead of stdout
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            path: None,
        }
    }
}

fn default_format() -> String {
    "plain".to_string()
}

/// Stock sweep: optimization level, LTO, RTTI, exceptions, NDEBUG.
pub fn default_axes() -> Axes {
    Axes::new(vec![
        FlagGroup::new("opt")
            .choice("O1", ["-Doptimization=1"])
            .choice("O2", ["-Doptimization=2"])
            .choice("O3", ["-Doptimization=3"])
            .choice("Os", ["-Doptimization=s"]),
        FlagGroup::new("lto")
            .choice("nolto", ["-Db_lto=false"])
            .choice("lto", ["-Db_lto=true"]),
        FlagGroup::new("rtti")
            .choice("nortti", ["-Dcpp_rtti=false"])
            .choice("rtti", ["-Dcpp_rtti=true"]),
        FlagGroup::new("exc")
            .choice("noexc", ["-Dcpp_eh=none"])
            .choice("exc", ["-Dcpp_eh=default"]),
        FlagGroup::new("ndbg")
            .choice("nondbg", ["-Db_ndebug=false"])
            .choice("ndbg", ["-Db_ndebug=true"]),
    ])
}

impl SweepConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Invalid {}", path.display()))?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory.
    ///
    /// `Ok(None)` when no file exists; a file that exists but fails to parse is an error.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path).map(Some);
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Reject configurations the runner cannot execute
    pub fn validate(&self) -> anyhow::Result<()> {
        self.axes.validate()?;

        let tools = [
            ("build", Some(&self.tools.build)),
            ("compile", self.tools.compile.as_ref()),
            ("strip", Some(&self.tools.strip)),
        ];
        for (name, tool) in tools {
            if tool.is_some_and(|t| t.program().is_none_or(str::is_empty)) {
                anyhow::bail!("Tool '{}' has an empty command", name);
            }
        }

        if self.paths.build_dir.as_os_str().is_empty() {
            anyhow::bail!("paths.build_dir must not be empty");
        }

        // The build directory is removed on every run: it must not hold the
        // sources or the directory we run from.
        let build_dir = lexical_absolute(&self.paths.build_dir)?;
        let source_dir = lexical_absolute(&self.paths.source_dir)?;
        if source_dir.starts_with(&build_dir) {
            anyhow::bail!(
                "paths.build_dir {} would delete paths.source_dir {}",
                self.paths.build_dir.display(),
                self.paths.source_dir.display()
            );
        }
        let current_dir = lexical_absolute(Path::new("."))?;
        if current_dir.starts_with(&build_dir) {
            anyhow::bail!(
                "paths.build_dir {} would delete the current directory",
                self.paths.build_dir.display()
            );
        }

        Ok(())
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# flagsweep configuration

[paths]
# Project source directory
source_dir = "capypdf"
# Build directory (deleted and recreated on every run)
build_dir = "build"
# Library artifact, relative to build_dir; stripped then measured
library = "src/libcapypdf.so.0.15.0"
# Benchmark executable, relative to build_dir
benchmark = "benchmark/loremipsum"

[tools]
# Build tool: a program name or an argv list, e.g. ["python3", "meson.py"]
build = "meson"
# Dedicated compile tool, run as `<tool> -C <build_dir>` (uncomment to enable)
# compile = "ninja"
strip = "strip"
build_type = "debugoptimized"

[benchmark]
# Passed to the benchmark as its only argument
iterations = 100

[output]
# Output format: plain, json, csv
format = "plain"
# Write the report to a file instead of stdout (uncomment to enable)
# path = "sweep-results.txt"

# Flag groups, swept in declaration order (first = outermost)
[[axes]]
name = "opt"
choices = [
    { label = "O1", args = ["-Doptimization=1"] },
    { label = "O2", args = ["-Doptimization=2"] },
    { label = "O3", args = ["-Doptimization=3"] },
    { label = "Os", args = ["-Doptimization=s"] },
]

[[axes]]
name = "lto"
choices = [
    { label = "nolto", args = ["-Db_lto=false"] },
    { label = "lto", args = ["-Db_lto=true"] },
]

[[axes]]
name = "rtti"
choices = [
    { label = "nortti", args = ["-Dcpp_rtti=false"] },
    { label = "rtti", args = ["-Dcpp_rtti=true"] },
]

[[axes]]
name = "exc"
choices = [
    { label = "noexc", args = ["-Dcpp_eh=none"] },
    { label = "exc", args = ["-Dcpp_eh=default"] },
]

[[axes]]
name = "ndbg"
choices = [
    { label = "nondbg", args = ["-Db_ndebug=false"] },
    { label = "ndbg", args = ["-Db_ndebug=true"] },
]
"#
        .to_string()
    }
}

/// Absolute form of `path` with `.` and `..` folded away, without touching
/// the filesystem
fn lexical_absolute(path: &Path) -> anyhow::Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
