//! Integration tests for flagsweep
//!
//! These run the `flagsweep` binary end to end against shell-script stand-ins
//! for the build tool, the strip tool and the benchmark. The stand-ins append
//! every invocation to `calls.log` so the tests can check the exact sequence
//! of external commands.

#![cfg(unix)]

use flagsweep::{Report, SweepConfig, SweepRunner, build_plan};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in project: two axes (opt x lto), four combinations
struct Fixture {
    dir: TempDir,
}

#[derive(Default)]
struct Failures {
    /// Fail the n-th compile (1-based) with exit code 7
    compile_at: Option<u32>,
    /// Exit code returned by every benchmark run
    bench_exit: Option<u32>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_failures(Failures::default())
    }

    fn with_failures(failures: Failures) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let log = root.join("calls.log");

        let meson = format!(
            r#"echo "$*" >> "{log}"
echo "meson $1"
case "$1" in
  setup) mkdir -p "$4" ;;
  configure) b="$2"; shift 2; printf '%s' "$*" > "$b/flags" ;;
  compile)
    n=$(cat "$3/count" 2>/dev/null || echo 0)
    n=$((n + 1))
    echo "$n" > "$3/count"
    [ "$n" -ne {compile_at} ] || exit 7
    mkdir -p "$3/src" "$3/benchmark"
    cp "$3/flags" "$3/src/libdemo.so"
    printf '#!/bin/sh\necho "bench $1" >> "{log}"\nexit {bench_exit}\n' > "$3/benchmark/demo"
    chmod +x "$3/benchmark/demo"
    ;;
esac
"#,
            log = log.display(),
            compile_at = failures.compile_at.unwrap_or(0),
            bench_exit = failures.bench_exit.unwrap_or(0),
        );
        std::fs::write(root.join("meson.sh"), meson).unwrap();

        let strip = format!(
            r#"echo "strip $1" >> "{log}"
test -f "$1"
"#,
            log = log.display()
        );
        std::fs::write(root.join("strip.sh"), strip).unwrap();

        let config = format!(
            r#"
[paths]
source_dir = "src-tree"
build_dir = "build"
library = "src/libdemo.so"
benchmark = "benchmark/demo"

[tools]
build = ["sh", '{meson}']
strip = ["sh", '{strip}']
build_type = "release"

[benchmark]
iterations = 7

[[axes]]
name = "opt"
choices = [
    {{ label = "O1", args = ["-Doptimization=1"] }},
    {{ label = "O2", args = ["-Doptimization=2"] }},
]

[[axes]]
name = "lto"
choices = [
    {{ label = "nolto", args = ["-Db_lto=false"] }},
    {{ label = "lto", args = ["-Db_lto=true"] }},
]
"#,
            meson = root.join("meson.sh").display(),
            strip = root.join("strip.sh").display(),
        );
        std::fs::write(root.join("sweep.toml"), config).unwrap();

        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.root().join("sweep.toml")
    }

    fn run(&self, extra_args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_flagsweep"))
            .current_dir(self.root())
            .arg("--config")
            .arg(self.config_path())
            .arg("--no-progress")
            .args(extra_args)
            .output()
            .unwrap()
    }

    fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.root().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Test that a full sweep prints one `label size seconds` line per combination
#[test]
fn test_full_sweep_reports_every_combination_in_order() {
    let fixture = Fixture::new();
    let output = fixture.run(&[]);
    assert!(output.status.success(), "{:?}", output);

    let line_re = Regex::new(r"^(\S+) (\d+) (\d+(\.\d+)?)$").unwrap();
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 4);

    let expected = [
        ("O1-nolto", "-Doptimization=1 -Db_lto=false"),
        ("O1-lto", "-Doptimization=1 -Db_lto=true"),
        ("O2-nolto", "-Doptimization=2 -Db_lto=false"),
        ("O2-lto", "-Doptimization=2 -Db_lto=true"),
    ];
    for (line, (label, args)) in lines.iter().zip(expected) {
        let caps = line_re.captures(line).unwrap();
        assert_eq!(&caps[1], label);
        // The stand-in library holds the configure arguments verbatim
        assert_eq!(caps[2].parse::<usize>().unwrap(), args.len());
        assert!(caps[3].parse::<f64>().unwrap() >= 0.0);
    }
}

/// Test the exact order of external commands
#[test]
fn test_command_sequence() {
    let fixture = Fixture::new();
    let output = fixture.run(&[]);
    assert!(output.status.success());

    let calls = fixture.calls();
    assert_eq!(calls.len(), 1 + 4 * 4);
    assert_eq!(calls[0], "setup --buildtype=release src-tree build");
    assert_eq!(
        &calls[1..5],
        [
            "configure build -Doptimization=1 -Db_lto=false",
            "compile -C build",
            "bench 7",
            "strip build/src/libdemo.so",
        ]
    );
    assert_eq!(calls[13], "configure build -Doptimization=2 -Db_lto=true");
}

/// Test that tool chatter never reaches stdout
#[test]
fn test_tool_output_goes_to_stderr() {
    let fixture = Fixture::new();
    let output = fixture.run(&[]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains("meson "));
    assert!(stderr.contains("meson setup"));
}

/// Test that a stale build directory is wiped before setup
#[test]
fn test_previous_build_dir_is_removed() {
    let fixture = Fixture::new();
    let stale = fixture.root().join("build/stale");
    std::fs::create_dir_all(&stale).unwrap();

    let output = fixture.run(&[]);
    assert!(output.status.success());
    assert!(!stale.exists());
}

/// Test that a failing compile aborts with its exit code and prints nothing
#[test]
fn test_compile_failure_aborts_with_its_exit_code() {
    let fixture = Fixture::with_failures(Failures {
        compile_at: Some(3),
        ..Failures::default()
    });
    let output = fixture.run(&[]);

    assert_eq!(output.status.code(), Some(7));
    assert!(output.stdout.is_empty());

    let calls = fixture.calls();
    let configures = calls.iter().filter(|c| c.starts_with("configure")).count();
    let benches = calls.iter().filter(|c| c.starts_with("bench")).count();
    assert_eq!(configures, 3);
    assert_eq!(benches, 2);
    assert_eq!(calls.last().map(String::as_str), Some("compile -C build"));
}

/// Test that a failing benchmark records nothing and skips the strip step
#[test]
fn test_benchmark_failure_aborts_before_strip() {
    let fixture = Fixture::with_failures(Failures {
        bench_exit: Some(5),
        ..Failures::default()
    });
    let output = fixture.run(&[]);

    assert_eq!(output.status.code(), Some(5));
    assert!(output.stdout.is_empty());
    assert!(!fixture.calls().iter().any(|c| c.starts_with("strip")));
}

/// Test that dry run lists the plan without touching the filesystem
#[test]
fn test_dry_run_lists_plan_only() {
    let fixture = Fixture::new();
    let output = fixture.run(&["--dry-run"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4 of 4 combinations"));
    assert!(stdout.contains("O2-lto"));
    assert!(stdout.contains("-Doptimization=2 -Db_lto=true"));
    assert!(fixture.calls().is_empty());
    assert!(!fixture.root().join("build").exists());
}

/// Test that a filter narrows the sweep without reordering it
#[test]
fn test_filter_restricts_sweep() {
    let fixture = Fixture::new();
    let output = fixture.run(&["--filter=-lto$"]);
    assert!(output.status.success());

    let labels: Vec<_> = stdout_lines(&output)
        .iter()
        .map(|l| l.split(' ').next().unwrap().to_string())
        .collect();
    assert_eq!(labels, ["O1-lto", "O2-lto"]);
}

/// Test JSON output written to a file
#[test]
fn test_json_report_to_file() {
    let fixture = Fixture::new();
    let path = fixture.root().join("report.json");
    let output = fixture.run(&["--format", "json", "--output", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let report: Report = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report.summary.combinations, 4);
    assert_eq!(report.meta.config.iterations, 7);
    assert_eq!(report.meta.config.build_type, "release");
    assert_eq!(report.meta.config.axes, ["opt", "lto"]);
    assert_eq!(report.measurements[0].label, "O1-nolto");
}

/// Test that two runs produce the same labels
#[test]
fn test_repeated_runs_produce_same_labels() {
    let fixture = Fixture::new();
    let labels = |output: &Output| -> Vec<String> {
        stdout_lines(output)
            .iter()
            .map(|l| l.split(' ').next().unwrap().to_string())
            .collect()
    };

    let first = fixture.run(&[]);
    let second = fixture.run(&[]);
    assert!(first.status.success() && second.status.success());
    assert_eq!(labels(&first), labels(&second));
}

/// Test the library API against the same stand-in project
#[test]
fn test_runner_api() {
    let fixture = Fixture::new();
    let mut config = SweepConfig::load(fixture.config_path()).unwrap();
    config.paths.source_dir = fixture.root().join("src-tree");
    config.paths.build_dir = fixture.root().join("build");

    let plan = build_plan(&config.axes, None);
    let mut runner = SweepRunner::new(&config);
    runner.run(&plan).unwrap();

    let measurements = runner.into_measurements();
    assert_eq!(measurements.len(), plan.len());
    for (measurement, combination) in measurements.iter().zip(&plan.combinations) {
        assert_eq!(measurement.label, combination.label);
        assert_eq!(
            measurement.size_bytes,
            combination.args.join(" ").len() as u64
        );
    }
}

/// Test that `init` prints a config that loads back to the built-in sweep
#[test]
fn test_init_prints_default_config() {
    let output = Command::new(env!("CARGO_BIN_EXE_flagsweep"))
        .arg("init")
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: SweepConfig = toml::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(config.axes, flagsweep::default_axes());
}
