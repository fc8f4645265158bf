//! System Metadata Collection
//!
//! Host and repository details recorded in the JSON report. CPU model and
//! memory come from /proc and are "Unknown" / 0 elsewhere.

use crate::config::SweepConfig;
use chrono::Utc;
use flagsweep_report::{ReportConfig, ReportMeta, SystemInfo};

/// Build report metadata including system info, git details and sweep settings
pub fn build_report_meta(config: &SweepConfig) -> ReportMeta {
    let system = SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu: cpu_model().unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: cpu_cores(),
        memory_gb: memory_gb().unwrap_or(0.0),
    };

    ReportMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        git_commit: git_output(&["rev-parse", "HEAD"]),
        git_branch: git_output(&["rev-parse", "--abbrev-ref", "HEAD"]),
        system,
        config: ReportConfig {
            build_type: config.tools.build_type.clone(),
            iterations: config.benchmark.iterations,
            axes: config.axes.names().map(str::to_string).collect(),
        },
    }
}

fn git_output(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .stderr(std::process::Stdio::null())
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Value of the first `key: value` line of a /proc file (Linux only)
fn proc_field(file: &str, key: &str) -> Option<String> {
    if !cfg!(target_os = "linux") {
        return None;
    }
    let content = std::fs::read_to_string(file).ok()?;
    content.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        (name.trim() == key).then(|| value.trim().to_string())
    })
}

fn cpu_model() -> Option<String> {
    proc_field("/proc/cpuinfo", "model name")
}

fn cpu_cores() -> u32 {
    std::thread::available_parallelism().map_or(1, |n| n.get() as u32)
}

/// `MemTotal` is reported in kB
fn memory_gb() -> Option<f64> {
    let total = proc_field("/proc/meminfo", "MemTotal")?;
    let kb: u64 = total.split_whitespace().next()?.parse().ok()?;
    Some(kb as f64 / (1024.0 * 1024.0))
}
