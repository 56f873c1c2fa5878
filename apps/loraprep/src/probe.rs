//! # Host Probe
//!
//! The real [`SystemChecker`]: inspects the local machine for what the MLX
//! trainer needs. Every check runs, even after an earlier one fails, so the
//! report always lists all eight outcomes.
//!
//! Checks shell out to `sysctl`, `sw_vers` and the configured Python. A
//! missing tool is a failed check, never an error.

use crate::config::ProbeConfig;
use loraprep_core::{CheckOutcome, SystemChecker, SystemReport};
use std::net::{TcpStream, ToSocketAddrs};
use std::process::Command;
use std::time::Duration;

/// Oldest supported Python.
const MIN_PYTHON: (u32, u32) = (3, 9);

/// Oldest supported macOS major version.
const MIN_MACOS_MAJOR: u32 = 13;

// =============================================================================
// HOST PROBE
// =============================================================================

/// System checker backed by the local host.
#[derive(Debug, Clone)]
pub struct HostProbe {
    config: ProbeConfig,
}

impl HostProbe {
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    fn check_apple_silicon(&self) -> CheckOutcome {
        const NAME: &str = "Apple Silicon Chip";
        match run_capture("sysctl", &["-n", "machdep.cpu.brand_string"]) {
            Some(brand) if brand.contains("Apple") => CheckOutcome::pass(NAME, brand),
            Some(brand) => CheckOutcome::fail(NAME, brand),
            None => CheckOutcome::fail(NAME, "CPU brand unavailable"),
        }
    }

    fn check_architecture(&self) -> CheckOutcome {
        const NAME: &str = "ARM64 Architecture";
        let arch = std::env::consts::ARCH;
        if arch == "aarch64" {
            CheckOutcome::pass(NAME, arch)
        } else {
            CheckOutcome::fail(NAME, arch)
        }
    }

    fn check_macos(&self) -> CheckOutcome {
        const NAME: &str = "macOS ≥ 13.0";
        let Some(version) = run_capture("sw_vers", &["-productVersion"]) else {
            return CheckOutcome::fail(NAME, "not macOS");
        };
        match parse_os_major(&version) {
            Some(major) if major >= MIN_MACOS_MAJOR => CheckOutcome::pass(NAME, version),
            _ => CheckOutcome::fail(NAME, version),
        }
    }

    fn check_python(&self) -> CheckOutcome {
        const NAME: &str = "Python ≥ 3.9";
        let Some(output) = run_capture(&self.config.python, &["--version"]) else {
            return CheckOutcome::fail(NAME, format!("{} not found", self.config.python));
        };
        match parse_python_version(&output) {
            Some(version) if version >= MIN_PYTHON => CheckOutcome::pass(NAME, output),
            _ => CheckOutcome::fail(NAME, output),
        }
    }

    fn check_import(&self, name: &str, module: &str) -> CheckOutcome {
        let script = format!("import {}", module);
        let ok = Command::new(&self.config.python)
            .args(["-c", &script])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if ok {
            CheckOutcome::pass(name, format!("{} importable", module))
        } else {
            CheckOutcome::fail(name, format!("{} not importable", module))
        }
    }

    fn check_ram(&self) -> CheckOutcome {
        let name = ram_check_name(self.config.min_ram_gb);
        match total_memory_bytes() {
            Some(bytes) => {
                let gb = bytes / (1024 * 1024 * 1024);
                let detail = format!("{} GB", gb);
                if gb >= self.config.min_ram_gb {
                    CheckOutcome::pass(name, detail)
                } else {
                    CheckOutcome::fail(name, detail)
                }
            }
            None => CheckOutcome::fail(name, "memory size unavailable"),
        }
    }

    fn check_network(&self) -> CheckOutcome {
        const NAME: &str = "Network Connection";
        let target = format!("{}:{}", self.config.network_host, self.config.network_port);
        let timeout = Duration::from_millis(self.config.network_timeout_ms);

        let reachable = target
            .to_socket_addrs()
            .ok()
            .into_iter()
            .flatten()
            .any(|addr| TcpStream::connect_timeout(&addr, timeout).is_ok());

        if reachable {
            CheckOutcome::pass(NAME, format!("{} reachable", target))
        } else {
            CheckOutcome::fail(NAME, format!("{} unreachable", target))
        }
    }
}

impl SystemChecker for HostProbe {
    fn run_checks(&self) -> SystemReport {
        let checks = vec![
            self.check_apple_silicon(),
            self.check_architecture(),
            self.check_macos(),
            self.check_python(),
            self.check_import("MLX Library", "mlx.core"),
            self.check_import("MLX-LM Package", "mlx_lm"),
            self.check_ram(),
            self.check_network(),
        ];

        for check in checks.iter().filter(|c| !c.passed) {
            tracing::warn!(check = %check.name, detail = %check.detail, "System check failed");
        }

        let report = SystemReport::from_checks(checks);
        tracing::info!(ready = report.ready, "System check finished");
        report
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Check name shown for a RAM minimum of `min_gb`.
pub fn ram_check_name(min_gb: u64) -> String {
    format!("Available RAM (≥{}GB)", min_gb)
}

/// Run a program and return its trimmed output, or `None` if it failed.
///
/// Some Python builds print `--version` to stderr, so stderr is used when
/// stdout is empty.
fn run_capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        (!stderr.is_empty()).then_some(stderr)
    } else {
        Some(stdout)
    }
}

fn total_memory_bytes() -> Option<u64> {
    if let Some(bytes) = run_capture("sysctl", &["-n", "hw.memsize"]).and_then(|s| s.parse().ok())
    {
        return Some(bytes);
    }
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo_kb(&meminfo).map(|kb| kb.saturating_mul(1024))
}

/// Parse `Python 3.11.4` into `(3, 11)`.
pub fn parse_python_version(output: &str) -> Option<(u32, u32)> {
    let version = output.trim().strip_prefix("Python")?.trim();
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

/// Parse the major component of a dotted OS version.
pub fn parse_os_major(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}

/// Read `MemTotal` from `/proc/meminfo` content, in kB.
pub fn parse_meminfo_kb(meminfo: &str) -> Option<u64> {
    meminfo
        .lines()
        .find_map(|line| line.strip_prefix("MemTotal:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_version_parsing() {
        assert_eq!(parse_python_version("Python 3.11.4"), Some((3, 11)));
        assert_eq!(parse_python_version("Python 3.9.0rc1\n"), Some((3, 9)));
        assert_eq!(parse_python_version("Python 3.13a"), Some((3, 13)));
        assert_eq!(parse_python_version("command not found"), None);
    }

    #[test]
    fn python_version_ordering_matches_minimum() {
        let old = parse_python_version("Python 3.8.18").expect("parse");
        let new = parse_python_version("Python 3.10.2").expect("parse");
        assert!(old < MIN_PYTHON);
        assert!(new >= MIN_PYTHON);
    }

    #[test]
    fn os_major_parsing() {
        assert_eq!(parse_os_major("14.4.1"), Some(14));
        assert_eq!(parse_os_major("13"), Some(13));
        assert_eq!(parse_os_major("Sonoma"), None);
    }

    #[test]
    fn meminfo_parsing() {
        let meminfo = "MemTotal:       16318412 kB\nMemFree:         1234 kB\n";
        assert_eq!(parse_meminfo_kb(meminfo), Some(16_318_412));
        assert_eq!(parse_meminfo_kb("MemFree: 1 kB"), None);
    }

    #[test]
    fn probe_reports_all_checks() {
        let probe = HostProbe::new(ProbeConfig {
            python: "loraprep-no-such-python".to_string(),
            network_host: "localhost".to_string(),
            network_port: 1,
            network_timeout_ms: 50,
            ..ProbeConfig::default()
        });
        let report = probe.run_checks();

        assert_eq!(report.checks.len(), 8);
        assert!(!report.ready);
        assert!(
            report
                .failures()
                .any(|c| c.name == "Python ≥ 3.9" && c.detail.contains("not found"))
        );
    }

    #[test]
    fn ram_check_names_configured_minimum() {
        assert_eq!(ram_check_name(8), "Available RAM (≥8GB)");

        let probe = HostProbe::new(ProbeConfig {
            min_ram_gb: 4096,
            ..ProbeConfig::default()
        });
        let ram = probe.check_ram();
        assert_eq!(ram.name, "Available RAM (≥4096GB)");
        assert!(!ram.passed);
    }
}
