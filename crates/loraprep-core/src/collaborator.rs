//! # Collaborator Contracts
//!
//! Interfaces to the work the CORE deliberately does not do itself: probing
//! the host and turning user files into training data.
//!
//! The CORE only consumes the final result of each collaborator. A
//! collaborator reports once, and its result is written into the session
//! through [`crate::Session::report_completion`] like any other payload.
//!
//! # Extension Point
//!
//! The application crate provides the real implementations. The fixed
//! implementations here are deterministic stand-ins for tests and dry runs.

use crate::types::{DataMethod, ProcessedDataResult, SourceFileRef, WizardError};
use serde::{Deserialize, Serialize};

// =============================================================================
// SYSTEM CHECKER
// =============================================================================

/// Result of one host compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    /// What was observed, e.g. "Python 3.11.4".
    #[serde(default)]
    pub detail: String,
}

impl CheckOutcome {
    /// A passing check.
    #[must_use]
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    /// A failing check.
    #[must_use]
    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// The full outcome of a system check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemReport {
    pub checks: Vec<CheckOutcome>,
    /// True iff at least one check ran and every check passed.
    pub ready: bool,
}

impl SystemReport {
    /// Build a report and compute its verdict.
    #[must_use]
    pub fn from_checks(checks: Vec<CheckOutcome>) -> Self {
        let ready = !checks.is_empty() && checks.iter().all(|c| c.passed);
        Self { checks, ready }
    }

    /// Checks that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Verifies that the host can run the trainer.
pub trait SystemChecker: Send + Sync {
    /// Run every check and report the outcome.
    fn run_checks(&self) -> SystemReport;
}

/// A checker that returns a preconfigured report.
#[derive(Debug, Clone)]
pub struct FixedSystemChecker {
    checks: Vec<CheckOutcome>,
}

impl FixedSystemChecker {
    /// Create a checker returning the given outcomes.
    #[must_use]
    pub fn new(checks: Vec<CheckOutcome>) -> Self {
        Self { checks }
    }

    /// A checker whose single check passes.
    #[must_use]
    pub fn passing() -> Self {
        Self::new(vec![CheckOutcome::pass("Fixed Check", "always passes")])
    }

    /// A checker whose single named check fails.
    #[must_use]
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(vec![CheckOutcome::fail(name, "configured to fail")])
    }
}

impl SystemChecker for FixedSystemChecker {
    fn run_checks(&self) -> SystemReport {
        SystemReport::from_checks(self.checks.clone())
    }
}

// =============================================================================
// DATA PROCESSOR
// =============================================================================

/// Turns a user file into training entries.
pub trait DataProcessor: Send + Sync {
    /// Process `source` with `method` and report how many entries resulted.
    fn process(
        &self,
        source: &SourceFileRef,
        method: DataMethod,
    ) -> Result<ProcessedDataResult, WizardError>;
}

/// A processor that reports a fixed entry count without reading anything.
#[derive(Debug, Clone, Copy)]
pub struct FixedDataProcessor {
    entries: u64,
}

impl FixedDataProcessor {
    /// Create a processor reporting `entries` generated entries.
    #[must_use]
    pub fn new(entries: u64) -> Self {
        Self { entries }
    }
}

impl DataProcessor for FixedDataProcessor {
    fn process(
        &self,
        source: &SourceFileRef,
        method: DataMethod,
    ) -> Result<ProcessedDataResult, WizardError> {
        Ok(ProcessedDataResult::new(method, source.clone(), self.entries))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_ready_when_all_pass() {
        let report = SystemReport::from_checks(vec![
            CheckOutcome::pass("ARM64 Architecture", "aarch64"),
            CheckOutcome::pass("Python >= 3.9", "Python 3.12.1"),
        ]);
        assert!(report.ready);
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn single_failure_blocks_readiness() {
        let report = SystemReport::from_checks(vec![
            CheckOutcome::pass("ARM64 Architecture", "aarch64"),
            CheckOutcome::fail("Network Connection", "timed out"),
        ]);
        assert!(!report.ready);
        let failed: Vec<_> = report.failures().map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec!["Network Connection"]);
    }

    #[test]
    fn empty_report_is_not_ready() {
        assert!(!SystemReport::from_checks(Vec::new()).ready);
    }

    #[test]
    fn fixed_checkers() {
        assert!(FixedSystemChecker::passing().run_checks().ready);
        assert!(!FixedSystemChecker::failing("MLX Library").run_checks().ready);
    }

    #[test]
    fn fixed_processor_echoes_input() {
        let processor = FixedDataProcessor::new(150);
        let result = processor
            .process(&SourceFileRef::new("book.txt"), DataMethod::Book)
            .expect("process");
        assert_eq!(result.entries_generated, 150);
        assert_eq!(result.method, DataMethod::Book);
        assert_eq!(result.source_file.as_str(), "book.txt");
    }
}
