//! # Status Derivation
//!
//! Maps the store to the single status label shown alongside the wizard.
//!
//! Rules are evaluated highest priority first, first match wins:
//!
//! | Priority | Condition | Label | Severity |
//! |----------|-----------|-------|----------|
//! | 1 | training config set | Ready to Train | Success |
//! | 2 | data result set | Configuring | Pending |
//! | 3 | model set | Processing Data | Pending |
//! | 4 | system ready | Selecting Model | Pending |
//! | 5 | otherwise | Checking System | Neutral |
//!
//! Later slots win even when earlier ones are missing or contradictory.

use crate::store::StageResultStore;
use serde::{Deserialize, Serialize};

/// How a status label should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Pending,
    Neutral,
}

/// A derived status label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub label: &'static str,
    pub severity: Severity,
}

impl Status {
    const fn new(label: &'static str, severity: Severity) -> Self {
        Self { label, severity }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label)
    }
}

/// Derive the status label from the current store contents.
///
/// Pure: the same store always yields the same status.
#[must_use]
pub fn derive_status(store: &StageResultStore) -> Status {
    if store.training().is_some() {
        Status::new("Ready to Train", Severity::Success)
    } else if store.data().is_some() {
        Status::new("Configuring", Severity::Pending)
    } else if store.model().is_some() {
        Status::new("Processing Data", Severity::Pending)
    } else if store.system_ready() == Some(true) {
        Status::new("Selecting Model", Severity::Pending)
    } else {
        Status::new("Checking System", Severity::Neutral)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_model;
    use crate::stage::StagePayload;
    use crate::tuning::TrainingDraft;
    use crate::types::{DataMethod, ProcessedDataResult, SourceFileRef};

    #[test]
    fn empty_store_is_checking_system() {
        let status = derive_status(&StageResultStore::new());
        assert_eq!(status.label, "Checking System");
        assert_eq!(status.severity, Severity::Neutral);
    }

    #[test]
    fn failed_check_stays_checking_system() {
        let mut store = StageResultStore::new();
        store.set(StagePayload::SystemCheck(false));
        assert_eq!(derive_status(&store).label, "Checking System");
    }

    #[test]
    fn model_without_readiness_is_processing_data() {
        let mut store = StageResultStore::new();
        let model = find_model("gemma").expect("gemma").clone();
        store.set(StagePayload::ModelSelection(model));
        assert_eq!(derive_status(&store).label, "Processing Data");
    }

    #[test]
    fn data_result_is_configuring() {
        let mut store = StageResultStore::new();
        store.set(StagePayload::DataProcessing(ProcessedDataResult::new(
            DataMethod::Structured,
            SourceFileRef::new("qa.csv"),
            42,
        )));
        let status = derive_status(&store);
        assert_eq!(status.label, "Configuring");
        assert_eq!(status.severity, Severity::Pending);
    }

    #[test]
    fn training_config_wins_over_everything() {
        let mut store = StageResultStore::new();
        store.set(StagePayload::SystemCheck(false));
        store.set(StagePayload::TrainingConfig(TrainingDraft::new().to_config()));

        let status = derive_status(&store);
        assert_eq!(status.label, "Ready to Train");
        assert_eq!(status.severity, Severity::Success);
    }
}
