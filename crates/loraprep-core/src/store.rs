//! # Stage Result Store
//!
//! Session-local holder of each completed stage's output.
//!
//! - One slot per stage, every slot starts unset
//! - `set` overwrites unconditionally, there is no history
//! - Navigating backward never clears a slot
//! - Never serialized to disk

use crate::stage::{StageId, StagePayload};
use crate::types::{ModelDescriptor, ProcessedDataResult, TrainingConfig};

/// The accumulated results of the wizard stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageResultStore {
    system_ready: Option<bool>,
    model: Option<ModelDescriptor>,
    data: Option<ProcessedDataResult>,
    training: Option<TrainingConfig>,
}

impl StageResultStore {
    /// Create a store with every slot unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a payload into the slot owned by its stage.
    pub fn set(&mut self, payload: StagePayload) {
        match payload {
            StagePayload::SystemCheck(ready) => self.system_ready = Some(ready),
            StagePayload::ModelSelection(model) => self.model = Some(model),
            StagePayload::DataProcessing(data) => self.data = Some(data),
            StagePayload::TrainingConfig(config) => self.training = Some(config),
        }
    }

    /// Read a slot back as a payload.
    #[must_use]
    pub fn get(&self, stage: StageId) -> Option<StagePayload> {
        match stage {
            StageId::SystemCheck => self.system_ready.map(StagePayload::SystemCheck),
            StageId::ModelSelection => self.model.clone().map(StagePayload::ModelSelection),
            StageId::DataProcessing => self.data.clone().map(StagePayload::DataProcessing),
            StageId::TrainingConfig => self.training.clone().map(StagePayload::TrainingConfig),
        }
    }

    /// Check if a slot holds a value (a `false` readiness counts as set).
    #[must_use]
    pub fn is_set(&self, stage: StageId) -> bool {
        match stage {
            StageId::SystemCheck => self.system_ready.is_some(),
            StageId::ModelSelection => self.model.is_some(),
            StageId::DataProcessing => self.data.is_some(),
            StageId::TrainingConfig => self.training.is_some(),
        }
    }

    /// System readiness verdict, if the check has reported.
    #[must_use]
    pub fn system_ready(&self) -> Option<bool> {
        self.system_ready
    }

    /// Currently selected model.
    #[must_use]
    pub fn model(&self) -> Option<&ModelDescriptor> {
        self.model.as_ref()
    }

    /// Latest data-processing result.
    #[must_use]
    pub fn data(&self) -> Option<&ProcessedDataResult> {
        self.data.as_ref()
    }

    /// Saved training configuration.
    #[must_use]
    pub fn training(&self) -> Option<&TrainingConfig> {
        self.training.as_ref()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_model;

    #[test]
    fn new_store_is_empty() {
        let store = StageResultStore::new();
        for stage in StageId::ALL {
            assert!(store.get(stage).is_none());
            assert!(!store.is_set(stage));
        }
    }

    #[test]
    fn set_overwrites_previous_selection() {
        let mut store = StageResultStore::new();
        let phi3 = find_model("phi3").expect("phi3").clone();
        let llama = find_model("llama").expect("llama").clone();

        store.set(StagePayload::ModelSelection(phi3));
        store.set(StagePayload::ModelSelection(llama));

        assert_eq!(store.model().map(|m| m.id.as_str()), Some("llama"));
    }

    #[test]
    fn false_readiness_is_stored() {
        let mut store = StageResultStore::new();
        store.set(StagePayload::SystemCheck(false));

        assert!(store.is_set(StageId::SystemCheck));
        assert_eq!(
            store.get(StageId::SystemCheck),
            Some(StagePayload::SystemCheck(false))
        );
    }

    #[test]
    fn slots_are_independent() {
        let mut store = StageResultStore::new();
        store.set(StagePayload::SystemCheck(true));

        assert!(store.model().is_none());
        assert!(store.data().is_none());
        assert!(store.training().is_none());
    }
}
