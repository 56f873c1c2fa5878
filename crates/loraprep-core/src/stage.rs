//! # Stage Definitions
//!
//! The fixed, ordered catalog of wizard stages.
//!
//! | Index | Stage | Completion Predicate |
//! |-------|-------|----------------------|
//! | 0 | System Check | readiness slot set and `true` |
//! | 1 | Model Selection | model slot set |
//! | 2 | Data Processing | data slot set |
//! | 3 | Training Config | training slot set |
//!
//! The sequence is compiled in and never changes at runtime.

use crate::catalog::find_model;
use crate::command::generate_command;
use crate::store::StageResultStore;
use crate::types::{ModelDescriptor, ProcessedDataResult, TrainingConfig, WizardError};
use serde::{Deserialize, Serialize};

/// Number of stages in the wizard.
pub const STAGE_COUNT: usize = 4;

// =============================================================================
// STAGE ENUM
// =============================================================================

/// One step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    SystemCheck,
    ModelSelection,
    DataProcessing,
    TrainingConfig,
}

impl StageId {
    /// All stages in wizard order.
    pub const ALL: [StageId; STAGE_COUNT] = [
        StageId::SystemCheck,
        StageId::ModelSelection,
        StageId::DataProcessing,
        StageId::TrainingConfig,
    ];

    /// Get the stage's position in the wizard.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            StageId::SystemCheck => 0,
            StageId::ModelSelection => 1,
            StageId::DataProcessing => 2,
            StageId::TrainingConfig => 3,
        }
    }

    /// Look up a stage by position.
    #[must_use]
    pub fn from_index(index: usize) -> Option<StageId> {
        Self::ALL.get(index).copied()
    }

    /// Get the stage title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            StageId::SystemCheck => "System Check",
            StageId::ModelSelection => "Model Selection",
            StageId::DataProcessing => "Data Processing",
            StageId::TrainingConfig => "Training Config",
        }
    }

    /// Message shown in place of the stage when it cannot be entered.
    #[must_use]
    pub fn gated_message(&self) -> &'static str {
        match self {
            StageId::SystemCheck => "",
            StageId::ModelSelection => "Please complete the system check first.",
            StageId::DataProcessing => "Please select a model first.",
            StageId::TrainingConfig => "Please process your data first.",
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<StageId> {
        Self::from_index(self.index().saturating_add(1))
    }

    /// Get the previous stage, if any.
    #[must_use]
    pub fn previous(&self) -> Option<StageId> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Evaluate this stage's completion predicate against the store.
    #[must_use]
    pub fn is_complete(&self, store: &StageResultStore) -> bool {
        match self {
            StageId::SystemCheck => store.system_ready() == Some(true),
            StageId::ModelSelection => store.model().is_some(),
            StageId::DataProcessing => store.data().is_some(),
            StageId::TrainingConfig => store.training().is_some(),
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.index().saturating_add(1), self.title())
    }
}

// =============================================================================
// STAGE PAYLOAD
// =============================================================================

/// Completion data reported by a stage.
///
/// Each variant belongs to exactly one stage, so the payload shape is fixed
/// by the type system rather than checked at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "result", rename_all = "snake_case")]
pub enum StagePayload {
    /// Whether every required host check passed.
    SystemCheck(bool),
    ModelSelection(ModelDescriptor),
    DataProcessing(ProcessedDataResult),
    TrainingConfig(TrainingConfig),
}

impl StagePayload {
    /// The stage that owns this payload's store slot.
    #[must_use]
    pub fn stage(&self) -> StageId {
        match self {
            StagePayload::SystemCheck(_) => StageId::SystemCheck,
            StagePayload::ModelSelection(_) => StageId::ModelSelection,
            StagePayload::DataProcessing(_) => StageId::DataProcessing,
            StagePayload::TrainingConfig(_) => StageId::TrainingConfig,
        }
    }

    /// Check a payload built outside the engine.
    ///
    /// A model must be an unmodified catalog entry, and a training config's
    /// command must be the one its parameters generate.
    pub fn validate(&self) -> Result<(), WizardError> {
        match self {
            StagePayload::ModelSelection(model) => {
                let entry = find_model(&model.id)
                    .ok_or_else(|| WizardError::UnknownModel(model.id.clone()))?;
                if entry != model {
                    return Err(WizardError::ContractViolation(format!(
                        "model '{}' does not match its catalog entry",
                        model.id
                    )));
                }
                Ok(())
            }
            StagePayload::TrainingConfig(config) => {
                if config.command != generate_command(&config.params) {
                    return Err(WizardError::ContractViolation(
                        "training command does not match its parameters".to_string(),
                    ));
                }
                Ok(())
            }
            StagePayload::SystemCheck(_) | StagePayload::DataProcessing(_) => Ok(()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_ordering_matches_indices() {
        for (i, stage) in StageId::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(StageId::from_index(i), Some(*stage));
        }
        assert_eq!(StageId::from_index(STAGE_COUNT), None);
    }

    #[test]
    fn next_and_previous_stop_at_bounds() {
        assert_eq!(StageId::SystemCheck.previous(), None);
        assert_eq!(StageId::SystemCheck.next(), Some(StageId::ModelSelection));
        assert_eq!(StageId::TrainingConfig.next(), None);
        assert_eq!(StageId::TrainingConfig.previous(), Some(StageId::DataProcessing));
    }

    #[test]
    fn failed_system_check_is_not_complete() {
        let mut store = StageResultStore::new();
        assert!(!StageId::SystemCheck.is_complete(&store));

        store.set(StagePayload::SystemCheck(false));
        assert!(!StageId::SystemCheck.is_complete(&store));

        store.set(StagePayload::SystemCheck(true));
        assert!(StageId::SystemCheck.is_complete(&store));
    }

    #[test]
    fn payload_knows_its_stage() {
        assert_eq!(
            StagePayload::SystemCheck(true).stage(),
            StageId::SystemCheck
        );
    }

    #[test]
    fn catalog_model_payload_is_valid() {
        let phi3 = find_model("phi3").cloned().expect("phi3");
        assert!(StagePayload::ModelSelection(phi3).validate().is_ok());
    }

    #[test]
    fn altered_model_payload_is_rejected() {
        let mut phi3 = find_model("phi3").cloned().expect("phi3");
        phi3.hf_path = "someone/else".to_string();
        let err = StagePayload::ModelSelection(phi3)
            .validate()
            .expect_err("altered hf_path");
        assert!(matches!(err, WizardError::ContractViolation(_)));

        let mut unknown = find_model("phi3").cloned().expect("phi3");
        unknown.id = "phi4".to_string();
        let err = StagePayload::ModelSelection(unknown)
            .validate()
            .expect_err("unknown id");
        assert!(matches!(err, WizardError::UnknownModel(id) if id == "phi4"));
    }

    #[test]
    fn config_command_must_follow_params() {
        let mut config = crate::tuning::TrainingDraft::new().to_config();
        assert!(StagePayload::TrainingConfig(config.clone()).validate().is_ok());

        config.command = "echo hello".to_string();
        let err = StagePayload::TrainingConfig(config)
            .validate()
            .expect_err("foreign command");
        assert!(matches!(err, WizardError::ContractViolation(_)));
    }

    #[test]
    fn stage_display() {
        assert_eq!(format!("{}", StageId::SystemCheck), "1. System Check");
        assert_eq!(format!("{}", StageId::TrainingConfig), "4. Training Config");
    }
}
