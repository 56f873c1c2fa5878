//! # Session Module
//!
//! The stage orchestrator: owns the result store, the active stage and the
//! training draft for one wizard run.
//!
//! - Navigation clamps at both ends and never checks gating
//! - Gating (`can_enter`) consults only the immediately preceding stage
//! - Completion payloads overwrite their slot, last write wins
//! - Navigating backward never clears a slot
//! - Never serialized to disk

use crate::catalog::find_model;
use crate::collaborator::SystemReport;
use crate::stage::{STAGE_COUNT, StageId, StagePayload};
use crate::status::{Status, derive_status};
use crate::store::StageResultStore;
use crate::tuning::TrainingDraft;
use crate::types::{ModelDescriptor, TrainingConfig, WizardError};
use serde::Serialize;

/// Position of one stage in the progress strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub index: usize,
    pub stage: StageId,
    pub title: &'static str,
    pub completed: bool,
    pub active: bool,
    pub can_enter: bool,
}

/// A single wizard run.
///
/// The session is the only owner of wizard state; hosts hold it by value or
/// behind their own lock and pass it where it is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    store: StageResultStore,
    active: StageId,
    draft: TrainingDraft,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session at the first stage with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: StageResultStore::new(),
            active: StageId::SystemCheck,
            draft: TrainingDraft::new(),
        }
    }

    /// Get a reference to the result store.
    #[must_use]
    pub fn store(&self) -> &StageResultStore {
        &self.store
    }

    /// Get the active stage.
    #[must_use]
    pub fn active(&self) -> StageId {
        self.active
    }

    /// Get the active stage's index.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active.index()
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Move to the next stage. No-op at the last stage.
    pub fn advance(&mut self) {
        if let Some(next) = self.active.next() {
            tracing::debug!(from = %self.active, to = %next, "advance");
            self.active = next;
        }
    }

    /// Move to the previous stage. No-op at the first stage.
    pub fn retreat(&mut self) {
        if let Some(previous) = self.active.previous() {
            tracing::debug!(from = %self.active, to = %previous, "retreat");
            self.active = previous;
        }
    }

    // =========================================================================
    // COMPLETION
    // =========================================================================

    /// Write a stage's completion payload into its store slot.
    ///
    /// Overwrites any earlier value. The active stage is not consulted, so a
    /// late collaborator result still lands after the user has moved on.
    pub fn report_completion(&mut self, payload: StagePayload) {
        let stage = payload.stage();
        if self.store.is_set(stage) {
            tracing::debug!(stage = %stage, "stage result overwritten");
        } else {
            tracing::debug!(stage = %stage, "stage result recorded");
        }
        self.store.set(payload);
    }

    /// Index-dispatched form of [`Session::report_completion`].
    ///
    /// Rejects a payload whose shape belongs to another stage or that fails
    /// [`StagePayload::validate`], leaving the store untouched.
    pub fn report_completion_at(
        &mut self,
        index: usize,
        payload: StagePayload,
    ) -> Result<(), WizardError> {
        let stage = StageId::from_index(index).ok_or_else(|| {
            WizardError::ContractViolation(format!(
                "stage index {} out of range 0..{}",
                index, STAGE_COUNT
            ))
        })?;

        let owner = payload.stage();
        if owner != stage {
            tracing::warn!(reported = %stage, payload = %owner, "rejected completion payload");
            return Err(WizardError::ContractViolation(format!(
                "stage {} ({}) cannot accept a {} payload",
                index,
                stage.title(),
                owner.title()
            )));
        }
        payload.validate()?;

        self.report_completion(payload);
        Ok(())
    }

    /// Record the verdict of a system check run.
    pub fn apply_system_report(&mut self, report: &SystemReport) {
        self.report_completion(StagePayload::SystemCheck(report.ready));
    }

    /// Select a catalog model by id and record it.
    pub fn select_model(&mut self, id: &str) -> Result<&'static ModelDescriptor, WizardError> {
        let model = find_model(id).ok_or_else(|| WizardError::UnknownModel(id.to_string()))?;
        self.report_completion(StagePayload::ModelSelection(model.clone()));
        Ok(model)
    }

    /// Freeze the training draft and record it as the training config.
    pub fn save_training_config(&mut self) -> TrainingConfig {
        let config = self.draft.to_config();
        self.report_completion(StagePayload::TrainingConfig(config.clone()));
        config
    }

    // =========================================================================
    // GATING & STATUS
    // =========================================================================

    /// Check whether the stage at `index` may be entered.
    ///
    /// Stage 0 always may. Stage `k` may iff stage `k-1` is complete, no
    /// matter what any other slot holds.
    #[must_use]
    pub fn can_enter(&self, index: usize) -> bool {
        match StageId::from_index(index) {
            Some(stage) => self.can_enter_stage(stage),
            None => false,
        }
    }

    /// Typed form of [`Session::can_enter`].
    #[must_use]
    pub fn can_enter_stage(&self, stage: StageId) -> bool {
        match stage.previous() {
            None => true,
            Some(previous) => previous.is_complete(&self.store),
        }
    }

    /// Gating flag for the active stage.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        self.can_enter_stage(self.active)
    }

    /// Derive the status label from the current store.
    #[must_use]
    pub fn status(&self) -> Status {
        derive_status(&self.store)
    }

    /// Snapshot of every stage for a progress display.
    #[must_use]
    pub fn progress(&self) -> Vec<StageView> {
        StageId::ALL
            .into_iter()
            .map(|stage| StageView {
                index: stage.index(),
                stage,
                title: stage.title(),
                completed: stage.is_complete(&self.store),
                active: stage == self.active,
                can_enter: self.can_enter_stage(stage),
            })
            .collect()
    }

    // =========================================================================
    // TRAINING DRAFT
    // =========================================================================

    /// Get a reference to the training draft.
    #[must_use]
    pub fn draft(&self) -> &TrainingDraft {
        &self.draft
    }

    /// Get a mutable reference to the training draft.
    pub fn draft_mut(&mut self) -> &mut TrainingDraft {
        &mut self.draft
    }
}

// =============================================================================
// TESTS
// =============================================================================
