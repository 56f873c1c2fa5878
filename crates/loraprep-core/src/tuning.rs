//! # Training Draft
//!
//! Editable parameter state of the training-config stage.
//!
//! Selecting a named preset replaces every field with the preset snapshot,
//! discarding manual edits. Field edits change one value and leave the
//! selection as it was.

use crate::catalog::preset;
use crate::command::generate_command;
use crate::types::{PresetKind, TrainingConfig, TrainingParameters, WizardError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// PARAMETER FIELDS
// =============================================================================

/// One editable training parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterField {
    LearningRate,
    Rank,
    Alpha,
    Iterations,
    BatchSize,
}

impl ParameterField {
    /// All fields in form order.
    pub const ALL: [ParameterField; 5] = [
        ParameterField::LearningRate,
        ParameterField::Rank,
        ParameterField::Alpha,
        ParameterField::Iterations,
        ParameterField::BatchSize,
    ];

    /// Get the wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterField::LearningRate => "learning_rate",
            ParameterField::Rank => "rank",
            ParameterField::Alpha => "alpha",
            ParameterField::Iterations => "iterations",
            ParameterField::BatchSize => "batch_size",
        }
    }

    /// Get the form label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ParameterField::LearningRate => "Learning Rate",
            ParameterField::Rank => "LoRA Rank",
            ParameterField::Alpha => "LoRA Alpha",
            ParameterField::Iterations => "Iterations",
            ParameterField::BatchSize => "Batch Size",
        }
    }

    /// Textual value of this field in `params`, as the trainer receives it.
    #[must_use]
    pub fn value_in(&self, params: &TrainingParameters) -> String {
        match self {
            ParameterField::LearningRate => params.learning_rate.clone(),
            ParameterField::Rank => params.rank.to_string(),
            ParameterField::Alpha => params.alpha.to_string(),
            ParameterField::Iterations => params.iterations.to_string(),
            ParameterField::BatchSize => params.batch_size.to_string(),
        }
    }
}

impl FromStr for ParameterField {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s || f.as_str().replace('_', "-") == s)
            .ok_or_else(|| WizardError::UnknownParameter(s.to_string()))
    }
}

// =============================================================================
// TRAINING DRAFT
// =============================================================================

/// The in-progress parameter set of the training-config stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingDraft {
    selection: PresetKind,
    params: TrainingParameters,
}

impl Default for TrainingDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingDraft {
    /// Create a draft holding the standard preset.
    #[must_use]
    pub fn new() -> Self {
        Self::from_preset(PresetKind::Standard)
    }

    /// Create a draft from a preset. `Custom` starts from standard values.
    #[must_use]
    pub fn from_preset(kind: PresetKind) -> Self {
        let mut draft = Self {
            selection: PresetKind::Standard,
            params: standard_params(),
        };
        draft.select_preset(kind);
        draft
    }

    /// Currently selected preset.
    #[must_use]
    pub fn selection(&self) -> PresetKind {
        self.selection
    }

    /// Current parameter values.
    #[must_use]
    pub fn params(&self) -> &TrainingParameters {
        &self.params
    }

    /// Select a preset.
    ///
    /// A named preset overwrites all fields; `Custom` keeps the current values.
    pub fn select_preset(&mut self, kind: PresetKind) {
        self.selection = kind;
        if let Some(snapshot) = preset(kind) {
            self.params = snapshot.params();
        }
        tracing::debug!(preset = %kind, "training preset selected");
    }

    /// Overwrite one field from its textual form.
    ///
    /// The learning rate is stored verbatim. Integer fields must parse as
    /// unsigned integers; their range is not checked.
    pub fn set_field(&mut self, field: ParameterField, value: &str) -> Result<(), WizardError> {
        let value = value.trim();
        let parse = || {
            value.parse::<u32>().map_err(|_| WizardError::InvalidParameter {
                field: field.as_str().to_string(),
                value: value.to_string(),
            })
        };

        match field {
            ParameterField::LearningRate => {
                if value.is_empty() {
                    return Err(WizardError::InvalidParameter {
                        field: field.as_str().to_string(),
                        value: value.to_string(),
                    });
                }
                self.params.learning_rate = value.to_string();
            }
            ParameterField::Rank => self.params.rank = parse()?,
            ParameterField::Alpha => self.params.alpha = parse()?,
            ParameterField::Iterations => self.params.iterations = parse()?,
            ParameterField::BatchSize => self.params.batch_size = parse()?,
        }

        tracing::trace!(field = field.as_str(), value, "training parameter edited");
        Ok(())
    }

    /// Live preview of the trainer command.
    #[must_use]
    pub fn command(&self) -> String {
        generate_command(&self.params)
    }

    /// Freeze the draft into a training configuration.
    #[must_use]
    pub fn to_config(&self) -> TrainingConfig {
        TrainingConfig {
            preset: self.selection,
            params: self.params.clone(),
            command: self.command(),
        }
    }
}

fn standard_params() -> TrainingParameters {
    TrainingParameters {
        learning_rate: "5e-5".to_string(),
        rank: 16,
        alpha: 32,
        iterations: 600,
        batch_size: 16,
    }
}

// =============================================================================
// TESTS
// =============================================================================
