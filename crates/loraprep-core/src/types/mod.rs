//! # Core Type Definitions
//!
//! This module contains the payload types that flow between the wizard
//! stages and the session store:
//! - Model selection (`ModelDescriptor`, `Difficulty`)
//! - Data preparation (`DataMethod`, `SourceFileRef`, `ProcessedDataResult`)
//! - Training configuration (`TrainingParameters`, `PresetKind`, `TrainingConfig`)
//! - Error types (`WizardError`)
//!
//! ## Integer Guarantees
//!
//! All numeric fields are unsigned integers. The only decimal value in the
//! wizard, the learning rate, is carried as the literal string the user typed
//! so the trainer command receives it verbatim.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// MODEL DESCRIPTOR
// =============================================================================

/// Skill level a base model asks of the person fine-tuning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A base model the wizard can prepare a fine-tuning run for.
///
/// `id` is the unique key within the model catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Minimum unified memory needed to fine-tune, in GB.
    pub ram_required_gb: u32,
    /// Hugging Face repository path.
    pub hf_path: String,
    pub difficulty: Difficulty,
    /// Human-readable duration range, e.g. "1-2 hours".
    pub training_time_estimate: String,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// DATA PREPARATION
// =============================================================================

/// How an uploaded file is turned into training entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMethod {
    /// Pre-formatted question/answer data (.txt, .csv, .json).
    Structured,
    /// Free text from which pairs are generated (.txt).
    Book,
}

impl DataMethod {
    /// Get the wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMethod::Structured => "structured",
            DataMethod::Book => "book",
        }
    }

    /// Get the display title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            DataMethod::Structured => "Structured Data",
            DataMethod::Book => "Book Processing",
        }
    }

    /// File extensions accepted for this method.
    #[must_use]
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            DataMethod::Structured => &["txt", "csv", "json"],
            DataMethod::Book => &["txt"],
        }
    }
}

impl fmt::Display for DataMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataMethod {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structured" => Ok(DataMethod::Structured),
            "book" => Ok(DataMethod::Book),
            other => Err(WizardError::InvalidData(format!(
                "Unknown data method: {}. Use: structured, book",
                other
            ))),
        }
    }
}

/// Opaque handle to a file handed to or produced by the data processor.
///
/// The CORE never opens it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFileRef(pub String);

impl SourceFileRef {
    /// Create a new file reference.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of one successful upload-and-process cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDataResult {
    pub method: DataMethod,
    pub source_file: SourceFileRef,
    pub entries_generated: u64,
    /// Where the processor wrote the generated entries, if it wrote any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<SourceFileRef>,
}

impl ProcessedDataResult {
    /// Create a result without an output file.
    #[must_use]
    pub fn new(method: DataMethod, source_file: SourceFileRef, entries_generated: u64) -> Self {
        Self {
            method,
            source_file,
            entries_generated,
            output_file: None,
        }
    }
}

// =============================================================================
// TRAINING CONFIGURATION
// =============================================================================

/// Which preset the training parameters came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    Light,
    Standard,
    Intensive,
    Custom,
}

impl PresetKind {
    /// Get the wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetKind::Light => "light",
            PresetKind::Standard => "standard",
            PresetKind::Intensive => "intensive",
            PresetKind::Custom => "custom",
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKind {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(PresetKind::Light),
            "standard" => Ok(PresetKind::Standard),
            "intensive" => Ok(PresetKind::Intensive),
            "custom" => Ok(PresetKind::Custom),
            other => Err(WizardError::UnknownPreset(other.to_string())),
        }
    }
}

/// LoRA hyperparameters handed to the trainer.
///
/// No range checks are applied: a zero or absurd value is passed through to
/// the trainer exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainingParameters {
    /// Decimal or scientific-notation literal, e.g. "5e-5".
    pub learning_rate: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub rank: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub alpha: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub iterations: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub batch_size: u32,
}

/// Accept both `16` and `"16"` for integer fields.
///
/// Form-driven clients send every field as a string.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("expected unsigned integer, got {:?}", s))
        }),
    }
}

/// The frozen output of the training-config stage.
///
/// `command` reflects `params` at the moment of saving and is never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub preset: PresetKind,
    pub params: TrainingParameters,
    pub command: String,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the wizard.
///
/// Absent store slots and failed system checks are NOT errors; they are
/// ordinary negative states handled by gating.
#[derive(Debug, Error)]
pub enum WizardError {
    /// A completion payload did not match the stage it was reported for.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Input was offered to a stage whose predecessor is not complete.
    #[error("Stage not available: {0}")]
    Gated(String),

    /// A stage index or identifier outside the fixed catalog.
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// The requested model id is not in the catalog.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// The requested preset name is not in the catalog.
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// A training parameter name that does not exist.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// A training parameter value that cannot be parsed.
    #[error("Invalid value for {field}: {value:?}")]
    InvalidParameter { field: String, value: String },

    /// Input data could not be turned into training entries.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_method_round_trips_through_str() {
        assert_eq!("book".parse::<DataMethod>().ok(), Some(DataMethod::Book));
        assert_eq!(DataMethod::Structured.to_string(), "structured");
        assert!("images".parse::<DataMethod>().is_err());
    }

    #[test]
    fn preset_kind_parse_rejects_unknown() {
        let err = "turbo".parse::<PresetKind>().expect_err("unknown preset");
        assert!(matches!(err, WizardError::UnknownPreset(name) if name == "turbo"));
    }

    #[test]
    fn parameters_accept_string_integers() {
        let json = r#"{"learning_rate":"5e-5","rank":"16","alpha":32,"iterations":"600","batch_size":"16"}"#;
        let params: TrainingParameters = serde_json::from_str(json).expect("parse");
        assert_eq!(params.rank, 16);
        assert_eq!(params.alpha, 32);
        assert_eq!(params.iterations, 600);
        assert_eq!(params.learning_rate, "5e-5");
    }

    #[test]
    fn parameters_reject_non_numeric_rank() {
        let json = r#"{"learning_rate":"5e-5","rank":"sixteen","alpha":32,"iterations":600,"batch_size":16}"#;
        assert!(serde_json::from_str::<TrainingParameters>(json).is_err());
    }

    #[test]
    fn processed_result_omits_missing_output_file() {
        let result =
            ProcessedDataResult::new(DataMethod::Book, SourceFileRef::new("novel.txt"), 150);
        let json = serde_json::to_string(&result).expect("serialize");
        assert!(json.contains("\"method\":\"book\""));
        assert!(!json.contains("output_file"));
    }
}
