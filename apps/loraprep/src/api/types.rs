//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use loraprep_core::{
    DataMethod, ModelDescriptor, Preset, PresetKind, ProcessedDataResult, Session, Severity,
    StageId, StagePayload, StageView, SystemReport, TrainingConfig, TrainingDraft,
    TrainingParameters, WizardError, find_model,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Wizard status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub label: String,
    pub severity: Severity,
    pub active_index: usize,
    pub active_stage: StageId,
    pub can_proceed: bool,
    /// Shown in place of the active stage's content while it is gated.
    pub gated_message: Option<String>,
}

impl StatusResponse {
    pub fn from_session(session: &Session) -> Self {
        let status = session.status();
        let active = session.active();
        let can_proceed = session.can_proceed();
        Self {
            label: status.label.to_string(),
            severity: status.severity,
            active_index: active.index(),
            active_stage: active,
            can_proceed,
            gated_message: (!can_proceed).then(|| active.gated_message().to_string()),
        }
    }
}

// =============================================================================
// STAGES RESPONSE
// =============================================================================

/// One entry of the progress strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageJson {
    pub index: usize,
    pub stage: StageId,
    pub title: String,
    pub completed: bool,
    pub active: bool,
    pub can_enter: bool,
}

impl From<&StageView> for StageJson {
    fn from(view: &StageView) -> Self {
        Self {
            index: view.index,
            stage: view.stage,
            title: view.title.to_string(),
            completed: view.completed,
            active: view.active,
            can_enter: view.can_enter,
        }
    }
}

/// Progress strip response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagesResponse {
    pub stages: Vec<StageJson>,
    pub status: StatusResponse,
}

impl StagesResponse {
    pub fn from_session(session: &Session) -> Self {
        Self {
            stages: session.progress().iter().map(StageJson::from).collect(),
            status: StatusResponse::from_session(session),
        }
    }
}

// =============================================================================
// STAGE COMPLETION
// =============================================================================

/// Completion request for `POST /stages/{index}/complete`.
///
/// `result` is interpreted according to the target stage:
/// - 0: `true` / `false`
/// - 1: a model id string, or a full descriptor equal to its catalog entry
/// - 2: a processed data result
/// - 3: a training config whose command matches its parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub result: serde_json::Value,
}

impl CompleteRequest {
    /// Convert to the typed payload for `stage`.
    pub fn to_payload(&self, stage: StageId) -> Result<StagePayload, WizardError> {
        let payload = self.parse_payload(stage)?;
        payload.validate()?;
        Ok(payload)
    }

    fn parse_payload(&self, stage: StageId) -> Result<StagePayload, WizardError> {
        let mismatch = |e: serde_json::Error| {
            WizardError::ContractViolation(format!(
                "result is not a valid {} payload: {}",
                stage.title(),
                e
            ))
        };
        let value = self.result.clone();

        match stage {
            StageId::SystemCheck => serde_json::from_value(value)
                .map(StagePayload::SystemCheck)
                .map_err(mismatch),
            StageId::ModelSelection => match value.as_str() {
                Some(id) => find_model(id)
                    .map(|m| StagePayload::ModelSelection(m.clone()))
                    .ok_or_else(|| WizardError::UnknownModel(id.to_string())),
                None => serde_json::from_value::<ModelDescriptor>(value)
                    .map(StagePayload::ModelSelection)
                    .map_err(mismatch),
            },
            StageId::DataProcessing => serde_json::from_value(value)
                .map(StagePayload::DataProcessing)
                .map_err(mismatch),
            StageId::TrainingConfig => serde_json::from_value(value)
                .map(StagePayload::TrainingConfig)
                .map_err(mismatch),
        }
    }
}

// =============================================================================
// COLLABORATOR RESPONSES
// =============================================================================

/// System check run response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemCheckResponse {
    pub report: SystemReport,
    pub status: StatusResponse,
}

/// Data processing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProcessRequest {
    pub path: String,
    pub method: String,
}

/// Data processing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProcessResponse {
    pub result: ProcessedDataResult,
    pub status: StatusResponse,
}

impl DataProcessRequest {
    pub fn method(&self) -> Result<DataMethod, WizardError> {
        self.method.parse()
    }
}

// =============================================================================
// CATALOGS
// =============================================================================

/// Model catalog response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelDescriptor>,
}

/// Preset JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetJson {
    pub kind: PresetKind,
    pub name: String,
    pub description: String,
    pub time_estimate: String,
    pub params: TrainingParameters,
}

impl From<&Preset> for PresetJson {
    fn from(preset: &Preset) -> Self {
        Self {
            kind: preset.kind,
            name: preset.name.to_string(),
            description: preset.description.to_string(),
            time_estimate: preset.time_estimate.to_string(),
            params: preset.params(),
        }
    }
}

/// Preset catalog response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetsResponse {
    pub presets: Vec<PresetJson>,
}

// =============================================================================
// TRAINING DRAFT
// =============================================================================

/// Current draft with its live command preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftResponse {
    pub selection: PresetKind,
    pub params: TrainingParameters,
    pub command: String,
}

impl From<&TrainingDraft> for DraftResponse {
    fn from(draft: &TrainingDraft) -> Self {
        Self {
            selection: draft.selection(),
            params: draft.params().clone(),
            command: draft.command(),
        }
    }
}

/// Preset selection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetRequest {
    pub preset: String,
}

/// Single-field edit request. `value` may be a JSON string or number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamRequest {
    pub field: String,
    pub value: serde_json::Value,
}

impl ParamRequest {
    /// Textual form of `value`, as typed into a form field.
    pub fn value_text(&self) -> Result<String, WizardError> {
        match &self.value {
            serde_json::Value::String(s) => Ok(s.clone()),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(WizardError::InvalidParameter {
                field: self.field.clone(),
                value: other.to_string(),
            }),
        }
    }
}

/// Saved training config response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub config: TrainingConfig,
    pub status: StatusResponse,
}

/// Generated command response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command: String,
}
