//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every stage-input endpoint checks gating first and answers 409 while the
//! target stage's predecessor is incomplete.

use super::{
    AppState,
    types::{
        CommandResponse, CompleteRequest, ConfigResponse, DataProcessRequest, DataProcessResponse,
        DraftResponse, ErrorResponse, HealthResponse, ModelsResponse, ParamRequest, PresetJson,
        PresetRequest, PresetsResponse, StagesResponse, StatusResponse, SystemCheckResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use loraprep_core::{
    ParameterField, PresetKind, Session, SourceFileRef, StageId, StagePayload, TrainingParameters,
    WizardError, generate_command, model_catalog, preset_catalog,
};

type ApiResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ErrorResponse>)>;

/// Map a wizard error to its HTTP status and body.
fn error_response(e: WizardError) -> (StatusCode, Json<ErrorResponse>) {
    let code = match &e {
        WizardError::ContractViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::Gated(_) => StatusCode::CONFLICT,
        WizardError::UnknownStage(_) | WizardError::UnknownModel(_) => StatusCode::NOT_FOUND,
        WizardError::UnknownPreset(_)
        | WizardError::UnknownParameter(_)
        | WizardError::InvalidParameter { .. }
        | WizardError::InvalidData(_) => StatusCode::BAD_REQUEST,
        WizardError::IoError(_)
        | WizardError::SerializationError(_)
        | WizardError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(ErrorResponse::new(e.to_string())))
}

fn task_failed(task: &str, e: tokio::task::JoinError) -> (StatusCode, Json<ErrorResponse>) {
    error_response(WizardError::IoError(format!("{} task failed: {}", task, e)))
}

/// Refuse input for a stage whose predecessor is incomplete.
fn ensure_enterable(session: &Session, stage: StageId) -> Result<(), WizardError> {
    if session.can_enter_stage(stage) {
        Ok(())
    } else {
        tracing::info!(stage = %stage, "input refused for gated stage");
        Err(WizardError::Gated(stage.gated_message().to_string()))
    }
}

// =============================================================================
// HEALTH & STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Get the derived status of the session.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    (StatusCode::OK, Json(StatusResponse::from_session(&session)))
}

/// Get the progress strip.
pub async fn stages_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    (StatusCode::OK, Json(StagesResponse::from_session(&session)))
}

// =============================================================================
// NAVIGATION
// =============================================================================

pub async fn next_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    session.advance();
    (StatusCode::OK, Json(StatusResponse::from_session(&session)))
}

pub async fn prev_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    session.retreat();
    (StatusCode::OK, Json(StatusResponse::from_session(&session)))
}

// =============================================================================
// STAGE COMPLETION
// =============================================================================

/// Report a completion payload for the stage at `index`.
pub async fn complete_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<CompleteRequest>,
) -> ApiResult<StatusResponse> {
    let stage = StageId::from_index(index)
        .ok_or_else(|| error_response(WizardError::UnknownStage(index.to_string())))?;

    let mut session = state.session.write().await;
    ensure_enterable(&session, stage).map_err(error_response)?;

    let payload = request.to_payload(stage).map_err(error_response)?;
    session
        .report_completion_at(index, payload)
        .map_err(error_response)?;

    Ok((StatusCode::OK, Json(StatusResponse::from_session(&session))))
}

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Run the configured system checker and record its verdict.
///
/// The lock is not held while the checker runs; the result is written
/// whenever it arrives.
pub async fn system_check_handler(State(state): State<AppState>) -> ApiResult<SystemCheckResponse> {
    let checker = state.checker.clone();
    let report = tokio::task::spawn_blocking(move || checker.run_checks())
        .await
        .map_err(|e| task_failed("System check", e))?;

    let mut session = state.session.write().await;
    session.apply_system_report(&report);

    Ok((
        StatusCode::OK,
        Json(SystemCheckResponse {
            report,
            status: StatusResponse::from_session(&session),
        }),
    ))
}

/// Run the configured data processor on a file and record the result.
pub async fn data_process_handler(
    State(state): State<AppState>,
    Json(request): Json<DataProcessRequest>,
) -> ApiResult<DataProcessResponse> {
    let method = request.method().map_err(error_response)?;
    {
        let session = state.session.read().await;
        ensure_enterable(&session, StageId::DataProcessing).map_err(error_response)?;
    }

    let processor = state.processor.clone();
    let source = SourceFileRef::new(request.path);
    let result = tokio::task::spawn_blocking(move || processor.process(&source, method))
        .await
        .map_err(|e| task_failed("Processing", e))?
        .map_err(error_response)?;

    let mut session = state.session.write().await;
    session.report_completion(StagePayload::DataProcessing(result.clone()));

    Ok((
        StatusCode::OK,
        Json(DataProcessResponse {
            result,
            status: StatusResponse::from_session(&session),
        }),
    ))
}

// =============================================================================
// CATALOGS
// =============================================================================

pub async fn models_handler() -> impl IntoResponse {
    Json(ModelsResponse {
        models: model_catalog().to_vec(),
    })
}

pub async fn presets_handler() -> impl IntoResponse {
    Json(PresetsResponse {
        presets: preset_catalog().iter().map(PresetJson::from).collect(),
    })
}

// =============================================================================
// TRAINING DRAFT
// =============================================================================

/// Get the training draft and its command preview.
pub async fn draft_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    (StatusCode::OK, Json(DraftResponse::from(session.draft())))
}

/// Select a preset for the draft.
pub async fn preset_handler(
    State(state): State<AppState>,
    Json(request): Json<PresetRequest>,
) -> ApiResult<DraftResponse> {
    let kind: PresetKind = request.preset.parse().map_err(error_response)?;

    let mut session = state.session.write().await;
    ensure_enterable(&session, StageId::TrainingConfig).map_err(error_response)?;
    session.draft_mut().select_preset(kind);

    Ok((StatusCode::OK, Json(DraftResponse::from(session.draft()))))
}

/// Edit one draft parameter.
pub async fn param_handler(
    State(state): State<AppState>,
    Json(request): Json<ParamRequest>,
) -> ApiResult<DraftResponse> {
    let field: ParameterField = request.field.parse().map_err(error_response)?;
    let value = request.value_text().map_err(error_response)?;

    let mut session = state.session.write().await;
    ensure_enterable(&session, StageId::TrainingConfig).map_err(error_response)?;
    session
        .draft_mut()
        .set_field(field, &value)
        .map_err(error_response)?;

    Ok((StatusCode::OK, Json(DraftResponse::from(session.draft()))))
}

/// Freeze the draft into the training config.
pub async fn save_handler(State(state): State<AppState>) -> ApiResult<ConfigResponse> {
    let mut session = state.session.write().await;
    ensure_enterable(&session, StageId::TrainingConfig).map_err(error_response)?;

    let config = session.save_training_config();
    tracing::info!(preset = %config.preset, "training config saved");

    Ok((
        StatusCode::OK,
        Json(ConfigResponse {
            config,
            status: StatusResponse::from_session(&session),
        }),
    ))
}

// =============================================================================
// COMMAND
// =============================================================================

/// Generate the trainer command for arbitrary parameters.
pub async fn command_handler(Json(params): Json<TrainingParameters>) -> impl IntoResponse {
    Json(CommandResponse {
        command: generate_command(&params),
    })
}
