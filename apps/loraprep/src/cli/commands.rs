//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::ParamOverrides;
use crate::api::{self, AppState};
use crate::config::AppConfig;
use crate::probe::HostProbe;
use crate::processor::FileDataProcessor;
use loraprep_core::{
    DataMethod, DataProcessor, ParameterField, PresetKind, Session, SourceFileRef, StagePayload,
    SystemChecker, TrainingDraft, TrainingParameters, WizardError, model_catalog,
    preset_catalog,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// HELPERS
// =============================================================================

/// Validate output path for security.
///
/// The parent directory must exist; the returned path joins its canonical
/// form with the requested file name.
fn validate_output_path(path: &Path) -> Result<PathBuf, WizardError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        WizardError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(WizardError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| WizardError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), WizardError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| WizardError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Print the stage strip and status line.
fn print_progress(session: &Session) {
    for view in session.progress() {
        let marker = if view.completed {
            "[x]"
        } else if view.can_enter {
            "[ ]"
        } else {
            "[-]"
        };
        let cursor = if view.active { ">" } else { " " };
        println!("{} {} {}", cursor, marker, view.stage);
    }
    println!("Status: {}", session.status());
    println!();
}

/// Print one labeled line per training parameter.
fn print_params(params: &TrainingParameters) {
    for field in ParameterField::ALL {
        println!("  {:<14} {}", field.label(), field.value_in(params));
    }
}

/// Fail unless the active stage is open.
fn require_open(session: &Session) -> Result<(), WizardError> {
    if session.can_proceed() {
        Ok(())
    } else {
        Err(WizardError::Gated(
            session.active().gated_message().to_string(),
        ))
    }
}

/// Build a draft from a preset name and manual overrides.
///
/// Overrides are applied after the preset, so they win.
pub fn build_draft(preset: &str, overrides: &ParamOverrides) -> Result<TrainingDraft, WizardError> {
    let kind: PresetKind = preset.parse()?;
    let mut draft = TrainingDraft::new();
    draft.select_preset(kind);

    let edits = [
        (ParameterField::LearningRate, &overrides.learning_rate),
        (ParameterField::Rank, &overrides.rank),
        (ParameterField::Alpha, &overrides.alpha),
        (ParameterField::Iterations, &overrides.iterations),
        (ParameterField::BatchSize, &overrides.batch_size),
    ];
    for (field, value) in edits {
        if let Some(value) = value {
            draft.set_field(field, value)?;
        }
    }

    Ok(draft)
}

fn host_probe(config: &AppConfig) -> HostProbe {
    HostProbe::new(config.probe.clone())
}

fn file_processor(config: &AppConfig) -> FileDataProcessor {
    FileDataProcessor::new(config.data.output_dir.clone(), config.data.max_file_bytes)
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP host.
pub async fn cmd_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), WizardError> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    println!("loraprep host starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", host);
    println!("  Port:       {}", port);
    println!("  Python:     {}", config.probe.python);
    println!("  Output dir: {}", config.data.output_dir.display());
    println!();
    println!("Endpoints:");
    println!("  GET  /status                  - Status label and gating");
    println!("  GET  /stages                  - Progress strip");
    println!("  POST /navigation/next|prev    - Move between stages");
    println!("  POST /stages/{{index}}/complete - Report a stage result");
    println!("  POST /system-check/run        - Probe this host");
    println!("  POST /data/process            - Prepare training data");
    println!("  POST /training/save           - Save the training config");
    println!("  GET  /health                  - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(
        Session::new(),
        Arc::new(host_probe(config)),
        Arc::new(file_processor(config)),
    );
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state, &config.server.cors_origins).await
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Arguments of `loraprep run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub model: String,
    pub data: PathBuf,
    pub method: String,
    pub preset: String,
    pub overrides: ParamOverrides,
    pub output: Option<PathBuf>,
    pub skip_checks: bool,
}

/// Drive all four stages in order.
pub fn cmd_run(config: &AppConfig, json_mode: bool, opts: &RunOptions) -> Result<(), WizardError> {
    // Validate inputs that need no host work before probing anything
    let method: DataMethod = opts.method.parse()?;
    let draft = build_draft(&opts.preset, &opts.overrides)?;
    let output = opts.output.as_deref().map(validate_output_path).transpose()?;

    let mut session = Session::new();
    let show = !json_mode;

    // Stage 1: system check
    let report = if opts.skip_checks {
        tracing::warn!("System check skipped");
        None
    } else {
        Some(host_probe(config).run_checks())
    };
    match &report {
        Some(report) => {
            if show {
                for check in &report.checks {
                    let mark = if check.passed { "PASS" } else { "FAIL" };
                    println!("  {} {:<24} {}", mark, check.name, check.detail);
                }
                println!();
            }
            session.apply_system_report(report);
        }
        None => session.report_completion(StagePayload::SystemCheck(true)),
    }
    if show {
        print_progress(&session);
    }
    session.advance();
    require_open(&session)?;

    // Stage 2: model selection
    let model = session.select_model(&opts.model)?;
    tracing::info!(model = %model.id, "model selected");
    if show {
        println!("Model: {} ({})", model.name, model.hf_path);
        print_progress(&session);
    }
    session.advance();
    require_open(&session)?;

    // Stage 3: data processing
    let source = SourceFileRef::new(opts.data.to_string_lossy());
    let result = file_processor(config).process(&source, method)?;
    if show {
        println!(
            "Data: {} entries generated from {}",
            result.entries_generated,
            result.source_file.as_str()
        );
    }
    session.report_completion(StagePayload::DataProcessing(result));
    if show {
        print_progress(&session);
    }
    session.advance();
    require_open(&session)?;

    // Stage 4: training config
    *session.draft_mut() = draft;
    let saved = session.save_training_config();
    if show {
        print_progress(&session);
    }

    if let Some(path) = &output {
        let text = serde_json::to_string_pretty(&saved)
            .map_err(|e| WizardError::SerializationError(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| WizardError::IoError(format!("Cannot write config: {}", e)))?;
        tracing::info!(path = %path.display(), "training config written");
    }

    if json_mode {
        let status = session.status();
        return print_json(&serde_json::json!({
            "status": status,
            "model": session.store().model(),
            "data": session.store().data(),
            "system_report": report,
            "training": saved,
        }));
    }

    println!("Preset: {}", saved.preset);
    print_params(&saved.params);
    println!();
    println!("Training command:");
    println!("  {}", saved.command);
    if let Some(path) = output {
        println!();
        println!("Config written to {}", path.display());
    }

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Run the host probe.
pub fn cmd_check(config: &AppConfig, json_mode: bool) -> Result<(), WizardError> {
    let report = host_probe(config).run_checks();

    if json_mode {
        return print_json(&report);
    }

    println!("System Compatibility Check");
    println!("==========================");
    for check in &report.checks {
        let mark = if check.passed { "PASS" } else { "FAIL" };
        println!("  {} {:<24} {}", mark, check.name, check.detail);
    }
    println!();
    if report.ready {
        println!("System is ready for MLX training.");
    } else {
        println!(
            "{} check(s) failed. Training will not be available.",
            report.failures().count()
        );
    }

    Ok(())
}

// =============================================================================
// PROCESS COMMAND
// =============================================================================

/// Run the data processor on one file.
pub fn cmd_process(
    config: &AppConfig,
    json_mode: bool,
    data: &Path,
    method: &str,
) -> Result<(), WizardError> {
    let method: DataMethod = method.parse()?;
    let source = SourceFileRef::new(data.to_string_lossy());
    let result = file_processor(config).process(&source, method)?;

    if json_mode {
        return print_json(&result);
    }

    println!("{}", method.title());
    println!("Source:  {}", result.source_file.as_str());
    println!("Entries: {}", result.entries_generated);
    if let Some(output) = &result.output_file {
        println!("Output:  {}", output.as_str());
    }

    Ok(())
}

// =============================================================================
// CATALOG COMMANDS
// =============================================================================

/// List the base model catalog.
pub fn cmd_models(json_mode: bool) -> Result<(), WizardError> {
    let models = model_catalog();

    if json_mode {
        return print_json(&models);
    }

    println!("Available Models");
    println!("================");
    for model in models {
        println!(
            "{:<8} {:<16} {:<10} {:>3} GB  {:<12} {}",
            model.id,
            model.name,
            model.provider,
            model.ram_required_gb,
            model.difficulty,
            model.training_time_estimate
        );
    }

    Ok(())
}

/// List the training presets.
pub fn cmd_presets(json_mode: bool) -> Result<(), WizardError> {
    let presets = preset_catalog();

    if json_mode {
        return print_json(&presets);
    }

    println!("Training Presets");
    println!("================");
    for preset in presets {
        println!("{} ({}): {}", preset.name, preset.kind, preset.description);
        println!(
            "  lr={} rank={} alpha={} iters={} batch={}  ~{}",
            preset.learning_rate,
            preset.rank,
            preset.alpha,
            preset.iterations,
            preset.batch_size,
            preset.time_estimate
        );
    }

    Ok(())
}

// =============================================================================
// COMMAND COMMAND
// =============================================================================

/// Print the trainer command for a preset plus overrides.
pub fn cmd_command(
    json_mode: bool,
    quiet: bool,
    preset: &str,
    overrides: &ParamOverrides,
) -> Result<(), WizardError> {
    let draft = build_draft(preset, overrides)?;

    if json_mode {
        return print_json(&draft.to_config());
    }

    if !quiet {
        println!("Preset: {}", draft.selection());
        print_params(draft.params());
        println!();
    }
    println!("{}", draft.command());
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show the status and stage strip of a fresh session.
pub fn cmd_status(json_mode: bool) -> Result<(), WizardError> {
    let session = Session::new();

    if json_mode {
        return print_json(&serde_json::json!({
            "status": session.status(),
            "stages": session.progress(),
            "can_proceed": session.can_proceed(),
        }));
    }

    println!("loraprep Wizard Status");
    println!("======================");
    print_progress(&session);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
