//! # loraprep HTTP API Module
//!
//! This module implements the JSON host that an external wizard UI drives.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Derived status label and gating flag
//! - `GET /stages` - Progress strip
//! - `POST /navigation/next`, `POST /navigation/prev` - Move between stages
//! - `POST /stages/{index}/complete` - Report a stage completion payload
//! - `POST /system-check/run` - Run the host probe
//! - `POST /data/process` - Turn a file into training data
//! - `GET /models`, `GET /presets` - Catalogs
//! - `GET /training/draft`, `POST /training/preset`, `POST /training/param` - Draft edits
//! - `POST /training/save` - Freeze the draft
//! - `POST /command` - Generate a trainer command
//!
//! ## CORS
//!
//! `server.cors_origins` (or `LORAPREP_CORS_ORIGINS`) lists allowed origins;
//! `*` allows all, an empty list allows localhost only.

mod handlers;
mod types;

// Re-export types for integration tests (via `loraprep::api::*`)
pub use types::{
    CommandResponse, CompleteRequest, ConfigResponse, DataProcessRequest, DataProcessResponse,
    DraftResponse, ErrorResponse, HealthResponse, ModelsResponse, ParamRequest, PresetJson,
    PresetRequest, PresetsResponse, StageJson, StagesResponse, StatusResponse,
    SystemCheckResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use loraprep_core::{DataProcessor, Session, SystemChecker, WizardError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the one wizard session and its collaborators.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub checker: Arc<dyn SystemChecker>,
    pub processor: Arc<dyn DataProcessor>,
}

impl AppState {
    /// Create new app state around a session.
    #[must_use]
    pub fn new(
        session: Session,
        checker: Arc<dyn SystemChecker>,
        processor: Arc<dyn DataProcessor>,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            checker,
            processor,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer for the configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. Do not expose this host beyond localhost.");
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// CORS layer allowing the usual local dev-server origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/stages", get(handlers::stages_handler))
        .route("/stages/{index}/complete", post(handlers::complete_handler))
        .route("/navigation/next", post(handlers::next_handler))
        .route("/navigation/prev", post(handlers::prev_handler))
        .route("/system-check/run", post(handlers::system_check_handler))
        .route("/data/process", post(handlers::data_process_handler))
        .route("/models", get(handlers::models_handler))
        .route("/presets", get(handlers::presets_handler))
        .route("/training/draft", get(handlers::draft_handler))
        .route("/training/preset", post(handlers::preset_handler))
        .route("/training/param", post(handlers::param_handler))
        .route("/training/save", post(handlers::save_handler))
        .route("/command", post(handlers::command_handler))
        .layer(middleware)
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    state: AppState,
    cors_origins: &[String],
) -> Result<(), WizardError> {
    let router = create_router(state, cors_origins);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| WizardError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("loraprep HTTP host listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WizardError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
