//! # loraprep-core
//!
//! The stage-orchestration engine for loraprep - THE LOGIC.
//!
//! This crate sequences the four wizard stages (system check, model
//! selection, data processing, training configuration), gates entry to each
//! stage on its predecessor's completion, accumulates stage results into a
//! session-local store, and derives a status label from that store.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Holds the only wizard state (one [`Session`] per process)
//! - Never probes the host, reads files or launches the trainer
//! - Consumes collaborator results through [`SystemChecker`] and [`DataProcessor`]
//! - Has NO async, NO network dependencies (pure Rust)
//!
//! ## Example
//!
//! ```
//! use loraprep_core::{Session, StagePayload, StageId};
//!
//! let mut session = Session::new();
//! assert_eq!(session.status().label, "Checking System");
//!
//! session.report_completion(StagePayload::SystemCheck(true));
//! assert!(session.can_enter(StageId::ModelSelection.index()));
//! assert_eq!(session.status().label, "Selecting Model");
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod collaborator;
pub mod command;
pub mod session;
pub mod stage;
pub mod status;
pub mod store;
pub mod tuning;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    DataMethod, Difficulty, ModelDescriptor, PresetKind, ProcessedDataResult, SourceFileRef,
    TrainingConfig, TrainingParameters, WizardError,
};

// =============================================================================
// RE-EXPORTS: Orchestration Engine
// =============================================================================

pub use catalog::{Preset, find_model, model_catalog, preset, preset_catalog};
pub use collaborator::{
    CheckOutcome, DataProcessor, FixedDataProcessor, FixedSystemChecker, SystemChecker,
    SystemReport,
};
pub use command::generate_command;
pub use session::{Session, StageView};
pub use stage::{STAGE_COUNT, StageId, StagePayload};
pub use status::{Severity, Status, derive_status};
pub use store::StageResultStore;
pub use tuning::{ParameterField, TrainingDraft};
