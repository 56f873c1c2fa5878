//! # loraprep CLI Module
//!
//! This module implements the CLI interface for loraprep.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP host
//! - `run` - Drive all four stages and print the trainer command
//! - `check` - Run the host probe
//! - `process` - Turn a file into training data
//! - `models` - List the model catalog
//! - `presets` - List the training presets
//! - `command` - Print the trainer command for a parameter set
//! - `status` - Show the status of an empty session

mod commands;

use crate::config::AppConfig;
use clap::{Args, Parser, Subcommand};
use loraprep_core::WizardError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// loraprep - LoRA fine-tuning preparation wizard
///
/// Checks the host, selects a base model, prepares training data and prints
/// the MLX-LM LoRA training command.
#[derive(Parser, Debug)]
#[command(name = "loraprep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a loraprep.toml configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Manual overrides applied on top of a preset.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamOverrides {
    /// Learning rate literal, e.g. 5e-5
    #[arg(long)]
    pub learning_rate: Option<String>,

    /// LoRA rank
    #[arg(long)]
    pub rank: Option<String>,

    /// LoRA alpha
    #[arg(long)]
    pub alpha: Option<String>,

    /// Training iterations
    #[arg(long)]
    pub iterations: Option<String>,

    /// Batch size
    #[arg(long)]
    pub batch_size: Option<String>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP host
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the whole wizard non-interactively
    Run {
        /// Model id from the catalog (phi3, gemma, mistral, llama)
        #[arg(short, long)]
        model: String,

        /// Training data file
        #[arg(short, long)]
        data: PathBuf,

        /// Data method (structured, book)
        #[arg(short = 't', long, default_value = "structured")]
        method: String,

        /// Training preset (light, standard, intensive, custom)
        #[arg(short, long, default_value = "standard")]
        preset: String,

        #[command(flatten)]
        overrides: ParamOverrides,

        /// Write the saved training config as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat the system check as passed without probing the host
        #[arg(long)]
        skip_checks: bool,
    },

    /// Run the host compatibility checks
    Check,

    /// Turn a data file into training entries
    Process {
        /// Training data file
        #[arg(short, long)]
        data: PathBuf,

        /// Data method (structured, book)
        #[arg(short = 't', long, default_value = "structured")]
        method: String,
    },

    /// List the base model catalog
    Models,

    /// List the training presets
    Presets,

    /// Print the trainer command for a parameter set
    Command {
        /// Training preset (light, standard, intensive, custom)
        #[arg(short, long, default_value = "standard")]
        preset: String,

        #[command(flatten)]
        overrides: ParamOverrides,
    },

    /// Show the status of an empty session
    Status,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli, config: AppConfig) -> Result<(), WizardError> {
    let json_mode = cli.json_mode;
    let quiet = cli.quiet;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(&config, host, port).await,
        Some(Commands::Run {
            model,
            data,
            method,
            preset,
            overrides,
            output,
            skip_checks,
        }) => cmd_run(
            &config,
            json_mode,
            &RunOptions {
                model,
                data,
                method,
                preset,
                overrides,
                output,
                skip_checks,
            },
        ),
        Some(Commands::Check) => cmd_check(&config, json_mode),
        Some(Commands::Process { data, method }) => cmd_process(&config, json_mode, &data, &method),
        Some(Commands::Models) => cmd_models(json_mode),
        Some(Commands::Presets) => cmd_presets(json_mode),
        Some(Commands::Command { preset, overrides }) => {
            cmd_command(json_mode, quiet, &preset, &overrides)
        }
        Some(Commands::Status) | None => cmd_status(json_mode),
    }
}
