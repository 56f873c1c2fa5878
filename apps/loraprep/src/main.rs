//! # loraprep - LoRA Fine-Tuning Preparation Wizard
//!
//! The main binary for the loraprep stage orchestration engine.
//!
//! This application provides:
//! - HTTP JSON host (axum-based) for a wizard UI
//! - CLI interface that drives the same four stages
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/loraprep (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │  │   CLI       │    │   HTTP API  │    │  Probe/Processor │   │
//! │  │  (clap)     │    │   (axum)    │    │  (host + files)  │   │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘   │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │ loraprep-core │                           │
//! │                    │ (THE LOGIC)   │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP host
//! loraprep serve --host 127.0.0.1 --port 8080
//!
//! # Run the whole wizard from the terminal
//! loraprep run --model phi3 --data qa.json --method structured --preset light
//!
//! # Print a command only
//! loraprep command --preset intensive --rank 64
//! ```

use clap::Parser;
use loraprep::{cli, config::AppConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Config is loaded before tracing so it can choose the log format
    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config, cli.verbose);

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli, config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber. LORAPREP_LOG_FORMAT=json (or
/// `log_format = "json"` in the config) enables machine-parseable output.
fn init_tracing(config: &AppConfig, verbose: bool) {
    let default_filter = if verbose {
        "loraprep=debug,loraprep_core=debug,tower_http=debug"
    } else {
        "loraprep=info,loraprep_core=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Print the loraprep startup banner.
fn print_banner() {
    println!(
        r#"
  ██╗      ██████╗ ██████╗  █████╗ ██████╗ ██████╗ ███████╗██████╗
  ██║     ██╔═══██╗██╔══██╗██╔══██╗██╔══██╗██╔══██╗██╔════╝██╔══██╗
  ██║     ██║   ██║██████╔╝███████║██████╔╝██████╔╝█████╗  ██████╔╝
  ██║     ██║   ██║██╔══██╗██╔══██║██╔═══╝ ██╔══██╗██╔══╝  ██╔═══╝
  ███████╗╚██████╔╝██║  ██║██║  ██║██║     ██║  ██║███████╗██║
  ╚══════╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝     ╚═╝  ╚═╝╚══════╝╚═╝

  LoRA Fine-Tuning Wizard v{}

  Check • Select • Prepare • Train
"#,
        env!("CARGO_PKG_VERSION")
    );
}
