//! # loraprep
//!
//! Application layer around `loraprep-core`: the HTTP host, the CLI and the
//! real collaborators that touch the machine.
//!
//! - [`api`]: axum JSON host for an external wizard UI
//! - [`cli`]: clap commands, including a non-interactive `run`
//! - [`config`]: `loraprep.toml` plus environment overrides
//! - [`probe`]: host compatibility checks
//! - [`processor`]: file to JSONL training data conversion

pub mod api;
pub mod cli;
pub mod config;
pub mod probe;
pub mod processor;
