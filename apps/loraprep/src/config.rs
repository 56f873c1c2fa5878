//! # Application Configuration
//!
//! Settings are read from a TOML file and then overridden by environment
//! variables. Every field has a default, so an absent file is not an error
//! unless the path was given explicitly.
//!
//! ## File Discovery
//!
//! 1. `--config <path>` if given (must exist)
//! 2. `./loraprep.toml` if present
//! 3. built-in defaults
//!
//! ## Environment Overrides
//!
//! - `LORAPREP_PYTHON`: Python interpreter used by the host probe
//! - `LORAPREP_OUTPUT_DIR`: directory receiving `train_data.jsonl`
//! - `LORAPREP_CORS_ORIGINS`: comma-separated allowed origins, or "*"
//! - `LORAPREP_LOG_FORMAT`: "json" or "text"

use loraprep_core::WizardError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "loraprep.toml";

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// HTTP host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. `["*"]` allows all, empty means localhost only.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

/// Host probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Python interpreter to inspect.
    pub python: String,
    pub min_ram_gb: u64,
    /// Host reached by the network check.
    pub network_host: String,
    pub network_port: u16,
    pub network_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            min_ram_gb: 8,
            network_host: "huggingface.co".to_string(),
            network_port: 443,
            network_timeout_ms: 3000,
        }
    }
}

/// Data processor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory that receives the generated JSONL file.
    pub output_dir: PathBuf,
    /// Largest input file accepted, in bytes.
    pub max_file_bytes: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            max_file_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// "json" or "text". `LORAPREP_LOG_FORMAT` takes precedence.
    pub log_format: Option<String>,
    pub server: ServerConfig,
    pub probe: ProbeConfig,
    pub data: DataConfig,
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Discover, load and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, WizardError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::load_from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, WizardError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WizardError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| WizardError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, WizardError> {
        toml::from_str(content).map_err(|e| WizardError::ConfigError(e.to_string()))
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(python) = lookup("LORAPREP_PYTHON").filter(|v| !v.is_empty()) {
            self.probe.python = python;
        }
        if let Some(dir) = lookup("LORAPREP_OUTPUT_DIR").filter(|v| !v.is_empty()) {
            self.data.output_dir = PathBuf::from(dir);
        }
        if let Some(origins) = lookup("LORAPREP_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(format) = lookup("LORAPREP_LOG_FORMAT").filter(|v| !v.is_empty()) {
            self.log_format = Some(format);
        }
    }

    /// Whether logs should be emitted as JSON.
    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.as_deref() == Some("json")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_toml("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.probe.min_ram_gb, 8);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_format = "json"

            [probe]
            python = "/opt/homebrew/bin/python3.12"

            [data]
            output_dir = "out"
            "#,
        )
        .expect("parse");

        assert!(config.json_logs());
        assert_eq!(config.probe.python, "/opt/homebrew/bin/python3.12");
        assert_eq!(config.probe.network_port, 443);
        assert_eq!(config.data.output_dir, PathBuf::from("out"));
        assert_eq!(config.data.max_file_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = AppConfig::from_toml("[server]\nport = \"eighty\"").expect_err("bad port");
        assert!(matches!(err, WizardError::ConfigError(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: BTreeMap<&str, &str> = [
            ("LORAPREP_PYTHON", "python3.11"),
            ("LORAPREP_CORS_ORIGINS", "http://localhost:5173, http://127.0.0.1:5173"),
            ("LORAPREP_LOG_FORMAT", "text"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::from_toml("log_format = \"json\"").expect("parse");
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.probe.python, "python3.11");
        assert_eq!(config.server.cors_origins.len(), 2);
        assert!(!config.json_logs());
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn load_from_file_reads_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("loraprep.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").expect("write");

        let config = AppConfig::load_from_file(&path).expect("load");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
