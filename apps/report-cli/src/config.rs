//! # Report Configuration
//!
//! Configuration of the report runner.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. CLI flags (highest priority)                                       │
//! │     --utc-offset -300 --order-surplus keep_recorded_total --trace      │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     TALLY_UTC_OFFSET_MINUTES=-300                                      │
//! │     TALLY_ORDER_SURPLUS=use_line_sum                                   │
//! │     TALLY_INCLUDE_TRACE=true                                           │
//! │     TALLY_LOG_LEVEL=debug                                              │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/tally-report/report.toml (Linux)                         │
//! │     ~/Library/Application Support/com.tally.report/report.toml (macOS) │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [engine]
//! utc_offset_minutes = -300
//! order_surplus = "use_line_sum"
//! include_trace = false
//!
//! [engine.labels]
//! no_brand = "Sin marca"
//!
//! [logging]
//! level = "info"
//!
//! [output]
//! pretty = true
//! ```

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_core::{EngineConfig, OrderSurplusPolicy, ReportError};

// =============================================================================
// Sections
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Pretty-print the report JSON.
    #[serde(default)]
    pub pretty: bool,
}

// =============================================================================
// Report Configuration
// =============================================================================

/// Complete runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl ReportConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (report.toml)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` must exist; the platform default may not.
    pub fn load(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    bail!("config file {} does not exist", path.display());
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Applies `TALLY_*` overrides read through `lookup`.
    ///
    /// A variable that is set but cannot be parsed is an `InvalidConfig`
    /// error. Runs before the tracing subscriber is installed.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ReportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(offset) = lookup("TALLY_UTC_OFFSET_MINUTES") {
            self.engine.utc_offset_minutes = offset.trim().parse::<i32>().map_err(|_| {
                ReportError::InvalidConfig(format!(
                    "TALLY_UTC_OFFSET_MINUTES must be whole minutes, got {:?}",
                    offset
                ))
            })?;
        }

        if let Some(policy) = lookup("TALLY_ORDER_SURPLUS") {
            self.engine.order_surplus = policy.parse::<OrderSurplusPolicy>().map_err(|e| {
                ReportError::InvalidConfig(format!("TALLY_ORDER_SURPLUS: {}", e))
            })?;
        }

        if let Some(trace) = lookup("TALLY_INCLUDE_TRACE") {
            self.engine.include_trace = match trace.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ReportError::InvalidConfig(format!(
                        "TALLY_INCLUDE_TRACE must be a boolean, got {:?}",
                        trace
                    )))
                }
            };
        }

        if let Some(level) = lookup("TALLY_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.engine.validate()?;

        if self.logging.level.trim().is_empty() {
            bail!("logging.level must not be empty");
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "report")
            .map(|dirs| dirs.config_dir().join("report.toml"))
    }
}
