//! Configuration management for bosconfig
//!
//! Settings are loaded from environment variables with sensible defaults. They
//! cover logging, the fallback utility applied to records that do not name
//! one, and an optional equipment catalog.
//!
//! # Environment Variables
//!
//! - `BOSCONFIG_LOG_LEVEL`: Logging level - default: "info"
//! - `BOSCONFIG_LOG_JSON`: Emit JSON logs (true|false) - default: "false"
//! - `BOSCONFIG_DEFAULT_UTILITY`: Utility code used when the record has none - default: "APS"
//! - `BOSCONFIG_DEFAULT_STATE`: Utility state used when the record has none - default: "AZ"
//! - `BOSCONFIG_CATALOG`: Path to a JSON equipment catalog - default: unset
//!
//! # Example
//!
//! ```no_run
//! use bosconfig::EngineConfig;
//!
//! let config = EngineConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::equipment::{CatalogError, EquipmentCatalog, NoCatalog, StaticCatalog, UtilityInfo};
use crate::util::logging::{level_from_name, LEVEL_NAMES};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_JSON: bool = false;
const DEFAULT_UTILITY: &str = "APS";
const DEFAULT_STATE: &str = "AZ";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Engine configuration
///
/// `Default::default()` reads the `BOSCONFIG_*` environment variables and
/// falls back to the constants above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_json: bool,

    /// Utility code applied when a record names none
    pub default_utility: String,

    pub default_state: String,

    /// Equipment catalog file
    pub catalog_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let log_level = env::var("BOSCONFIG_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("BOSCONFIG_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_LOG_JSON);

        let default_utility =
            env::var("BOSCONFIG_DEFAULT_UTILITY").unwrap_or_else(|_| DEFAULT_UTILITY.to_string());

        let default_state =
            env::var("BOSCONFIG_DEFAULT_STATE").unwrap_or_else(|_| DEFAULT_STATE.to_string());

        let catalog_path = env::var("BOSCONFIG_CATALOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            log_level,
            log_json,
            default_utility,
            default_state,
            catalog_path,
        }
    }
}

impl EngineConfig {
    /// Same as `default()`, but rejects a `BOSCONFIG_LOG_JSON` that is not a boolean
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(raw) = env::var("BOSCONFIG_LOG_JSON") {
            raw.parse::<bool>().map_err(|e| ConfigError::ParseError {
                field: "BOSCONFIG_LOG_JSON".to_string(),
                error: e.to_string(),
            })?;
        }
        Ok(Self::default())
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown log level or a blank default utility
    pub fn validate(&self) -> Result<(), ConfigError> {
        if level_from_name(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: {}",
                self.log_level,
                LEVEL_NAMES.join(", ")
            )));
        }

        if self.default_utility.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Default utility cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Fallback utility for records without one
    pub fn default_utility_info(&self) -> UtilityInfo {
        UtilityInfo::new(&self.default_utility, &self.default_state)
    }

    /// Loads the configured catalog, or an empty one when none is set
    ///
    /// An explicit `path` takes precedence over `catalog_path`.
    pub fn load_catalog(
        &self,
        path: Option<&PathBuf>,
    ) -> Result<Arc<dyn EquipmentCatalog>, CatalogError> {
        match path.or(self.catalog_path.as_ref()) {
            Some(path) => Ok(Arc::new(StaticCatalog::from_path(path)?)),
            None => Ok(Arc::new(NoCatalog)),
        }
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());
        map.insert("default_utility".to_string(), self.default_utility.clone());
        map.insert("default_state".to_string(), self.default_state.clone());
        if let Some(ref path) = self.catalog_path {
            map.insert("catalog_path".to_string(), path.display().to_string());
        }

        map
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bosconfig Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  JSON Logs: {}", self.log_json)?;
        writeln!(f, "  Default Utility: {}", self.default_utility)?;
        writeln!(f, "  Default State: {}", self.default_state)?;
        if let Some(ref path) = self.catalog_path {
            writeln!(f, "  Catalog: {}", path.display())?;
        }
        Ok(())
    }
}
