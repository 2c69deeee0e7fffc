//! Structured logging setup
//!
//! Resolution traces go through `tracing`. Output is written to stderr so the
//! CLI can keep stdout for configuration results.
//!
//! # Example
//!
//! ```no_run
//! use bosconfig::util::logging;
//! use tracing::{debug, info};
//!
//! logging::init_from_env();
//!
//! info!("Resolver started");
//! debug!(config_id = "aps_pv_only", "Detector matched");
//! ```

use crate::config::EngineConfig;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static INIT: Once = Once::new();

/// Controls level, format and metadata of log lines
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// Emit one JSON object per event instead of console lines
    pub use_json: bool,

    /// Include the module target (e.g. bosconfig::registry)
    pub include_target: bool,

    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// JSON output with file, line and thread metadata
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            ..Default::default()
        }
    }

    /// Logging settings carried by the engine configuration
    pub fn from_engine_config(config: &EngineConfig) -> Self {
        Self {
            level: parse_level(&config.log_level),
            use_json: config.log_json,
            ..Default::default()
        }
    }
}

/// Level names accepted by `--log-level` and `BOSCONFIG_LOG_LEVEL`
pub const LEVEL_NAMES: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Strict level lookup, `None` for anything outside [`LEVEL_NAMES`]
pub fn level_from_name(name: &str) -> Option<Level> {
    match name.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Lenient level lookup for command-line input
///
/// Unknown values print a notice and fall back to `INFO`.
///
/// ```
/// use bosconfig::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    level_from_name(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: {}",
            level_str,
            LEVEL_NAMES.join(", ")
        );
        Level::INFO
    })
}

/// `RUST_LOG` directives, plus one for this crate at `level`
fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("{}={}", crate::NAME, level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Event formatter writing to stderr; stdout carries resolution output
fn event_layer(config: &LoggingConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread_ids)
        .with_thread_names(config.include_thread_ids);

    if config.use_json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(event_layer(&config))
            .with(build_filter(config.level))
            .init();
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from the `BOSCONFIG_LOG_*` variables
pub fn init_from_env() {
    init_logging(LoggingConfig::from_engine_config(&EngineConfig::default()));
}
