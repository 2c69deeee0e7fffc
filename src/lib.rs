//! bosconfig - balance-of-system configuration resolution for solar and storage projects
//!
//! Given the equipment recorded for one system of a residential project (solar
//! panels, inverters, batteries, storage management, backup panels) and the
//! utility serving the site, the engine recognizes which reference
//! interconnection configuration applies and synthesizes the balance-of-system
//! items it requires: meters, disconnects and breakers, each sized from the
//! inverter and battery output.
//!
//! # Core Concepts
//!
//! - **Equipment state**: a normalized, typed snapshot of one system, built from
//!   a flat project record by [`EquipmentStateExtractor`]
//! - **Detectors**: one rule per reference configuration, each with a
//!   [`Priority`]; lower priorities are evaluated first
//! - **Registry**: the ordered detector set that resolves a state to its best
//!   [`ConfigurationMatch`], or to nothing
//! - **Sibling provider**: injected lookup of the other systems of a project,
//!   used by multi-system configurations
//!
//! # Example Usage
//!
//! ```ignore
//! use bosconfig::{DetectorRegistry, EquipmentStateExtractor, NoSiblingProvider, SystemNumber, UtilityInfo};
//!
//! async fn best_configuration(record: &bosconfig::ProjectRecord) {
//!     let registry = DetectorRegistry::with_defaults();
//!     let state = EquipmentStateExtractor::new().extract(
//!         record,
//!         SystemNumber::One,
//!         &UtilityInfo::new("APS", "AZ"),
//!     );
//!
//!     match registry.resolve(&state, &NoSiblingProvider).await {
//!         Some(found) => println!("{}: {} BOS items", found.config_name, found.bos_equipment.len()),
//!         None => println!("No configuration matched, select BOS manually"),
//!     }
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`equipment`]: equipment state, record extraction and catalog lookups
//! - [`bos`]: amperage sizing, BOS items and match types
//! - [`detectors`]: the configuration rules
//! - [`registry`]: ordering, resolution and project analysis
//! - [`sibling`]: cross-system state providers

pub mod bos;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod equipment;
pub mod registry;
pub mod sibling;
pub mod util;

pub use bos::{
    BosEquipment, BosSection, BosSizing, Confidence, ConfigurationMatch, EquipmentSections,
    MultiSystemConfig, Topology,
};
pub use config::{ConfigError, EngineConfig};
pub use detectors::{ConfigurationDetector, Priority, PriorityError};
pub use equipment::{
    BackupOption, CouplingType, EquipmentCatalog, EquipmentState, EquipmentStateExtractor,
    ProjectRecord, StaticCatalog, SystemNumber, SystemType, UtilityInfo,
};
pub use registry::{DetectorRegistry, ProjectAnalysis, RegistryError, SystemAnalysis};
pub use sibling::{
    InMemorySiblingProvider, LookupError, NoSiblingProvider, RecordSiblingProvider,
    SiblingStateProvider,
};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
