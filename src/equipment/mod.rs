//! Equipment state model and record extraction

pub mod catalog;
pub mod extractor;
pub mod fields;
pub mod state;
pub mod utility;

pub use catalog::{CatalogError, EquipmentCatalog, NoCatalog, StaticCatalog};
pub use extractor::{system_has_data, EquipmentStateExtractor, ProjectRecord, UtilityInfo};
pub use state::{
    BackupOption, BosSlot, ChargingSource, CouplingType, EquipmentState, ExistingBos,
    InvalidSystemNumber, InverterType, SystemNumber, SystemType,
};
pub use utility::normalize_utility_name;
