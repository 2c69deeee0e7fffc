//! Balance-of-system synthesis: sizing, derived items and match types

pub mod amperage;
pub mod items;
pub mod types;
pub mod warnings;

pub use amperage::{derate, required_amps, standard_amp_rating, BosSizing, Topology};
pub use types::{
    BosEquipment, BosSection, CombinePoint, Confidence, ConfigurationMatch, EquipmentSections,
    MultiSystemConfig,
};
