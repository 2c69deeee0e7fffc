//! Standard BOS items shared across configurations

use super::amperage::BosSizing;
use super::types::{BosEquipment, BosSection};

pub const UNI_DIRECTIONAL_METER: &str = "Uni-Directional Meter";
pub const UNI_DIRECTIONAL_LINE_SIDE_DISCONNECT: &str = "Uni-Directional Meter Line Side Disconnect";
pub const BI_DIRECTIONAL_METER: &str = "Bi-Directional Meter";
pub const BI_DIRECTIONAL_DER_SIDE_DISCONNECT: &str = "Bi-Directional Meter DER Side Disconnect";
pub const BI_DIRECTIONAL_LINE_SIDE_DISCONNECT: &str = "Bi-Directional Meter Line Side Disconnect";
pub const UTILITY_DISCONNECT: &str = "Utility Disconnect";
pub const AUTOMATIC_DISCONNECT_SWITCH: &str = "Automatic Disconnect Switch";
pub const DISCONNECT_SWITCH: &str = "Disconnect Switch";
pub const STRING_COMBINER_PANEL: &str = "String Combiner Panel";
pub const DEDICATED_DER_COMBINER_PANEL: &str = "Dedicated DER Combiner Panel";
pub const TRANSFER_SWITCH: &str = "Transfer Switch";

pub const MILBANK: &str = "Milbank";
pub const MILBANK_METER_MODEL: &str = "U5929XL";
pub const MILBANK_METER_AMPS: u32 = 100;
pub const PREFERRED_DISCONNECT_MAKE: &str = "Siemens";

/// APS-approved production meter, always placed as a fixed selection
pub fn milbank_meter(section: BosSection, position: u8) -> BosEquipment {
    BosEquipment::new(section, position, UNI_DIRECTIONAL_METER)
        .auto_selected(MILBANK, MILBANK_METER_MODEL)
        .with_amp_rating(MILBANK_METER_AMPS)
}

pub fn line_side_disconnect(section: BosSection, position: u8) -> BosEquipment {
    BosEquipment::new(section, position, UNI_DIRECTIONAL_LINE_SIDE_DISCONNECT)
        .with_preferred_make(PREFERRED_DISCONNECT_MAKE)
}

pub fn sized(
    section: BosSection,
    position: u8,
    equipment_type: &str,
    sizing: &BosSizing,
) -> BosEquipment {
    BosEquipment::new(section, position, equipment_type).with_sizing(sizing.clone())
}

pub fn rated(section: BosSection, position: u8, equipment_type: &str, amps: u32) -> BosEquipment {
    BosEquipment::new(section, position, equipment_type).with_amp_rating(amps)
}
