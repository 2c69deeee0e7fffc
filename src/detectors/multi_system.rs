//! Pieces shared by the multi-system layouts
//!
//! System 2 carries the storage and system 1 is a microinverter PV array
//! fetched through the sibling provider. The two join ahead of a
//! post-combine meter stack that belongs to neither system.

use crate::bos::items::{
    self, BI_DIRECTIONAL_DER_SIDE_DISCONNECT, BI_DIRECTIONAL_METER,
    UNI_DIRECTIONAL_LINE_SIDE_DISCONNECT, UNI_DIRECTIONAL_METER, UTILITY_DISCONNECT,
};
use crate::bos::{warnings, BosEquipment, BosSection, BosSizing, CombinePoint, MultiSystemConfig};
use crate::equipment::{EquipmentState, SystemNumber};
use crate::sibling::{LookupError, SiblingStateProvider};
use tracing::{debug, warn};

pub const DEFAULT_BUS_RATING: u32 = 200;

pub(crate) const MAIN_PANEL_A: &str = "Main Panel A";

/// System 1 of the same project, or `None` when the lookup fails
pub(crate) async fn fetch_system_one(
    config_id: &str,
    state: &EquipmentState,
    siblings: &dyn SiblingStateProvider,
) -> Option<EquipmentState> {
    let fetched = match state.project_id.as_deref() {
        Some(project_id) if !project_id.trim().is_empty() => {
            siblings.fetch(project_id, SystemNumber::One).await
        }
        _ => Err(LookupError::MissingProjectId),
    };

    match fetched {
        Ok(system1) => Some(system1),
        Err(e) => {
            warn!(
                config_id,
                error = %e,
                "System 1 lookup failed, multi-system configuration not matched"
            );
            None
        }
    }
}

/// Microinverter PV without storage or SMS
pub(crate) fn is_micro_pv_only(system1: &EquipmentState) -> bool {
    let matches = system1.is_microinverter()
        && system1.has_solar_panels
        && system1.battery_quantity == 0
        && !system1.has_sms;
    if !matches {
        debug!(
            micro = system1.is_microinverter(),
            solar = system1.has_solar_panels,
            batteries = system1.battery_quantity,
            sms = system1.has_sms,
            "System 1 is not a microinverter PV-only system"
        );
    }
    matches
}

/// Backup bus rating, or the default together with a warning
pub(crate) fn bus_rating(state: &EquipmentState) -> (u32, Option<String>) {
    match state.backup_panel_bus_rating {
        Some(rating) if rating > 0 => (rating, None),
        _ => (
            DEFAULT_BUS_RATING,
            Some(warnings::assumed_bus_rating(DEFAULT_BUS_RATING)),
        ),
    }
}

pub(crate) fn backup_meter_stack(amps: u32) -> [BosEquipment; 2] {
    [
        items::rated(BosSection::Backup, 1, UNI_DIRECTIONAL_METER, amps),
        items::rated(
            BosSection::Backup,
            2,
            UNI_DIRECTIONAL_LINE_SIDE_DISCONNECT,
            amps,
        ),
    ]
}

/// System 1 pre-combine items, the backup stack of system 2 and the
/// untagged post-combine stack
pub(crate) fn combined_equipment(bus_amps: u32, sizing: &BosSizing) -> Vec<BosEquipment> {
    let mut equipment = vec![
        items::milbank_meter(BosSection::Utility, 1).for_system(SystemNumber::One),
        items::line_side_disconnect(BosSection::Utility, 2).for_system(SystemNumber::One),
    ];
    equipment.extend(
        backup_meter_stack(bus_amps)
            .into_iter()
            .map(|item| item.for_system(SystemNumber::Two)),
    );
    for (i, equipment_type) in [
        BI_DIRECTIONAL_DER_SIDE_DISCONNECT,
        BI_DIRECTIONAL_METER,
        UTILITY_DISCONNECT,
    ]
    .iter()
    .enumerate()
    {
        equipment.push(items::sized(
            BosSection::PostCombine,
            i as u8 + 1,
            equipment_type,
            sizing,
        ));
    }
    equipment
}

/// System 1 combines at the storage inverter, system 2 at the main panel
pub(crate) fn two_system_layout(system1_combines_at: &str) -> MultiSystemConfig {
    MultiSystemConfig {
        total_systems: 2,
        combine_points: vec![
            CombinePoint {
                system_number: SystemNumber::One,
                combines_at: system1_combines_at.to_string(),
            },
            CombinePoint {
                system_number: SystemNumber::Two,
                combines_at: MAIN_PANEL_A.to_string(),
            },
        ],
    }
}

pub(crate) fn combine_note(system1_combines_at: &str) -> String {
    format!(
        "Systems combine at: System 1 → {}, System 2 → {}",
        system1_combines_at, MAIN_PANEL_A
    )
}
