//! Tesla Powerwall 3 with Backup Gateway 3 on APS
//!
//! Three configurations share the Tesla predicates:
//!
//! - a multi-system layout where system 1 is a microinverter PV array and
//!   system 2 carries the Powerwall 3 with whole-home backup; the two combine
//!   ahead of a shared post-combine meter stack
//! - a single-system layout with whole or partial home backup
//! - a single-system layout without backup
//!
//! The Powerwall 3 always contributes its fixed continuous output to the
//! AC-coupled sum, regardless of battery quantity.

use super::multi_system::{
    backup_meter_stack, bus_rating, combine_note, combined_equipment, fetch_system_one,
    is_micro_pv_only, two_system_layout,
};
use super::predicates::{contains_any_ci, contains_ci};
use super::{ConfigurationDetector, Priority};
use crate::bos::items::{
    self, BI_DIRECTIONAL_DER_SIDE_DISCONNECT, BI_DIRECTIONAL_METER, UTILITY_DISCONNECT,
};
use crate::bos::{BosSection, BosSizing, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::APS;
use crate::equipment::{BackupOption, EquipmentState, SystemNumber, SystemType};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

/// Continuous output of one Powerwall 3 in amps
pub const POWERWALL_3_OUTPUT_AMPS: f64 = 48.0;

const POWERWALL_3: &str = "Tesla Powerwall 3";

pub(crate) fn is_tesla_pw3(state: &EquipmentState) -> bool {
    contains_any_ci(&state.inverter_make, &["tesla", "powerwall"])
}

pub(crate) fn has_gateway_3(state: &EquipmentState) -> bool {
    state.has_sms
        && contains_ci(&state.sms_make, "tesla")
        && contains_any_ci(&state.sms_model, &["gateway 3", "gateway3"])
}

/// AC-coupled sizing with the Powerwall's fixed output as the battery term
fn powerwall_sizing(state: &EquipmentState) -> BosSizing {
    BosSizing::ac_coupled(
        state.inverter_max_continuous_output.unwrap_or(0.0),
        POWERWALL_3_OUTPUT_AMPS,
    )
}

fn tesla_sections(state: &EquipmentState) -> EquipmentSections {
    let mut sections = EquipmentSections::from_state(state);
    sections.battery1 = true;
    sections.ess = true;
    sections.sms = true;
    sections.gateway = true;
    sections
}

/// Powerwall 3 on system 2 combined with a microinverter PV system 1
pub struct TeslaPw3MultiSystemDetector;

impl TeslaPw3MultiSystemDetector {
    pub fn new() -> Self {
        Self
    }

    fn system_two_matches(&self, state: &EquipmentState) -> bool {
        state.system_number == SystemNumber::Two
            && self.applies_to_utility(&state.utility_name)
            && !state.has_solar_panels
            && is_tesla_pw3(state)
            && has_gateway_3(state)
            && state.battery_quantity > 0
            && state.backup_option == BackupOption::WholeHome
            && state.has_backup_panel
    }
}

impl Default for TeslaPw3MultiSystemDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigurationDetector for TeslaPw3MultiSystemDetector {
    fn config_id(&self) -> &'static str {
        "tesla_pw3_gateway3_aps"
    }

    fn name(&self) -> &'static str {
        "Tesla Powerwall 3 + Gateway 3 + APS Whole Home (Multi-System)"
    }

    fn priority(&self) -> Priority {
        Priority::of(3)
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[APS]
    }

    fn affected_systems(&self) -> &'static [SystemNumber] {
        &[SystemNumber::One, SystemNumber::Two]
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        state.system_number == SystemNumber::Two
            && state.battery_quantity > 0
            && state.backup_option == BackupOption::WholeHome
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.system_two_matches(state) {
            return None;
        }

        let system1 = fetch_system_one(self.config_id(), state, siblings).await?;
        if !is_micro_pv_only(&system1) {
            return None;
        }

        let sizing = powerwall_sizing(state);
        let (bus_amps, bus_warning) = bus_rating(state);
        let equipment = combined_equipment(bus_amps, &sizing);

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.name(),
            self.priority(),
            Confidence::Exact,
            state,
        )
        .with_description("Multi-system: microinverter PV on System 1, Tesla Powerwall 3 on System 2, Whole Home backup")
        .with_equipment(equipment)
        .with_sections(tesla_sections(state))
        .with_multi_system(two_system_layout(POWERWALL_3))
        .with_note(combine_note(POWERWALL_3));

        if let Some(warning) = bus_warning {
            result = result.with_warning(warning);
        }
        Some(result)
    }
}

/// Single-system Powerwall 3 layouts, with or without backup
pub struct TeslaPw3ApsDetector {
    backup: bool,
}

impl TeslaPw3ApsDetector {
    pub fn single_backup() -> Self {
        Self { backup: true }
    }

    pub fn no_backup() -> Self {
        Self { backup: false }
    }

    fn base_matches(&self, state: &EquipmentState) -> bool {
        state.system_number == SystemNumber::One
            && self.applies_to_utility(&state.utility_name)
            && state.is_string_inverter()
            && is_tesla_pw3(state)
            && has_gateway_3(state)
    }

    fn backup_matches(&self, state: &EquipmentState) -> bool {
        if self.backup {
            state.backup_option.is_backup() && state.has_backup_panel
        } else {
            state.backup_option == BackupOption::None || !state.has_backup_panel
        }
    }

    fn config_name(&self, state: &EquipmentState) -> String {
        if !self.backup {
            return "Tesla Powerwall 3 + Gateway 3 + APS (No Backup)".to_string();
        }
        let scope = match state.backup_option {
            BackupOption::PartialHome => "Partial",
            _ => "Whole",
        };
        let pv = if state.has_solar_panels {
            "with solar panels"
        } else {
            "battery-only"
        };
        format!("Tesla Powerwall 3 + Gateway 3 + APS {} Home ({})", scope, pv)
    }
}

#[async_trait]
impl ConfigurationDetector for TeslaPw3ApsDetector {
    fn config_id(&self) -> &'static str {
        if self.backup {
            "tesla_pw3_gateway3_aps_single_backup"
        } else {
            "tesla_pw3_gateway3_aps_no_backup"
        }
    }

    fn name(&self) -> &'static str {
        if self.backup {
            "Tesla Powerwall 3 + Gateway 3 + APS (Backup)"
        } else {
            "Tesla Powerwall 3 + Gateway 3 + APS (No Backup)"
        }
    }

    fn priority(&self) -> Priority {
        if self.backup {
            Priority::of(4)
        } else {
            Priority::of(5)
        }
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[APS]
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        state.system_number == SystemNumber::One && state.is_string_inverter() && state.has_sms
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.base_matches(state) || !self.backup_matches(state) {
            return None;
        }

        let sizing = powerwall_sizing(state);
        let mut equipment = Vec::new();
        let mut bus_warning = None;

        if self.backup {
            let (bus_amps, warning) = bus_rating(state);
            bus_warning = warning;
            equipment.extend(backup_meter_stack(bus_amps));
            equipment.push(items::sized(
                BosSection::Utility,
                1,
                BI_DIRECTIONAL_DER_SIDE_DISCONNECT,
                &sizing,
            ));
            equipment.push(items::sized(BosSection::Utility, 2, BI_DIRECTIONAL_METER, &sizing));
            equipment.push(items::sized(BosSection::PostSms, 3, UTILITY_DISCONNECT, &sizing));
        } else {
            for (i, equipment_type) in [
                BI_DIRECTIONAL_DER_SIDE_DISCONNECT,
                BI_DIRECTIONAL_METER,
                UTILITY_DISCONNECT,
            ]
            .iter()
            .enumerate()
            {
                equipment.push(items::sized(
                    BosSection::PostSms,
                    i as u8 + 1,
                    equipment_type,
                    &sizing,
                ));
            }
        }

        let mut sections = tesla_sections(state).with_system_type(Some(SystemType::Inverter));
        sections.backup_load_sub_panel = self.backup;
        sections.gateway = true;

        let description = if self.backup {
            format!(
                "Single-system Tesla Powerwall 3 with Backup Gateway 3, {} backup",
                state.backup_option.label()
            )
        } else {
            "Single-system Tesla Powerwall 3 with Backup Gateway 3, grid-tied without backup".to_string()
        };

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.config_name(state),
            self.priority(),
            Confidence::Exact,
            state,
        )
        .with_description(description)
        .with_equipment(equipment)
        .with_sections(sections);

        if !self.backup {
            result = result.without_backup();
        }
        if let Some(warning) = bus_warning {
            result = result.with_warning(warning);
        }
        Some(result)
    }
}
