//! Storz Power batteries behind a Sol-Ark hybrid inverter on APS
//!
//! Multi-system only: system 2 holds the Sol-Ark and Storz storage with
//! whole-home backup and no SMS, system 1 is a microinverter PV array. The
//! batteries sit on the Sol-Ark's DC bus, so the post-combine stack is sized
//! from the inverter output alone.

use super::multi_system::{
    bus_rating, combine_note, combined_equipment, fetch_system_one, is_micro_pv_only,
    two_system_layout,
};
use super::predicates::{contains_any_ci, contains_ci};
use super::{ConfigurationDetector, Priority};
use crate::bos::{warnings, BosSizing, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::APS;
use crate::equipment::{BackupOption, EquipmentState, SystemNumber};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

/// Assumed Sol-Ark output when the record does not carry one
pub const DEFAULT_INVERTER_OUTPUT: f64 = 100.0;

const SOL_ARK: &str = "Sol-Ark";

pub(crate) fn is_sol_ark(state: &EquipmentState) -> bool {
    contains_any_ci(&state.inverter_make, &["sol-ark", "solark"])
}

pub(crate) fn is_storz_battery(state: &EquipmentState) -> bool {
    state.battery_quantity > 0 && contains_ci(&state.battery_make, "storz")
}

pub struct StorzWholeHomeMultiSystemDetector;

impl StorzWholeHomeMultiSystemDetector {
    pub fn new() -> Self {
        Self
    }

    fn system_two_matches(&self, state: &EquipmentState) -> bool {
        state.system_number == SystemNumber::Two
            && self.applies_to_utility(&state.utility_name)
            && !state.has_solar_panels
            && is_sol_ark(state)
            && is_storz_battery(state)
            && state.backup_option == BackupOption::WholeHome
            && state.has_backup_panel
            && !state.has_sms
    }
}

impl Default for StorzWholeHomeMultiSystemDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigurationDetector for StorzWholeHomeMultiSystemDetector {
    fn config_id(&self) -> &'static str {
        "storz_whole_home_aps"
    }

    fn name(&self) -> &'static str {
        "Storz Whole Home + APS (Multi-System)"
    }

    fn priority(&self) -> Priority {
        Priority::of(2)
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

        let mut assumed = Vec::new();
        let inverter_output = match state.inverter_max_continuous_output {
            Some(amps) if amps > 0.0 => amps,
            _ => {
                assumed.push(warnings::assumed_inverter_output(DEFAULT_INVERTER_OUTPUT));
                DEFAULT_INVERTER_OUTPUT
            }
        };
        let sizing = BosSizing::dc_coupled(inverter_output);
        let (bus_amps, bus_warning) = bus_rating(state);
        assumed.extend(bus_warning);

        let mut sections = EquipmentSections::from_state(state);
        sections.solar = true;
        sections.battery1 = true;
        sections.ess = true;
        sections.backup_load_sub_panel = true;
        sections.gateway = false;

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.name(),
            self.priority(),
            Confidence::Exact,
            state,
        )
        .with_description(
            "Multi-system: microinverter PV on System 1, Sol-Ark with Storz batteries on System 2, Whole Home backup",
        )
        .with_equipment(combined_equipment(bus_amps, &sizing))
        .with_sections(sections)
        .with_multi_system(two_system_layout(SOL_ARK))
        .with_note(format!(
            "DC-coupled: post-combine BOS sized to {}A from the inverter output alone",
            sizing.required_amps
        ))
        .with_note(combine_note(SOL_ARK));

        for warning in assumed {
            result = result.with_warning(warning);
        }
        Some(result)
    }
}
