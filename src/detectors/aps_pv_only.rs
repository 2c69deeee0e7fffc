//! APS solar without storage

use super::{ConfigurationDetector, Priority};
use crate::bos::items::{self, UTILITY_DISCONNECT};
use crate::bos::{BosSection, BosSizing, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::APS;
use crate::equipment::{BackupOption, EquipmentState, SystemNumber, SystemType};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

pub struct ApsPvOnlyDetector;

impl ApsPvOnlyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ApsPvOnlyDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigurationDetector for ApsPvOnlyDetector {
    fn config_id(&self) -> &'static str {
        "aps_pv_only"
    }

    fn name(&self) -> &'static str {
        "APS PV-Only (No Battery, No Backup)"
    }

    fn priority(&self) -> Priority {
        Priority::of(4)
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[APS]
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        state.system_number == SystemNumber::One
            && state.has_solar_panels
            && state.battery_quantity == 0
            && !state.has_sms
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.applies_to_utility(&state.utility_name)
            || !self.quick_check(state)
            || state.has_backup_panel
            || state.backup_option != BackupOption::None
        {
            return None;
        }

        let system_type = state.system_type?;
        let (name, kind) = match system_type {
            SystemType::Inverter => (
                "APS PV-Only String Inverter (No Battery, No Backup)",
                "string inverter",
            ),
            SystemType::Microinverter => (
                "APS PV-Only Microinverter (No Battery, No Backup)",
                "microinverters",
            ),
        };

        let sizing = BosSizing::pv_only(state.inverter_max_continuous_output.unwrap_or(0.0));
        let equipment = vec![
            items::milbank_meter(BosSection::Utility, 1),
            items::sized(BosSection::Utility, 2, UTILITY_DISCONNECT, &sizing),
        ];

        let mut sections = EquipmentSections::from_state(state);
        sections.solar = true;
        sections.string_combiner_panel = system_type == SystemType::Inverter;
        sections.battery1 = false;
        sections.battery2 = false;
        sections.sms = false;
        sections.ess = false;
        sections.gateway = false;
        sections.backup_load_sub_panel = false;

        Some(
            ConfigurationMatch::new(self.config_id(), name, self.priority(), Confidence::Exact, state)
                .with_description(format!(
                    "Solar panels with {}, no battery storage, no backup",
                    kind
                ))
                .with_equipment(equipment)
                .with_sections(sections)
                .without_backup(),
        )
    }
}
