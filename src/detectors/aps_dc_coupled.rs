//! APS DC-coupled storage behind a shared hybrid inverter
//!
//! Battery output never enters the sizing: the shared inverter's AC output
//! bounds what the system can deliver.

use super::{ConfigurationDetector, Priority};
use crate::bos::items::{
    self, BI_DIRECTIONAL_DER_SIDE_DISCONNECT, BI_DIRECTIONAL_METER,
    UNI_DIRECTIONAL_LINE_SIDE_DISCONNECT, UNI_DIRECTIONAL_METER, UTILITY_DISCONNECT,
};
use crate::bos::{warnings, BosSection, BosSizing, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::APS;
use crate::equipment::{BackupOption, CouplingType, EquipmentState, SystemNumber};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

/// Assumed inverter output when the record does not carry one
pub const DEFAULT_INVERTER_OUTPUT: f64 = 100.0;
pub const DEFAULT_BUS_RATING: u32 = 200;

pub struct ApsDcCoupledDetector {
    sms: bool,
    backup: bool,
}

impl ApsDcCoupledDetector {
    pub fn new(sms: bool, backup: bool) -> Self {
        Self { sms, backup }
    }

    pub fn sms_backup() -> Self {
        Self::new(true, true)
    }

    pub fn sms_no_backup() -> Self {
        Self::new(true, false)
    }

    pub fn no_sms_backup() -> Self {
        Self::new(false, true)
    }

    pub fn no_sms_no_backup() -> Self {
        Self::new(false, false)
    }

    fn backup_label(&self, state: &EquipmentState) -> &'static str {
        if !self.backup {
            return "No Backup";
        }
        match state.backup_option {
            BackupOption::WholeHome => "Whole Home",
            BackupOption::PartialHome => "Partial Home",
            BackupOption::None => "Backup",
        }
    }
}

#[async_trait]
impl ConfigurationDetector for ApsDcCoupledDetector {
    fn config_id(&self) -> &'static str {
        match (self.sms, self.backup) {
            (true, true) => "aps_dc_coupled_sms_backup",
            (true, false) => "aps_dc_coupled_sms_no_backup",
            (false, true) => "aps_dc_coupled_no_sms_backup",
            (false, false) => "aps_dc_coupled_no_sms_no_backup",
        }
    }

    fn name(&self) -> &'static str {
        match (self.sms, self.backup) {
            (true, true) => "APS DC Coupled + SMS + Backup",
            (true, false) => "APS DC Coupled + SMS + No Backup",
            (false, true) => "APS DC Coupled + Backup",
            (false, false) => "APS DC Coupled + No Backup",
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
        state.system_number == SystemNumber::One
            && state.coupling_type == CouplingType::DC
            && state.battery_quantity > 0
            && state.has_sms == self.sms
            && state.has_backup_panel == self.backup
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.applies_to_utility(&state.utility_name)
            || !self.quick_check(state)
            || !state.is_string_inverter()
            || !state.has_solar_panels
        {
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

        let mut equipment = Vec::new();
        if self.backup {
            let bus_amps = match state.backup_panel_bus_rating {
                Some(rating) if rating > 0 => rating,
                _ => {
                    assumed.push(warnings::assumed_bus_rating(DEFAULT_BUS_RATING));
                    DEFAULT_BUS_RATING
                }
            };
            equipment.push(items::rated(BosSection::Backup, 1, UNI_DIRECTIONAL_METER, bus_amps));
            equipment.push(items::rated(
                BosSection::Backup,
                2,
                UNI_DIRECTIONAL_LINE_SIDE_DISCONNECT,
                bus_amps,
            ));
        }

        equipment.push(items::sized(
            BosSection::Utility,
            1,
            BI_DIRECTIONAL_DER_SIDE_DISCONNECT,
            &sizing,
        ));
        equipment.push(items::sized(BosSection::Utility, 2, BI_DIRECTIONAL_METER, &sizing));

        let disconnect_section = if self.sms {
            BosSection::PostSms
        } else {
            BosSection::Utility
        };
        equipment.push(items::sized(disconnect_section, 3, UTILITY_DISCONNECT, &sizing));

        let mut sections = EquipmentSections::from_state(state);
        sections.battery_combiner_panel = state.battery_max_continuous_output > 0.0;

        let backup_label = self.backup_label(state);
        let config_name = if self.sms {
            format!("APS DC Coupled + SMS + {}", backup_label)
        } else {
            format!("APS DC Coupled + {}", backup_label)
        };

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            config_name,
            self.priority(),
            Confidence::Partial,
            state,
        )
        .with_description(format!(
            "DC-coupled battery system {} SMS, {}",
            if self.sms { "with" } else { "without" },
            backup_label.to_lowercase()
        ))
        .with_equipment(equipment)
        .with_sections(sections);

        if !self.backup {
            result = result.without_backup();
        }
        for warning in assumed {
            result = result.with_warning(warning);
        }
        Some(result)
    }
}
