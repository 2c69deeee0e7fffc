//! APS AC-coupled storage with its own battery inverter
//!
//! Equipment-agnostic: any battery brand, string or microinverter PV. Both
//! inverters can discharge at full power together, so the utility disconnect
//! is sized from the sum of their outputs.

use super::{ac_sizing, sized_item, ConfigurationDetector, Priority, UNSIZED_WARNING};
use crate::bos::items::{
    self, BI_DIRECTIONAL_DER_SIDE_DISCONNECT, BI_DIRECTIONAL_LINE_SIDE_DISCONNECT,
    BI_DIRECTIONAL_METER, UTILITY_DISCONNECT,
};
use crate::bos::{BosEquipment, BosSection, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::APS;
use crate::equipment::{CouplingType, EquipmentState, SystemType};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

pub struct ApsAcCoupledDetector {
    system_type: SystemType,
    sms: bool,
    backup: bool,
}

impl ApsAcCoupledDetector {
    pub fn new(system_type: SystemType, sms: bool, backup: bool) -> Self {
        Self {
            system_type,
            sms,
            backup,
        }
    }

    /// String variants first, then microinverter variants
    pub fn all() -> Vec<Self> {
        let mut detectors = Vec::with_capacity(8);
        for system_type in [SystemType::Inverter, SystemType::Microinverter] {
            for (sms, backup) in [(true, true), (false, true), (true, false), (false, false)] {
                detectors.push(Self::new(system_type, sms, backup));
            }
        }
        detectors
    }

    fn is_micro(&self) -> bool {
        self.system_type == SystemType::Microinverter
    }

    fn battery_meter_stack(&self) -> Vec<BosEquipment> {
        let types: &[&str] = if self.backup {
            &[
                BI_DIRECTIONAL_DER_SIDE_DISCONNECT,
                BI_DIRECTIONAL_METER,
                BI_DIRECTIONAL_LINE_SIDE_DISCONNECT,
            ]
        } else {
            &[BI_DIRECTIONAL_METER, BI_DIRECTIONAL_LINE_SIDE_DISCONNECT]
        };
        types
            .iter()
            .enumerate()
            .map(|(i, equipment_type)| {
                BosEquipment::new(BosSection::Battery, i as u8 + 1, equipment_type)
            })
            .collect()
    }
}

#[async_trait]
impl ConfigurationDetector for ApsAcCoupledDetector {
    fn config_id(&self) -> &'static str {
        match (self.is_micro(), self.sms, self.backup) {
            (false, true, true) => "aps_ac_coupled_sms_backup",
            (false, true, false) => "aps_ac_coupled_sms_no_backup",
            (false, false, true) => "aps_ac_coupled_no_sms_backup",
            (false, false, false) => "aps_ac_coupled_no_sms_no_backup",
            (true, true, true) => "aps_ac_coupled_micro_sms_backup",
            (true, true, false) => "aps_ac_coupled_micro_sms_no_backup",
            (true, false, true) => "aps_ac_coupled_micro_no_sms_backup",
            (true, false, false) => "aps_ac_coupled_micro_no_sms_no_backup",
        }
    }

    fn name(&self) -> &'static str {
        match (self.is_micro(), self.sms, self.backup) {
            (false, true, true) => "Generic AC-Coupled + APS + SMS + Backup",
            (false, true, false) => "Generic AC-Coupled + APS + SMS + No Backup",
            (false, false, true) => "Generic AC-Coupled + APS + No SMS + Backup",
            (false, false, false) => "Generic AC-Coupled + APS + No SMS + No Backup",
            (true, true, true) => "Generic AC-Coupled Microinverter + APS + SMS + Backup",
            (true, true, false) => "Generic AC-Coupled Microinverter + APS + SMS + No Backup",
            (true, false, true) => "Generic AC-Coupled Microinverter + APS + No SMS + Backup",
            (true, false, false) => {
                "Generic AC-Coupled Microinverter + APS + No SMS + No Backup"
            }
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
        state.system_type == Some(self.system_type)
            && state.has_solar_panels
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
            || state.coupling_type != CouplingType::AC
            || (self.backup && !state.backup_option.is_backup())
        {
            return None;
        }

        let sizing = ac_sizing(state);

        let mut equipment = vec![
            items::milbank_meter(BosSection::Utility, 1),
            items::line_side_disconnect(BosSection::Utility, 2),
        ];
        equipment.extend(self.battery_meter_stack());
        equipment.push(if self.sms {
            sized_item(BosSection::PostSms, 1, UTILITY_DISCONNECT, sizing.as_ref())
        } else {
            sized_item(BosSection::Utility, 3, UTILITY_DISCONNECT, sizing.as_ref())
        });

        let mut sections = EquipmentSections::from_state(state);
        sections.battery1 = true;
        sections.ess = true;
        sections.sms = self.sms;
        sections.gateway = self.backup;
        sections.backup_load_sub_panel = self.backup;
        sections.string_combiner_panel = self.is_micro();

        let family = if self.is_micro() {
            "Generic AC-Coupled Microinverter + APS"
        } else {
            "Generic AC-Coupled + APS"
        };
        let backup_label = if self.backup {
            state.backup_option.label()
        } else {
            "No Backup"
        };
        let config_name = format!(
            "{} + {} + {}",
            family,
            if self.sms { "SMS" } else { "No SMS" },
            backup_label
        );

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            config_name,
            self.priority(),
            Confidence::Partial,
            state,
        )
        .with_description(format!(
            "AC-coupled battery with {} {} SMS, {}",
            self.system_type.label().to_lowercase(),
            if self.sms { "and" } else { "without" },
            backup_label.to_lowercase()
        ))
        .with_equipment(equipment)
        .with_sections(sections);

        match &sizing {
            Some(sizing) => {
                result = result.with_note(format!(
                    "Utility disconnect sized to {}A from inverter plus battery output",
                    sizing.required_amps
                ));
            }
            None => result = result.with_warning(UNSIZED_WARNING),
        }
        if !self.backup {
            result = result.without_backup();
        }
        Some(result)
    }
}
