//! Franklin aPower battery with aGate SMS on SRP

use super::franklin_aps::{franklin_sections, is_franklin_system};
use super::{ac_sizing, sized_item, BackupVariant, ConfigurationDetector, Priority, UNSIZED_WARNING};
use crate::bos::{BosEquipment, BosSection, Confidence, ConfigurationMatch};
use crate::equipment::utility::SRP;
use crate::equipment::EquipmentState;
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

const DEDICATED_DER_METER: &str = "Dedicated DER Meter";
const DER_METER_DISCONNECT: &str = "DER Meter Disconnect Switch";
const UTILITY_AC_DISCONNECT: &str = "Utility AC Disconnect Switch";

pub struct FranklinSrpDetector {
    variant: BackupVariant,
}

impl FranklinSrpDetector {
    pub fn new(variant: BackupVariant) -> Self {
        Self { variant }
    }

    pub fn whole_home() -> Self {
        Self::new(BackupVariant::WholeHome)
    }

    pub fn partial_home() -> Self {
        Self::new(BackupVariant::PartialHome)
    }

    pub fn no_backup() -> Self {
        Self::new(BackupVariant::NoBackup)
    }
}

#[async_trait]
impl ConfigurationDetector for FranklinSrpDetector {
    fn config_id(&self) -> &'static str {
        match self.variant {
            BackupVariant::WholeHome => "franklin_srp_wholeHome",
            BackupVariant::PartialHome => "franklin_srp_partialHome",
            BackupVariant::NoBackup => "franklin_srp_noBackup",
        }
    }

    fn name(&self) -> &'static str {
        match self.variant {
            BackupVariant::WholeHome => "Franklin aPower + SRP (Whole Home Backup)",
            BackupVariant::PartialHome => "Franklin aPower + SRP (Partial Home Backup)",
            BackupVariant::NoBackup => "Franklin aPower + SRP (Grid-Tied, No Backup)",
        }
    }

    fn priority(&self) -> Priority {
        self.variant.priority()
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[SRP]
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        state.battery_quantity > 0 && self.variant.matches(state.backup_option)
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.applies_to_utility(&state.utility_name)
            || !self.variant.matches(state.backup_option)
            || !is_franklin_system(state)
        {
            return None;
        }

        let sizing = ac_sizing(state);
        let equipment = vec![
            BosEquipment::new(BosSection::Utility, 1, DEDICATED_DER_METER),
            BosEquipment::new(BosSection::Utility, 2, DER_METER_DISCONNECT),
            sized_item(BosSection::PostSms, 1, UTILITY_AC_DISCONNECT, sizing.as_ref()),
        ];

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.name(),
            self.priority(),
            Confidence::Exact,
            state,
        )
        .with_description(format!(
            "Franklin aPower battery with aGate SMS on SRP utility, {}.",
            self.variant.name_suffix().trim_matches(|c| c == '(' || c == ')')
        ))
        .with_equipment(equipment)
        .with_sections(franklin_sections(state, self.variant));

        if !self.variant.has_backup() {
            result = result.without_backup();
        }
        if sizing.is_none() {
            result = result.with_warning(UNSIZED_WARNING);
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{BackupOption, SystemType};
    use crate::sibling::NoSiblingProvider;

    fn srp_state(backup: BackupOption) -> EquipmentState {
        EquipmentState {
            utility_name: "SRP".to_string(),
            system_type: Some(SystemType::Inverter),
            has_solar_panels: true,
            inverter_max_continuous_output: Some(38.5),
            battery_quantity: 2,
            battery_make: "Franklin".to_string(),
            battery_model: "aPower X".to_string(),
            battery_max_continuous_output: 20.0,
            has_sms: true,
            sms_make: "FranklinWH".to_string(),
            sms_model: "aGate 2".to_string(),
            has_backup_panel: backup.is_backup(),
            backup_option: backup,
            ..Default::default()
        }
        .with_derived_flags()
    }

    #[tokio::test]
    async fn test_srp_whole_home_bos() {
        let result = FranklinSrpDetector::whole_home()
            .detect(&srp_state(BackupOption::WholeHome), &NoSiblingProvider)
            .await
            .expect("should match");

        let types: Vec<&str> = result
            .bos_equipment
            .iter()
            .map(|item| item.equipment_type.as_str())
            .collect();
        assert_eq!(
            types,
            vec![
                "Dedicated DER Meter",
                "DER Meter Disconnect Switch",
                "Utility AC Disconnect Switch"
            ]
        );
        assert_eq!(result.bos_equipment[2].section, BosSection::PostSms);
        assert_eq!(result.bos_equipment[2].amp_rating, Some(74));
        assert_eq!(
            result.description,
            "Franklin aPower battery with aGate SMS on SRP utility, Whole Home Backup."
        );
    }

    #[tokio::test]
    async fn test_srp_rejects_aps() {
        let mut state = srp_state(BackupOption::WholeHome);
        state.utility_name = "APS".to_string();
        assert!(FranklinSrpDetector::whole_home()
            .detect(&state, &NoSiblingProvider)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_srp_no_backup_warnings() {
        let result = FranklinSrpDetector::no_backup()
            .detect(&srp_state(BackupOption::None), &NoSiblingProvider)
            .await
            .expect("should match");
        assert_eq!(result.config_id, "franklin_srp_noBackup");
        assert_eq!(result.priority, Priority::of(3));
        assert!(result.has_warning_containing("No backup power capability"));
    }
}
