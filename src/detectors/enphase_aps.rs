//! Enphase microinverters, IQ Battery and IQ System Controller on APS

use super::predicates::contains_ci;
use super::{ac_sizing, sized_item, BackupVariant, ConfigurationDetector, Priority, UNSIZED_WARNING};
use crate::bos::items::{self, UTILITY_DISCONNECT};
use crate::bos::{BosSection, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::APS;
use crate::equipment::{EquipmentState, SystemType};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

fn is_enphase_system(state: &EquipmentState) -> bool {
    state.is_microinverter()
        && state.has_solar_panels
        && contains_ci(&state.micro_inverter_make, "enphase")
        && state.has_sms
        && contains_ci(&state.sms_make, "enphase")
        && contains_ci(&state.battery_make, "enphase")
        && state.battery_quantity > 0
}

pub struct EnphaseApsDetector {
    variant: BackupVariant,
}

impl EnphaseApsDetector {
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

    fn sections(&self, state: &EquipmentState) -> EquipmentSections {
        let mut sections =
            EquipmentSections::from_state(state).with_system_type(Some(SystemType::Microinverter));
        sections.solar = true;
        sections.battery1 = true;
        sections.sms = true;
        sections.ess = true;
        sections.string_combiner_panel = false;
        sections.backup_load_sub_panel = self.variant.has_backup();
        sections.gateway = self.variant.has_backup();
        sections
    }
}

#[async_trait]
impl ConfigurationDetector for EnphaseApsDetector {
    fn config_id(&self) -> &'static str {
        match self.variant {
            BackupVariant::WholeHome => "enphase_aps_wholeHome",
            BackupVariant::PartialHome => "enphase_aps_partialHome",
            BackupVariant::NoBackup => "enphase_aps_noBackup",
        }
    }

    fn name(&self) -> &'static str {
        match self.variant {
            BackupVariant::WholeHome => "Enphase IQ + APS (Whole Home Backup)",
            BackupVariant::PartialHome => "Enphase IQ + APS (Partial Home Backup)",
            BackupVariant::NoBackup => "Enphase IQ + APS (Grid-Tied, No Backup)",
        }
    }

    fn priority(&self) -> Priority {
        self.variant.priority()
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[APS]
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        state.is_microinverter()
            && state.has_sms
            && state.battery_quantity > 0
            && self.variant.matches(state.backup_option)
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.applies_to_utility(&state.utility_name)
            || !self.variant.matches(state.backup_option)
            || !is_enphase_system(state)
        {
            return None;
        }

        let sizing = ac_sizing(state);
        let equipment = vec![
            items::milbank_meter(BosSection::Utility, 1),
            items::line_side_disconnect(BosSection::Utility, 2),
            sized_item(BosSection::PostSms, 1, UTILITY_DISCONNECT, sizing.as_ref()),
        ];

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.name(),
            self.priority(),
            Confidence::Exact,
            state,
        )
        .with_description(format!(
            "Enphase microinverters with IQ Battery and IQ System Controller on APS, {}",
            state.backup_option.label()
        ))
        .with_equipment(equipment)
        .with_sections(self.sections(state));

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
    use crate::equipment::BackupOption;
    use crate::sibling::NoSiblingProvider;
    use yare::parameterized;

    fn enphase_state(backup: BackupOption) -> EquipmentState {
        EquipmentState {
            utility_name: "APS".to_string(),
            system_type: Some(SystemType::Microinverter),
            has_solar_panels: true,
            micro_inverter_make: "Enphase".to_string(),
            micro_inverter_model: "IQ8PLUS".to_string(),
            micro_inverter_quantity: 24,
            inverter_max_continuous_output: Some(29.0),
            battery_quantity: 1,
            battery_make: "Enphase Energy".to_string(),
            battery_model: "IQ Battery 5P".to_string(),
            battery_max_continuous_output: 15.6,
            has_sms: true,
            sms_make: "Enphase".to_string(),
            sms_model: "IQ System Controller 3".to_string(),
            has_backup_panel: backup.is_backup(),
            backup_option: backup,
            ..Default::default()
        }
        .with_derived_flags()
    }

    #[parameterized(
        whole_home = { BackupVariant::WholeHome, BackupOption::WholeHome, "enphase_aps_wholeHome" },
        partial_home = { BackupVariant::PartialHome, BackupOption::PartialHome, "enphase_aps_partialHome" },
        no_backup = { BackupVariant::NoBackup, BackupOption::None, "enphase_aps_noBackup" },
    )]
    #[test_macro(tokio::test)]
    async fn test_variant_matches(variant: BackupVariant, option: BackupOption, id: &str) {
        let result = EnphaseApsDetector::new(variant)
            .detect(&enphase_state(option), &NoSiblingProvider)
            .await
            .expect("should match");

        assert_eq!(result.config_id, id);
        assert_eq!(result.bos_equipment.len(), 3);
        assert!(result.equipment_sections.micro_inverter());
        assert!(!result.equipment_sections.inverter());
        assert!(!result.equipment_sections.string_combiner_panel);
    }

    #[tokio::test]
    async fn test_post_sms_disconnect_is_ac_coupled() {
        let result = EnphaseApsDetector::whole_home()
            .detect(&enphase_state(BackupOption::WholeHome), &NoSiblingProvider)
            .await
            .unwrap();

        let disconnect = &result.bos_equipment[2];
        assert_eq!(disconnect.section, BosSection::PostSms);
        // (29 + 15.6) x 1.25 = 55.75
        assert_eq!(disconnect.amp_rating, Some(56));
        assert_eq!(
            disconnect.sizing.as_ref().map(|s| s.label.as_str()),
            Some("Total System Output (AC-Coupled)")
        );
    }

    #[tokio::test]
    async fn test_string_inverter_rejected() {
        let mut state = enphase_state(BackupOption::WholeHome);
        state.system_type = Some(SystemType::Inverter);
        assert!(EnphaseApsDetector::whole_home()
            .detect(&state, &NoSiblingProvider)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_sms_rejected() {
        let mut state = enphase_state(BackupOption::WholeHome);
        state.has_sms = false;
        assert!(EnphaseApsDetector::whole_home()
            .detect(&state, &NoSiblingProvider)
            .await
            .is_none());
    }
}
