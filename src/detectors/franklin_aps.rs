//! Franklin aPower battery with aGate SMS on APS

use super::predicates::contains_ci;
use super::{ac_sizing, sized_item, BackupVariant, ConfigurationDetector, Priority, UNSIZED_WARNING};
use crate::bos::items::{
    self, BI_DIRECTIONAL_DER_SIDE_DISCONNECT, BI_DIRECTIONAL_LINE_SIDE_DISCONNECT,
    BI_DIRECTIONAL_METER, UTILITY_DISCONNECT,
};
use crate::bos::{BosEquipment, BosSection, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::APS;
use crate::equipment::EquipmentState;
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

/// Franklin aPower battery paired with a FranklinWH aGate, with solar
pub(crate) fn is_franklin_system(state: &EquipmentState) -> bool {
    state.has_solar_panels
        && contains_ci(&state.sms_make, "franklin")
        && contains_ci(&state.sms_model, "agate")
        && contains_ci(&state.battery_make, "franklin")
        && contains_ci(&state.battery_model, "apower")
        && state.battery_quantity > 0
}

/// Sections shown for any Franklin configuration
pub(crate) fn franklin_sections(state: &EquipmentState, variant: BackupVariant) -> EquipmentSections {
    let mut sections = EquipmentSections::from_state(state);
    sections.solar = true;
    sections.battery1 = true;
    sections.sms = true;
    sections.ess = true;
    sections.backup_load_sub_panel = variant.has_backup();
    sections.gateway = variant.has_backup();
    sections
}

pub struct FranklinApsDetector {
    variant: BackupVariant,
}

impl FranklinApsDetector {
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

    fn bos(&self, state: &EquipmentState) -> (Vec<BosEquipment>, bool) {
        let sizing = ac_sizing(state);

        let mut equipment = vec![
            items::milbank_meter(BosSection::Utility, 1),
            items::line_side_disconnect(BosSection::Utility, 2),
        ];

        let battery_items: &[&str] = if self.variant.has_backup() {
            &[
                BI_DIRECTIONAL_DER_SIDE_DISCONNECT,
                BI_DIRECTIONAL_METER,
                BI_DIRECTIONAL_LINE_SIDE_DISCONNECT,
            ]
        } else {
            &[BI_DIRECTIONAL_METER, BI_DIRECTIONAL_LINE_SIDE_DISCONNECT]
        };
        for (i, equipment_type) in battery_items.iter().enumerate() {
            equipment.push(BosEquipment::new(BosSection::Battery, i as u8 + 1, equipment_type));
        }

        equipment.push(sized_item(
            BosSection::PostSms,
            1,
            UTILITY_DISCONNECT,
            sizing.as_ref(),
        ));

        (equipment, sizing.is_some())
    }
}

#[async_trait]
impl ConfigurationDetector for FranklinApsDetector {
    fn config_id(&self) -> &'static str {
        match self.variant {
            BackupVariant::WholeHome => "franklin_aps_wholeHome",
            BackupVariant::PartialHome => "franklin_aps_partialHome",
            BackupVariant::NoBackup => "franklin_aps_noBackup",
        }
    }

    fn name(&self) -> &'static str {
        match self.variant {
            BackupVariant::WholeHome => "Franklin aPower + APS (Whole Home Backup)",
            BackupVariant::PartialHome => "Franklin aPower + APS (Partial Home Backup)",
            BackupVariant::NoBackup => "Franklin aPower + APS (Grid-Tied, No Backup)",
        }
    }

    fn priority(&self) -> Priority {
        self.variant.priority()
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[APS]
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

        let (equipment, sized) = self.bos(state);
        let description = if self.variant.has_backup() {
            format!(
                "Franklin aPower battery with aGate SMS on APS utility, {} backup.",
                state.backup_option.label()
            )
        } else {
            "Grid-tied configuration for Franklin aPower battery with aGate SMS on APS utility. No backup power capability.".to_string()
        };

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.name(),
            self.priority(),
            Confidence::Exact,
            state,
        )
        .with_description(description)
        .with_equipment(equipment)
        .with_sections(franklin_sections(state, self.variant));

        if !self.variant.has_backup() {
            result = result.without_backup();
        }
        if !sized {
            result = result.with_warning(UNSIZED_WARNING);
        }
        Some(result)
    }
}
