//! PV-only configurations for SRP, TEP and TRICO
//!
//! Each utility names its production meter and disconnect differently; the
//! layout is otherwise identical, so one table drives all six detectors.

use super::{ConfigurationDetector, Priority};
use crate::bos::{BosEquipment, BosSection, BosSizing, Confidence, ConfigurationMatch, EquipmentSections};
use crate::equipment::utility::{SRP, TEP, TRICO};
use crate::equipment::{EquipmentState, SystemNumber, SystemType};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

/// Utility-specific equipment names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilityPvProfile {
    pub utility: &'static str,
    utilities: &'static [&'static str],
    pub meter: &'static str,
    pub disconnect: &'static str,
    string_id: &'static str,
    micro_id: &'static str,
    string_name: &'static str,
    micro_name: &'static str,
}

pub const SRP_PROFILE: UtilityPvProfile = UtilityPvProfile {
    utility: SRP,
    utilities: &[SRP],
    meter: "Dedicated DER Meter",
    disconnect: "DER Meter Disconnect Switch",
    string_id: "srp_pv_only_string",
    micro_id: "srp_pv_only_micro",
    string_name: "SRP PV-Only String Inverter",
    micro_name: "SRP PV-Only Microinverter",
};

pub const TEP_PROFILE: UtilityPvProfile = UtilityPvProfile {
    utility: TEP,
    utilities: &[TEP],
    meter: "Utility DG Meter",
    disconnect: "DG Disconnect Switch",
    string_id: "tep_pv_only_string",
    micro_id: "tep_pv_only_micro",
    string_name: "TEP PV-Only String Inverter",
    micro_name: "TEP PV-Only Microinverter",
};

pub const TRICO_PROFILE: UtilityPvProfile = UtilityPvProfile {
    utility: TRICO,
    utilities: &[TRICO],
    meter: "Co-Generation Meter",
    disconnect: "Co-Generation System Utility Disconnect",
    string_id: "trico_pv_only_string",
    micro_id: "trico_pv_only_micro",
    string_name: "TRICO PV-Only String Inverter",
    micro_name: "TRICO PV-Only Microinverter",
};

pub const PROFILES: [UtilityPvProfile; 3] = [SRP_PROFILE, TEP_PROFILE, TRICO_PROFILE];

pub struct UtilityPvOnlyDetector {
    profile: UtilityPvProfile,
    system_type: SystemType,
}

impl UtilityPvOnlyDetector {
    pub fn new(profile: UtilityPvProfile, system_type: SystemType) -> Self {
        Self {
            profile,
            system_type,
        }
    }

    /// String and microinverter detectors for every profile
    pub fn all() -> Vec<Self> {
        PROFILES
            .iter()
            .flat_map(|profile| {
                [
                    Self::new(*profile, SystemType::Inverter),
                    Self::new(*profile, SystemType::Microinverter),
                ]
            })
            .collect()
    }

    fn equipment_present(&self, state: &EquipmentState) -> bool {
        match self.system_type {
            SystemType::Inverter => {
                !state.inverter_make.is_empty() && !state.inverter_model.is_empty()
            }
            SystemType::Microinverter => true,
        }
    }
}

#[async_trait]
impl ConfigurationDetector for UtilityPvOnlyDetector {
    fn config_id(&self) -> &'static str {
        match self.system_type {
            SystemType::Inverter => self.profile.string_id,
            SystemType::Microinverter => self.profile.micro_id,
        }
    }

    fn name(&self) -> &'static str {
        match self.system_type {
            SystemType::Inverter => self.profile.string_name,
            SystemType::Microinverter => self.profile.micro_name,
        }
    }

    fn priority(&self) -> Priority {
        Priority::of(6)
    }

    fn utilities(&self) -> &'static [&'static str] {
        self.profile.utilities
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        state.system_number == SystemNumber::One
            && state.has_solar_panels
            && state.battery_quantity == 0
            && state.system_type == Some(self.system_type)
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.applies_to_utility(&state.utility_name)
            || !self.quick_check(state)
            || !self.equipment_present(state)
        {
            return None;
        }

        let inverter_output = state
            .inverter_max_continuous_output
            .filter(|amps| *amps > 0.0)?;
        let sizing = BosSizing::pv_only(inverter_output).rounded_to_standard();

        let equipment = vec![
            BosEquipment::new(BosSection::Utility, 1, self.profile.meter).with_sizing(sizing.clone()),
            BosEquipment::new(BosSection::Utility, 2, self.profile.disconnect).with_sizing(sizing),
        ];

        let mut sections = EquipmentSections::from_state(state);
        sections.string_combiner_panel = self.system_type == SystemType::Inverter;

        Some(
            ConfigurationMatch::new(
                self.config_id(),
                format!("{} (No Battery, No Backup)", self.name()),
                self.priority(),
                Confidence::Exact,
                state,
            )
            .with_description(format!(
                "Solar panels with {} on {}, no battery storage",
                self.system_type.label().to_lowercase(),
                self.profile.utility
            ))
            .with_equipment(equipment)
            .with_sections(sections)
            .without_backup(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sibling::NoSiblingProvider;

    fn pv_state(utility: &str, system_type: SystemType, output: Option<f64>) -> EquipmentState {
        EquipmentState {
            utility_name: utility.to_string(),
            has_solar_panels: true,
            system_type: Some(system_type),
            inverter_make: "SolarEdge".to_string(),
            inverter_model: "SE7600H".to_string(),
            inverter_max_continuous_output: output,
            ..Default::default()
        }
        .with_derived_flags()
    }

    #[tokio::test]
    async fn test_tep_string_rounds_to_standard_rating() {
        let detector = UtilityPvOnlyDetector::new(TEP_PROFILE, SystemType::Inverter);
        let result = detector
            .detect(&pv_state("TEP", SystemType::Inverter, Some(38.5)), &NoSiblingProvider)
            .await
            .expect("should match");

        assert_eq!(result.config_id, "tep_pv_only_string");
        assert_eq!(result.bos_equipment[0].equipment_type, "Utility DG Meter");
        assert_eq!(result.bos_equipment[1].equipment_type, "DG Disconnect Switch");
        // 38.5 x 1.25 = 49 -> 50A breaker
        assert!(result.bos_equipment.iter().all(|item| item.amp_rating == Some(50)));
        assert!(result.equipment_sections.string_combiner_panel);
    }

    #[tokio::test]
    async fn test_trico_micro() {
        let detector = UtilityPvOnlyDetector::new(TRICO_PROFILE, SystemType::Microinverter);
        let result = detector
            .detect(
                &pv_state("TRICO", SystemType::Microinverter, Some(24.0)),
                &NoSiblingProvider,
            )
            .await
            .expect("should match");

        assert_eq!(result.config_id, "trico_pv_only_micro");
        assert_eq!(result.bos_equipment[0].equipment_type, "Co-Generation Meter");
        assert_eq!(result.bos_equipment[0].amp_rating, Some(30));
        assert!(result.has_warning_containing("No backup power"));
    }

    #[tokio::test]
    async fn test_requires_known_output_and_matching_type() {
        let detector = UtilityPvOnlyDetector::new(SRP_PROFILE, SystemType::Inverter);

        let unknown = pv_state("SRP", SystemType::Inverter, None);
        assert!(detector.detect(&unknown, &NoSiblingProvider).await.is_none());

        let micro = pv_state("SRP", SystemType::Microinverter, Some(30.0));
        assert!(detector.detect(&micro, &NoSiblingProvider).await.is_none());

        let mut no_model = pv_state("SRP", SystemType::Inverter, Some(30.0));
        no_model.inverter_model.clear();
        assert!(detector.detect(&no_model, &NoSiblingProvider).await.is_none());

        let aps = pv_state("APS", SystemType::Inverter, Some(30.0));
        assert!(detector.detect(&aps, &NoSiblingProvider).await.is_none());
    }

    #[test]
    fn test_all_builds_six_detectors() {
        let detectors = UtilityPvOnlyDetector::all();
        assert_eq!(detectors.len(), 6);
        let ids: Vec<&str> = detectors.iter().map(|d| d.config_id()).collect();
        assert!(ids.contains(&"srp_pv_only_micro"));
        assert!(ids.contains(&"trico_pv_only_string"));
    }
}
