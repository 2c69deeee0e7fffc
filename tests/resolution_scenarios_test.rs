//! Resolution scenarios against the default detector registry
//!
//! These tests drive `DetectorRegistry::resolve` end to end: reference
//! scenarios, priority ordering, determinism and brand exclusivity.

mod support;

use bosconfig::detectors::{EnphaseApsDetector, FranklinApsDetector, GenericConfig, GenericDetector};
use bosconfig::{
    BackupOption, BosSection, Confidence, ConfigurationDetector, CouplingType, DetectorRegistry,
    EquipmentState, NoSiblingProvider, RegistryError, SystemNumber, SystemType,
};
use std::sync::Arc;
use support::aps_string_pv;
use yare::parameterized;

fn enphase_state(backup: BackupOption) -> EquipmentState {
    EquipmentState {
        project_id: Some("P-3001".to_string()),
        utility_name: "APS".to_string(),
        has_solar_panels: true,
        solar_panel_quantity: 24,
        system_type: Some(SystemType::Microinverter),
        micro_inverter_make: "Enphase".to_string(),
        micro_inverter_model: "IQ8PLUS-72-2-US".to_string(),
        micro_inverter_quantity: 24,
        inverter_max_continuous_output: Some(29.0),
        battery_quantity: 1,
        battery_make: "Enphase".to_string(),
        battery_model: "IQ Battery 5P".to_string(),
        battery_max_continuous_output: 15.6,
        has_sms: true,
        sms_make: "Enphase".to_string(),
        sms_model: "IQ System Controller 3".to_string(),
        backup_option: backup,
        has_backup_panel: backup.is_backup(),
        ..Default::default()
    }
    .with_derived_flags()
}

fn franklin_state(battery_make: &str) -> EquipmentState {
    EquipmentState {
        project_id: Some("P-3002".to_string()),
        utility_name: "APS".to_string(),
        has_solar_panels: true,
        solar_panel_quantity: 20,
        system_type: Some(SystemType::Inverter),
        inverter_make: "SMA".to_string(),
        inverter_model: "Sunny Boy 7.7".to_string(),
        inverter_quantity: 1,
        inverter_max_continuous_output: Some(32.0),
        battery_quantity: 1,
        battery_make: battery_make.to_string(),
        battery_model: "aPower 2".to_string(),
        battery_max_continuous_output: 24.0,
        has_sms: true,
        sms_make: "FranklinWH".to_string(),
        sms_model: "aGate".to_string(),
        backup_option: BackupOption::WholeHome,
        has_backup_panel: true,
        coupling_type: CouplingType::AC,
        ..Default::default()
    }
    .with_derived_flags()
}

#[tokio::test]
async fn test_scenario_aps_pv_only() {
    let registry = DetectorRegistry::with_defaults();
    let state = aps_string_pv(38.5);

    let result = registry
        .resolve(&state, &NoSiblingProvider)
        .await
        .expect("APS PV-only should match");

    assert_eq!(result.config_id, "aps_pv_only");
    assert_eq!(result.bos_equipment.len(), 2);
    assert!(result.has_warning_containing("No backup power"));
    assert!(result.has_warning_containing("NEC 690.12"));
    assert_eq!(result.bos_equipment[1].amp_rating, Some(49));
}

#[tokio::test]
async fn test_scenario_enphase_whole_home() {
    let registry = DetectorRegistry::with_defaults();

    let result = registry
        .resolve(&enphase_state(BackupOption::WholeHome), &NoSiblingProvider)
        .await
        .expect("Enphase whole home should match");

    assert_eq!(result.config_id, "enphase_aps_wholeHome");
    assert_eq!(result.bos_equipment.len(), 3);

    let meter = result
        .equipment_in(BosSection::Utility)
        .next()
        .expect("utility item");
    assert_eq!(meter.equipment_type, "Uni-Directional Meter");
    assert_eq!(meter.make, "Milbank");
    assert_eq!(meter.model, "U5929XL");
    assert!(meter.auto_selected);
}

#[tokio::test]
async fn test_scenario_enphase_partial_home_rejected_by_whole_home() {
    let state = enphase_state(BackupOption::PartialHome);

    assert!(EnphaseApsDetector::whole_home()
        .detect(&state, &NoSiblingProvider)
        .await
        .is_none());

    let result = DetectorRegistry::with_defaults()
        .resolve(&state, &NoSiblingProvider)
        .await
        .unwrap();
    assert_eq!(result.config_id, "enphase_aps_partialHome");
}

#[tokio::test]
async fn test_brand_specific_rule_beats_fallback() {
    let registry = DetectorRegistry::with_defaults();
    let state = franklin_state("FranklinWH");

    let all = registry.find_all_matches(&state, &NoSiblingProvider).await;
    let ids: Vec<&str> = all.iter().map(|m| m.config_id.as_str()).collect();
    assert!(ids.contains(&"franklin_aps_wholeHome"));
    assert!(ids.contains(&"generic_ac_coupled"));

    let best = registry.resolve(&state, &NoSiblingProvider).await.unwrap();
    assert_eq!(best.config_id, "franklin_aps_wholeHome");
    assert_eq!(best.config_id, all[0].config_id);
}

#[tokio::test]
async fn test_brand_exclusivity() {
    let detector = FranklinApsDetector::whole_home();
    assert!(detector
        .detect(&franklin_state("FranklinWH"), &NoSiblingProvider)
        .await
        .is_some());
    assert!(detector
        .detect(&franklin_state("Generic"), &NoSiblingProvider)
        .await
        .is_none());

    let fallback = DetectorRegistry::with_defaults()
        .resolve(&franklin_state("Generic"), &NoSiblingProvider)
        .await
        .unwrap();
    assert_ne!(fallback.config_id, "franklin_aps_wholeHome");
}

#[parameterized(
    pv_only = { aps_string_pv(38.5) },
    enphase = { enphase_state(BackupOption::WholeHome) },
    franklin = { franklin_state("FranklinWH") },
    unmatched = { EquipmentState::default() },
)]
#[test_macro(tokio::test)]
async fn test_resolution_is_deterministic(state: EquipmentState) {
    let registry = DetectorRegistry::with_defaults();
    let first = registry.resolve(&state, &NoSiblingProvider).await;
    let second = registry.resolve(&state.clone(), &NoSiblingProvider).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_malformed_state_is_no_match() {
    let registry = DetectorRegistry::with_defaults();

    assert!(registry
        .resolve(&EquipmentState::default(), &NoSiblingProvider)
        .await
        .is_none());

    let mut blank_utility = aps_string_pv(38.5);
    blank_utility.utility_name = String::new();
    assert!(registry
        .resolve(&blank_utility, &NoSiblingProvider)
        .await
        .is_none());

    let mut no_type = aps_string_pv(38.5);
    no_type.system_type = None;
    let result = registry.resolve(&no_type, &NoSiblingProvider).await;
    assert!(result.map_or(true, |m| m.config_id != "aps_pv_only"));
}

#[tokio::test]
async fn test_unknown_utility_falls_back_to_generic() {
    let mut state = aps_string_pv(40.0);
    state.utility_name = "PG&E".to_string();

    let result = DetectorRegistry::with_defaults()
        .resolve(&state, &NoSiblingProvider)
        .await
        .unwrap();
    assert_eq!(result.config_id, "generic_pv_only");
    assert_eq!(result.confidence, Confidence::Fallback);
    assert!(result
        .bos_equipment
        .iter()
        .all(|item| item.amp_rating == Some(50) && item.system_number == Some(SystemNumber::One)));
}

#[tokio::test]
async fn test_section_flags_never_both_set() {
    let registry = DetectorRegistry::with_defaults();
    for state in [
        aps_string_pv(38.5),
        enphase_state(BackupOption::WholeHome),
        enphase_state(BackupOption::None),
        franklin_state("FranklinWH"),
    ] {
        for found in registry.find_all_matches(&state, &NoSiblingProvider).await {
            let sections = &found.equipment_sections;
            assert!(
                !(sections.inverter() && sections.micro_inverter()),
                "{} sets both inverter flags",
                found.config_id
            );
        }
    }
}

#[tokio::test]
async fn test_top_matches_limits_results() {
    let registry = DetectorRegistry::with_defaults();
    let state = franklin_state("FranklinWH");

    let top = registry.top_matches(&state, &NoSiblingProvider, 1).await;
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].config_id, "franklin_aps_wholeHome");
}

#[test]
fn test_registry_rejects_empty_and_duplicates() {
    assert_eq!(
        DetectorRegistry::from_detectors(vec![]).err(),
        Some(RegistryError::Empty)
    );

    let duplicate: Vec<Arc<dyn ConfigurationDetector>> = vec![
        Arc::new(GenericDetector::new(GenericConfig::PvOnly)),
        Arc::new(GenericDetector::new(GenericConfig::PvOnly)),
    ];
    assert_eq!(
        DetectorRegistry::from_detectors(duplicate).err(),
        Some(RegistryError::DuplicateConfigId("generic_pv_only".to_string()))
    );
}

#[test]
fn test_default_registry_is_priority_ordered() {
    let registry = DetectorRegistry::with_defaults();
    let priorities: Vec<u16> = registry.iter().map(|d| d.priority().get()).collect();
    assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(registry.iter().next().map(|d| d.priority().get()), Some(1));
    assert!(registry.get("aps_pv_only").is_some());
    assert!(registry.get("does_not_exist").is_none());
}
