//! Tesla Powerwall 3 multi-system configuration
//!
//! System 2 carries the Powerwall and gateway; system 1 must be a
//! microinverter PV system fetched through the sibling provider. Lookup
//! failures never escape `resolve`.

mod support;

use async_trait::async_trait;
use bosconfig::detectors::{StorzWholeHomeMultiSystemDetector, TeslaPw3MultiSystemDetector};
use bosconfig::equipment::ChargingSource;
use bosconfig::{
    BackupOption, BosSection, ConfigurationDetector, DetectorRegistry, EquipmentState,
    InMemorySiblingProvider, LookupError, NoSiblingProvider, RecordSiblingProvider,
    SiblingStateProvider, SystemNumber, SystemType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const PROJECT: &str = "P-4001";

fn system_one() -> EquipmentState {
    EquipmentState {
        system_number: SystemNumber::One,
        project_id: Some(PROJECT.to_string()),
        utility_name: "APS".to_string(),
        has_solar_panels: true,
        solar_panel_quantity: 18,
        system_type: Some(SystemType::Microinverter),
        micro_inverter_make: "Enphase".to_string(),
        micro_inverter_model: "IQ8M-72-2-US".to_string(),
        micro_inverter_quantity: 18,
        inverter_max_continuous_output: Some(24.0),
        ..Default::default()
    }
    .with_derived_flags()
}

fn system_two() -> EquipmentState {
    EquipmentState {
        system_number: SystemNumber::Two,
        project_id: Some(PROJECT.to_string()),
        utility_name: "APS".to_string(),
        system_type: Some(SystemType::Inverter),
        inverter_make: "Tesla".to_string(),
        inverter_model: "Powerwall 3".to_string(),
        inverter_quantity: 1,
        inverter_max_continuous_output: Some(48.0),
        battery_quantity: 1,
        battery_make: "Tesla".to_string(),
        battery_model: "Powerwall 3".to_string(),
        battery_charging_source: ChargingSource::GridOnly,
        has_sms: true,
        sms_make: "Tesla".to_string(),
        sms_model: "Backup Gateway 3".to_string(),
        backup_option: BackupOption::WholeHome,
        has_backup_panel: true,
        backup_panel_bus_rating: Some(225),
        ..Default::default()
    }
    .with_derived_flags()
}

fn storz_system_two() -> EquipmentState {
    EquipmentState {
        system_number: SystemNumber::Two,
        project_id: Some(PROJECT.to_string()),
        utility_name: "APS".to_string(),
        system_type: Some(SystemType::Inverter),
        inverter_make: "Sol-Ark".to_string(),
        inverter_model: "15K".to_string(),
        inverter_quantity: 1,
        inverter_max_continuous_output: Some(50.0),
        battery_quantity: 2,
        battery_make: "Storz Power".to_string(),
        backup_option: BackupOption::WholeHome,
        has_backup_panel: true,
        backup_panel_bus_rating: Some(200),
        ..Default::default()
    }
    .with_derived_flags()
}

fn siblings() -> InMemorySiblingProvider {
    InMemorySiblingProvider::new().with_state(PROJECT, system_one())
}

/// Provider whose backend is down
struct FailingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl SiblingStateProvider for FailingProvider {
    async fn fetch(
        &self,
        _project_id: &str,
        _system: SystemNumber,
    ) -> Result<EquipmentState, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LookupError::Unavailable("connection refused".to_string()))
    }
}

/// Provider that answers correctly after a delay
struct SlowProvider {
    inner: InMemorySiblingProvider,
}

#[async_trait]
impl SiblingStateProvider for SlowProvider {
    async fn fetch(
        &self,
        project_id: &str,
        system: SystemNumber,
    ) -> Result<EquipmentState, LookupError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.fetch(project_id, system).await
    }
}

#[tokio::test]
async fn test_multi_system_match() {
    let result = TeslaPw3MultiSystemDetector::new()
        .detect(&system_two(), &siblings())
        .await
        .expect("multi-system should match");

    assert_eq!(result.config_id, "tesla_pw3_gateway3_aps");
    assert_eq!(result.system_number, SystemNumber::Two);

    let utility: Vec<_> = result.equipment_in(BosSection::Utility).collect();
    assert_eq!(utility.len(), 2);
    assert!(utility
        .iter()
        .all(|item| item.system_number == Some(SystemNumber::One)));

    let backup: Vec<_> = result.equipment_in(BosSection::Backup).collect();
    assert_eq!(backup.len(), 2);
    assert!(backup.iter().all(|item| item.amp_rating == Some(225)));

    // (48 + 48) x 1.25
    let combine: Vec<_> = result.equipment_in(BosSection::PostCombine).collect();
    assert_eq!(combine.len(), 3);
    assert!(combine.iter().all(|item| item.amp_rating == Some(120)));
    assert!(combine.iter().all(|item| item.system_number.is_none()));

    let multi = result.multi_system.as_ref().expect("multi-system block");
    assert_eq!(multi.total_systems, 2);
    assert_eq!(multi.combine_points.len(), 2);
    assert!(!result.has_warning_containing("assumed"));
}

#[tokio::test]
async fn test_missing_bus_rating_defaults_with_warning() {
    let mut state = system_two();
    state.backup_panel_bus_rating = None;

    let result = TeslaPw3MultiSystemDetector::new()
        .detect(&state, &siblings())
        .await
        .unwrap();

    assert!(result
        .equipment_in(BosSection::Backup)
        .all(|item| item.amp_rating == Some(200)));
    assert!(result.has_warning_containing("200A"));
}

#[tokio::test]
async fn test_failing_lookup_is_no_match() {
    let provider = FailingProvider {
        calls: AtomicUsize::new(0),
    };

    let detector = TeslaPw3MultiSystemDetector::new();
    assert!(detector.detect(&system_two(), &provider).await.is_none());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let result = DetectorRegistry::with_defaults()
        .resolve(&system_two(), &provider)
        .await
        .expect("a lower-priority detector should still match");
    assert_ne!(result.config_id, "tesla_pw3_gateway3_aps");
}

#[tokio::test]
async fn test_missing_project_id_skips_lookup() {
    let provider = FailingProvider {
        calls: AtomicUsize::new(0),
    };
    let mut state = system_two();
    state.project_id = None;

    assert!(TeslaPw3MultiSystemDetector::new()
        .detect(&state, &provider)
        .await
        .is_none());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_system_one_must_be_microinverter_pv_only() {
    let mut with_battery = system_one();
    with_battery.battery_quantity = 1;
    with_battery.battery_make = "Enphase".to_string();
    let provider =
        InMemorySiblingProvider::new().with_state(PROJECT, with_battery.with_derived_flags());

    assert!(TeslaPw3MultiSystemDetector::new()
        .detect(&system_two(), &provider)
        .await
        .is_none());

    assert!(TeslaPw3MultiSystemDetector::new()
        .detect(&system_two(), &NoSiblingProvider)
        .await
        .is_none());
}

#[tokio::test]
async fn test_slow_lookup_is_awaited() {
    let provider = SlowProvider { inner: siblings() };

    let result = DetectorRegistry::with_defaults()
        .resolve(&system_two(), &provider)
        .await
        .unwrap();
    assert_eq!(result.config_id, "tesla_pw3_gateway3_aps");
}

#[tokio::test]
async fn test_analysis_propagates_to_system_one() {
    let registry = DetectorRegistry::with_defaults();
    let states = vec![system_one(), system_two()];

    let analysis = registry.analyze_project(&states, &siblings()).await;

    assert_eq!(analysis.systems_analyzed, 2);
    let one = analysis.best_match(SystemNumber::One).expect("system 1 match");
    let two = analysis.best_match(SystemNumber::Two).expect("system 2 match");
    assert_eq!(one.config_id, "tesla_pw3_gateway3_aps");
    assert_eq!(two.config_id, "tesla_pw3_gateway3_aps");
    assert_eq!(one.system_number, SystemNumber::One);
    assert!(one
        .notes
        .iter()
        .any(|n| n == "Part of multi-system configuration (detected from System 2)"));

    assert!(analysis
        .recommendations
        .iter()
        .any(|r| r.starts_with("Multi-system configuration detected:")));
    assert!(analysis
        .recommendations
        .iter()
        .any(|r| r == "Systems 1 & 2 are configured together"));
    assert!(analysis.warnings.is_empty());
}

#[tokio::test]
async fn test_analysis_without_multi_system_resolves_independently() {
    let registry = DetectorRegistry::with_defaults();
    let states = vec![system_one(), system_two()];

    let analysis = registry
        .analyze_project(&states, &FailingProvider { calls: AtomicUsize::new(0) })
        .await;

    let one = analysis.best_match(SystemNumber::One).unwrap();
    assert_eq!(one.config_id, "aps_pv_only");
    assert!(analysis
        .recommendations
        .iter()
        .all(|r| !r.starts_with("Multi-system")));
}

#[tokio::test]
async fn test_analysis_of_unmatched_project() {
    let analysis = DetectorRegistry::with_defaults()
        .analyze_project(&[EquipmentState::default()], &NoSiblingProvider)
        .await;

    assert_eq!(analysis.systems_analyzed, 1);
    assert_eq!(analysis.total_matches, 0);
    assert_eq!(
        analysis.warnings,
        vec!["No configuration match found for System 1".to_string()]
    );
    assert!(analysis.recommendations[0].starts_with("No configurations matched"));
}

#[tokio::test]
async fn test_storz_multi_system_resolves_and_propagates() {
    let registry = DetectorRegistry::with_defaults();

    let found = registry
        .resolve(&storz_system_two(), &siblings())
        .await
        .expect("should match");
    assert_eq!(found.config_id, "storz_whole_home_aps");
    assert_eq!(found.priority.get(), 2);

    // 50 x 1.25, battery on the DC bus
    let combine: Vec<_> = found.equipment_in(BosSection::PostCombine).collect();
    assert_eq!(combine.len(), 3);
    assert!(combine
        .iter()
        .all(|item| item.amp_rating == Some(63) && item.system_number.is_none()));

    let analysis = registry
        .analyze_project(&[system_one(), storz_system_two()], &siblings())
        .await;
    assert_eq!(
        analysis.best_match(SystemNumber::One).map(|m| m.config_id.as_str()),
        Some("storz_whole_home_aps")
    );
    assert_eq!(analysis.system(SystemNumber::Two).unwrap().matches.len(), 1);
}

#[tokio::test]
async fn test_storz_failing_lookup_is_no_match() {
    let provider = FailingProvider {
        calls: AtomicUsize::new(0),
    };

    assert!(StorzWholeHomeMultiSystemDetector::new()
        .detect(&storz_system_two(), &provider)
        .await
        .is_none());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let fallback = DetectorRegistry::with_defaults()
        .resolve(&storz_system_two(), &provider)
        .await;
    assert!(fallback.map_or(true, |m| m.config_id != "storz_whole_home_aps"));
}

#[test]
fn test_detector_declares_affected_systems() {
    let detector = TeslaPw3MultiSystemDetector::new();
    assert!(detector.is_multi_system());
    assert_eq!(
        detector.affected_systems(),
        &[SystemNumber::One, SystemNumber::Two]
    );
}

#[tokio::test]
async fn test_record_fixture_resolves_as_multi_system() {
    let record = support::load_record("tesla_multi_system.json");
    let utility = bosconfig::UtilityInfo::from_record(&record);
    let extractor = bosconfig::EquipmentStateExtractor::new();
    let states = extractor.extract_all(&record, &utility);
    assert_eq!(states.len(), 2);

    let provider =
        RecordSiblingProvider::new(record, utility, bosconfig::EquipmentStateExtractor::new());
    let analysis = DetectorRegistry::with_defaults()
        .analyze_project(&states, &provider)
        .await;

    let two = analysis.best_match(SystemNumber::Two).unwrap();
    assert_eq!(two.config_id, "tesla_pw3_gateway3_aps");
    assert!(two
        .equipment_in(BosSection::Backup)
        .all(|item| item.amp_rating == Some(225)));
    assert_eq!(
        analysis.best_match(SystemNumber::One).map(|m| m.config_id.as_str()),
        Some("tesla_pw3_gateway3_aps")
    );
}
