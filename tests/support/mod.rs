//! Shared helpers for integration tests

#![allow(dead_code)]

use bosconfig::{EquipmentState, EquipmentStateExtractor, ProjectRecord, SystemNumber, UtilityInfo};
use std::fs;
use std::path::{Path, PathBuf};

/// Path to a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_record(name: &str) -> ProjectRecord {
    let path = fixture_path(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Fixture {} is not a JSON object: {}", path.display(), e))
}

pub fn extract(record: &ProjectRecord, system: SystemNumber) -> EquipmentState {
    EquipmentStateExtractor::new().extract(record, system, &UtilityInfo::from_record(record))
}

/// APS state with solar and a string inverter, no storage
pub fn aps_string_pv(inverter_output: f64) -> EquipmentState {
    EquipmentState {
        project_id: Some("P-2001".to_string()),
        utility_name: "APS".to_string(),
        has_solar_panels: true,
        solar_panel_quantity: 20,
        system_type: Some(bosconfig::SystemType::Inverter),
        inverter_make: "SolarEdge".to_string(),
        inverter_model: "SE7600H".to_string(),
        inverter_quantity: 1,
        inverter_max_continuous_output: Some(inverter_output),
        ..Default::default()
    }
    .with_derived_flags()
}
