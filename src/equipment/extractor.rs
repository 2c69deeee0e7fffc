//! Projects a flat project record onto per-system equipment state
//!
//! Extraction never fails. Missing or unparseable fields fall back to their
//! empty value, so a sparse record simply yields a mostly-false state.

use super::catalog::{EquipmentCatalog, NoCatalog};
use super::fields::{self, keys_for, AliasedSlotKeys, SlotKeys};
use super::state::{
    BackupOption, BosSlot, ChargingSource, CouplingType, EquipmentState, ExistingBos,
    InverterType, SystemNumber, SystemType,
};
use super::utility::normalize_utility_name;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Flat `sys{N}_`-prefixed project record
pub type ProjectRecord = serde_json::Map<String, Value>;

/// Manufacturers whose presence implies a microinverter system
const MICROINVERTER_MAKES: &[&str] = &["enphase", "hoymiles", "apsystems", "ap systems"];

/// Product-line prefix matched only at the start of a word, as in "IQ" or "IQ8"
const MICROINVERTER_LINE_PREFIX: &str = "iq";

fn implies_microinverter(make: &str) -> bool {
    let make = make.to_lowercase();
    MICROINVERTER_MAKES.iter().any(|m| make.contains(m))
        || make
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter_map(|word| word.strip_prefix(MICROINVERTER_LINE_PREFIX))
            .any(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

/// Utility serving the project site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtilityInfo {
    pub name: String,
    pub state: String,
}

impl UtilityInfo {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
        }
    }

    /// Reads the global utility fields of a record
    pub fn from_record(record: &ProjectRecord) -> Self {
        Self {
            name: first_text(record, &[fields::UTILITY, fields::UTILITY_NAME]),
            state: text(record, fields::UTILITY_STATE),
        }
    }
}

fn text(record: &ProjectRecord, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn first_text(record: &ProjectRecord, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| text(record, key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn number(record: &ProjectRecord, key: &str) -> Option<f64> {
    let value = match record.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim().trim_end_matches(['A', 'a']).trim();
            s.parse::<f64>().ok()
        }
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn count(record: &ProjectRecord, key: &str) -> u32 {
    number(record, key)
        .filter(|n| *n > 0.0)
        .map(|n| n.floor() as u32)
        .unwrap_or(0)
}

fn amps(record: &ProjectRecord, key: &str) -> Option<u32> {
    number(record, key)
        .filter(|n| *n > 0.0)
        .map(|n| n.ceil() as u32)
}

fn is_set(record: &ProjectRecord, key: &str) -> bool {
    match record.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn present(make: &str, model: &str) -> bool {
    !make.is_empty() || !model.is_empty()
}

fn slot(record: &ProjectRecord, keys: &SlotKeys) -> BosSlot {
    BosSlot {
        equipment_type: text(record, keys.equipment_type),
        make: text(record, keys.make),
        model: text(record, keys.model),
        amp_rating: amps(record, keys.amp_rating),
    }
}

fn aliased_slot(record: &ProjectRecord, keys: &AliasedSlotKeys) -> BosSlot {
    let current = slot(record, &keys.current);
    match keys.legacy {
        Some(legacy) if current.is_empty() => slot(record, &legacy),
        _ => current,
    }
}

fn resolve_system_type(
    record: &ProjectRecord,
    direct: &str,
    selected: &str,
    make: &str,
    model: &str,
) -> Option<SystemType> {
    SystemType::parse(&text(record, direct))
        .or_else(|| SystemType::parse(&text(record, selected)))
        .or_else(|| {
            if implies_microinverter(make) {
                Some(SystemType::Microinverter)
            } else if !model.is_empty() {
                Some(SystemType::Inverter)
            } else {
                None
            }
        })
}

/// Builds [`EquipmentState`] values from project records
pub struct EquipmentStateExtractor {
    catalog: Arc<dyn EquipmentCatalog>,
}

impl EquipmentStateExtractor {
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(NoCatalog))
    }

    pub fn with_catalog(catalog: Arc<dyn EquipmentCatalog>) -> Self {
        Self { catalog }
    }

    /// Extracts one system; always returns a state, however sparse the record
    pub fn extract(
        &self,
        record: &ProjectRecord,
        system: SystemNumber,
        utility: &UtilityInfo,
    ) -> EquipmentState {
        let keys = keys_for(system);

        let solar_panel_make = text(record, keys.solar_make);
        let solar_panel_model = text(record, keys.solar_model);
        let solar_panel_quantity = count(record, keys.solar_qty);
        let has_solar_panels =
            present(&solar_panel_make, &solar_panel_model) || solar_panel_quantity > 0;

        let make = text(record, keys.inverter_make);
        let model = text(record, keys.inverter_model);
        let system_type = resolve_system_type(
            record,
            keys.inverter_type,
            keys.selected_system,
            &make,
            &model,
        );
        let mut quantity = count(record, keys.inverter_qty);
        if quantity == 0 && present(&make, &model) {
            quantity = 1;
        }
        let inverter_type = InverterType::infer(&make, &model);

        let inverter_max_continuous_output = number(record, keys.inverter_max_output)
            .filter(|a| *a > 0.0)
            .or_else(|| {
                let per_unit = self.catalog.inverter_output_amps(&make, &model)?;
                Some(match system_type {
                    Some(SystemType::Microinverter) => per_unit * f64::from(quantity),
                    _ => per_unit,
                })
            })
            .filter(|a| *a > 0.0);

        let battery_make = text(record, keys.battery_make);
        let battery_model = text(record, keys.battery_model);
        let battery_quantity = count(record, keys.battery_qty);
        let battery_max_continuous_output = number(record, keys.battery_max_output)
            .filter(|a| *a > 0.0)
            .or_else(|| self.catalog.battery_output_amps(&battery_make, &battery_model))
            .unwrap_or(0.0);

        let charging = text(record, keys.battery_charging_source).to_lowercase();
        let battery_charging_source =
            if !has_solar_panels || charging.contains("grid-only") || charging.contains("grid only") {
                ChargingSource::GridOnly
            } else {
                ChargingSource::GridOrRenewable
            };

        let catalog_coupling = if battery_quantity > 0 && present(&battery_make, &battery_model) {
            self.catalog.battery_coupling(&battery_make, &battery_model)
        } else {
            None
        };
        let coupling_type = catalog_coupling.unwrap_or(match inverter_type {
            Some(InverterType::Hybrid) => CouplingType::DC,
            _ => CouplingType::AC,
        });

        let sms_make = text(record, keys.sms_make);
        let sms_model = text(record, keys.sms_model);
        let has_sms = present(&sms_make, &sms_model)
            && !sms_make.eq_ignore_ascii_case("no sms")
            && !sms_model.eq_ignore_ascii_case("no sms");

        let gateway_make = text(record, keys.gateway_make);
        let gateway_model = text(record, keys.gateway_model);
        let has_gateway = (present(&gateway_make, &gateway_model)
            && !gateway_make.eq_ignore_ascii_case("no gateway")
            && !gateway_model.eq_ignore_ascii_case("no gateway"))
            || is_set(record, keys.gateway);

        let backup_option = BackupOption::parse(&text(record, keys.backup_option));
        let backup_panel_make = first_text(record, &keys.backup_panel_make);
        let backup_panel_model = first_text(record, &keys.backup_panel_model);
        let has_backup_panel =
            backup_option.is_backup() && present(&backup_panel_make, &backup_panel_model);

        let project_id = Some(first_text(record, &[fields::PROJECT_ID, fields::ID]))
            .filter(|id| !id.is_empty());

        let utility_name = if utility.name.trim().is_empty() {
            first_text(record, &[fields::UTILITY, fields::UTILITY_NAME])
        } else {
            utility.name.clone()
        };
        let utility_state = if utility.state.trim().is_empty() {
            text(record, fields::UTILITY_STATE)
        } else {
            utility.state.trim().to_string()
        };

        let existing_bos = ExistingBos {
            utility: keys.utility_bos.map(|k| slot(record, &k)),
            battery: keys.battery_bos.map(|k| slot(record, &k)),
            backup: keys.backup_bos.map(|k| slot(record, &k)),
            post_sms: keys.post_sms_bos.map(|k| aliased_slot(record, &k)),
        };

        let (inverter, micro) = match system_type {
            Some(SystemType::Microinverter) => ((String::new(), String::new(), 0), (make, model, quantity)),
            _ => ((make, model, quantity), (String::new(), String::new(), 0)),
        };

        let state = EquipmentState {
            system_number: system,
            project_id,
            utility_name: normalize_utility_name(&utility_name),
            utility_state,
            has_solar_panels,
            solar_panel_make,
            solar_panel_model,
            solar_panel_quantity,
            solar_panel_wattage: number(record, keys.solar_wattage).unwrap_or(0.0),
            system_type,
            inverter_make: inverter.0,
            inverter_model: inverter.1,
            inverter_quantity: inverter.2,
            inverter_type,
            inverter_max_continuous_output,
            micro_inverter_make: micro.0,
            micro_inverter_model: micro.1,
            micro_inverter_quantity: micro.2,
            battery_quantity,
            battery_make,
            battery_model,
            battery_charging_source,
            battery_max_continuous_output,
            battery2_quantity: count(record, keys.battery2_qty),
            battery2_make: text(record, keys.battery2_make),
            battery2_model: text(record, keys.battery2_model),
            has_sms,
            sms_make,
            sms_model,
            has_gateway,
            gateway_make,
            gateway_model,
            has_backup_panel,
            backup_option,
            backup_panel_make,
            backup_panel_model,
            backup_panel_bus_rating: amps(record, keys.backup_bus_rating),
            utility_service_amps: amps(record, fields::UTILITY_SERVICE_AMPS),
            coupling_type,
            existing_bos,
            ..Default::default()
        }
        .with_derived_flags();

        debug!(
            system = %system,
            utility = %state.utility_name,
            system_type = ?state.system_type,
            coupling = ?state.coupling_type,
            "Extracted equipment state"
        );

        state
    }

    /// Extracts every system of the record that carries equipment
    pub fn extract_all(&self, record: &ProjectRecord, utility: &UtilityInfo) -> Vec<EquipmentState> {
        SystemNumber::ALL
            .into_iter()
            .filter(|system| system_has_data(record, *system))
            .map(|system| self.extract(record, system, utility))
            .collect()
    }
}

impl Default for EquipmentStateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a system slot of the record carries any equipment
pub fn system_has_data(record: &ProjectRecord, system: SystemNumber) -> bool {
    let keys = keys_for(system);
    let battery = present(&text(record, keys.battery_make), &text(record, keys.battery_model))
        && count(record, keys.battery_qty) > 0;

    [
        keys.solar_make,
        keys.solar_model,
        keys.inverter_make,
        keys.inverter_model,
        keys.selected_system,
    ]
    .iter()
    .any(|key| !text(record, key).is_empty())
        || count(record, keys.solar_qty) > 0
        || battery
}
