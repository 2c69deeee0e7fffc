//! Per-system equipment facts consumed by the configuration detectors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Electrical system slot within a project (1-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SystemNumber {
    #[default]
    One,
    Two,
    Three,
    Four,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("System number must be between 1 and 4, got {0}")]
pub struct InvalidSystemNumber(pub u8);

impl SystemNumber {
    pub const ALL: [SystemNumber; 4] = [
        SystemNumber::One,
        SystemNumber::Two,
        SystemNumber::Three,
        SystemNumber::Four,
    ];

    pub fn as_u8(self) -> u8 {
        match self {
            SystemNumber::One => 1,
            SystemNumber::Two => 2,
            SystemNumber::Three => 3,
            SystemNumber::Four => 4,
        }
    }

    /// Zero-based index into per-system tables
    pub fn index(self) -> usize {
        usize::from(self.as_u8() - 1)
    }

    /// Record key prefix, e.g. `sys2_`
    pub fn prefix(self) -> &'static str {
        match self {
            SystemNumber::One => "sys1_",
            SystemNumber::Two => "sys2_",
            SystemNumber::Three => "sys3_",
            SystemNumber::Four => "sys4_",
        }
    }
}

impl TryFrom<u8> for SystemNumber {
    type Error = InvalidSystemNumber;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SystemNumber::One),
            2 => Ok(SystemNumber::Two),
            3 => Ok(SystemNumber::Three),
            4 => Ok(SystemNumber::Four),
            other => Err(InvalidSystemNumber(other)),
        }
    }
}

impl From<SystemNumber> for u8 {
    fn from(system: SystemNumber) -> Self {
        system.as_u8()
    }
}

impl fmt::Display for SystemNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    Microinverter,
    Inverter,
}

impl SystemType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "microinverter" => Some(SystemType::Microinverter),
            "inverter" => Some(SystemType::Inverter),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SystemType::Microinverter => "Microinverter",
            SystemType::Inverter => "String Inverter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackupOption {
    #[serde(rename = "Whole Home")]
    WholeHome,
    #[serde(rename = "Partial Home")]
    PartialHome,
    #[default]
    None,
}

impl BackupOption {
    /// Unknown or blank values mean no backup
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "whole home" | "whole_home" | "wholehome" => BackupOption::WholeHome,
            "partial home" | "partial_home" | "partialhome" => BackupOption::PartialHome,
            _ => BackupOption::None,
        }
    }

    pub fn is_backup(self) -> bool {
        self != BackupOption::None
    }

    pub fn label(self) -> &'static str {
        match self {
            BackupOption::WholeHome => "Whole Home",
            BackupOption::PartialHome => "Partial Home",
            BackupOption::None => "No Backup",
        }
    }
}

impl fmt::Display for BackupOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CouplingType {
    #[default]
    AC,
    DC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargingSource {
    GridOnly,
    #[default]
    GridOrRenewable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InverterType {
    GridFollowing,
    GridFormingFollowing,
    Hybrid,
}

impl InverterType {
    /// Classifies an inverter from its make and model text
    pub fn infer(make: &str, model: &str) -> Option<Self> {
        let make = make.trim().to_lowercase();
        let model = model.trim().to_lowercase();
        if make.is_empty() && model.is_empty() {
            return None;
        }
        let text = format!("{} {}", make, model);

        let hybrid_make = ["goodwe", "growatt", "sol-ark", "solark"]
            .iter()
            .any(|m| make.contains(m));
        if text.contains("hybrid")
            || (make.contains("solaredge") && text.contains("hd-wave"))
            || hybrid_make
        {
            return Some(InverterType::Hybrid);
        }

        let forming = ["forming", "powerwall", "backup interface", "agate"]
            .iter()
            .any(|k| text.contains(k));
        if forming || make.contains("franklin") || make.contains("tesla") {
            return Some(InverterType::GridFormingFollowing);
        }

        Some(InverterType::GridFollowing)
    }
}

/// One recorded BOS slot on the project
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BosSlot {
    pub equipment_type: String,
    pub make: String,
    pub model: String,
    pub amp_rating: Option<u32>,
}

impl BosSlot {
    pub fn is_empty(&self) -> bool {
        self.equipment_type.trim().is_empty()
    }
}

/// BOS already recorded for a system, by section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingBos {
    pub utility: [BosSlot; 6],
    pub battery: [BosSlot; 3],
    pub backup: [BosSlot; 3],
    pub post_sms: [BosSlot; 3],
}

impl ExistingBos {
    pub fn occupied(&self) -> usize {
        self.utility
            .iter()
            .chain(&self.battery)
            .chain(&self.backup)
            .chain(&self.post_sms)
            .filter(|slot| !slot.is_empty())
            .count()
    }
}

/// Equipment facts for one electrical system
///
/// Built fresh for every resolution and never mutated afterwards. Derived
/// flags are filled by [`EquipmentState::with_derived_flags`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentState {
    pub system_number: SystemNumber,
    pub project_id: Option<String>,
    pub utility_name: String,
    pub utility_state: String,

    pub has_solar_panels: bool,
    pub solar_panel_make: String,
    pub solar_panel_model: String,
    pub solar_panel_quantity: u32,
    pub solar_panel_wattage: f64,

    pub system_type: Option<SystemType>,
    pub inverter_make: String,
    pub inverter_model: String,
    pub inverter_quantity: u32,
    pub inverter_type: Option<InverterType>,
    pub inverter_max_continuous_output: Option<f64>,
    pub micro_inverter_make: String,
    pub micro_inverter_model: String,
    pub micro_inverter_quantity: u32,

    pub battery_quantity: u32,
    pub battery_make: String,
    pub battery_model: String,
    pub battery_charging_source: ChargingSource,
    pub battery_max_continuous_output: f64,
    pub battery2_quantity: u32,
    pub battery2_make: String,
    pub battery2_model: String,

    #[serde(rename = "hasSMS")]
    pub has_sms: bool,
    pub sms_make: String,
    pub sms_model: String,

    pub has_gateway: bool,
    pub gateway_make: String,
    pub gateway_model: String,

    pub has_backup_panel: bool,
    pub backup_option: BackupOption,
    pub backup_panel_make: String,
    pub backup_panel_model: String,
    pub backup_panel_bus_rating: Option<u32>,

    pub utility_service_amps: Option<u32>,
    pub coupling_type: CouplingType,
    pub existing_bos: ExistingBos,

    pub has_multiple_batteries: bool,
    pub has_different_battery_types: bool,
    pub is_standby_only: bool,
    pub requires_backup_power: bool,
    pub supports_peak_shaving: bool,
}

impl EquipmentState {
    pub fn system_prefix(&self) -> &'static str {
        self.system_number.prefix()
    }

    /// Recomputes every derived flag from the primary fields
    pub fn with_derived_flags(mut self) -> Self {
        self.has_multiple_batteries = self.battery_quantity > 1;
        self.has_different_battery_types = self.battery2_quantity > 0;
        self.is_standby_only =
            !self.has_solar_panels && self.battery_charging_source == ChargingSource::GridOnly;
        self.requires_backup_power = self.has_backup_panel && self.backup_option.is_backup();
        self.supports_peak_shaving = self.inverter_type == Some(InverterType::Hybrid);
        self
    }

    pub fn has_battery(&self) -> bool {
        self.battery_quantity > 0
    }

    /// Make of whichever inverter family the system uses
    pub fn active_inverter_make(&self) -> &str {
        match self.system_type {
            Some(SystemType::Microinverter) => &self.micro_inverter_make,
            _ => &self.inverter_make,
        }
    }

    pub fn active_inverter_model(&self) -> &str {
        match self.system_type {
            Some(SystemType::Microinverter) => &self.micro_inverter_model,
            _ => &self.inverter_model,
        }
    }

    pub fn is_microinverter(&self) -> bool {
        self.system_type == Some(SystemType::Microinverter)
    }

    pub fn is_string_inverter(&self) -> bool {
        self.system_type == Some(SystemType::Inverter)
    }
}
