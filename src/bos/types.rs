//! Configuration match and derived BOS equipment types

use super::amperage::BosSizing;
use super::warnings;
use crate::detectors::Priority;
use crate::equipment::{EquipmentState, SystemNumber, SystemType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a BOS item sits in the one-line diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BosSection {
    Utility,
    Battery,
    Backup,
    PostSms,
    PostCombine,
}

impl BosSection {
    /// Number of slots the project record offers for this section
    pub fn slot_count(self) -> u8 {
        match self {
            BosSection::Utility => 6,
            _ => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BosSection::Utility => "utility",
            BosSection::Battery => "battery",
            BosSection::Backup => "backup",
            BosSection::PostSms => "post-sms",
            BosSection::PostCombine => "post-combine",
        }
    }
}

impl fmt::Display for BosSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One derived balance-of-system item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BosEquipment {
    pub section: BosSection,
    pub position: u8,
    pub equipment_type: String,
    pub make: String,
    pub model: String,
    pub amp_rating: Option<u32>,
    pub auto_selected: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub system_number: Option<SystemNumber>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preferred_make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sizing: Option<BosSizing>,
}

impl BosEquipment {
    pub fn new(section: BosSection, position: u8, equipment_type: &str) -> Self {
        Self {
            section,
            position,
            equipment_type: equipment_type.to_string(),
            make: String::new(),
            model: String::new(),
            amp_rating: None,
            auto_selected: false,
            system_number: None,
            preferred_make: None,
            sizing: None,
        }
    }

    /// Fixed make and model chosen by the configuration rather than the user
    pub fn auto_selected(mut self, make: &str, model: &str) -> Self {
        self.make = make.to_string();
        self.model = model.to_string();
        self.auto_selected = true;
        self
    }

    pub fn with_amp_rating(mut self, amps: u32) -> Self {
        self.amp_rating = Some(amps);
        self
    }

    pub fn with_sizing(mut self, sizing: BosSizing) -> Self {
        self.amp_rating = Some(sizing.required_amps);
        self.sizing = Some(sizing);
        self
    }

    pub fn with_preferred_make(mut self, make: &str) -> Self {
        self.preferred_make = Some(make.to_string());
        self
    }

    pub fn for_system(mut self, system: SystemNumber) -> Self {
        self.system_number = Some(system);
        self
    }
}

/// How tightly a configuration fits the equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Brand and utility specific rule
    Exact,
    Partial,
    /// Utility-agnostic fallback
    Fallback,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Exact => f.write_str("exact"),
            Confidence::Partial => f.write_str("partial"),
            Confidence::Fallback => f.write_str("fallback"),
        }
    }
}

/// Which equipment sections the configuration shows
///
/// `inverter` and `micro_inverter` are never both set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSections {
    pub solar: bool,
    inverter: bool,
    micro_inverter: bool,
    pub battery1: bool,
    pub battery2: bool,
    pub battery_combiner_panel: bool,
    pub backup_load_sub_panel: bool,
    pub gateway: bool,
    pub sms: bool,
    pub ess: bool,
    pub string_combiner_panel: bool,
}

impl EquipmentSections {
    /// Sections implied directly by the equipment state
    pub fn from_state(state: &EquipmentState) -> Self {
        let mut sections = Self {
            solar: state.has_solar_panels,
            battery1: state.has_battery(),
            battery2: state.battery2_quantity > 0,
            backup_load_sub_panel: state.has_backup_panel,
            gateway: state.has_gateway,
            sms: state.has_sms,
            ess: state.has_battery(),
            ..Default::default()
        };
        sections.set_system_type(state.system_type);
        sections
    }

    pub fn set_system_type(&mut self, system_type: Option<SystemType>) {
        self.inverter = system_type == Some(SystemType::Inverter);
        self.micro_inverter = system_type == Some(SystemType::Microinverter);
    }

    pub fn with_system_type(mut self, system_type: Option<SystemType>) -> Self {
        self.set_system_type(system_type);
        self
    }

    pub fn inverter(&self) -> bool {
        self.inverter
    }

    pub fn micro_inverter(&self) -> bool {
        self.micro_inverter
    }

    /// Looks a section up by its serialized name
    pub fn get(&self, name: &str) -> Option<bool> {
        let value = match name {
            "solar" => self.solar,
            "inverter" => self.inverter,
            "microInverter" => self.micro_inverter,
            "battery1" => self.battery1,
            "battery2" => self.battery2,
            "batteryCombinerPanel" => self.battery_combiner_panel,
            "backupLoadSubPanel" => self.backup_load_sub_panel,
            "gateway" => self.gateway,
            "sms" => self.sms,
            "ess" => self.ess,
            "stringCombinerPanel" => self.string_combiner_panel,
            _ => return None,
        };
        Some(value)
    }
}

/// Where each system of a multi-system configuration combines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinePoint {
    pub system_number: SystemNumber,
    pub combines_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSystemConfig {
    pub total_systems: u8,
    pub combine_points: Vec<CombinePoint>,
}

/// A reference configuration resolved for one system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationMatch {
    pub config_id: String,
    pub config_name: String,
    pub description: String,
    pub priority: Priority,
    pub confidence: Confidence,
    pub system_number: SystemNumber,
    pub bos_equipment: Vec<BosEquipment>,
    pub equipment_sections: EquipmentSections,
    pub warnings: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub multi_system: Option<MultiSystemConfig>,
}

impl ConfigurationMatch {
    pub fn new(
        config_id: &str,
        config_name: impl Into<String>,
        priority: Priority,
        confidence: Confidence,
        state: &EquipmentState,
    ) -> Self {
        Self {
            config_id: config_id.to_string(),
            config_name: config_name.into(),
            description: String::new(),
            priority,
            confidence,
            system_number: state.system_number,
            bos_equipment: Vec::new(),
            equipment_sections: EquipmentSections::from_state(state),
            warnings: Vec::new(),
            notes: Vec::new(),
            multi_system: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_equipment(mut self, equipment: Vec<BosEquipment>) -> Self {
        self.bos_equipment = equipment;
        self
    }

    pub fn with_sections(mut self, sections: EquipmentSections) -> Self {
        self.equipment_sections = sections;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Adds the grid-tied no-backup compliance warnings
    pub fn without_backup(self) -> Self {
        self.with_warning(warnings::NO_BACKUP_POWER)
            .with_warning(warnings::RAPID_SHUTDOWN)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_multi_system(mut self, multi_system: MultiSystemConfig) -> Self {
        self.multi_system = Some(multi_system);
        self
    }

    pub fn is_multi_system(&self) -> bool {
        self.multi_system.is_some()
    }

    pub fn equipment_in(&self, section: BosSection) -> impl Iterator<Item = &BosEquipment> {
        self.bos_equipment
            .iter()
            .filter(move |item| item.section == section)
    }

    pub fn has_warning_containing(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.contains(needle))
    }
}
