//! Utility-agnostic fallback configurations
//!
//! These run last and fit BOS around whatever the project already records:
//! each new item takes the next free slot of its section, and items that do
//! not fit are dropped.

use super::{ConfigurationDetector, Priority, ANY_UTILITY};
use crate::bos::{BosEquipment, BosSection, BosSizing, Confidence, ConfigurationMatch, Topology};
use crate::equipment::{BosSlot, CouplingType, EquipmentState};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;
use tracing::debug;

const PV_METER: &str = "PV Meter";
const AC_DISCONNECT: &str = "AC Disconnect";

/// Tracks free positions per section while items are placed
struct SlotAllocator {
    utility: Vec<bool>,
    battery: Vec<bool>,
    backup: Vec<bool>,
    post_sms: Vec<bool>,
}

impl SlotAllocator {
    fn from_state(state: &EquipmentState) -> Self {
        fn taken(slots: &[BosSlot]) -> Vec<bool> {
            slots.iter().map(|slot| !slot.is_empty()).collect()
        }
        let existing = &state.existing_bos;
        Self {
            utility: taken(&existing.utility),
            battery: taken(&existing.battery),
            backup: taken(&existing.backup),
            post_sms: taken(&existing.post_sms),
        }
    }

    /// Claims the lowest free position (1-based) in `section`
    fn claim(&mut self, section: BosSection) -> Option<u8> {
        let slots = match section {
            BosSection::Utility => &mut self.utility,
            BosSection::Battery => &mut self.battery,
            BosSection::Backup => &mut self.backup,
            BosSection::PostSms => &mut self.post_sms,
            BosSection::PostCombine => return None,
        };
        let index = slots.iter().position(|taken| !taken)?;
        slots[index] = true;
        Some(index as u8 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericConfig {
    PvOnly,
    DcCoupled,
    AcCoupled,
    BatteryOnly,
}

impl GenericConfig {
    pub const ALL: [GenericConfig; 4] = [
        GenericConfig::PvOnly,
        GenericConfig::DcCoupled,
        GenericConfig::AcCoupled,
        GenericConfig::BatteryOnly,
    ];

    fn topology(self) -> Topology {
        match self {
            GenericConfig::PvOnly => Topology::PvOnly,
            GenericConfig::DcCoupled => Topology::DcCoupled,
            GenericConfig::AcCoupled | GenericConfig::BatteryOnly => Topology::AcCoupled,
        }
    }

    fn matches(self, state: &EquipmentState) -> bool {
        let solar = state.has_solar_panels;
        let battery = state.has_battery();
        match self {
            GenericConfig::PvOnly => solar && !battery,
            GenericConfig::DcCoupled => solar && battery && state.coupling_type == CouplingType::DC,
            GenericConfig::AcCoupled => solar && battery && state.coupling_type == CouplingType::AC,
            GenericConfig::BatteryOnly => !solar && battery,
        }
    }
}

pub struct GenericDetector {
    config: GenericConfig,
}

impl GenericDetector {
    pub fn new(config: GenericConfig) -> Self {
        Self { config }
    }

    pub fn all() -> Vec<Self> {
        GenericConfig::ALL.iter().copied().map(Self::new).collect()
    }

    /// Sections requested in order, before slot allocation
    fn requested(&self, state: &EquipmentState) -> Vec<(BosSection, &'static str)> {
        let mut requested = Vec::new();
        if self.config != GenericConfig::BatteryOnly {
            requested.push((BosSection::Utility, PV_METER));
            requested.push((BosSection::Utility, AC_DISCONNECT));
        }
        if self.config != GenericConfig::PvOnly {
            requested.push((BosSection::Battery, AC_DISCONNECT));
            if state.has_backup_panel {
                requested.push((BosSection::Backup, AC_DISCONNECT));
            }
            if state.has_sms {
                requested.push((BosSection::PostSms, AC_DISCONNECT));
            }
        }
        requested
    }
}

#[async_trait]
impl ConfigurationDetector for GenericDetector {
    fn config_id(&self) -> &'static str {
        match self.config {
            GenericConfig::PvOnly => "generic_pv_only",
            GenericConfig::DcCoupled => "generic_dc_coupled",
            GenericConfig::AcCoupled => "generic_ac_coupled",
            GenericConfig::BatteryOnly => "generic_battery_only",
        }
    }

    fn name(&self) -> &'static str {
        match self.config {
            GenericConfig::PvOnly => "Generic PV-Only",
            GenericConfig::DcCoupled => "Generic DC-Coupled Solar + Battery",
            GenericConfig::AcCoupled => "Generic AC-Coupled Solar + Battery",
            GenericConfig::BatteryOnly => "Generic Battery-Only",
        }
    }

    fn priority(&self) -> Priority {
        match self.config {
            GenericConfig::PvOnly => Priority::of(20),
            GenericConfig::DcCoupled => Priority::of(21),
            GenericConfig::AcCoupled => Priority::of(22),
            GenericConfig::BatteryOnly => Priority::of(23),
        }
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[ANY_UTILITY]
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        self.config.matches(state)
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.applies_to_utility(&state.utility_name) || !self.config.matches(state) {
            return None;
        }

        let inverter_output = state
            .inverter_max_continuous_output
            .filter(|amps| *amps > 0.0)?;
        let sizing = BosSizing::for_topology(
            self.config.topology(),
            inverter_output,
            state.battery_max_continuous_output,
        );

        let mut slots = SlotAllocator::from_state(state);
        let mut equipment = Vec::new();
        for (section, equipment_type) in self.requested(state) {
            match slots.claim(section) {
                Some(position) => equipment.push(
                    BosEquipment::new(section, position, equipment_type)
                        .with_sizing(sizing.clone())
                        .for_system(state.system_number),
                ),
                None => debug!(
                    config_id = self.config_id(),
                    section = %section,
                    equipment_type,
                    "No free slot, item skipped"
                ),
            }
        }

        if equipment.is_empty() {
            return None;
        }

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.name(),
            self.priority(),
            Confidence::Fallback,
            state,
        )
        .with_description(format!(
            "Utility-agnostic {} configuration, BOS placed in free slots",
            self.config.topology()
        ))
        .with_equipment(equipment)
        .with_note(format!("BOS sized to {}A: {}", sizing.required_amps, sizing.calculation));

        if !state.requires_backup_power {
            result = result.without_backup();
        }
        Some(result)
    }
}
