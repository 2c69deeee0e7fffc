//! APS switchboard configurations A-1 through D
//!
//! Brand-agnostic rules taken from the APS interconnection switchboard. They
//! run after every brand-specific detector and before the utility-agnostic
//! fallbacks.

use super::{ConfigurationDetector, Priority};
use crate::bos::items::{
    AUTOMATIC_DISCONNECT_SWITCH, BI_DIRECTIONAL_METER, DEDICATED_DER_COMBINER_PANEL,
    DISCONNECT_SWITCH, STRING_COMBINER_PANEL, TRANSFER_SWITCH, UNI_DIRECTIONAL_METER,
};
use crate::bos::{
    warnings, BosEquipment, BosSection, BosSizing, Confidence, ConfigurationMatch, Topology,
};
use crate::equipment::utility::APS;
use crate::equipment::{ChargingSource, CouplingType, EquipmentState};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

const DC_DEFAULT_INVERTER_OUTPUT: f64 = 100.0;

/// One row of the APS switchboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApsSwitchboard {
    A1,
    A2,
    B1,
    B2,
    B3,
    B4,
    B5,
    C1,
    C2,
    D,
}

impl ApsSwitchboard {
    pub const ALL: [ApsSwitchboard; 10] = [
        ApsSwitchboard::A1,
        ApsSwitchboard::A2,
        ApsSwitchboard::B1,
        ApsSwitchboard::B2,
        ApsSwitchboard::B3,
        ApsSwitchboard::B4,
        ApsSwitchboard::B5,
        ApsSwitchboard::C1,
        ApsSwitchboard::C2,
        ApsSwitchboard::D,
    ];

    fn config_id(self) -> &'static str {
        match self {
            ApsSwitchboard::A1 => "aps_a1",
            ApsSwitchboard::A2 => "aps_a2",
            ApsSwitchboard::B1 => "aps_b1",
            ApsSwitchboard::B2 => "aps_b2",
            ApsSwitchboard::B3 => "aps_b3",
            ApsSwitchboard::B4 => "aps_b4",
            ApsSwitchboard::B5 => "aps_b5",
            ApsSwitchboard::C1 => "aps_c1",
            ApsSwitchboard::C2 => "aps_c2",
            ApsSwitchboard::D => "aps_d",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ApsSwitchboard::A1 => "AC Coupled A-1 (Grid-only + Backup)",
            ApsSwitchboard::A2 => "AC Coupled A-2 (Grid-only + PCS)",
            ApsSwitchboard::B1 => "AC Coupled B-1 (Solar + Multiple Batteries + Backup)",
            ApsSwitchboard::B2 => "AC Coupled B-2 (Solar + Battery + PCS)",
            ApsSwitchboard::B3 => "AC Coupled B-3 (Solar + Single Battery + Backup)",
            ApsSwitchboard::B4 => "AC Coupled B-4 (Solar + Battery Standard)",
            ApsSwitchboard::B5 => "AC Coupled B-5 (Multiple Batteries + PCS)",
            ApsSwitchboard::C1 => "DC Coupled Hybrid C-1 (Peak Shaving)",
            ApsSwitchboard::C2 => "DC Coupled Hybrid C-2 (Peak Shaving + Backup)",
            ApsSwitchboard::D => "Standby Battery Configuration D",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ApsSwitchboard::A1 => "Battery charged from grid only with backup power capability",
            ApsSwitchboard::A2 => {
                "Battery charged from grid only with Power Control System (curtailment)"
            }
            ApsSwitchboard::B1 => {
                "Battery charged from grid or renewable with multiple batteries and backup"
            }
            ApsSwitchboard::B2 => "Battery charged from grid or renewable with PCS (curtailment)",
            ApsSwitchboard::B3 => {
                "Battery charged from grid or renewable with single battery and backup"
            }
            ApsSwitchboard::B4 => "Battery charged from grid or renewable (standard configuration)",
            ApsSwitchboard::B5 => {
                "Battery charged from grid or renewable with multiple batteries and PCS"
            }
            ApsSwitchboard::C1 => "DC coupled hybrid system with peak shaving capability",
            ApsSwitchboard::C2 => "DC coupled hybrid system with peak shaving and backup power",
            ApsSwitchboard::D => "Standby battery system without renewable energy sources",
        }
    }

    fn priority(self) -> Priority {
        match self {
            ApsSwitchboard::A1 => Priority::of(10),
            ApsSwitchboard::A2 => Priority::of(11),
            ApsSwitchboard::B1 => Priority::of(12),
            ApsSwitchboard::B2 => Priority::of(13),
            ApsSwitchboard::B3 => Priority::of(14),
            ApsSwitchboard::B4 => Priority::of(15),
            ApsSwitchboard::B5 => Priority::of(16),
            ApsSwitchboard::C1 => Priority::of(17),
            ApsSwitchboard::C2 => Priority::of(18),
            ApsSwitchboard::D => Priority::of(19),
        }
    }

    fn topology(self) -> Option<Topology> {
        match self {
            ApsSwitchboard::C1 | ApsSwitchboard::C2 => Some(Topology::DcCoupled),
            ApsSwitchboard::D => None,
            _ => Some(Topology::AcCoupled),
        }
    }

    fn has_backup(self) -> bool {
        !matches!(
            self,
            ApsSwitchboard::A2 | ApsSwitchboard::B2 | ApsSwitchboard::B4 | ApsSwitchboard::B5
        )
    }

    /// Utility-section items in order; `true` marks items rated at the sized amps
    fn items(self) -> &'static [(&'static str, bool)] {
        match self {
            ApsSwitchboard::A1 => &[
                (AUTOMATIC_DISCONNECT_SWITCH, true),
                (BI_DIRECTIONAL_METER, true),
                (BI_DIRECTIONAL_METER, true),
            ],
            ApsSwitchboard::A2 => &[(DISCONNECT_SWITCH, true), (BI_DIRECTIONAL_METER, true)],
            ApsSwitchboard::B1 => &[
                (STRING_COMBINER_PANEL, false),
                (AUTOMATIC_DISCONNECT_SWITCH, true),
                (UNI_DIRECTIONAL_METER, true),
                (DEDICATED_DER_COMBINER_PANEL, false),
            ],
            ApsSwitchboard::B2 | ApsSwitchboard::B4 | ApsSwitchboard::B5 => {
                &[(STRING_COMBINER_PANEL, false), (BI_DIRECTIONAL_METER, true)]
            }
            ApsSwitchboard::B3 => &[
                (STRING_COMBINER_PANEL, false),
                (AUTOMATIC_DISCONNECT_SWITCH, true),
                (BI_DIRECTIONAL_METER, true),
            ],
            ApsSwitchboard::C1 => &[
                (STRING_COMBINER_PANEL, false),
                (BI_DIRECTIONAL_METER, true),
                (UNI_DIRECTIONAL_METER, true),
            ],
            ApsSwitchboard::C2 => &[
                (STRING_COMBINER_PANEL, false),
                (AUTOMATIC_DISCONNECT_SWITCH, true),
                (BI_DIRECTIONAL_METER, true),
            ],
            ApsSwitchboard::D => &[(TRANSFER_SWITCH, false)],
        }
    }

    fn notes(self) -> &'static [&'static str] {
        match self {
            ApsSwitchboard::A1 => &[
                "Battery charges from grid only",
                "Provides backup power during outages",
                "Requires ADS for grid isolation",
            ],
            ApsSwitchboard::A2 => &[
                "Battery charges from grid only",
                "Provides customer load curtailment/PCS",
            ],
            ApsSwitchboard::B1 => &[
                "Multiple battery units of the same type",
                "Requires dedicated DER combiner panel for multiple batteries",
            ],
            ApsSwitchboard::B2 => &["Single battery system", "Provides customer load curtailment/PCS"],
            ApsSwitchboard::B3 => &["Single battery system", "Requires ADS for grid isolation"],
            ApsSwitchboard::B4 => &["Standard configuration", "No PCS/curtailment"],
            ApsSwitchboard::B5 => &[
                "Multiple battery units of the same type",
                "Provides customer load curtailment/PCS",
            ],
            ApsSwitchboard::C1 => &[
                "DC coupled system with hybrid inverter",
                "PV array directly connected to hybrid inverter",
            ],
            ApsSwitchboard::C2 => &[
                "DC coupled system with hybrid inverter",
                "Requires ADS for grid isolation",
            ],
            ApsSwitchboard::D => &["Standby battery only, no solar", "Requires transfer switch"],
        }
    }

    fn matches(self, state: &EquipmentState) -> bool {
        let grid_only = state.battery_charging_source == ChargingSource::GridOnly;
        let grid_or_renewable = state.battery_charging_source == ChargingSource::GridOrRenewable;
        let ac = state.coupling_type == CouplingType::AC;
        let dc = state.coupling_type == CouplingType::DC;
        let solar = state.has_solar_panels;
        let batteries = state.battery_quantity;
        let panel = state.has_backup_panel;

        match self {
            ApsSwitchboard::A1 => !solar && batteries > 0 && grid_only && ac && panel,
            ApsSwitchboard::A2 => !solar && batteries > 0 && grid_only && ac && !panel,
            ApsSwitchboard::B1 => {
                solar && batteries > 1 && state.has_multiple_batteries && grid_or_renewable && ac && panel
            }
            ApsSwitchboard::B2 => {
                solar
                    && batteries == 1
                    && grid_or_renewable
                    && ac
                    && !panel
                    && state.supports_peak_shaving
            }
            ApsSwitchboard::B3 => {
                solar
                    && batteries == 1
                    && grid_or_renewable
                    && ac
                    && panel
                    && !state.has_multiple_batteries
            }
            ApsSwitchboard::B4 => {
                solar
                    && batteries == 1
                    && grid_or_renewable
                    && ac
                    && !panel
                    && !state.supports_peak_shaving
            }
            ApsSwitchboard::B5 => {
                solar && batteries > 1 && state.has_multiple_batteries && grid_or_renewable && ac && !panel
            }
            ApsSwitchboard::C1 => solar && dc && state.supports_peak_shaving && !panel,
            ApsSwitchboard::C2 => solar && dc && state.supports_peak_shaving && panel,
            ApsSwitchboard::D => !solar && batteries > 0 && state.is_standby_only,
        }
    }
}

/// Detector for one switchboard row
pub struct ApsGenericDetector {
    config: ApsSwitchboard,
}

impl ApsGenericDetector {
    pub fn new(config: ApsSwitchboard) -> Self {
        Self { config }
    }

    /// One detector per switchboard row, in priority order
    pub fn all() -> Vec<Self> {
        ApsSwitchboard::ALL.iter().copied().map(Self::new).collect()
    }

    fn sizing(&self, state: &EquipmentState) -> (Option<BosSizing>, Option<String>) {
        let inverter = state.inverter_max_continuous_output.unwrap_or(0.0);
        match self.config.topology() {
            Some(Topology::DcCoupled) if inverter <= 0.0 => (
                Some(BosSizing::dc_coupled(DC_DEFAULT_INVERTER_OUTPUT)),
                Some(warnings::assumed_inverter_output(DC_DEFAULT_INVERTER_OUTPUT)),
            ),
            Some(topology) => (
                Some(BosSizing::for_topology(
                    topology,
                    inverter,
                    state.battery_max_continuous_output,
                )),
                None,
            ),
            None => (None, None),
        }
    }
}

#[async_trait]
impl ConfigurationDetector for ApsGenericDetector {
    fn config_id(&self) -> &'static str {
        self.config.config_id()
    }

    fn name(&self) -> &'static str {
        self.config.name()
    }

    fn priority(&self) -> Priority {
        self.config.priority()
    }

    fn utilities(&self) -> &'static [&'static str] {
        &[APS]
    }

    fn quick_check(&self, state: &EquipmentState) -> bool {
        match self.config {
            ApsSwitchboard::C1 | ApsSwitchboard::C2 => state.has_solar_panels,
            _ => state.battery_quantity > 0,
        }
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        _siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        if !self.applies_to_utility(&state.utility_name) || !self.config.matches(state) {
            return None;
        }

        let (sizing, assumed) = self.sizing(state);
        let equipment = self
            .config
            .items()
            .iter()
            .enumerate()
            .map(|(i, (equipment_type, sized))| {
                let item = BosEquipment::new(BosSection::Utility, i as u8 + 1, equipment_type);
                match (&sizing, sized) {
                    (Some(sizing), true) => item.with_sizing(sizing.clone()),
                    _ => item,
                }
            })
            .collect();

        let mut result = ConfigurationMatch::new(
            self.config_id(),
            self.name(),
            self.priority(),
            Confidence::Partial,
            state,
        )
        .with_description(self.config.description())
        .with_equipment(equipment);

        for note in self.config.notes() {
            result = result.with_note(*note);
        }
        if let Some(sizing) = &sizing {
            result = result.with_note(format!("BOS sized to {}A: {}", sizing.required_amps, sizing.calculation));
        }
        if !self.config.has_backup() {
            result = result.without_backup();
        }
        if let Some(warning) = assumed {
            result = result.with_warning(warning);
        }
        Some(result)
    }
}
