//! Continuous-duty amperage sizing for BOS equipment
//!
//! Ratings are always rounded up: undersized protective equipment is never
//! acceptable, so the derated figure is the ceiling of `amps × 1.25`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// NEC continuous-duty multiplier
pub const CONTINUOUS_DUTY_FACTOR: f64 = 1.25;

/// Products this many ULPs from a whole ampere are treated as exact
const SNAP_ULPS: f64 = 4.0;

/// Standard breaker and disconnect ratings in amps
pub const STANDARD_AMP_RATINGS: [u32; 19] = [
    15, 20, 30, 40, 50, 60, 70, 80, 90, 100, 125, 150, 175, 200, 225, 250, 300, 350, 400,
];

/// How the storage and PV current sources meet the AC bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    PvOnly,
    /// Battery on the DC side of a shared inverter
    DcCoupled,
    /// Battery with its own inverter on the AC bus
    AcCoupled,
}

impl Topology {
    pub fn label(self) -> &'static str {
        match self {
            Topology::PvOnly => "PV-Only",
            Topology::DcCoupled => "DC-Coupled",
            Topology::AcCoupled => "AC-Coupled",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn sanitize(amps: f64) -> f64 {
    if amps.is_finite() && amps > 0.0 {
        amps
    } else {
        0.0
    }
}

/// `ceil(amps × 1.25)`; negative and non-finite inputs count as zero
///
/// Only floating-point noise of a few ULPs is absorbed, so `40.8` sizes to
/// 51 while `32.0000001` still rounds up to 41.
pub fn derate(amps: f64) -> u32 {
    let product = sanitize(amps) * CONTINUOUS_DUTY_FACTOR;
    let nearest = product.round();
    if (product - nearest).abs() <= f64::EPSILON * SNAP_ULPS * nearest.max(1.0) {
        nearest as u32
    } else {
        product.ceil() as u32
    }
}

/// Required rating for the given topology
///
/// Only AC coupling adds the battery's output: under DC coupling the shared
/// inverter bounds the deliverable current.
pub fn required_amps(topology: Topology, inverter_output: f64, battery_output: f64) -> u32 {
    match topology {
        Topology::PvOnly | Topology::DcCoupled => derate(inverter_output),
        Topology::AcCoupled => derate(sanitize(inverter_output) + sanitize(battery_output)),
    }
}

/// Smallest standard rating at or above `amps`
pub fn standard_amp_rating(amps: u32) -> u32 {
    STANDARD_AMP_RATINGS
        .iter()
        .copied()
        .find(|rating| *rating >= amps)
        .unwrap_or_else(|| amps.saturating_add(49) / 50 * 50)
}

/// A sized rating together with how it was derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BosSizing {
    pub required_amps: u32,
    pub calculation: String,
    pub label: String,
}

impl BosSizing {
    pub fn for_topology(topology: Topology, inverter_output: f64, battery_output: f64) -> Self {
        let inverter = sanitize(inverter_output);
        let battery = sanitize(battery_output);
        let required = required_amps(topology, inverter, battery);

        let calculation = match topology {
            Topology::AcCoupled => format!(
                "Inverter ({}A) + Battery ({}A) × {} = {}A ({})",
                inverter, battery, CONTINUOUS_DUTY_FACTOR, required, topology
            ),
            _ => format!(
                "{}A × {} = {}A ({})",
                inverter, CONTINUOUS_DUTY_FACTOR, required, topology
            ),
        };

        let label = match topology {
            Topology::PvOnly => "Inverter Output (PV-Only)".to_string(),
            _ => format!("Total System Output ({})", topology),
        };

        Self {
            required_amps: required,
            calculation,
            label,
        }
    }

    pub fn pv_only(inverter_output: f64) -> Self {
        Self::for_topology(Topology::PvOnly, inverter_output, 0.0)
    }

    pub fn dc_coupled(inverter_output: f64) -> Self {
        Self::for_topology(Topology::DcCoupled, inverter_output, 0.0)
    }

    pub fn ac_coupled(inverter_output: f64, battery_output: f64) -> Self {
        Self::for_topology(Topology::AcCoupled, inverter_output, battery_output)
    }

    /// Rounds the requirement up to a standard rating
    pub fn rounded_to_standard(mut self) -> Self {
        let rating = standard_amp_rating(self.required_amps);
        if rating != self.required_amps {
            self.calculation = format!("{} → {}A standard rating", self.calculation, rating);
            self.required_amps = rating;
        }
        self
    }
}
