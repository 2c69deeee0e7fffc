//! Compliance warning texts
//!
//! Consumers match on substrings of these, so the wording is fixed.

pub const NO_BACKUP_POWER: &str = "No backup power capability";

pub const RAPID_SHUTDOWN: &str =
    "System shuts down when grid goes down (NEC 690.12 rapid shutdown)";

pub fn assumed_inverter_output(amps: f64) -> String {
    format!(
        "Inverter max continuous output not specified, assumed {}A for sizing",
        amps
    )
}

pub fn assumed_bus_rating(amps: u32) -> String {
    format!(
        "Backup panel bus rating not specified, assumed {}A",
        amps
    )
}
