//! Fixed record-key table for every system slot
//!
//! Project records store one flat namespace of `sys{N}_`-prefixed keys. The
//! table below spells out every key each system reads, so extraction never
//! builds key names at runtime.

use super::state::SystemNumber;

pub const UTILITY_SERVICE_AMPS: &str = "utility_service_amps";
pub const PROJECT_ID: &str = "project_id";
pub const ID: &str = "id";
pub const UTILITY: &str = "utility";
pub const UTILITY_NAME: &str = "utility_name";
pub const UTILITY_STATE: &str = "state";

/// Keys of one recorded BOS slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotKeys {
    pub equipment_type: &'static str,
    pub make: &'static str,
    pub model: &'static str,
    pub amp_rating: &'static str,
}

/// A slot recorded under a current key set, with an optional legacy spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasedSlotKeys {
    pub current: SlotKeys,
    pub legacy: Option<SlotKeys>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemKeys {
    pub solar_make: &'static str,
    pub solar_model: &'static str,
    pub solar_qty: &'static str,
    pub solar_wattage: &'static str,

    pub inverter_type: &'static str,
    pub selected_system: &'static str,
    pub inverter_make: &'static str,
    pub inverter_model: &'static str,
    pub inverter_qty: &'static str,
    pub inverter_max_output: &'static str,

    pub battery_qty: &'static str,
    pub battery_make: &'static str,
    pub battery_model: &'static str,
    pub battery_max_output: &'static str,
    pub battery_charging_source: &'static str,
    pub battery2_qty: &'static str,
    pub battery2_make: &'static str,
    pub battery2_model: &'static str,

    pub sms_make: &'static str,
    pub sms_model: &'static str,

    pub gateway_make: &'static str,
    pub gateway_model: &'static str,
    pub gateway: &'static str,

    pub backup_option: &'static str,
    /// Current key first, legacy spelling second
    pub backup_panel_make: [&'static str; 2],
    pub backup_panel_model: [&'static str; 2],
    pub backup_bus_rating: &'static str,

    pub utility_bos: [SlotKeys; 6],
    pub battery_bos: [SlotKeys; 3],
    pub backup_bos: [SlotKeys; 3],
    pub post_sms_bos: [AliasedSlotKeys; 3],
}

macro_rules! slot_keys {
    ($($part:literal),+) => {
        SlotKeys {
            equipment_type: concat!($($part),+, "_equipment_type"),
            make: concat!($($part),+, "_make"),
            model: concat!($($part),+, "_model"),
            amp_rating: concat!($($part),+, "_amp_rating"),
        }
    };
}

macro_rules! post_sms_slot {
    ($sys:literal, $i:literal) => {
        AliasedSlotKeys {
            current: slot_keys!("post_sms_bos_sys", $sys, "_type", $i),
            legacy: Some(slot_keys!("sys", $sys, "_post_sms_bos_type_", $i)),
        }
    };
}

macro_rules! system_keys {
    ($sys:literal, backup_panel: [$bp:literal, $bp_legacy:literal], bus_rating: $br:literal) => {
        SystemKeys {
            solar_make: concat!("sys", $sys, "_solar_panel_make"),
            solar_model: concat!("sys", $sys, "_solar_panel_model"),
            solar_qty: concat!("sys", $sys, "_solar_panel_qty"),
            solar_wattage: concat!("sys", $sys, "_solar_panel_wattage"),

            inverter_type: concat!("sys", $sys, "_inverter_type"),
            selected_system: concat!("sys", $sys, "_selectedsystem"),
            inverter_make: concat!("sys", $sys, "_micro_inverter_make"),
            inverter_model: concat!("sys", $sys, "_micro_inverter_model"),
            inverter_qty: concat!("sys", $sys, "_micro_inverter_qty"),
            inverter_max_output: concat!("sys", $sys, "_inv_max_continuous_output"),

            battery_qty: concat!("sys", $sys, "_battery_1_qty"),
            battery_make: concat!("sys", $sys, "_battery_1_make"),
            battery_model: concat!("sys", $sys, "_battery_1_model"),
            battery_max_output: concat!("sys", $sys, "_battery_1_max_continuous_output"),
            battery_charging_source: concat!("sys", $sys, "_battery_charging_source"),
            battery2_qty: concat!("sys", $sys, "_battery_2_qty"),
            battery2_make: concat!("sys", $sys, "_battery_2_make"),
            battery2_model: concat!("sys", $sys, "_battery_2_model"),

            sms_make: concat!("sys", $sys, "_sms_make"),
            sms_model: concat!("sys", $sys, "_sms_model"),

            gateway_make: concat!("sys", $sys, "_gateway_make"),
            gateway_model: concat!("sys", $sys, "_gateway_model"),
            gateway: concat!("sys", $sys, "_gateway"),

            backup_option: concat!("sys", $sys, "_backup_option"),
            backup_panel_make: [concat!($bp, "_make"), concat!($bp_legacy, "_make")],
            backup_panel_model: [concat!($bp, "_model"), concat!($bp_legacy, "_model")],
            backup_bus_rating: $br,

            utility_bos: [
                slot_keys!("bos_sys", $sys, "_type1"),
                slot_keys!("bos_sys", $sys, "_type2"),
                slot_keys!("bos_sys", $sys, "_type3"),
                slot_keys!("bos_sys", $sys, "_type4"),
                slot_keys!("bos_sys", $sys, "_type5"),
                slot_keys!("bos_sys", $sys, "_type6"),
            ],
            battery_bos: [
                slot_keys!("bos_sys", $sys, "_battery1_type1"),
                slot_keys!("bos_sys", $sys, "_battery1_type2"),
                slot_keys!("bos_sys", $sys, "_battery1_type3"),
            ],
            backup_bos: [
                slot_keys!("bos_sys", $sys, "_backup_type1"),
                slot_keys!("bos_sys", $sys, "_backup_type2"),
                slot_keys!("bos_sys", $sys, "_backup_type3"),
            ],
            post_sms_bos: [
                post_sms_slot!($sys, 1),
                post_sms_slot!($sys, 2),
                post_sms_slot!($sys, 3),
            ],
        }
    };
}

/// Record keys per system, indexed by [`SystemNumber::index`]
///
/// System 1 keeps its backup load panel under the `bls1_` namespace.
pub static SYSTEM_KEYS: [SystemKeys; 4] = [
    system_keys!(
        1,
        backup_panel: ["bls1_backup_load_sub_panel", "bls1_backup_load_sub_panel"],
        bus_rating: "bls1_backuploader_bus_bar_rating"
    ),
    system_keys!(
        2,
        backup_panel: ["sys2_backuploadsubpanel", "sys2_backup_load_sub_panel"],
        bus_rating: "sys2_backuploadsubpanel_bus_rating"
    ),
    system_keys!(
        3,
        backup_panel: ["sys3_backuploadsubpanel", "sys3_backup_load_sub_panel"],
        bus_rating: "sys3_backuploadsubpanel_bus_rating"
    ),
    system_keys!(
        4,
        backup_panel: ["sys4_backuploadsubpanel", "sys4_backup_load_sub_panel"],
        bus_rating: "sys4_backuploadsubpanel_bus_rating"
    ),
];

pub fn keys_for(system: SystemNumber) -> &'static SystemKeys {
    &SYSTEM_KEYS[system.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_system_one_keys() {
        let keys = keys_for(SystemNumber::One);
        assert_eq!(keys.solar_make, "sys1_solar_panel_make");
        assert_eq!(keys.inverter_make, "sys1_micro_inverter_make");
        assert_eq!(keys.inverter_max_output, "sys1_inv_max_continuous_output");
        assert_eq!(keys.backup_panel_make[0], "bls1_backup_load_sub_panel_make");
        assert_eq!(keys.backup_bus_rating, "bls1_backuploader_bus_bar_rating");
        assert_eq!(keys.utility_bos[5].equipment_type, "bos_sys1_type6_equipment_type");
        assert_eq!(keys.battery_bos[0].amp_rating, "bos_sys1_battery1_type1_amp_rating");
    }

    #[test]
    fn test_other_systems_use_sys_prefix_for_backup_panel() {
        let keys = keys_for(SystemNumber::Three);
        assert_eq!(keys.backup_panel_make[0], "sys3_backuploadsubpanel_make");
        assert_eq!(keys.backup_panel_model[1], "sys3_backup_load_sub_panel_model");
        assert_eq!(keys.backup_bus_rating, "sys3_backuploadsubpanel_bus_rating");
    }

    #[test]
    fn test_post_sms_slot_aliases() {
        let slot = keys_for(SystemNumber::Two).post_sms_bos[1];
        assert_eq!(slot.current.equipment_type, "post_sms_bos_sys2_type2_equipment_type");
        assert_eq!(
            slot.legacy.map(|k| k.equipment_type),
            Some("sys2_post_sms_bos_type_2_equipment_type")
        );
    }

    #[test]
    fn test_keys_do_not_collide_across_systems() {
        let mut seen = HashSet::new();
        for system in SystemNumber::ALL {
            let keys = keys_for(system);
            for key in [
                keys.solar_make,
                keys.inverter_make,
                keys.battery_make,
                keys.sms_make,
                keys.backup_option,
                keys.backup_bus_rating,
                keys.utility_bos[0].equipment_type,
                keys.post_sms_bos[0].current.equipment_type,
            ] {
                assert!(seen.insert(key), "duplicate key {}", key);
            }
        }
    }
}
