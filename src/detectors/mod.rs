//! Configuration detectors
//!
//! Each detector recognizes one reference configuration: a brand, utility and
//! coupling topology combination together with one backup variant. Detectors
//! are independent of each other; when a state satisfies several of them the
//! registry picks the one with the lowest [`Priority`].

use crate::bos::{BosEquipment, BosSection, BosSizing};
use crate::equipment::{BackupOption, EquipmentState, SystemNumber};
use crate::sibling::SiblingStateProvider;
use async_trait::async_trait;

pub mod aps_ac_coupled;
pub mod aps_dc_coupled;
pub mod aps_generic;
pub mod aps_pv_only;
pub mod enphase_aps;
pub mod franklin_aps;
pub mod franklin_srp;
pub mod generic;
pub mod multi_system;
pub mod predicates;
pub mod priority;
pub mod storz_aps;
pub mod tesla_pw3_aps;
pub mod utility_pv_only;

pub use aps_ac_coupled::ApsAcCoupledDetector;
pub use aps_dc_coupled::ApsDcCoupledDetector;
pub use aps_generic::{ApsGenericDetector, ApsSwitchboard};
pub use aps_pv_only::ApsPvOnlyDetector;
pub use enphase_aps::EnphaseApsDetector;
pub use franklin_aps::FranklinApsDetector;
pub use franklin_srp::FranklinSrpDetector;
pub use generic::{GenericConfig, GenericDetector};
pub use priority::{Priority, PriorityError};
pub use storz_aps::StorzWholeHomeMultiSystemDetector;
pub use tesla_pw3_aps::{TeslaPw3ApsDetector, TeslaPw3MultiSystemDetector};
pub use utility_pv_only::{UtilityPvOnlyDetector, UtilityPvProfile};

/// Matches the utilities of every detector that lists it
pub const ANY_UTILITY: &str = "*";

/// One reference configuration rule
#[async_trait]
pub trait ConfigurationDetector: Send + Sync {
    /// Stable machine identifier of the configuration
    fn config_id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn priority(&self) -> Priority;

    /// Utility codes served, or [`ANY_UTILITY`]
    fn utilities(&self) -> &'static [&'static str];

    /// Systems a multi-system configuration claims; empty for single-system rules
    fn affected_systems(&self) -> &'static [SystemNumber] {
        &[]
    }

    fn is_multi_system(&self) -> bool {
        self.affected_systems().len() > 1
    }

    /// A blank utility never applies
    fn applies_to_utility(&self, utility: &str) -> bool {
        let utility = utility.trim();
        !utility.is_empty()
            && self
                .utilities()
                .iter()
                .any(|u| *u == ANY_UTILITY || u.eq_ignore_ascii_case(utility))
    }

    /// Cheap field comparisons run before [`ConfigurationDetector::detect`]
    fn quick_check(&self, state: &EquipmentState) -> bool {
        let _ = state;
        true
    }

    async fn detect(
        &self,
        state: &EquipmentState,
        siblings: &dyn SiblingStateProvider,
    ) -> Option<crate::bos::ConfigurationMatch>;
}

/// Backup option a detector instance stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupVariant {
    WholeHome,
    PartialHome,
    NoBackup,
}

impl BackupVariant {
    pub fn matches(self, option: BackupOption) -> bool {
        matches!(
            (self, option),
            (BackupVariant::WholeHome, BackupOption::WholeHome)
                | (BackupVariant::PartialHome, BackupOption::PartialHome)
                | (BackupVariant::NoBackup, BackupOption::None)
        )
    }

    pub fn has_backup(self) -> bool {
        self != BackupVariant::NoBackup
    }

    /// Default precedence among a brand's variants
    pub fn priority(self) -> Priority {
        match self {
            BackupVariant::WholeHome => Priority::of(1),
            BackupVariant::PartialHome => Priority::of(2),
            BackupVariant::NoBackup => Priority::of(3),
        }
    }

    /// Suffix used in the configuration name
    pub fn name_suffix(self) -> &'static str {
        match self {
            BackupVariant::WholeHome => "(Whole Home Backup)",
            BackupVariant::PartialHome => "(Partial Home Backup)",
            BackupVariant::NoBackup => "(Grid-Tied, No Backup)",
        }
    }
}

/// AC-coupled sizing from the state's inverter and battery outputs
///
/// `None` when neither output is known.
pub(crate) fn ac_sizing(state: &EquipmentState) -> Option<BosSizing> {
    let sizing = BosSizing::ac_coupled(
        state.inverter_max_continuous_output.unwrap_or(0.0),
        state.battery_max_continuous_output,
    );
    (sizing.required_amps > 0).then_some(sizing)
}

pub(crate) fn sized_item(
    section: BosSection,
    position: u8,
    equipment_type: &str,
    sizing: Option<&BosSizing>,
) -> BosEquipment {
    let item = BosEquipment::new(section, position, equipment_type);
    match sizing {
        Some(sizing) => item.with_sizing(sizing.clone()),
        None => item,
    }
}

pub(crate) const UNSIZED_WARNING: &str =
    "Amp rating not calculated: inverter and battery output not specified";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bos::ConfigurationMatch;

    struct Stub;

    #[async_trait]
    impl ConfigurationDetector for Stub {
        fn config_id(&self) -> &'static str {
            "stub"
        }
        fn name(&self) -> &'static str {
            "Stub"
        }
        fn priority(&self) -> Priority {
            Priority::of(1)
        }
        fn utilities(&self) -> &'static [&'static str] {
            &["APS", "SRP"]
        }
        async fn detect(
            &self,
            _state: &EquipmentState,
            _siblings: &dyn SiblingStateProvider,
        ) -> Option<ConfigurationMatch> {
            None
        }
    }

    struct Wildcard;

    #[async_trait]
    impl ConfigurationDetector for Wildcard {
        fn config_id(&self) -> &'static str {
            "wildcard"
        }
        fn name(&self) -> &'static str {
            "Wildcard"
        }
        fn priority(&self) -> Priority {
            Priority::of(20)
        }
        fn utilities(&self) -> &'static [&'static str] {
            &[ANY_UTILITY]
        }
        async fn detect(
            &self,
            _state: &EquipmentState,
            _siblings: &dyn SiblingStateProvider,
        ) -> Option<ConfigurationMatch> {
            None
        }
    }

    #[test]
    fn test_applies_to_utility() {
        assert!(Stub.applies_to_utility("aps"));
        assert!(Stub.applies_to_utility(" SRP "));
        assert!(!Stub.applies_to_utility("TEP"));
        assert!(!Stub.applies_to_utility(""));
    }

    #[test]
    fn test_wildcard_requires_some_utility() {
        assert!(Wildcard.applies_to_utility("Pacific Gas & Electric"));
        assert!(!Wildcard.applies_to_utility("  "));
    }

    #[test]
    fn test_trait_defaults() {
        assert!(Stub.affected_systems().is_empty());
        assert!(!Stub.is_multi_system());
        assert!(Stub.quick_check(&EquipmentState::default()));
    }

    #[test]
    fn test_backup_variant_matching() {
        assert!(BackupVariant::WholeHome.matches(BackupOption::WholeHome));
        assert!(!BackupVariant::WholeHome.matches(BackupOption::PartialHome));
        assert!(BackupVariant::NoBackup.matches(BackupOption::None));
        assert!(!BackupVariant::NoBackup.has_backup());
        assert!(BackupVariant::WholeHome.priority().precedes(BackupVariant::NoBackup.priority()));
    }

    #[test]
    fn test_ac_sizing() {
        let state = EquipmentState {
            inverter_max_continuous_output: Some(38.5),
            battery_max_continuous_output: 20.0,
            ..Default::default()
        };
        assert_eq!(ac_sizing(&state).map(|s| s.required_amps), Some(74));
        assert!(ac_sizing(&EquipmentState::default()).is_none());
    }
}
