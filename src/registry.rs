//! Detector registry and resolver
//!
//! The registry keeps detectors sorted by ascending [`Priority`]; equal
//! priorities keep their registration order. [`DetectorRegistry::resolve`]
//! walks that order and returns the first match.

use crate::bos::ConfigurationMatch;
use crate::detectors::{
    ApsAcCoupledDetector, ApsDcCoupledDetector, ApsGenericDetector, ApsPvOnlyDetector,
    ConfigurationDetector, EnphaseApsDetector, FranklinApsDetector, FranklinSrpDetector,
    GenericDetector, StorzWholeHomeMultiSystemDetector, TeslaPw3ApsDetector,
    TeslaPw3MultiSystemDetector, UtilityPvOnlyDetector,
};
use crate::equipment::{EquipmentState, SystemNumber};
use crate::sibling::SiblingStateProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry needs at least one detector")]
    Empty,

    #[error("Duplicate configuration id: {0}")]
    DuplicateConfigId(String),
}

/// Registry of configuration detectors
#[derive(Clone)]
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn ConfigurationDetector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FranklinApsDetector::whole_home()));
        registry.register(Arc::new(FranklinApsDetector::partial_home()));
        registry.register(Arc::new(FranklinApsDetector::no_backup()));
        registry.register(Arc::new(FranklinSrpDetector::whole_home()));
        registry.register(Arc::new(FranklinSrpDetector::partial_home()));
        registry.register(Arc::new(FranklinSrpDetector::no_backup()));
        registry.register(Arc::new(EnphaseApsDetector::whole_home()));
        registry.register(Arc::new(EnphaseApsDetector::partial_home()));
        registry.register(Arc::new(EnphaseApsDetector::no_backup()));
        registry.register(Arc::new(StorzWholeHomeMultiSystemDetector::new()));
        registry.register(Arc::new(TeslaPw3MultiSystemDetector::new()));
        registry.register(Arc::new(TeslaPw3ApsDetector::single_backup()));
        registry.register(Arc::new(TeslaPw3ApsDetector::no_backup()));
        registry.register(Arc::new(ApsPvOnlyDetector::new()));
        registry.register(Arc::new(ApsDcCoupledDetector::sms_backup()));
        registry.register(Arc::new(ApsDcCoupledDetector::sms_no_backup()));
        registry.register(Arc::new(ApsDcCoupledDetector::no_sms_backup()));
        registry.register(Arc::new(ApsDcCoupledDetector::no_sms_no_backup()));
        for detector in ApsAcCoupledDetector::all() {
            registry.register(Arc::new(detector));
        }
        for detector in UtilityPvOnlyDetector::all() {
            registry.register(Arc::new(detector));
        }
        for detector in ApsGenericDetector::all() {
            registry.register(Arc::new(detector));
        }
        for detector in GenericDetector::all() {
            registry.register(Arc::new(detector));
        }
        registry
    }

    /// Builds a registry from an explicit detector list
    ///
    /// Rejects empty lists and duplicate configuration ids.
    pub fn from_detectors(
        detectors: Vec<Arc<dyn ConfigurationDetector>>,
    ) -> Result<Self, RegistryError> {
        if detectors.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        let mut registry = Self::new();
        for detector in detectors {
            if !seen.insert(detector.config_id()) {
                return Err(RegistryError::DuplicateConfigId(
                    detector.config_id().to_string(),
                ));
            }
            registry.register(detector);
        }
        Ok(registry)
    }

    /// Inserts after every detector of lower or equal priority
    pub fn register(&mut self, detector: Arc<dyn ConfigurationDetector>) {
        let priority = detector.priority();
        let idx = self
            .detectors
            .partition_point(|existing| existing.priority() <= priority);
        self.detectors.insert(idx, detector);
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Get detector by configuration id
    pub fn get(&self, config_id: &str) -> Option<&dyn ConfigurationDetector> {
        self.detectors
            .iter()
            .find(|d| d.config_id() == config_id)
            .map(|d| d.as_ref())
    }

    /// Detectors in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &dyn ConfigurationDetector> {
        self.detectors.iter().map(|d| d.as_ref())
    }

    fn candidates<'a>(
        &'a self,
        state: &'a EquipmentState,
    ) -> impl Iterator<Item = &'a dyn ConfigurationDetector> + 'a {
        self.iter().filter(move |detector| {
            if !detector.applies_to_utility(&state.utility_name) {
                return false;
            }
            let passed = detector.quick_check(state);
            if !passed {
                debug!(config_id = detector.config_id(), "Quick check rejected");
            }
            passed
        })
    }

    /// First matching configuration in priority order
    pub async fn resolve(
        &self,
        state: &EquipmentState,
        siblings: &dyn SiblingStateProvider,
    ) -> Option<ConfigurationMatch> {
        debug!(
            system = %state.system_number,
            utility = %state.utility_name,
            "Resolving configuration"
        );

        for detector in self.candidates(state) {
            if let Some(found) = detector.detect(state, siblings).await {
                info!(
                    system = %state.system_number,
                    config_id = %found.config_id,
                    priority = %found.priority,
                    "Configuration matched"
                );
                return Some(found);
            }
            debug!(config_id = detector.config_id(), "No match");
        }

        info!(system = %state.system_number, "No configuration matched");
        None
    }

    /// Every matching configuration, best first
    ///
    /// Ordered by priority, then confidence, then registration order.
    pub async fn find_all_matches(
        &self,
        state: &EquipmentState,
        siblings: &dyn SiblingStateProvider,
    ) -> Vec<ConfigurationMatch> {
        let mut found = Vec::new();
        for (order, detector) in self.candidates(state).enumerate() {
            if let Some(m) = detector.detect(state, siblings).await {
                found.push((order, m));
            }
        }

        found.sort_by(|(a_order, a), (b_order, b)| {
            a.priority
                .cmp(&b.priority)
                .then(a.confidence.cmp(&b.confidence))
                .then(a_order.cmp(b_order))
        });

        debug!(
            system = %state.system_number,
            count = found.len(),
            "Collected configuration matches"
        );
        found.into_iter().map(|(_, m)| m).collect()
    }

    pub async fn top_matches(
        &self,
        state: &EquipmentState,
        siblings: &dyn SiblingStateProvider,
        n: usize,
    ) -> Vec<ConfigurationMatch> {
        let mut matches = self.find_all_matches(state, siblings).await;
        matches.truncate(n);
        matches
    }

    /// Resolves every system of one project
    ///
    /// System 2 goes first so that a multi-system configuration found there
    /// claims the other systems it covers before they are resolved on their
    /// own.
    pub async fn analyze_project(
        &self,
        states: &[EquipmentState],
        siblings: &dyn SiblingStateProvider,
    ) -> ProjectAnalysis {
        let mut analysis = ProjectAnalysis::default();
        let mut claimed: Vec<(SystemNumber, Vec<ConfigurationMatch>)> = Vec::new();

        if let Some(system2) = states
            .iter()
            .find(|s| s.system_number == SystemNumber::Two)
        {
            let matches = self.find_all_matches(system2, siblings).await;
            let multi = matches.iter().find_map(|m| {
                let detector = self.get(&m.config_id)?;
                detector
                    .is_multi_system()
                    .then(|| (m.clone(), detector.affected_systems()))
            });

            let matches = if let Some((multi_match, affected)) = multi {
                info!(
                    config_id = %multi_match.config_id,
                    "Multi-system configuration detected from System 2"
                );

                for system in affected {
                    if *system == SystemNumber::Two {
                        continue;
                    }
                    if !states.iter().any(|s| s.system_number == *system) {
                        continue;
                    }
                    let mut copy = multi_match.clone();
                    copy.system_number = *system;
                    copy.notes.push(
                        "Part of multi-system configuration (detected from System 2)".to_string(),
                    );
                    claimed.push((*system, vec![copy]));
                }

                analysis.recommendations.push(format!(
                    "Multi-system configuration detected: {}",
                    multi_match.config_name
                ));
                let systems: Vec<String> = affected.iter().map(|s| s.to_string()).collect();
                analysis.recommendations.push(format!(
                    "Systems {} are configured together",
                    systems.join(" & ")
                ));
                vec![multi_match]
            } else {
                matches
            };

            claimed.push((SystemNumber::Two, matches));
        }

        let mut ordered: Vec<&EquipmentState> = states.iter().collect();
        ordered.sort_by_key(|s| s.system_number);

        for state in ordered {
            let system = state.system_number;
            let matches = match claimed.iter().position(|(s, _)| *s == system) {
                Some(idx) => claimed.swap_remove(idx).1,
                None => self.find_all_matches(state, siblings).await,
            };

            if matches.is_empty() {
                analysis
                    .warnings
                    .push(format!("No configuration match found for System {}", system));
            }

            analysis.systems_analyzed += 1;
            analysis.total_matches += matches.len();
            analysis.systems.push(SystemAnalysis {
                system_number: system,
                best_match: matches.first().cloned(),
                matches,
            });
        }

        if analysis.total_matches == 0 {
            analysis.recommendations.push(
                "No configurations matched your equipment. Consider adding major equipment (solar, battery, inverter) first."
                    .to_string(),
            );
        } else if analysis.systems_analyzed > 1 {
            analysis.recommendations.push(format!(
                "Analyzed {} systems and found {} configuration matches.",
                analysis.systems_analyzed, analysis.total_matches
            ));
        }

        analysis
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Matches found for one system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAnalysis {
    pub system_number: SystemNumber,
    pub matches: Vec<ConfigurationMatch>,
    pub best_match: Option<ConfigurationMatch>,
}

/// Result of resolving all systems of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub systems: Vec<SystemAnalysis>,
    pub systems_analyzed: usize,
    pub total_matches: usize,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ProjectAnalysis {
    pub fn system(&self, system: SystemNumber) -> Option<&SystemAnalysis> {
        self.systems.iter().find(|s| s.system_number == system)
    }

    pub fn best_match(&self, system: SystemNumber) -> Option<&ConfigurationMatch> {
        self.system(system)?.best_match.as_ref()
    }
}
