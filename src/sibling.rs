//! Access to the other systems of the same project
//!
//! Only multi-system configurations need this. Lookups are asynchronous and
//! may fail; detectors treat any failure as "does not match".

use crate::equipment::{
    system_has_data, EquipmentState, EquipmentStateExtractor, ProjectRecord, SystemNumber,
    UtilityInfo,
};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Project id missing, sibling systems cannot be looked up")]
    MissingProjectId,

    #[error("System {system} not found for project {project_id}")]
    NotFound {
        project_id: String,
        system: SystemNumber,
    },

    #[error("Sibling lookup unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SiblingStateProvider: Send + Sync {
    async fn fetch(
        &self,
        project_id: &str,
        system: SystemNumber,
    ) -> Result<EquipmentState, LookupError>;
}

/// Provider for callers that never resolve multi-system configurations
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSiblingProvider;

#[async_trait]
impl SiblingStateProvider for NoSiblingProvider {
    async fn fetch(
        &self,
        _project_id: &str,
        _system: SystemNumber,
    ) -> Result<EquipmentState, LookupError> {
        Err(LookupError::Unavailable(
            "no sibling provider configured".to_string(),
        ))
    }
}

/// Extracts sibling systems from the same project record
pub struct RecordSiblingProvider {
    record: ProjectRecord,
    utility: UtilityInfo,
    extractor: EquipmentStateExtractor,
}

impl RecordSiblingProvider {
    pub fn new(record: ProjectRecord, utility: UtilityInfo, extractor: EquipmentStateExtractor) -> Self {
        Self {
            record,
            utility,
            extractor,
        }
    }
}

#[async_trait]
impl SiblingStateProvider for RecordSiblingProvider {
    async fn fetch(
        &self,
        project_id: &str,
        system: SystemNumber,
    ) -> Result<EquipmentState, LookupError> {
        let not_found = || LookupError::NotFound {
            project_id: project_id.to_string(),
            system,
        };

        if !system_has_data(&self.record, system) {
            return Err(not_found());
        }

        let state = self.extractor.extract(&self.record, system, &self.utility);
        match state.project_id.as_deref() {
            Some(id) if id == project_id => Ok(state),
            _ => Err(not_found()),
        }
    }
}

/// Pre-built states keyed by project and system
#[derive(Debug, Clone, Default)]
pub struct InMemorySiblingProvider {
    states: HashMap<(String, SystemNumber), EquipmentState>,
}

impl InMemorySiblingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, project_id: &str, state: EquipmentState) {
        self.states
            .insert((project_id.to_string(), state.system_number), state);
    }

    pub fn with_state(mut self, project_id: &str, state: EquipmentState) -> Self {
        self.insert(project_id, state);
        self
    }
}

#[async_trait]
impl SiblingStateProvider for InMemorySiblingProvider {
    async fn fetch(
        &self,
        project_id: &str,
        system: SystemNumber,
    ) -> Result<EquipmentState, LookupError> {
        self.states
            .get(&(project_id.to_string(), system))
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                project_id: project_id.to_string(),
                system,
            })
    }
}
