//! Per-model equipment facts the project record does not carry

use super::state::CouplingType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lookup of equipment datasheet values by make and model
pub trait EquipmentCatalog: Send + Sync {
    /// Maximum continuous AC output of a single inverter unit
    fn inverter_output_amps(&self, make: &str, model: &str) -> Option<f64>;

    fn battery_coupling(&self, make: &str, model: &str) -> Option<CouplingType>;

    fn battery_output_amps(&self, make: &str, model: &str) -> Option<f64> {
        let _ = (make, model);
        None
    }
}

/// Catalog that knows nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCatalog;

impl EquipmentCatalog for NoCatalog {
    fn inverter_output_amps(&self, _make: &str, _model: &str) -> Option<f64> {
        None
    }

    fn battery_coupling(&self, _make: &str, _model: &str) -> Option<CouplingType> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterEntry {
    pub make: String,
    pub model: String,
    pub max_continuous_output_amps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryEntry {
    pub make: String,
    pub model: String,
    pub coupling: CouplingType,
    #[serde(default)]
    pub max_continuous_output_amps: Option<f64>,
}

/// In-memory catalog, usually loaded from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    pub inverters: Vec<InverterEntry>,
    #[serde(default)]
    pub batteries: Vec<BatteryEntry>,
}

fn same(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl StaticCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn with_inverter(mut self, make: &str, model: &str, amps: f64) -> Self {
        self.inverters.push(InverterEntry {
            make: make.to_string(),
            model: model.to_string(),
            max_continuous_output_amps: amps,
        });
        self
    }

    pub fn with_battery(mut self, make: &str, model: &str, coupling: CouplingType) -> Self {
        self.batteries.push(BatteryEntry {
            make: make.to_string(),
            model: model.to_string(),
            coupling,
            max_continuous_output_amps: None,
        });
        self
    }

    fn battery(&self, make: &str, model: &str) -> Option<&BatteryEntry> {
        self.batteries
            .iter()
            .find(|b| same(&b.make, make) && same(&b.model, model))
    }
}

impl EquipmentCatalog for StaticCatalog {
    fn inverter_output_amps(&self, make: &str, model: &str) -> Option<f64> {
        self.inverters
            .iter()
            .find(|i| same(&i.make, make) && same(&i.model, model))
            .map(|i| i.max_continuous_output_amps)
    }

    fn battery_coupling(&self, make: &str, model: &str) -> Option<CouplingType> {
        self.battery(make, model).map(|b| b.coupling)
    }

    fn battery_output_amps(&self, make: &str, model: &str) -> Option<f64> {
        self.battery(make, model)
            .and_then(|b| b.max_continuous_output_amps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_no_catalog_knows_nothing() {
        assert_eq!(NoCatalog.inverter_output_amps("SMA", "SB7.7"), None);
        assert_eq!(NoCatalog.battery_coupling("Tesla", "Powerwall 3"), None);
        assert_eq!(NoCatalog.battery_output_amps("Tesla", "Powerwall 3"), None);
    }

    #[test]
    fn test_static_catalog_lookup_is_case_insensitive() {
        let catalog = StaticCatalog::default()
            .with_inverter("Enphase", "IQ8PLUS-72-2-US", 1.21)
            .with_battery("FranklinWH", "aPower", CouplingType::AC);

        assert_eq!(
            catalog.inverter_output_amps("enphase", " iq8plus-72-2-us "),
            Some(1.21)
        );
        assert_eq!(
            catalog.battery_coupling("FRANKLINWH", "apower"),
            Some(CouplingType::AC)
        );
        assert_eq!(catalog.battery_coupling("Generic", "apower"), None);
    }

    #[test]
    fn test_static_catalog_from_json() {
        let json = r#"{
            "inverters": [{"make": "SMA", "model": "SB7.7", "max_continuous_output_amps": 32.0}],
            "batteries": [{"make": "LG", "model": "RESU10H", "coupling": "DC", "max_continuous_output_amps": 20.8}]
        }"#;
        let catalog = StaticCatalog::from_json_str(json).unwrap();

        assert_eq!(catalog.inverter_output_amps("SMA", "SB7.7"), Some(32.0));
        assert_eq!(catalog.battery_coupling("LG", "RESU10H"), Some(CouplingType::DC));
        assert_eq!(catalog.battery_output_amps("LG", "RESU10H"), Some(20.8));
    }

    #[test]
    fn test_static_catalog_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"inverters": []}}"#).unwrap();

        let catalog = StaticCatalog::from_path(file.path()).unwrap();
        assert!(catalog.inverters.is_empty());
        assert!(catalog.batteries.is_empty());
    }

    #[test]
    fn test_static_catalog_errors() {
        assert!(matches!(
            StaticCatalog::from_json_str("not json"),
            Err(CatalogError::Parse(_))
        ));
        assert!(matches!(
            StaticCatalog::from_path(Path::new("/nonexistent/catalog.json")),
            Err(CatalogError::Read { .. })
        ));
    }
}
