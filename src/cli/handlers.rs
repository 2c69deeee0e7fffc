//! Command handlers
//!
//! Each handler returns the process exit code. Errors are logged and mapped
//! to 1; a system that matches no configuration still exits 0.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};

use super::commands::{AnalyzeArgs, ConfigArgs, DetectorsArgs, RecordArgs, ResolveArgs};
use super::output::{DetectorInfo, MatchListReport, OutputFormatter, ResolutionReport};
use crate::config::EngineConfig;
use crate::equipment::{EquipmentCatalog, EquipmentStateExtractor, ProjectRecord, SystemNumber, UtilityInfo};
use crate::registry::DetectorRegistry;
use crate::sibling::RecordSiblingProvider;

/// Record, utility and catalog resolved from the command line
struct LoadedRecord {
    record: ProjectRecord,
    utility: UtilityInfo,
    catalog: Arc<dyn EquipmentCatalog>,
}

impl LoadedRecord {
    fn extractor(&self) -> EquipmentStateExtractor {
        EquipmentStateExtractor::with_catalog(self.catalog.clone())
    }

    fn siblings(&self) -> RecordSiblingProvider {
        RecordSiblingProvider::new(self.record.clone(), self.utility.clone(), self.extractor())
    }
}

pub async fn handle_resolve(
    args: &ResolveArgs,
    config: &EngineConfig,
    registry: &DetectorRegistry,
) -> i32 {
    match run_resolve(args, config, registry).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Resolution failed: {:#}", e);
            1
        }
    }
}

async fn run_resolve(
    args: &ResolveArgs,
    config: &EngineConfig,
    registry: &DetectorRegistry,
) -> Result<()> {
    let system = SystemNumber::try_from(args.system)
        .with_context(|| format!("Invalid system number {}", args.system))?;
    let loaded = load_record(&args.record, config).await?;

    let state = loaded.extractor().extract(&loaded.record, system, &loaded.utility);
    let siblings = loaded.siblings();
    let formatter = OutputFormatter::new(args.record.format.into());

    let output = if args.all {
        let matches = match args.top {
            Some(n) => registry.top_matches(&state, &siblings, n).await,
            None => registry.find_all_matches(&state, &siblings).await,
        };
        formatter.format_matches(&MatchListReport {
            system_number: system,
            matches,
        })?
    } else {
        let best = registry.resolve(&state, &siblings).await;
        formatter.format(&ResolutionReport::new(system, best))?
    };

    write_output(&output, args.record.output.as_deref()).await
}

pub async fn handle_analyze(
    args: &AnalyzeArgs,
    config: &EngineConfig,
    registry: &DetectorRegistry,
) -> i32 {
    match run_analyze(args, config, registry).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            1
        }
    }
}

async fn run_analyze(
    args: &AnalyzeArgs,
    config: &EngineConfig,
    registry: &DetectorRegistry,
) -> Result<()> {
    let loaded = load_record(&args.record, config).await?;
    let states = loaded.extractor().extract_all(&loaded.record, &loaded.utility);
    debug!(systems = states.len(), "Systems with equipment");

    let analysis = registry.analyze_project(&states, &loaded.siblings()).await;
    let output = OutputFormatter::new(args.record.format.into()).format_analysis(&analysis)?;
    write_output(&output, args.record.output.as_deref()).await
}

pub async fn handle_detectors(args: &DetectorsArgs, registry: &DetectorRegistry) -> i32 {
    let detectors = DetectorInfo::list(registry);
    match OutputFormatter::new(args.format.into()).format_detectors(&detectors) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format detector list: {:#}", e);
            1
        }
    }
}

pub async fn handle_config(args: &ConfigArgs, config: &EngineConfig) -> i32 {
    match OutputFormatter::new(args.format.into()).format_config(config) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format configuration: {:#}", e);
            1
        }
    }
}

async fn load_record(args: &RecordArgs, config: &EngineConfig) -> Result<LoadedRecord> {
    let raw = read_input(&args.record).await?;
    let record = parse_record(&raw)
        .with_context(|| format!("Invalid project record {}", args.record.display()))?;

    let mut utility = UtilityInfo::from_record(&record);
    if let Some(code) = &args.utility {
        utility.name = code.clone();
    }
    if utility.name.trim().is_empty() {
        utility.name = config.default_utility.clone();
    }
    if utility.state.trim().is_empty() {
        utility.state = config.default_state.clone();
    }
    debug!(utility = %utility.name, state = %utility.state, "Utility selected");

    let catalog = config
        .load_catalog(args.catalog.as_ref())
        .context("Failed to load equipment catalog")?;

    Ok(LoadedRecord {
        record,
        utility,
        catalog,
    })
}

async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("Failed to read project record from stdin")?;
        return Ok(raw);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Parses a project record; the top level must be a JSON object
pub fn parse_record(raw: &str) -> Result<ProjectRecord> {
    let value: serde_json::Value = serde_json::from_str(raw).context("Malformed JSON")?;
    match value {
        serde_json::Value::Object(record) => Ok(record),
        other => bail!("Expected a JSON object, found {}", json_kind(&other)),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

async fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, output)
                .await
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormatArg;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn engine_config() -> EngineConfig {
        EngineConfig {
            log_level: "info".to_string(),
            log_json: false,
            default_utility: "APS".to_string(),
            default_state: "AZ".to_string(),
            catalog_path: None,
        }
    }

    fn record_args(record: PathBuf, output: Option<PathBuf>) -> RecordArgs {
        RecordArgs {
            record,
            utility: None,
            catalog: None,
            format: OutputFormatArg::Json,
            output,
        }
    }

    #[test]
    fn test_parse_record_requires_object() {
        assert!(parse_record(r#"{"utility": "APS"}"#).is_ok());

        let err = parse_record("[1, 2]").unwrap_err();
        assert!(format!("{:#}", err).contains("an array"));
        assert!(parse_record("{not json").is_err());
    }

    #[tokio::test]
    async fn test_load_record_applies_default_utility() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, r#"{"sys1_solar_panel_make": "REC"}"#).unwrap();

        let loaded = load_record(&record_args(path, None), &engine_config())
            .await
            .unwrap();
        assert_eq!(loaded.utility.name, "APS");
        assert_eq!(loaded.utility.state, "AZ");
    }

    #[tokio::test]
    async fn test_utility_flag_overrides_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, r#"{"utility": "TEP", "state": "AZ"}"#).unwrap();

        let mut args = record_args(path, None);
        args.utility = Some("SRP".to_string());
        let loaded = load_record(&args, &engine_config()).await.unwrap();
        assert_eq!(loaded.utility.name, "SRP");
    }

    #[tokio::test]
    async fn test_missing_record_is_error_exit() {
        let args = ResolveArgs {
            record: record_args(PathBuf::from("/nonexistent/project.json"), None),
            system: 1,
            all: false,
            top: None,
        };
        let code = handle_resolve(&args, &engine_config(), &DetectorRegistry::with_defaults()).await;
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_resolve_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let record = dir.path().join("project.json");
        let output = dir.path().join("result.json");
        std::fs::write(
            &record,
            r#"{
                "utility": "APS",
                "sys1_solar_panel_make": "REC",
                "sys1_solar_panel_model": "Alpha 400",
                "sys1_solar_panel_qty": 20,
                "sys1_micro_inverter_make": "SolarEdge",
                "sys1_micro_inverter_model": "SE7600H",
                "sys1_inverter_type": "inverter",
                "sys1_inv_max_continuous_output": 32
            }"#,
        )
        .unwrap();

        let args = ResolveArgs {
            record: record_args(record, Some(output.clone())),
            system: 1,
            all: false,
            top: None,
        };
        let code = handle_resolve(&args, &engine_config(), &DetectorRegistry::with_defaults()).await;
        assert_eq!(code, 0);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written["matched"], true);
        assert_eq!(written["configuration"]["configId"], "aps_pv_only");
    }
}
