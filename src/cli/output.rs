//! Output formatting for multiple formats
//!
//! Results are rendered as JSON, YAML or human-readable text. JSON and YAML
//! carry the full match structure; the human format shows the BOS items as a
//! tree.
//!
//! # Example
//!
//! ```ignore
//! use bosconfig::cli::output::{OutputFormat, OutputFormatter, ResolutionReport};
//!
//! let report = ResolutionReport::new(SystemNumber::One, registry.resolve(&state, &siblings).await);
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format(&report)?);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::bos::{BosEquipment, ConfigurationMatch};
use crate::config::EngineConfig;
use crate::detectors::ConfigurationDetector;
use crate::equipment::SystemNumber;
use crate::registry::{DetectorRegistry, ProjectAnalysis};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Best configuration of one system, or the explicit absence of one
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    pub system_number: SystemNumber,
    pub matched: bool,
    pub configuration: Option<ConfigurationMatch>,
}

impl ResolutionReport {
    pub fn new(system_number: SystemNumber, configuration: Option<ConfigurationMatch>) -> Self {
        Self {
            system_number,
            matched: configuration.is_some(),
            configuration,
        }
    }
}

/// Every configuration matching one system, best first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListReport {
    pub system_number: SystemNumber,
    pub matches: Vec<ConfigurationMatch>,
}

/// Registry entry as listed by the `detectors` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorInfo {
    pub config_id: String,
    pub name: String,
    pub priority: u16,
    pub utilities: Vec<String>,
    pub multi_system: bool,
}

impl DetectorInfo {
    pub fn from_detector(detector: &dyn ConfigurationDetector) -> Self {
        Self {
            config_id: detector.config_id().to_string(),
            name: detector.name().to_string(),
            priority: detector.priority().get(),
            utilities: detector.utilities().iter().map(|u| u.to_string()).collect(),
            multi_system: detector.is_multi_system(),
        }
    }

    pub fn list(registry: &DetectorRegistry) -> Vec<Self> {
        registry.iter().map(Self::from_detector).collect()
    }
}

/// Output formatter for resolution results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the resolution of one system
    pub fn format(&self, report: &ResolutionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::to_json(report, "resolution result"),
            OutputFormat::Yaml => Self::to_yaml(report, "resolution result"),
            OutputFormat::Human => Ok(self.format_human(report)),
        }
    }

    pub fn format_matches(&self, report: &MatchListReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::to_json(report, "match list"),
            OutputFormat::Yaml => Self::to_yaml(report, "match list"),
            OutputFormat::Human => Ok(self.format_matches_human(report)),
        }
    }

    pub fn format_analysis(&self, analysis: &ProjectAnalysis) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::to_json(analysis, "project analysis"),
            OutputFormat::Yaml => Self::to_yaml(analysis, "project analysis"),
            OutputFormat::Human => Ok(self.format_analysis_human(analysis)),
        }
    }

    pub fn format_detectors(&self, detectors: &[DetectorInfo]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::to_json(detectors, "detector list"),
            OutputFormat::Yaml => Self::to_yaml(detectors, "detector list"),
            OutputFormat::Human => Ok(self.format_detectors_human(detectors)),
        }
    }

    /// Formats configuration display
    pub fn format_config(&self, config: &EngineConfig) -> Result<String> {
        let map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => Self::to_json(&map, "configuration"),
            OutputFormat::Yaml => Self::to_yaml(&map, "configuration"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
        serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {} to JSON", what))
    }

    fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
        serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
    }

    // Human-readable formatting methods

    fn format_human(&self, report: &ResolutionReport) -> String {
        match &report.configuration {
            Some(found) => render_match(found),
            None => {
                let mut output = String::new();
                output.push_str(&format!(
                    "\u{26A0} No configuration matched (System {})\n",
                    report.system_number
                ));
                output.push_str(RULE);
                output.push_str("\n\n");
                output.push_str("No reference configuration fits this equipment.\n");
                output.push_str("Select the BOS equipment manually.\n");
                output
            }
        }
    }

    fn format_matches_human(&self, report: &MatchListReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} matching configuration(s) for System {}\n",
            report.matches.len(),
            report.system_number
        ));
        output.push_str(RULE);
        output.push_str("\n\n");

        if report.matches.is_empty() {
            output.push_str("No reference configuration fits this equipment.\n");
            return output;
        }

        for (rank, found) in report.matches.iter().enumerate() {
            output.push_str(&format!(
                "{}. {} [{}] priority {}, {}\n",
                rank + 1,
                found.config_name,
                found.config_id,
                found.priority,
                found.confidence
            ));
        }
        output
    }

    fn format_analysis_human(&self, analysis: &ProjectAnalysis) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Project Analysis: {} system(s), {} match(es)\n",
            analysis.systems_analyzed, analysis.total_matches
        ));
        output.push_str(RULE);
        output.push_str("\n\n");

        for system in &analysis.systems {
            match &system.best_match {
                Some(best) => output.push_str(&format!(
                    "System {}: {} [{}]\n",
                    system.system_number, best.config_name, best.config_id
                )),
                None => output.push_str(&format!(
                    "System {}: no configuration matched\n",
                    system.system_number
                )),
            }
            if let Some(best) = &system.best_match {
                push_tree(&mut output, &best.bos_equipment);
            }
            output.push('\n');
        }

        if !analysis.warnings.is_empty() {
            output.push_str("\u{26A0} Warnings:\n");
            for warning in &analysis.warnings {
                output.push_str(&format!("  - {}\n", warning));
            }
            output.push('\n');
        }

        if !analysis.recommendations.is_empty() {
            output.push_str("Recommendations:\n");
            for recommendation in &analysis.recommendations {
                output.push_str(&format!("  - {}\n", recommendation));
            }
        }
        output
    }

    fn format_detectors_human(&self, detectors: &[DetectorInfo]) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} registered detectors\n", detectors.len()));
        output.push_str(RULE);
        output.push('\n');
        for detector in detectors {
            let scope = if detector.multi_system { " (multi-system)" } else { "" };
            output.push_str(&format!(
                "{:>3}  {:<36} {}{}\n",
                detector.priority,
                detector.config_id,
                detector.utilities.join(","),
                scope
            ));
        }
        output
    }
}

fn render_match(found: &ConfigurationMatch) -> String {
    let mut output = String::new();
    output.push_str(&format!("\u{2713} {}\n", found.config_name));
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str(&format!("Config ID:   {}\n", found.config_id));
    output.push_str(&format!("System:      {}\n", found.system_number));
    output.push_str(&format!("Priority:    {}\n", found.priority));
    output.push_str(&format!("Confidence:  {}\n", found.confidence));
    if !found.description.is_empty() {
        output.push_str(&format!("Description: {}\n", found.description));
    }
    output.push('\n');

    output.push_str("BOS Equipment:\n");
    push_tree(&mut output, &found.bos_equipment);
    output.push('\n');

    if let Some(multi) = &found.multi_system {
        output.push_str(&format!("Multi-System: {} systems\n", multi.total_systems));
        for point in &multi.combine_points {
            output.push_str(&format!(
                "  System {} combines at {}\n",
                point.system_number, point.combines_at
            ));
        }
        output.push('\n');
    }

    if !found.warnings.is_empty() {
        output.push_str("\u{26A0} Warnings:\n");
        for warning in &found.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    if !found.notes.is_empty() {
        output.push_str("\nNotes:\n");
        for note in &found.notes {
            output.push_str(&format!("  - {}\n", note));
        }
    }
    output
}

fn push_tree(output: &mut String, items: &[BosEquipment]) {
    if items.is_empty() {
        output.push_str("\u{2514}\u{2500} (none)\n");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        let connector = if i == items.len() - 1 { "\u{2514}" } else { "\u{251C}" };
        let mut line = format!(
            "{}\u{2500} [{} {}] {}",
            connector, item.section, item.position, item.equipment_type
        );
        if item.auto_selected {
            line.push_str(&format!(" ({} {})", item.make, item.model));
        }
        if let Some(amps) = item.amp_rating {
            line.push_str(&format!(" {}A", amps));
        }
        if let Some(system) = item.system_number {
            line.push_str(&format!(" sys{}", system));
        }
        output.push_str(&line);
        output.push('\n');
    }
}
