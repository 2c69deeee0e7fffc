pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, ConfigArgs, DetectorsArgs, RecordArgs, ResolveArgs};
pub use output::{DetectorInfo, MatchListReport, OutputFormat, OutputFormatter, ResolutionReport};
