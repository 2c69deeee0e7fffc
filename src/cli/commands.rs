use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Balance-of-system configuration resolver for residential solar and storage projects
#[derive(Parser, Debug)]
#[command(
    name = "bosconfig",
    about = "Balance-of-system configuration resolver for solar and storage projects",
    version,
    author,
    long_about = "bosconfig reads a project equipment record, recognizes which reference \
                  interconnection configuration it matches for the serving utility, and \
                  synthesizes the meters, disconnects and breakers that configuration \
                  requires, sized from the inverter and battery output."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Resolve the BOS configuration of one system",
        long_about = "Extracts one system from a project record and returns the highest \
                      priority configuration that matches it. A record that matches \
                      nothing is reported as such and is not an error.\n\n\
                      Examples:\n  \
                      bosconfig resolve project.json\n  \
                      bosconfig resolve project.json --system 2 --format json\n  \
                      bosconfig resolve project.json --all --top 3\n  \
                      cat project.json | bosconfig resolve -"
    )]
    Resolve(ResolveArgs),

    #[command(
        about = "Analyze every system of a project",
        long_about = "Resolves all systems that carry equipment. A multi-system \
                      configuration found on system 2 is applied to every system it \
                      covers.\n\n\
                      Examples:\n  \
                      bosconfig analyze project.json\n  \
                      bosconfig analyze project.json --format yaml -o analysis.yaml"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "List registered detectors",
        long_about = "Lists every configuration detector in evaluation order.\n\n\
                      Examples:\n  \
                      bosconfig detectors\n  \
                      bosconfig detectors --format json"
    )]
    Detectors(DetectorsArgs),

    #[command(
        about = "Show effective configuration",
        long_about = "Prints the configuration read from BOSCONFIG_* environment variables.\n\n\
                      Examples:\n  \
                      bosconfig config\n  \
                      BOSCONFIG_DEFAULT_UTILITY=SRP bosconfig config --format json"
    )]
    Config(ConfigArgs),
}

/// Options shared by commands that read a project record
#[derive(Parser, Debug, Clone)]
pub struct RecordArgs {
    #[arg(
        value_name = "RECORD",
        help = "Path to the project record (JSON object), or '-' for stdin"
    )]
    pub record: PathBuf,

    #[arg(
        short = 'u',
        long,
        value_name = "CODE",
        help = "Utility code, overriding the record (e.g. APS, SRP, TEP)"
    )]
    pub utility: Option<String>,

    #[arg(long, value_name = "FILE", help = "JSON equipment catalog")]
    pub catalog: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    #[arg(
        short = 's',
        long,
        value_name = "N",
        default_value = "1",
        value_parser = clap::value_parser!(u8).range(1..=4),
        help = "System number (1-4)"
    )]
    pub system: u8,

    #[arg(long, help = "List every matching configuration instead of the best one")]
    pub all: bool,

    #[arg(
        long,
        value_name = "N",
        requires = "all",
        help = "Limit --all to the N best matches"
    )]
    pub top: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub record: RecordArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectorsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
