use bosconfig::cli::commands::{CliArgs, Commands};
use bosconfig::cli::handlers::{handle_analyze, handle_config, handle_detectors, handle_resolve};
use bosconfig::util::logging::{init_logging, parse_level, LoggingConfig};
use bosconfig::{DetectorRegistry, EngineConfig, VERSION};

use clap::Parser;
use tracing::{debug, error, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = EngineConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    init_logging_from_args(&args, &config);

    debug!("bosconfig v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    let registry = DetectorRegistry::with_defaults();
    debug!(detectors = registry.len(), "Detector registry built");

    let exit_code = match &args.command {
        Commands::Resolve(resolve_args) => handle_resolve(resolve_args, &config, &registry).await,
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args, &config, &registry).await,
        Commands::Detectors(detectors_args) => handle_detectors(detectors_args, &registry).await,
        Commands::Config(config_args) => handle_config(config_args, &config).await,
    };

    std::process::exit(exit_code);
}

/// Command-line flags win over `BOSCONFIG_LOG_LEVEL`
fn init_logging_from_args(args: &CliArgs, config: &EngineConfig) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        parse_level(&config.log_level)
    };

    init_logging(LoggingConfig {
        level,
        ..LoggingConfig::from_engine_config(config)
    });
}
