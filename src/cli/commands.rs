//! Command implementations

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::container::DefaultAppContainer;
use crate::app::convert_interactor::write_report;
use crate::app::InspectFormat;
use crate::cli::args::{ConvertArgs, InspectArgs};
use crate::cli::{Cli, Commands};
use crate::config_initialization::{environment_snapshot, initialize_configuration_hierarchy};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig, LoggingSystem};

/// Resolve configuration, start logging and run the requested command
pub async fn execute(cli: Cli) -> Result<()> {
    let overrides = match &cli.command {
        Commands::Convert(args) => args.overrides(),
        Commands::Inspect(args) => args.overrides(),
    };
    let base_dir = std::env::current_dir().context("Cannot determine working directory")?;

    // Flags and defaults only; the `[logging]` section is not known yet
    let bootstrap = LoggingSystem::new(logging_config(&cli, &LoggingConfig::default())?);
    let config = bootstrap
        .scoped(|| {
            initialize_configuration_hierarchy(&overrides, &environment_snapshot(), &base_dir)
        })
        .context("Failed to load configuration")?;

    let logging = LoggingSystem::new(logging_config(&cli, &config.logging)?);
    logging
        .initialize()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    logging.log_system_info();

    match cli.command {
        Commands::Convert(args) => {
            info!("Executing convert command");
            convert(args, config).await
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            inspect(args, config).await
        }
    }
}

/// Logging flags override the `[logging]` section
fn logging_config(cli: &Cli, file: &LoggingConfig) -> Result<LoggingConfig> {
    let mut config = file.clone();
    if let Some(level) = &cli.log_level {
        config.level = level.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    if let Some(format) = &cli.log_format {
        config.format = format.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
    }
    if let Some(file) = &cli.log_file {
        config.file = Some(file.clone());
    }
    Ok(config)
}

/// Execute the convert command. Per-item failures are reported, not returned.
pub async fn convert(args: ConvertArgs, config: AppConfig) -> Result<()> {
    info!("Input: {}", args.input.display());
    info!("Output: {}", args.output.display());

    let container = DefaultAppContainer::new(config);
    let interactor = container
        .convert_interactor(&args.input, &args.output)
        .await
        .context("Setup failed")?;

    let report = interactor
        .execute()
        .await
        .context("Conversion aborted")?;

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }

    if !report.summary.all_succeeded() {
        warn!(
            "{} of {} video(s) could not be converted",
            report.summary.failed, report.summary.total
        );
    }
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, config: AppConfig) -> Result<()> {
    let container = DefaultAppContainer::new(config);
    let interactor = container
        .inspect_interactor(&args.input)
        .context("Failed to open archive")?;

    let report = interactor.execute(&args.input.display().to_string()).await?;
    let format = if args.json {
        InspectFormat::Json
    } else {
        InspectFormat::Text
    };
    println!("{}", interactor.render(&report, format)?);
    Ok(())
}
