use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liqlock_core::BlockClock;
use liqlock_service::{create_example_config, LockerService, Scenario, ServiceConfig, SnapshotStore};

#[derive(Parser)]
#[command(name = "liqlock")]
#[command(about = "Liquidity-locking reward engine")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "liqlock.toml", global = true)]
    config: PathBuf,

    /// Override log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write an example configuration file
    InitConfig {
        #[arg(short, long, default_value = "liqlock.toml")]
        output: PathBuf,
    },
    /// Validate the configuration and exit
    Validate,
    /// Run a JSON scenario and print each outcome as a JSON line
    Simulate {
        scenario: PathBuf,
    },
    /// Print the stored config and pool summary without touching the snapshot
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { output } = &cli.command {
        create_example_config(output)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("Example configuration written to {}", output.display());
        return Ok(());
    }

    let mut config = if cli.config.exists() {
        ServiceConfig::load(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        ServiceConfig::default()
    };

    if let Some(log_level) = cli.log_level {
        config.monitoring.log_level = log_level;
    }
    init_logging(&config)?;

    if !cli.config.exists() {
        warn!("Config file not found, using defaults: {}", cli.config.display());
    }
    config.validate()?;
    info!("Configuration validated successfully");

    match cli.command {
        Command::InitConfig { .. } => {}
        Command::Validate => {
            info!("Engine address: {}", config.engine.address);
            info!("Snapshot path: {}", config.storage.snapshot_path.display());
        }
        Command::Simulate { scenario } => {
            let text = std::fs::read_to_string(&scenario)
                .with_context(|| format!("reading scenario {}", scenario.display()))?;
            let scenario = Scenario::from_json(&text)?;
            let start = scenario.start.unwrap_or_else(|| BlockClock::new(0, 0));

            let service = LockerService::bootstrap(&config, &start).await?;
            let report = scenario.run(&service).await?;

            for outcome in &report.outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }
            println!("{}", serde_json::to_string(&report.summary)?);
            info!(
                steps = report.outcomes.len(),
                failures = report.failures(),
                "Scenario finished"
            );
        }
        Command::Summary => {
            let store = SnapshotStore::new(&config.storage.snapshot_path);
            match store.load().await? {
                Some(snapshot) => {
                    println!("{}", serde_json::to_string_pretty(&snapshot.config)?);
                    println!("{}", serde_json::to_string_pretty(&snapshot.pool_summary()?)?);
                }
                None => {
                    warn!("No snapshot at {}", store.path().display());
                    println!("null");
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &ServiceConfig) -> Result<()> {
    let log_level: tracing::Level = config.monitoring.log_level.parse()
        .unwrap_or(tracing::Level::INFO);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            format!("liqlock_core={},liqlock_service={},liqlock={}", log_level, log_level, log_level).into()
        });

    // logs go to stderr so simulate output stays machine-readable
    if config.monitoring.structured_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
