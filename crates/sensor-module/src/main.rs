//! CLI Entry Point for the i2c sensor module
//!
//! Registers the sensor models this module serves, builds components against
//! mock boards and polls their readings.
//!
//! # Usage
//!
//! List the models:
//! ```bash
//! i2c-sensors models
//! ```
//!
//! Check a configuration and print each component's dependencies:
//! ```bash
//! i2c-sensors validate --config config/module.toml
//! ```
//!
//! Poll readings as JSON lines:
//! ```bash
//! i2c-sensors --log-level=debug run --config config/module.toml --count 10
//! ```

// Global allocator (Microsoft Rust Guidelines: M-MIMALLOC-APPS)
#[cfg(not(test))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod config;
mod runner;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::ModuleConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "i2c-sensors")]
#[command(about = "i2c sensor module: LPS25H pressure sensor over mock boards", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered models
    Models,

    /// Validate a configuration file and print each component's dependencies
    Validate {
        /// Module configuration file (TOML format)
        #[arg(long)]
        config: PathBuf,
    },

    /// Build the configured components and poll their readings
    Run {
        /// Module configuration file (TOML format)
        #[arg(long)]
        config: PathBuf,

        /// Stop after this many polling rounds (default: until Ctrl-C)
        #[arg(long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Models => {
            init_tracing(cli.log_level.as_deref().unwrap_or("info"));
            list_models()
        }
        Commands::Validate { config } => {
            let module = load_config(&config)?;
            init_tracing(cli.log_level.as_deref().unwrap_or(&module.log_level));
            validate(&module)
        }
        Commands::Run { config, count } => {
            let module = load_config(&config)?;
            init_tracing(cli.log_level.as_deref().unwrap_or(&module.log_level));
            run(module, count).await
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: &Path) -> Result<ModuleConfig> {
    let module = ModuleConfig::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    module
        .validate()
        .map_err(|e| anyhow!("Invalid config {}: {}", path.display(), e))?;
    Ok(module)
}

fn list_models() -> Result<()> {
    let models = runner::model_registry()?;
    for model in models.models() {
        let factory = models.factory(&model)?;
        println!("{}\t{}", model, factory.name());
    }
    Ok(())
}

fn validate(module: &ModuleConfig) -> Result<()> {
    let models = runner::model_registry()?;
    for (name, dependencies) in runner::validate_components(&models, module)? {
        println!("{}: [{}]", name, dependencies.join(", "));
    }
    tracing::info!(components = module.components.len(), "Configuration is valid");
    Ok(())
}

async fn run(module: ModuleConfig, count: Option<u64>) -> Result<()> {
    tracing::info!(
        components = module.components.len(),
        boards = module.boards.len(),
        "Starting i2c-sensors module"
    );

    let models = runner::model_registry()?;
    let mut registry = runner::build_components(models, &module).await?;

    let interval = Duration::from_millis(module.poll_interval_ms);
    let result = runner::poll(&registry, interval, count).await;

    registry.close_all().await;
    let rounds = result?;
    tracing::info!(rounds, "Module stopped");
    Ok(())
}
