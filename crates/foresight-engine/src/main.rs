//! Driver binary for the Foresight counterfactual planner.
//!
//! Runs every demonstration world to its horizon and prints one report per
//! rollout to stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `foresight-config.yaml` (or `FORESIGHT_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Run the newsroom, workshop, facility, and replication demonstrations
//! 4. Render each outcome as text or JSON

mod driver;
mod error;
mod report;

use std::path::{Path, PathBuf};

use foresight_core::SimulationConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default config file, relative to the working directory.
const CONFIG_FILE: &str = "foresight-config.yaml";

/// Environment variable overriding the config file path.
const CONFIG_ENV: &str = "FORESIGHT_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a rollout fails, or a
/// report cannot be rendered.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration; the log level lives in it.
    let path = config_path();
    let loaded = load_config(&path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("foresight-engine starting");
    if found {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }

    // 3. Run the demonstrations.
    let outcomes = driver::run_all(&config)?;

    // 4. Report.
    for outcome in &outcomes {
        println!("{}", report::render(outcome, config.report.format)?);
    }

    info!(reports = outcomes.len(), "foresight-engine finished");
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
}

/// Load the simulation configuration, or `None` if the file does not exist.
fn load_config(path: &Path) -> Result<Option<SimulationConfig>, EngineError> {
    if path.exists() {
        Ok(Some(SimulationConfig::from_file(path)?))
    } else {
        Ok(None)
    }
}
