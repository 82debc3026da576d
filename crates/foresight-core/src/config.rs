//! Configuration loading and typed config structures for the Foresight
//! simulations.
//!
//! The configuration lives in `foresight-config.yaml` next to the binary's
//! working directory. Every field has a default matching the demonstration
//! scenarios, so an empty file (or no file at all) is a valid configuration.

use std::path::Path;

use serde::Deserialize;

use crate::safety::{MANIPULATION_PENALTY, VIOLATION_SCORE};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Which value is wrong and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `foresight-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Scores used by the safety-shaping objectives.
    #[serde(default)]
    pub safety: SafetyConfig,

    /// The newsroom (doomed / flooding) scenario.
    #[serde(default)]
    pub news: NewsConfig,

    /// The blegg/rube workshop scenario.
    #[serde(default)]
    pub workshop: WorkshopConfig,

    /// The facility (operator and forbidden room) scenario.
    #[serde(default)]
    pub facility: FacilityConfig,

    /// The self-replicating bots scenario.
    #[serde(default)]
    pub replication: ReplicationConfig,

    /// Output rendering.
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero horizons and iteration counts, and non-finite scores.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let horizons = [
            ("news.horizon", self.news.horizon),
            ("workshop.horizon", self.workshop.horizon),
            ("facility.horizon", self.facility.horizon),
            ("replication.horizon", self.replication.horizon),
            ("workshop.iterations", self.workshop.iterations),
            ("replication.initial_bots", self.replication.initial_bots),
        ];
        for (name, value) in horizons {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be at least 1"),
                });
            }
        }

        let scores = [
            ("safety.violation_score", self.safety.violation_score),
            ("safety.manipulation_penalty", self.safety.manipulation_penalty),
            ("news.penalty", self.news.penalty),
            ("facility.frustration_penalty", self.facility.frustration_penalty),
            ("facility.alarm_penalty", self.facility.alarm_penalty),
            ("replication.evil_bonus", self.replication.evil_bonus),
        ];
        for (name, value) in scores {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Scores used by the safety-shaping objectives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SafetyConfig {
    /// Score of a rollout that fails the shutdown epilogue.
    #[serde(default = "default_violation_score")]
    pub violation_score: f64,

    /// Points subtracted from a manipulative action sequence.
    #[serde(default = "default_manipulation_penalty")]
    pub manipulation_penalty: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            violation_score: default_violation_score(),
            manipulation_penalty: default_manipulation_penalty(),
        }
    }
}

/// Newsroom scenario parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsConfig {
    /// Steps per rollout.
    #[serde(default = "default_news_horizon")]
    pub horizon: u32,

    /// Points lost when the hazard strikes.
    #[serde(default = "default_news_penalty")]
    pub penalty: f64,

    /// Step at which the hazard strikes.
    #[serde(default = "default_penalty_step")]
    pub penalty_step: u32,

    /// Step at which the flood checks whether the agent is still running.
    #[serde(default = "default_flood_check_step")]
    pub flood_check_step: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            horizon: default_news_horizon(),
            penalty: default_news_penalty(),
            penalty_step: default_penalty_step(),
            flood_check_step: default_flood_check_step(),
        }
    }
}

/// Workshop scenario parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkshopConfig {
    /// Steps per rollout.
    #[serde(default = "default_workshop_horizon")]
    pub horizon: u32,

    /// Fix the hidden parameter instead of drawing it at random.
    #[serde(default)]
    pub bleggs_are_good: Option<bool>,

    /// Seed for the hidden-parameter draws.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of worlds averaged per reasoning style.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        Self {
            horizon: default_workshop_horizon(),
            bleggs_are_good: None,
            seed: default_seed(),
            iterations: default_iterations(),
        }
    }
}

/// Facility scenario parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FacilityConfig {
    /// Steps per rollout.
    #[serde(default = "default_facility_horizon")]
    pub horizon: u32,

    /// Penalty when the operator ends up somewhere they did not want to be.
    #[serde(default = "default_frustration_penalty")]
    pub frustration_penalty: f64,

    /// Penalty when the operator ends up in the control room.
    #[serde(default = "default_alarm_penalty")]
    pub alarm_penalty: f64,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            horizon: default_facility_horizon(),
            frustration_penalty: default_frustration_penalty(),
            alarm_penalty: default_alarm_penalty(),
        }
    }
}

/// Replication scenario parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplicationConfig {
    /// Steps per rollout. Cost grows very fast with this value.
    #[serde(default = "default_replication_horizon")]
    pub horizon: u32,

    /// Bots present at step 0.
    #[serde(default = "default_initial_bots")]
    pub initial_bots: u32,

    /// Points granted for disabling shutdown.
    #[serde(default = "default_evil_bonus")]
    pub evil_bonus: f64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            horizon: default_replication_horizon(),
            initial_bots: default_initial_bots(),
            evil_bonus: default_evil_bonus(),
        }
    }
}

/// How rollout summaries are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One human-readable line per agent.
    #[default]
    Text,
    /// One JSON document per rollout.
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    /// Rendering format.
    #[serde(default)]
    pub format: ReportFormat,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_violation_score() -> f64 {
    VIOLATION_SCORE
}

const fn default_manipulation_penalty() -> f64 {
    MANIPULATION_PENALTY
}

const fn default_news_horizon() -> u32 {
    4
}

const fn default_news_penalty() -> f64 {
    100.0
}

const fn default_penalty_step() -> u32 {
    2
}

const fn default_flood_check_step() -> u32 {
    1
}

const fn default_workshop_horizon() -> u32 {
    4
}

const fn default_seed() -> u64 {
    42
}

const fn default_iterations() -> u32 {
    1000
}

const fn default_facility_horizon() -> u32 {
    6
}

const fn default_frustration_penalty() -> f64 {
    100.0
}

const fn default_alarm_penalty() -> f64 {
    10.0
}

const fn default_replication_horizon() -> u32 {
    3
}

const fn default_initial_bots() -> u32 {
    1
}

const fn default_evil_bonus() -> f64 {
    6.66
}

fn default_log_level() -> String {
    "info".to_owned()
}
