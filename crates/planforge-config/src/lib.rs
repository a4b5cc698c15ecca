//! Configuration system for PlanForge.
//!
//! Load planner configuration from TOML or YAML files to choose the compiler
//! pipeline, bound the search and control plan validation without code
//! changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use planforge_config::{CompilerKind, PlannerConfig};
//! use std::time::Duration;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     compilers = ["negative_conditions_remover", "grounder"]
//!
//!     [search]
//!     node_limit = 5000
//!     seconds_spent_limit = 10
//!
//!     [validation]
//!     record_trace = false
//! "#).unwrap();
//!
//! assert_eq!(
//!     config.compilers,
//!     vec![CompilerKind::NegativeConditionsRemover, CompilerKind::Grounder]
//! );
//! assert_eq!(config.search.time_limit(), Some(Duration::from_secs(10)));
//! assert!(config.validation.enabled);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use planforge_config::PlannerConfig;
//!
//! let config = PlannerConfig::load("planforge.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```


use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on expanded search nodes.
pub const DEFAULT_NODE_LIMIT: u64 = 100_000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PlannerConfig {
    /// Compilers applied, in order, before an engine is selected.
    #[serde(default = "default_compilers")]
    pub compilers: Vec<CompilerKind>,

    /// Name of the engine to use instead of the closest match.
    #[serde(default)]
    pub engine: Option<String>,

    /// Search bounds for planning engines.
    #[serde(default)]
    pub search: SearchConfig,

    /// Validation of the back-translated plan.
    #[serde(default)]
    pub validation: ValidationConfig,
}

fn default_compilers() -> Vec<CompilerKind> {
    vec![CompilerKind::NegativeConditionsRemover]
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            compilers: default_compilers(),
            engine: None,
            search: SearchConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or
    /// describes an unusable configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.node_limit == 0 {
            return Err(ConfigError::Invalid("search.node_limit must be positive".into()));
        }
        if matches!(&self.engine, Some(name) if name.trim().is_empty()) {
            return Err(ConfigError::Invalid("engine name must not be empty".into()));
        }
        Ok(())
    }

    /// Appends a compiler to the pipeline.
    pub fn with_compiler(mut self, compiler: CompilerKind) -> Self {
        self.compilers.push(compiler);
        self
    }

    /// Replaces the whole compiler pipeline.
    pub fn with_compilers(mut self, compilers: impl IntoIterator<Item = CompilerKind>) -> Self {
        self.compilers = compilers.into_iter().collect();
        self
    }

    /// Sets the search node limit.
    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.search.node_limit = node_limit;
        self
    }

    /// Sets the search time limit.
    pub fn with_time_limit_seconds(mut self, seconds: u64) -> Self {
        self.search.seconds_spent_limit = Some(seconds);
        self
    }

    /// Requests a specific engine by name.
    pub fn with_engine(mut self, name: impl Into<String>) -> Self {
        self.engine = Some(name.into());
        self
    }

    /// Enables or disables validation of produced plans.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation.enabled = enabled;
        self
    }
}

/// A compiler that can be named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompilerKind {
    /// Replaces negated fluents in conditions by shadow fluents.
    NegativeConditionsRemover,

    /// Replaces parameterised actions by ground ones.
    Grounder,
}

impl fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerKind::NegativeConditionsRemover => write!(f, "negative_conditions_remover"),
            CompilerKind::Grounder => write!(f, "grounder"),
        }
    }
}

/// Search bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SearchConfig {
    /// Maximum number of expanded nodes before giving up with a timeout.
    pub node_limit: u64,

    /// Maximum seconds to spend searching.
    pub seconds_spent_limit: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            node_limit: DEFAULT_NODE_LIMIT,
            seconds_spent_limit: None,
        }
    }
}

impl SearchConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.seconds_spent_limit.map(Duration::from_secs)
    }
}

/// Plan validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ValidationConfig {
    /// Validate every plan against the original problem after solving.
    pub enabled: bool,

    /// Keep the full state trace in validation results.
    pub record_trace: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            record_trace: true,
        }
    }
}
