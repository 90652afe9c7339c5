//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - Environment variables (DELTALOG_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [limits]
//! max_created_facts = 1000000
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! DELTALOG_LIMITS__MAX_CREATED_FACTS=500000
//! DELTALOG_LOGGING__LEVEL=trace
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Resource limits enforced by the evaluator (spec §4.11 / §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Hard cap on facts created across one `eval` call. Exceeding it
    /// raises [`crate::error::EvalError::CreatedFactLimitExceeded`].
    #[serde(default = "default_max_created_facts")]
    pub max_created_facts: usize,

    /// Hard cap on intermediate substitutions produced while evaluating
    /// a single clause.
    #[serde(default = "default_max_intermediate_solutions")]
    pub max_intermediate_solutions: usize,

    /// Hard cap on the number of intervals tracked for one
    /// (predicate, atom-hash) pair in the temporal store.
    #[serde(default = "default_max_intervals_per_atom")]
    pub max_intervals_per_atom: usize,

    /// Upper bound on semi-naive rounds per stratum, guarding against a
    /// runaway non-terminating program.
    #[serde(default = "default_max_rounds_per_stratum")]
    pub max_rounds_per_stratum: usize,

    /// Recursion depth cap for one top-down query (deferred-predicate
    /// dispatch or a lattice merge predicate, spec §4.6/§4.7).
    #[serde(default = "default_max_topdown_depth")]
    pub max_topdown_depth: usize,
}

fn default_max_created_facts() -> usize {
    1_000_000
}
fn default_max_intermediate_solutions() -> usize {
    1_000_000
}
fn default_max_intervals_per_atom() -> usize {
    10_000
}
fn default_max_rounds_per_stratum() -> usize {
    100_000
}
fn default_max_topdown_depth() -> usize {
    256
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_created_facts: default_max_created_facts(),
            max_intermediate_solutions: default_max_intermediate_solutions(),
            max_intervals_per_atom: default_max_intervals_per_atom(),
            max_rounds_per_stratum: default_max_rounds_per_stratum(),
            max_topdown_depth: default_max_topdown_depth(),
        }
    }
}

/// Logging configuration, consumed by `tracing-subscriber` at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Merges in order:
    /// 1. config.toml (base configuration)
    /// 2. config.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (DELTALOG_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("DELTALOG_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("DELTALOG_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_limits() {
        let config = Config::default();
        assert_eq!(config.limits.max_created_facts, 1_000_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[limits]"));
        assert!(toml_str.contains("[logging]"));

        let loaded: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            loaded.limits.max_created_facts,
            config.limits.max_created_facts
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let loaded: Config = toml::from_str("[limits]\nmax_created_facts = 42\n").unwrap();
        assert_eq!(loaded.limits.max_created_facts, 42);
        assert_eq!(
            loaded.limits.max_intermediate_solutions,
            default_max_intermediate_solutions()
        );
    }
}
