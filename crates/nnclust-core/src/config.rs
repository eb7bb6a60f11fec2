//! `nnclust` Configuration Module
//!
//! Tuning knobs for the kernels, loadable from `nnclust.toml` or a TOML
//! string. The C entry points always run with [`NnclustConfig::default`];
//! Rust callers can load and override.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (builder methods)
//! 2. Configuration file (`nnclust.toml`)
//! 3. Default values
//!
//! Environment variables are deliberately not a source: the core reads
//! nothing from the process environment.

use crate::cluster::BorderPolicy;
use crate::distance::DistanceMetric;
use crate::executor::ThreadConfig;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Neighbor search (NN-descent) section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborsConfig {
    /// Maximum refinement rounds when the cluster engine builds its own graph.
    pub max_iterations: usize,
    /// Convergence threshold as a fraction of `n * k` list updates.
    pub delta: f64,
    /// Point sets this small get the exact brute-force graph instead.
    pub exact_threshold: usize,
    /// Maximum reverse neighbors joined per point (0 = `k`).
    pub reverse_cap: usize,
    /// Seed used when the cluster engine builds its own graph.
    pub seed: u64,
}

impl Default for NeighborsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            delta: 0.001,
            exact_threshold: 256,
            reverse_cap: 0,
            seed: 0x5DEE_CE66_D1A4_B5B5,
        }
    }
}

impl NeighborsConfig {
    /// Validates the neighbor search section.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_iterations` is zero or `delta` is outside
    /// `[0, 1)` (NaN included).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "neighbors.max_iterations".to_string(),
                message: "value must be >= 1".to_string(),
            });
        }

        let delta = self.delta;
        if !(0.0..1.0).contains(&delta) {
            return Err(ConfigError::InvalidValue {
                key: "neighbors.delta".to_string(),
                message: format!("value {delta} is out of range [0, 1)"),
            });
        }

        Ok(())
    }
}

/// Cluster engine section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Lower bound on `k` for internally built graphs (`k = max(min_pts, this)`).
    pub min_graph_k: usize,
    /// How non-core points join clusters.
    pub border_policy: BorderPolicy,
    /// Metric used for epsilon-neighborhoods.
    pub metric: DistanceMetric,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_graph_k: 8,
            border_policy: BorderPolicy::default(),
            metric: DistanceMetric::Euclidean,
        }
    }
}

impl ClusterConfig {
    /// Validates the cluster section.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_graph_k` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_graph_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cluster.min_graph_k".to_string(),
                message: "value must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Executor section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Number of worker threads (0 = auto). Ignored by the serial build.
    pub threads: usize,
}

impl ExecutorConfig {
    /// Worker count as a [`ThreadConfig`].
    #[must_use]
    pub fn thread_config(&self) -> ThreadConfig {
        ThreadConfig::from_count(self.threads)
    }
}

/// Main `nnclust` configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NnclustConfig {
    /// Neighbor search configuration.
    pub neighbors: NeighborsConfig,
    /// Cluster engine configuration.
    pub cluster: ClusterConfig,
    /// Executor configuration.
    pub executor: ExecutorConfig,
}

impl NnclustConfig {
    /// Loads configuration from `nnclust.toml` in the working directory,
    /// falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("nnclust.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str))
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.neighbors.validate()?;
        self.cluster.validate()
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
