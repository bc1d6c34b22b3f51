//! Configuration for networks, road edges and path collections.
//!
//! Every section has working defaults, so a configuration file only needs the
//! keys it wants to change:
//!
//! ```toml
//! [network]
//! directed = false
//! removal_policy = "reject"
//!
//! [road]
//! capacity = 1800.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CnetConfig {
    pub network: NetworkConfig,
    pub road: RoadDefaults,
    pub paths: PathsConfig,
}

impl CnetConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: CnetConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.road.validate()?;
        if self.paths.separator.is_empty() {
            return Err(ConfigError::Invalid("paths.separator must not be empty".into()));
        }
        if self.network.edge_id_prefix.is_empty() {
            return Err(ConfigError::Invalid("network.edge_id_prefix must not be empty".into()));
        }
        Ok(())
    }
}

/// What happens to the incident edges of a removed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Incident edges are removed together with the node.
    #[default]
    Cascade,
    /// Nodes that still have incident edges cannot be removed.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub directed: bool,
    /// Create missing endpoints instead of failing in `add_edge`.
    pub auto_create_nodes: bool,
    pub removal_policy: RemovalPolicy,
    /// When false, negative weights make `transition_matrix` fail.
    pub allow_negative_weights: bool,
    /// Prefix of generated edge ids (`e0`, `e1`, ...).
    pub edge_id_prefix: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            directed: true,
            auto_create_nodes: false,
            removal_policy: RemovalPolicy::Cascade,
            allow_negative_weights: false,
            edge_id_prefix: "e".to_string(),
        }
    }
}

/// Shape parameters applied to road edges that do not set their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadDefaults {
    pub alpha: f64,
    pub beta: f64,
    pub capacity: f64,
    pub free_flow_speed: f64,
    /// How a road edge added without an explicit length measures itself.
    pub length_mode: LengthMode,
}

impl Default for RoadDefaults {
    fn default() -> Self {
        Self {
            alpha: 0.15,
            beta: 4.0,
            capacity: 1000.0,
            free_flow_speed: 25.0,
            length_mode: LengthMode::Euclidean,
        }
    }
}

/// How the length of an edge is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthMode {
    /// Straight line between the endpoint coordinates.
    #[default]
    Euclidean,
    /// Great-circle distance in metres; coordinates are latitude/longitude.
    Haversine,
    /// Every edge has length 1.
    Topological,
    /// The edge's own `length` attribute.
    Attribute,
}

impl RoadDefaults {
    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("road.alpha", self.alpha >= 0.0),
            ("road.beta", self.beta >= 0.0),
            ("road.capacity", self.capacity > 0.0),
            ("road.free_flow_speed", self.free_flow_speed > 0.0),
        ];
        for (name, ok) in checks {
            if !ok {
                return Err(ConfigError::Invalid(format!("{} is out of range", name)));
            }
        }
        Ok(())
    }
}

/// What `Paths::add_path` does with a path whose node sequence is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Increase the stored frequency.
    #[default]
    Increment,
    /// Fail with `DuplicateId`.
    Reject,
}

/// Which common sub-paths a shared-path query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedPolicy {
    /// Every maximal common contiguous run.
    #[default]
    AllMaximal,
    /// Only the longest runs (all of them on ties).
    LongestOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub duplicate_policy: DuplicatePolicy,
    pub shared_policy: SharedPolicy,
    /// Shortest shared run worth reporting, in nodes.
    pub min_shared_nodes: usize,
    pub separator: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Increment,
            shared_policy: SharedPolicy::AllMaximal,
            min_shared_nodes: 2,
            separator: "-".to_string(),
        }
    }
}
