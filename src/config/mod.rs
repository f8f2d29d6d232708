//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits and switches applied to a merged schema
///
/// Every field is optional in YAML; missing fields take their defaults.
///
/// ```yaml
/// max_depth: 10
/// max_complexity: 200
/// introspection: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Maximum query nesting depth (unlimited when absent)
    pub max_depth: Option<usize>,

    /// Maximum query complexity (unlimited when absent)
    pub max_complexity: Option<usize>,

    /// Recursion limit of the engine's query parser
    pub max_recursive_depth: Option<usize>,

    /// Whether `__schema` / `__type` introspection queries are answered
    pub introspection: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_complexity: None,
            max_recursive_depth: None,
            introspection: true,
        }
    }
}

impl SchemaConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge two configurations, `other` taking precedence where it sets a limit
    pub fn merge(self, other: SchemaConfig) -> SchemaConfig {
        SchemaConfig {
            max_depth: other.max_depth.or(self.max_depth),
            max_complexity: other.max_complexity.or(self.max_complexity),
            max_recursive_depth: other.max_recursive_depth.or(self.max_recursive_depth),
            introspection: self.introspection && other.introspection,
        }
    }
}
