//! Cluster document errors

use thiserror::Error;

/// Errors raised while reading or writing a cluster document
#[derive(Debug, Error)]
pub enum ModelError {
    /// YAML (de)serialization error
    #[error("Cluster document error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
