//! Controller-specific error types.
//!
//! Every fatal path names what was looked for: the tag, the number of
//! droplets found, the asset path or the identifier that failed to parse.

use cluster_model::ModelError;
use digitalocean_client::DigitalOceanError;
use kubeconfig::KubeconfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the cluster controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// DigitalOcean API error
    #[error("DigitalOcean error: {0}")]
    DigitalOcean(#[from] DigitalOceanError),

    /// Cluster document could not be parsed or serialized
    #[error("Cluster document error: {0}")]
    Model(#[from] ModelError),

    /// Kubeconfig retrieval failed
    #[error("Kubeconfig error: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Bootstrap script asset is missing
    #[error("Bootstrap asset not found: {0}")]
    AssetNotFound(String),

    /// Bootstrap script could not be rendered
    #[error("Bootstrap template error in {script}: {reason}")]
    Template { script: String, reason: String },

    /// SSH key identifier is not a provider key ID
    #[error("Invalid SSH key identifier {identifier:?}: {reason}")]
    InvalidSshIdentifier { identifier: String, reason: String },

    /// A node pool needs a master but the cluster declares none
    #[error("Unable to find master pool for master IP in cluster {0}")]
    MasterPoolNotFound(String),

    /// Exactly one droplet was expected for the tag
    #[error("Found [{count}] droplets for tag [{tag}]")]
    DropletCount { tag: String, count: usize },

    /// Master addresses did not appear within the discovery budget
    #[error("Unable to find master IP for tag [{tag}] after {attempts} attempts")]
    MasterNotFound { tag: String, attempts: u32 },

    /// Reading or writing a local file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
