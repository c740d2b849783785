//! Server pools
//!
//! A server pool is a named group of same-role, same-configuration compute
//! instances. The pool name doubles as the provider-side grouping tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a server pool within the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerPoolType {
    /// Runs the Kubernetes control plane
    Master,

    /// Joins the control plane as a worker
    #[default]
    Node,
}

impl fmt::Display for ServerPoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Node => write!(f, "node"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPool {
    /// Pool role (master | node)
    #[serde(rename = "type")]
    pub pool_type: ServerPoolType,

    /// Pool name, also used as the provider tag
    pub name: String,

    /// Opaque identifier carried through from the document
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identifier: String,

    /// Maximum instance count
    #[serde(default)]
    pub max_count: u32,

    /// Image slug
    #[serde(default)]
    pub image: String,

    /// Size class slug
    #[serde(default)]
    pub size: String,

    /// Bootstrap script asset name
    #[serde(default)]
    pub bootstrap_script: String,

    /// Disks attached to every server of the pool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disks: Vec<crate::Disk>,
}

impl ServerPool {
    /// Whether this pool runs the control plane
    #[must_use]
    pub fn is_master(&self) -> bool {
        self.pool_type == ServerPoolType::Master
    }
}
