//! Cluster document
//!
//! Constructed from the desired-state document before reconciliation, mutated
//! in place by resources during apply and render, and written back afterwards.

use crate::error::ModelError;
use crate::server_pool::{ServerPool, ServerPoolType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Cluster name
    pub name: String,

    /// Provider region slug
    #[serde(default)]
    pub location: String,

    /// SSH material used for instance access and credential retrieval
    #[serde(default)]
    pub ssh: Ssh,

    /// Kubernetes API descriptor
    #[serde(default)]
    pub kubernetes_api: KubernetesApi,

    /// Server pools, in declared order
    #[serde(default)]
    pub server_pools: Vec<ServerPool>,

    /// Template substitution values
    #[serde(default)]
    pub values: Values,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ssh {
    /// Remote login user
    #[serde(default)]
    pub user: String,

    /// Path to the public key; the private key sits beside it without `.pub`
    #[serde(default)]
    pub public_key_path: String,

    /// Public key fingerprint registered with the provider
    #[serde(default)]
    pub public_key_fingerprint: String,

    /// Provider-side key identifier
    #[serde(default)]
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesApi {
    /// Externally visible API endpoint, set once the master is provisioned
    #[serde(default)]
    pub endpoint: String,

    /// API port
    #[serde(default)]
    pub port: String,
}

/// String-keyed substitution map read by the bootstrap injector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Values {
    #[serde(default)]
    pub item_map: BTreeMap<String, String>,
}

impl Cluster {
    /// Parse a cluster document from YAML
    pub fn from_yaml_str(document: &str) -> Result<Self, ModelError> {
        Ok(serde_yaml::from_str(document)?)
    }

    /// Serialize the cluster document to YAML
    pub fn to_yaml_string(&self) -> Result<String, ModelError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Name of the master pool, if one is declared
    #[must_use]
    pub fn master_pool_name(&self) -> Option<&str> {
        self.server_pools
            .iter()
            .find(|pool| pool.pool_type == ServerPoolType::Master)
            .map(|pool| pool.name.as_str())
    }

    /// Look up a server pool by name
    #[must_use]
    pub fn server_pool(&self, name: &str) -> Option<&ServerPool> {
        self.server_pools.iter().find(|pool| pool.name == name)
    }

    /// Look up a server pool by name for in-place update
    pub fn server_pool_mut(&mut self, name: &str) -> Option<&mut ServerPool> {
        self.server_pools.iter_mut().find(|pool| pool.name == name)
    }
}
