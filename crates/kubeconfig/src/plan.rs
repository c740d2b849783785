//! Where to connect, as whom, and which files to move

use crate::error::KubeconfigError;
use cluster_model::Cluster;
use std::path::{Path, PathBuf};

/// SSH port on the master
pub const SSH_PORT: u16 = 22;

/// Everything one retrieval needs, derived from the cluster document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPlan {
    /// Remote login user
    pub user: String,
    /// `<endpoint>:22`
    pub address: String,
    /// Private key, derived from the public key path
    pub private_key_path: PathBuf,
    /// Absolute path of the kubeconfig on the master
    pub remote_path: String,
    /// Local file the kubeconfig is appended to
    pub local_path: PathBuf,
}

impl RetrievalPlan {
    /// Derive the plan from the cluster's SSH settings and API endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint or SSH user is empty, or the home
    /// directory cannot be determined.
    pub fn for_cluster(cluster: &Cluster) -> Result<Self, KubeconfigError> {
        let endpoint = cluster.kubernetes_api.endpoint.trim();
        if endpoint.is_empty() {
            return Err(KubeconfigError::InvalidConfig(format!(
                "cluster {} has no Kubernetes API endpoint",
                cluster.name
            )));
        }
        if cluster.ssh.user.is_empty() {
            return Err(KubeconfigError::InvalidConfig(format!(
                "cluster {} has no SSH user",
                cluster.name
            )));
        }

        let home = dirs::home_dir().ok_or(KubeconfigError::HomeDirectory)?;

        Ok(Self {
            user: cluster.ssh.user.clone(),
            address: format!("{endpoint}:{SSH_PORT}"),
            private_key_path: private_key_path(&cluster.ssh.public_key_path, &home),
            remote_path: remote_config_path(&cluster.ssh.user),
            local_path: local_config_path(&home),
        })
    }
}

/// Kubeconfig location on the master for `user`
#[must_use]
pub fn remote_config_path(user: &str) -> String {
    if user == "root" {
        "/root/.kube/config".to_string()
    } else {
        format!("/home/{user}/.kube/config")
    }
}

/// `<home>/.kube/config`
#[must_use]
pub fn local_config_path(home: &Path) -> PathBuf {
    home.join(".kube").join("config")
}

/// Public key path with `.pub` removed and a leading `~` expanded
#[must_use]
pub fn private_key_path(public_key_path: &str, home: &Path) -> PathBuf {
    let stripped = public_key_path
        .strip_suffix(".pub")
        .unwrap_or(public_key_path);

    if stripped == "~" {
        home.to_path_buf()
    } else if let Some(rest) = stripped.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(stripped)
    }
}
