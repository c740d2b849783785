//! Controller configuration from environment variables

use crate::error::ControllerError;
use digitalocean_client::client::API_BASE_URL;
use std::path::PathBuf;
use std::str::FromStr;

/// What a run does to the declared cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Converge droplets toward the document
    #[default]
    Apply,
    /// Destroy every droplet the document declares
    Delete,
}

impl FromStr for Action {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "delete" => Ok(Self::Delete),
            other => Err(ControllerError::InvalidConfig(format!(
                "CLUSTER_ACTION must be apply or delete, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub token: String,
    pub api_url: String,
    pub cluster_file: PathBuf,
    /// Script directory; embedded scripts are used when unset
    pub bootstrap_dir: Option<PathBuf>,
    pub action: Action,
    pub fetch_kubeconfig: bool,
}

impl ControllerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DIGITALOCEAN_ACCESS_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ControllerError::InvalidConfig(
                    "DIGITALOCEAN_ACCESS_TOKEN environment variable is required".to_string(),
                )
            })?;

        let action = lookup("CLUSTER_ACTION")
            .map(|a| a.parse::<Action>())
            .transpose()?
            .unwrap_or_default();

        let fetch_kubeconfig = match lookup("FETCH_KUBECONFIG") {
            None => true,
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "" | "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(ControllerError::InvalidConfig(format!(
                        "FETCH_KUBECONFIG must be true or false, got {other:?}"
                    )));
                }
            },
        };

        Ok(Self {
            token,
            api_url: lookup("DIGITALOCEAN_API_URL").unwrap_or_else(|| API_BASE_URL.to_string()),
            cluster_file: lookup("CLUSTER_FILE")
                .map_or_else(|| PathBuf::from("cluster.yaml"), PathBuf::from),
            bootstrap_dir: lookup("BOOTSTRAP_DIR").map(PathBuf::from),
            action,
            fetch_kubeconfig,
        })
    }
}
