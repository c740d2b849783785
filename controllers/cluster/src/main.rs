//! Cluster Controller
//!
//! Converges the DigitalOcean droplets of a declared cluster:
//! - one droplet per server pool, tagged with the pool name
//! - master pools first; node pools discover the master's private address
//!   and receive it through their bootstrap script
//! - the cluster document is written back with the rendered state
//!
//! Once the cluster converges, the kubeconfig is fetched from the master.

mod bootstrap;
mod compare;
mod config;
mod error;
mod reconciler;
mod resource;
#[cfg(test)]
mod test_utils;

use crate::bootstrap::{AssetStore, DirectoryAssets, EmbeddedAssets};
use crate::config::{Action, ControllerConfig};
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use cluster_model::Cluster;
use digitalocean_client::{DigitalOceanClient, DropletClientTrait};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Cluster Controller");

    let config = ControllerConfig::from_env()?;
    info!("Configuration:");
    info!("  DigitalOcean API: {}", config.api_url);
    info!("  Cluster file: {}", config.cluster_file.display());
    info!(
        "  Bootstrap scripts: {}",
        config
            .bootstrap_dir
            .as_deref()
            .map_or_else(|| "embedded".to_string(), |dir| dir.display().to_string())
    );
    info!("  Action: {:?}", config.action);

    let mut cluster = load_cluster(&config.cluster_file)?;

    let client: Arc<dyn DropletClientTrait> = Arc::new(DigitalOceanClient::with_base_url(
        config.api_url.clone(),
        config.token.clone(),
    )?);
    let assets: Arc<dyn AssetStore> = match &config.bootstrap_dir {
        Some(dir) => Arc::new(DirectoryAssets::new(dir)),
        None => Arc::new(EmbeddedAssets),
    };
    let reconciler = Reconciler::new(client, assets);

    match config.action {
        Action::Apply => {
            reconciler.reconcile(&mut cluster).await?;
            save_cluster(&config.cluster_file, &cluster)?;

            if config.fetch_kubeconfig {
                let path = kubeconfig::retrieve_kubeconfig(&cluster).await?;
                info!(path = %path.display(), "Kubeconfig written");
            }
        }
        Action::Delete => {
            reconciler.destroy(&cluster).await?;
        }
    }

    Ok(())
}

fn load_cluster(path: &Path) -> Result<Cluster, ControllerError> {
    let document = std::fs::read_to_string(path).map_err(|source| ControllerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Cluster::from_yaml_str(&document)?)
}

fn save_cluster(path: &Path, cluster: &Cluster) -> Result<(), ControllerError> {
    std::fs::write(path, cluster.to_yaml_string()?).map_err(|source| ControllerError::Io {
        path: path.to_path_buf(),
        source,
    })
}
