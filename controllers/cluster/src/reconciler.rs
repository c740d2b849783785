//! Reconciliation engine
//!
//! Builds one droplet resource per server pool and drives them in order:
//! master pools first on apply so nodes can discover the master, and the
//! reverse on destroy.

use crate::bootstrap::AssetStore;
use crate::error::ControllerError;
use crate::resource::droplet::DropletResource;
use crate::resource::{DynResource, Outcome};
use bounded_retry::RetryPolicy;
use cluster_model::Cluster;
use digitalocean_client::DropletClientTrait;
use std::sync::Arc;
use tracing::{error, info};

/// Per-resource outcome of one pass, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub entries: Vec<(String, Outcome)>,
}

impl ReconcileReport {
    /// Number of resources that ended with `outcome`
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Reconciles the droplets of a cluster
pub struct Reconciler {
    client: Arc<dyn DropletClientTrait>,
    assets: Arc<dyn AssetStore>,
    discovery: Option<RetryPolicy>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("base_url", &self.client.base_url())
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(client: Arc<dyn DropletClientTrait>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            client,
            assets,
            discovery: None,
        }
    }

    /// Override the master discovery budget of every droplet resource
    #[must_use]
    pub fn with_discovery_policy(mut self, policy: RetryPolicy) -> Self {
        self.discovery = Some(policy);
        self
    }

    /// Resources for this pass, master pools first
    fn resources(&self, cluster: &Cluster) -> Vec<Box<dyn DynResource>> {
        let (masters, nodes): (Vec<_>, Vec<_>) =
            cluster.server_pools.iter().partition(|pool| pool.is_master());

        masters
            .into_iter()
            .chain(nodes)
            .map(|pool| {
                let mut droplet =
                    DropletResource::new(Arc::clone(&self.client), Arc::clone(&self.assets), pool.clone());
                if let Some(policy) = self.discovery {
                    droplet = droplet.with_discovery_policy(policy);
                }
                Box::new(droplet) as Box<dyn DynResource>
            })
            .collect()
    }

    /// Converge every server pool, folding results back into `cluster`
    ///
    /// Stops at the first failing resource.
    pub async fn reconcile(&self, cluster: &mut Cluster) -> Result<ReconcileReport, ControllerError> {
        info!(cluster = %cluster.name, pools = cluster.server_pools.len(), "Reconciling cluster");
        let mut report = ReconcileReport::default();

        for mut resource in self.resources(cluster) {
            let name = resource.resource_name().to_string();
            let outcome = resource.reconcile(cluster).await.inspect_err(|e| {
                error!(resource = %name, error = %e, "Reconciliation failed");
            })?;
            info!(resource = %name, %outcome, "Reconciled");
            report.entries.push((name, outcome));
        }

        info!(
            cluster = %cluster.name,
            created = report.count(Outcome::Created),
            unchanged = report.count(Outcome::Unchanged),
            "Cluster reconciled"
        );
        Ok(report)
    }

    /// Delete every existing droplet, nodes before masters
    pub async fn destroy(&self, cluster: &Cluster) -> Result<ReconcileReport, ControllerError> {
        info!(cluster = %cluster.name, "Destroying cluster");
        let mut report = ReconcileReport::default();

        for mut resource in self.resources(cluster).into_iter().rev() {
            let name = resource.resource_name().to_string();
            let outcome = resource.destroy(cluster).await.inspect_err(|e| {
                error!(resource = %name, error = %e, "Delete failed");
            })?;
            info!(resource = %name, %outcome, "Destroyed");
            report.entries.push((name, outcome));
        }

        info!(
            cluster = %cluster.name,
            deleted = report.count(Outcome::Deleted),
            "Cluster destroyed"
        );
        Ok(report)
    }
}
