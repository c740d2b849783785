//! DigitalOcean droplet resource
//!
//! One resource per server pool. The pool name is the droplet name and the
//! droplet's only tag, so the provider is always queried by tag.
//!
//! Node pools cannot be bootstrapped before the master exists: `apply` polls
//! the master pool's tag until exactly one droplet with both addresses shows
//! up and injects `<private>:<port>` into the node's bootstrap script.

use crate::bootstrap::{
    AssetStore, INJECTED_MASTER, INJECTED_NAME, INJECTED_PORT, INJECTED_TOKEN, asset_path, generate_token, inject,
};
use crate::compare::{Comparable, is_equal};
use crate::error::ControllerError;
use crate::resource::{Resource, ResourceState};
use bounded_retry::{RetryError, RetryPolicy, retry};
use cluster_model::{Cluster, ServerPool};
use digitalocean_client::{CreateDropletRequest, DropletClientTrait, DropletSshKey, ImageIdentifier};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Polls before giving up on the master's addresses
pub const MASTER_IP_ATTEMPTS: u32 = 40;

/// Sleep between polls
pub const MASTER_IP_SLEEP: Duration = Duration::from_secs(3);

/// Droplet state as seen by the comparator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropletState {
    pub name: String,
    /// Provider ID; `None` when the droplet does not exist
    pub cloud_id: Option<i64>,
    /// Region slug
    pub region: String,
    /// Size slug
    pub size: String,
    /// Image slug
    pub image: String,
    pub count: u32,
    pub ssh_fingerprint: String,
}

impl Comparable for DropletState {
    type Key<'a> = (&'a str, &'a str, &'a str, &'a str, u32, &'a str);

    fn comparison_key(&self) -> Self::Key<'_> {
        (
            self.name.as_str(),
            self.size.as_str(),
            self.region.as_str(),
            self.image.as_str(),
            self.count,
            self.ssh_fingerprint.as_str(),
        )
    }
}

impl ResourceState for DropletState {
    fn exists(&self) -> bool {
        self.cloud_id.is_some()
    }
}

/// Addresses of the discovered master droplet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterAddress {
    pub private: String,
    pub public: String,
}

/// Result of one discovery poll that did not find the master
#[derive(Debug)]
enum Poll {
    /// Nothing usable yet, poll again
    NotReady(String),
    /// Polling cannot succeed
    Fatal(ControllerError),
}

impl fmt::Display for Poll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady(reason) => write!(f, "{reason}"),
            Self::Fatal(e) => write!(f, "{e}"),
        }
    }
}

/// Droplet backing one server pool
pub struct DropletResource {
    client: Arc<dyn DropletClientTrait>,
    assets: Arc<dyn AssetStore>,
    pool: ServerPool,
    discovery: RetryPolicy,
    cached_actual: Option<DropletState>,
    cached_expected: Option<DropletState>,
}

impl fmt::Debug for DropletResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropletResource")
            .field("pool", &self.pool.name)
            .field("discovery", &self.discovery)
            .field("cached_actual", &self.cached_actual)
            .field("cached_expected", &self.cached_expected)
            .finish_non_exhaustive()
    }
}

impl DropletResource {
    pub fn new(client: Arc<dyn DropletClientTrait>, assets: Arc<dyn AssetStore>, pool: ServerPool) -> Self {
        Self {
            client,
            assets,
            pool,
            discovery: RetryPolicy::fixed(MASTER_IP_ATTEMPTS, MASTER_IP_SLEEP),
            cached_actual: None,
            cached_expected: None,
        }
    }

    #[must_use]
    pub fn with_discovery_policy(mut self, policy: RetryPolicy) -> Self {
        self.discovery = policy;
        self
    }

    /// Poll `tag` until exactly one droplet with both addresses appears
    ///
    /// A failed query and an empty result are both treated as "not ready".
    /// More than one droplet is fatal on the spot.
    pub async fn discover_addresses(&self, tag: &str) -> Result<MasterAddress, ControllerError> {
        let client = &self.client;
        debug!(tag, max_wait = ?self.discovery.total_sleep(), "Waiting for master addresses");

        let result = retry(
            &self.discovery,
            "master IP discovery",
            |poll: &Poll| matches!(poll, Poll::NotReady(_)),
            |attempt| async move {
                debug!(tag, attempt, "Hanging for master IP");
                let droplets = match client.list_droplets_by_tag(tag).await {
                    Ok(droplets) => droplets,
                    Err(e) => {
                        return Err(Poll::NotReady(format!("listing droplets for tag {tag} failed: {e}")));
                    }
                };

                match droplets.as_slice() {
                    [] => Err(Poll::NotReady(format!("no droplets for tag {tag} yet"))),
                    [droplet] => match (droplet.private_ipv4(), droplet.public_ipv4()) {
                        (Some(private), Some(public)) => Ok(MasterAddress {
                            private: private.to_string(),
                            public: public.to_string(),
                        }),
                        _ => Err(Poll::NotReady(format!(
                            "droplet {} has no private and public address yet",
                            droplet.name
                        ))),
                    },
                    many => Err(Poll::Fatal(ControllerError::DropletCount {
                        tag: tag.to_string(),
                        count: many.len(),
                    })),
                }
            },
        )
        .await;

        result.map_err(|e| match e {
            RetryError::Aborted(Poll::Fatal(e)) => e,
            RetryError::Exhausted { attempts, .. } => ControllerError::MasterNotFound {
                tag: tag.to_string(),
                attempts,
            },
            RetryError::Aborted(Poll::NotReady(_)) => ControllerError::MasterNotFound {
                tag: tag.to_string(),
                attempts: self.discovery.max_attempts,
            },
        })
    }
}

/// Provider key ID from the document's SSH identifier
pub fn parse_ssh_identifier(identifier: &str) -> Result<i64, ControllerError> {
    identifier
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ControllerError::InvalidSshIdentifier {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })
}

#[async_trait::async_trait]
impl Resource for DropletResource {
    type State = DropletState;

    fn name(&self) -> &str {
        &self.pool.name
    }

    async fn actual(&mut self, cluster: &Cluster) -> Result<DropletState, ControllerError> {
        if let Some(cached) = &self.cached_actual {
            debug!(pool = %self.pool.name, "Using cached droplet [actual]");
            return Ok(cached.clone());
        }

        let mut actual = DropletState {
            name: self.pool.name.clone(),
            count: self.pool.max_count,
            ssh_fingerprint: cluster.ssh.public_key_fingerprint.clone(),
            ..DropletState::default()
        };

        let droplets = self.client.list_droplets_by_tag(&self.pool.name).await?;
        match droplets.as_slice() {
            [] => debug!(pool = %self.pool.name, "No droplet yet"),
            [droplet] => {
                actual.cloud_id = Some(droplet.id);
                actual.size.clone_from(&droplet.size_slug);
                actual.region.clone_from(&droplet.region.slug);
                actual.image = droplet.image_slug().to_string();
            }
            many => {
                return Err(ControllerError::DropletCount {
                    tag: self.pool.name.clone(),
                    count: many.len(),
                });
            }
        }

        self.cached_actual = Some(actual.clone());
        Ok(actual)
    }

    fn expected(&mut self, cluster: &Cluster) -> Result<DropletState, ControllerError> {
        if let Some(cached) = &self.cached_expected {
            debug!(pool = %self.pool.name, "Using cached droplet [expected]");
            return Ok(cached.clone());
        }

        let expected = DropletState {
            name: self.pool.name.clone(),
            cloud_id: None,
            region: cluster.location.clone(),
            size: self.pool.size.clone(),
            image: self.pool.image.clone(),
            count: self.pool.max_count,
            ssh_fingerprint: cluster.ssh.public_key_fingerprint.clone(),
        };

        self.cached_expected = Some(expected.clone());
        Ok(expected)
    }

    async fn apply(
        &mut self,
        actual: &DropletState,
        expected: &DropletState,
        cluster: &mut Cluster,
    ) -> Result<DropletState, ControllerError> {
        if is_equal(actual, expected) {
            debug!(pool = %self.pool.name, "Droplet already converged");
            return Ok(expected.clone());
        }

        let script = &self.pool.bootstrap_script;
        let raw = self.assets.asset(&asset_path(script))?;

        let mut endpoint = None;
        if !self.pool.is_master() {
            let master_tag = cluster
                .master_pool_name()
                .ok_or_else(|| ControllerError::MasterPoolNotFound(cluster.name.clone()))?
                .to_string();
            let master = self.discover_addresses(&master_tag).await?;
            info!(tag = %master_tag, private = %master.private, public = %master.public, "Found master");
            cluster.values.item_map.insert(
                INJECTED_MASTER.to_string(),
                format!("{}:{}", master.private, cluster.kubernetes_api.port),
            );
            endpoint = Some(master.public);
        }

        cluster
            .values
            .item_map
            .insert(INJECTED_NAME.to_string(), cluster.name.clone());
        cluster
            .values
            .item_map
            .insert(INJECTED_PORT.to_string(), cluster.kubernetes_api.port.clone());
        // Generated once; later pools and later runs reuse the stored token
        cluster
            .values
            .item_map
            .entry(INJECTED_TOKEN.to_string())
            .or_insert_with(generate_token);
        let user_data = inject(script, &raw, &cluster.values.item_map)?;
        let user_data = String::from_utf8(user_data).map_err(|e| ControllerError::Template {
            script: script.clone(),
            reason: e.to_string(),
        })?;

        let ssh_id = parse_ssh_identifier(&cluster.ssh.identifier)?;

        let request = CreateDropletRequest {
            name: expected.name.clone(),
            region: expected.region.clone(),
            size: expected.size.clone(),
            image: ImageIdentifier::Slug(expected.image.clone()),
            ssh_keys: vec![DropletSshKey {
                id: ssh_id,
                fingerprint: expected.ssh_fingerprint.clone(),
            }],
            private_networking: true,
            user_data: Some(user_data),
            tags: vec![expected.name.clone()],
        };
        let droplet = self.client.create_droplet(&request).await?;
        info!(id = droplet.id, name = %droplet.name, "Created Droplet");
        self.cached_actual = None;

        if self.pool.is_master() {
            let public = match droplet.public_ipv4() {
                Some(public) => public.to_string(),
                None => self.discover_addresses(&self.pool.name).await?.public,
            };
            endpoint = Some(public);
        }
        if let Some(endpoint) = endpoint {
            debug!(%endpoint, "Setting Kubernetes API endpoint");
            cluster.kubernetes_api.endpoint = endpoint;
        }

        Ok(DropletState {
            name: droplet.name.clone(),
            cloud_id: Some(droplet.id),
            region: droplet.region.slug.clone(),
            size: droplet.size_slug.clone(),
            image: droplet.image_slug().to_string(),
            count: expected.count,
            ssh_fingerprint: expected.ssh_fingerprint.clone(),
        })
    }

    async fn delete(&mut self, actual: &DropletState, _cluster: &Cluster) -> Result<(), ControllerError> {
        if actual.name.is_empty() {
            return Err(ControllerError::InvalidConfig(
                "Unable to delete droplet resource without a name".to_string(),
            ));
        }

        let droplets = self.client.list_droplets_by_tag(&self.pool.name).await?;
        let [droplet] = droplets.as_slice() else {
            return Err(ControllerError::DropletCount {
                tag: self.pool.name.clone(),
                count: droplets.len(),
            });
        };

        self.client.delete_droplet(droplet.id).await?;
        info!(id = droplet.id, name = %droplet.name, "Deleted Droplet");
        self.cached_actual = None;
        Ok(())
    }

    fn render(&self, state: &DropletState, cluster: &mut Cluster) -> Result<(), ControllerError> {
        if let Some(pool) = cluster.server_pool_mut(&state.name) {
            pool.image.clone_from(&state.image);
            pool.size.clone_from(&state.size);
            pool.max_count = state.count;
        } else {
            cluster.server_pools.push(ServerPool {
                pool_type: self.pool.pool_type,
                name: state.name.clone(),
                image: state.image.clone(),
                size: state.size.clone(),
                max_count: state.count,
                bootstrap_script: self.pool.bootstrap_script.clone(),
                ..ServerPool::default()
            });
        }
        cluster.location.clone_from(&state.region);
        Ok(())
    }

    async fn tag(&mut self, tags: &BTreeMap<String, String>) -> Result<(), ControllerError> {
        debug!(pool = %self.pool.name, ?tags, "Droplets are tagged with their pool name on create");
        Ok(())
    }
}
