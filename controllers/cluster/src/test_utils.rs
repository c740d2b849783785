//! Test utilities for droplet and engine tests

use crate::bootstrap::{AssetStore, EmbeddedAssets};
use crate::resource::droplet::DropletResource;
use cluster_model::{Cluster, KubernetesApi, ServerPool, ServerPoolType, Ssh, Values};
use digitalocean_client::{DropletClientTrait, MockDropletClient};
use std::sync::Arc;

pub const MASTER_POOL: &str = "master-pool";
pub const NODE_POOL: &str = "node-pool";
pub const MASTER_SCRIPT: &str = "digitalocean_k8s_ubuntu_master.sh";
pub const NODE_SCRIPT: &str = "digitalocean_k8s_ubuntu_node.sh";

/// Helper to create a test server pool
pub fn create_test_pool(name: &str, pool_type: ServerPoolType, script: &str) -> ServerPool {
    ServerPool {
        pool_type,
        name: name.to_string(),
        max_count: 1,
        image: "ubuntu-22-04-x64".to_string(),
        size: "s-2vcpu-4gb".to_string(),
        bootstrap_script: script.to_string(),
        ..ServerPool::default()
    }
}

/// Cluster with a node pool declared before its master pool
pub fn create_test_cluster() -> Cluster {
    Cluster {
        name: "demo".to_string(),
        location: "nyc3".to_string(),
        ssh: Ssh {
            user: "root".to_string(),
            public_key_path: "~/.ssh/id_rsa.pub".to_string(),
            public_key_fingerprint: "aa:bb:cc:dd".to_string(),
            identifier: "12345".to_string(),
        },
        kubernetes_api: KubernetesApi {
            endpoint: String::new(),
            port: "443".to_string(),
        },
        server_pools: vec![
            create_test_pool(NODE_POOL, ServerPoolType::Node, NODE_SCRIPT),
            create_test_pool(MASTER_POOL, ServerPoolType::Master, MASTER_SCRIPT),
        ],
        values: Values::default(),
    }
}

pub fn mock_client() -> MockDropletClient {
    MockDropletClient::new("http://test-digitalocean")
}

/// Helper to create a droplet resource for `pool_name` backed by `client`
pub fn create_test_droplet_resource(client: &MockDropletClient, cluster: &Cluster, pool_name: &str) -> DropletResource {
    let pool = cluster
        .server_pool(pool_name)
        .cloned()
        .unwrap_or_else(|| panic!("no pool {pool_name} in test cluster"));
    let client: Arc<dyn DropletClientTrait> = Arc::new(client.clone());
    let assets: Arc<dyn AssetStore> = Arc::new(EmbeddedAssets);
    DropletResource::new(client, assets, pool)
}
