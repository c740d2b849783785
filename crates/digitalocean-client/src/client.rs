//! DigitalOcean API client
//!
//! Implements the droplet endpoints the reconciler needs.
//! API Documentation: <https://docs.digitalocean.com/reference/api/>

use crate::common::HttpClient;
use crate::droplet_trait::DropletClientTrait;
use crate::error::DigitalOceanError;
use crate::models::{CreateDropletRequest, Droplet, DropletListResponse, DropletResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Base URL for the DigitalOcean API
pub const API_BASE_URL: &str = "https://api.digitalocean.com/v2";

/// Default timeout for API requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size used when listing droplets
const PAGE_SIZE: &str = "200";

/// DigitalOcean API client
#[derive(Debug)]
pub struct DigitalOceanClient {
    http: HttpClient,
}

impl DigitalOceanClient {
    /// Create a new client against the public DigitalOcean API
    ///
    /// # Arguments
    /// * `token` - API token for authentication
    pub fn new(token: String) -> Result<Self, DigitalOceanError> {
        Self::with_base_url(API_BASE_URL.to_string(), token)
    }

    /// Create a new client against a custom API base URL
    pub fn with_base_url(base_url: String, token: String) -> Result<Self, DigitalOceanError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }
}

#[async_trait::async_trait]
impl DropletClientTrait for DigitalOceanClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<Droplet>, DigitalOceanError> {
        let query = HttpClient::build_query_string(&[("tag_name", tag), ("per_page", PAGE_SIZE)]);
        let droplets = self
            .http
            .fetch_all_pages::<DropletListResponse>(&format!("/droplets?{query}"))
            .await?;
        debug!(tag, count = droplets.len(), "Listed droplets by tag");
        Ok(droplets)
    }

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet, DigitalOceanError> {
        info!(
            name = %request.name,
            region = %request.region,
            size = %request.size,
            "Creating droplet"
        );
        let response: DropletResponse = self.http.post("/droplets", request).await?;
        Ok(response.droplet)
    }

    async fn delete_droplet(&self, id: i64) -> Result<(), DigitalOceanError> {
        info!(droplet_id = id, "Deleting droplet");
        self.http.delete(&format!("/droplets/{id}")).await
    }
}
