//! DropletClient trait for mocking
//!
//! This trait abstracts the DigitalOcean client so the reconciler can be unit
//! tested against an in-memory provider.

use crate::error::DigitalOceanError;
use crate::models::{CreateDropletRequest, Droplet};

/// Droplet operations consumed by the reconciler
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait DropletClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// List every droplet carrying `tag`
    async fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<Droplet>, DigitalOceanError>;

    /// Create a droplet
    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet, DigitalOceanError>;

    /// Delete a droplet by ID
    async fn delete_droplet(&self, id: i64) -> Result<(), DigitalOceanError>;
}
