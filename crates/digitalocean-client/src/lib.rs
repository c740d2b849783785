//! DigitalOcean REST API Client
//!
//! A small client for the DigitalOcean v2 droplet API: list droplets by tag,
//! create a droplet, delete a droplet. The reconciler only talks to the
//! provider through [`DropletClientTrait`], so tests can swap in the
//! in-memory [`MockDropletClient`] (feature `test-util`).
//!
//! # Example
//!
//! ```no_run
//! use digitalocean_client::{DigitalOceanClient, DropletClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DigitalOceanClient::new("your-api-token".to_string())?;
//!
//! // Droplets are grouped by a tag equal to their server pool name
//! let droplets = client.list_droplets_by_tag("demo.master").await?;
//! for droplet in &droplets {
//!     println!("{} {:?}", droplet.name, droplet.public_ipv4());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod droplet_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::DigitalOceanClient;
pub use common::{HttpClient, Paginated};
pub use droplet_trait::DropletClientTrait;
pub use error::DigitalOceanError;
pub use models::*;
#[cfg(feature = "test-util")]
pub use mock::{ListOutcome, MockDropletClient};
