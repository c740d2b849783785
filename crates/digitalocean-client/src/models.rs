//! DigitalOcean API models
//!
//! These models match the DigitalOcean v2 droplet API.
//! See: <https://docs.digitalocean.com/reference/api/api-reference/#tag/Droplets>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Droplet types
// ============================================================================

/// Droplet (instance) from API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub id: i64,
    pub name: String,
    /// "new", "active", "off", "archive"
    #[serde(default)]
    pub status: String,
    pub region: Region,
    #[serde(default)]
    pub size_slug: String,
    pub image: Image,
    #[serde(default)]
    pub networks: Networks,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Droplet {
    /// Private IPv4 address, once assigned
    #[must_use]
    pub fn private_ipv4(&self) -> Option<&str> {
        self.ipv4_of_type("private")
    }

    /// Public IPv4 address, once assigned
    #[must_use]
    pub fn public_ipv4(&self) -> Option<&str> {
        self.ipv4_of_type("public")
    }

    /// Image slug, falling back to the image name for custom images
    #[must_use]
    pub fn image_slug(&self) -> &str {
        self.image.slug.as_deref().unwrap_or(&self.image.name)
    }

    fn ipv4_of_type(&self, address_type: &str) -> Option<&str> {
        self.networks
            .v4
            .iter()
            .find(|ip| ip.address_type == address_type)
            .map(|ip| ip.ip_address.as_str())
    }
}

/// Network configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Networks {
    #[serde(default)]
    pub v4: Vec<NetworkAddress>,
    #[serde(default)]
    pub v6: Vec<NetworkAddress>,
}

/// Network address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAddress {
    pub ip_address: String,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    /// "public" or "private"
    #[serde(rename = "type")]
    pub address_type: String,
}

/// Region information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

/// Image information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Droplet list response
#[derive(Debug, Clone, Deserialize)]
pub struct DropletListResponse {
    pub droplets: Vec<Droplet>,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Single droplet response
#[derive(Debug, Clone, Deserialize)]
pub struct DropletResponse {
    pub droplet: Droplet,
}

/// Pagination links
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub pages: Option<Pages>,
}

/// Page links
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

/// Response metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub total: u64,
}

// ============================================================================
// Create Droplet types
// ============================================================================

/// Request body for creating a droplet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDropletRequest {
    pub name: String,
    /// Region slug
    pub region: String,
    /// Size slug
    pub size: String,
    pub image: ImageIdentifier,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<DropletSshKey>,
    pub private_networking: bool,
    /// User data for cloud-init
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Image identifier (can be slug or ID)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageIdentifier {
    Slug(String),
    Id(i64),
}

/// SSH key reference in a create request
///
/// Serialized as the numeric ID when one is known, otherwise as the
/// fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropletSshKey {
    pub id: i64,
    pub fingerprint: String,
}

impl Serialize for DropletSshKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.id > 0 {
            serializer.serialize_i64(self.id)
        } else {
            serializer.serialize_str(&self.fingerprint)
        }
    }
}
