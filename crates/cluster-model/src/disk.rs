//! Disk descriptor
//!
//! Attached-storage attributes for a server. Attribute-only; no lifecycle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    /// Whether this is the boot disk
    #[serde(rename = "bootdisk", default, skip_serializing_if = "std::ops::Not::not")]
    pub boot_disk: bool,

    /// Disk size in GB
    #[serde(rename = "sizegb", default, skip_serializing_if = "is_zero")]
    pub size_gb: i64,

    /// Image the disk is created from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
