//! Cluster Model
//!
//! The desired-state document consumed and updated by the cluster reconciler:
//! cluster identity, location, SSH material, Kubernetes API descriptor,
//! server pools, and the template-substitution values.

pub mod cluster;
pub mod disk;
pub mod error;
pub mod server_pool;

pub use cluster::*;
pub use disk::*;
pub use error::*;
pub use server_pool::*;
