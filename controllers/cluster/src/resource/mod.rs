//! Resource interface
//!
//! Every provisionable entity implements [`Resource`] with its own strongly
//! typed state. The engine drives a heterogeneous list of resources through
//! [`DynResource`], which every [`Resource`] gets for free.

pub mod droplet;

use crate::compare::{Comparable, is_equal};
use crate::error::ControllerError;
use cluster_model::Cluster;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// State snapshot of one resource kind
pub trait ResourceState: Comparable + Clone + fmt::Debug + Send + Sync {
    /// Whether the provider-side object exists
    fn exists(&self) -> bool;
}

/// Lifecycle contract of a provisionable entity
///
/// Implementations may cache the first `actual` and `expected` results; a
/// resource value lives for one reconciliation pass only.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    type State: ResourceState;

    /// Stable name, also the provider-side lookup key
    fn name(&self) -> &str;

    /// Query the provider. An absent object yields a state whose
    /// [`ResourceState::exists`] is false; query failures are errors.
    async fn actual(&mut self, cluster: &Cluster) -> Result<Self::State, ControllerError>;

    /// Derive the desired state from the document alone.
    fn expected(&mut self, cluster: &Cluster) -> Result<Self::State, ControllerError>;

    /// Converge the provider toward `expected`.
    ///
    /// Returns `expected` untouched when `actual` already satisfies it. May
    /// write substitution values and the API endpoint into `cluster`.
    async fn apply(
        &mut self,
        actual: &Self::State,
        expected: &Self::State,
        cluster: &mut Cluster,
    ) -> Result<Self::State, ControllerError>;

    /// Destroy the provider-side object.
    async fn delete(&mut self, actual: &Self::State, cluster: &Cluster) -> Result<(), ControllerError>;

    /// Fold `state` back into the document.
    fn render(&self, state: &Self::State, cluster: &mut Cluster) -> Result<(), ControllerError>;

    /// Attach provider tags.
    async fn tag(&mut self, tags: &BTreeMap<String, String>) -> Result<(), ControllerError>;
}

/// What a pass did to one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Actual state already matched
    Unchanged,
    /// Provider object created
    Created,
    /// Provider object destroyed
    Deleted,
    /// Nothing to destroy
    Absent,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Created => write!(f, "created"),
            Self::Deleted => write!(f, "deleted"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Object-safe view of a [`Resource`] with its state type erased
#[async_trait::async_trait]
pub trait DynResource: Send + Sync {
    fn resource_name(&self) -> &str;

    /// Actual, expected, apply, render
    async fn reconcile(&mut self, cluster: &mut Cluster) -> Result<Outcome, ControllerError>;

    /// Actual, then delete if the object exists
    async fn destroy(&mut self, cluster: &Cluster) -> Result<Outcome, ControllerError>;
}

#[async_trait::async_trait]
impl<R: Resource> DynResource for R {
    fn resource_name(&self) -> &str {
        self.name()
    }

    async fn reconcile(&mut self, cluster: &mut Cluster) -> Result<Outcome, ControllerError> {
        let actual = self.actual(cluster).await?;
        let expected = self.expected(cluster)?;
        let unchanged = is_equal(&actual, &expected);
        debug!(resource = %self.name(), ?actual, ?expected, unchanged, "Computed states");

        let applied = self.apply(&actual, &expected, cluster).await?;
        self.render(&applied, cluster)?;

        if unchanged {
            return Ok(Outcome::Unchanged);
        }

        let tags = BTreeMap::from([("cluster".to_string(), cluster.name.clone())]);
        self.tag(&tags).await?;
        info!(resource = %self.name(), "Resource converged");
        Ok(Outcome::Created)
    }

    async fn destroy(&mut self, cluster: &Cluster) -> Result<Outcome, ControllerError> {
        let actual = self.actual(cluster).await?;
        if !actual.exists() {
            debug!(resource = %self.name(), "Nothing to delete");
            return Ok(Outcome::Absent);
        }

        self.delete(&actual, cluster).await?;
        Ok(Outcome::Deleted)
    }
}
