//! Kubeconfig Retrieval
//!
//! Fetches the kubeconfig generated on the cluster master once provisioning is
//! done. The master is usually still booting when the reconciler finishes, so
//! the connect-authenticate-fetch sequence is retried while the failure says
//! the file "does not exist" yet or the connection was "refused".
//!
//! The fetched bytes are appended to `<home>/.kube/config`, which is created
//! with mode `0600` if absent and never truncated.

pub mod error;
pub mod fetcher;
pub mod key;
pub mod local;
pub mod plan;
pub mod prompt;
pub mod retriever;

pub use error::KubeconfigError;
pub use fetcher::{RemoteFetcher, SshFetcher};
pub use key::{KeyFormat, KeyMaterial, detect_format, load_key};
pub use plan::RetrievalPlan;
pub use prompt::{PassphrasePrompt, TerminalPrompt};
pub use retriever::{CredentialRetriever, FetchState, RETRY_ATTEMPTS, RETRY_SLEEP};

use cluster_model::Cluster;
use std::path::PathBuf;
use std::sync::Arc;

/// Retrieve the kubeconfig for `cluster` with the default SSH fetcher and
/// retry budget, prompting on the terminal if the key needs a passphrase.
///
/// Returns the local path the kubeconfig was appended to.
pub async fn retrieve_kubeconfig(cluster: &Cluster) -> Result<PathBuf, KubeconfigError> {
    let plan = RetrievalPlan::for_cluster(cluster)?;
    let key = load_key(&plan.private_key_path, &TerminalPrompt)?;
    CredentialRetriever::new(Arc::new(SshFetcher))
        .retrieve(&plan, &key)
        .await
}
