//! Kubeconfig retrieval errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while retrieving the kubeconfig
#[derive(Debug, Error)]
pub enum KubeconfigError {
    /// The home directory could not be determined
    #[error("Unable to determine home directory")]
    HomeDirectory,

    /// The cluster document lacks a field the retrieval needs
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading the private key failed
    #[error("Unable to read private key {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The private key could not be parsed, with or without a passphrase
    #[error("Unable to parse private key {path}: {reason}")]
    InvalidKey { path: PathBuf, reason: String },

    /// Reading the passphrase from the terminal failed
    #[error("Unable to read passphrase: {0}")]
    Prompt(String),

    /// TCP connection to the master failed
    #[error("Unable to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The server rejected the key
    #[error("Authentication failed for {user}@{address}")]
    Authentication { user: String, address: String },

    /// The remote kubeconfig has not been written yet
    #[error("Remote file {0} does not exist")]
    RemoteFileMissing(String),

    /// SSH or SFTP protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    /// Local or remote I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking fetch task did not complete
    #[error("Fetch task failed: {0}")]
    Task(String),

    /// Every attempt failed while the cluster was still booting
    #[error("Timed out writing kubeconfig after {attempts} attempts: {last}")]
    Timeout { attempts: u32, last: String },
}

impl KubeconfigError {
    /// Whether the failure means the cluster is still booting
    ///
    /// Classification is by message so that SSH-library errors carrying the
    /// same wording are treated alike.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        let message = self.to_string().to_lowercase();
        message.contains("does not exist") || message.contains("connection refused")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_missing_remote_file_is_retryable() {
        let err = KubeconfigError::RemoteFileMissing("/root/.kube/config".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_connection_refused_is_retryable() {
        let err = KubeconfigError::Connect {
            address: "203.0.113.10:22".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_errors_are_fatal() {
        let auth = KubeconfigError::Authentication {
            user: "root".to_string(),
            address: "203.0.113.10:22".to_string(),
        };
        let timeout = KubeconfigError::Connect {
            address: "203.0.113.10:22".to_string(),
            source: io::Error::new(io::ErrorKind::TimedOut, "timed out"),
        };
        assert!(!auth.is_retryable());
        assert!(!timeout.is_retryable());
    }
}
