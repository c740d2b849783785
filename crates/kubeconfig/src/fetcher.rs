//! Remote kubeconfig fetch over SSH + SFTP

use crate::error::KubeconfigError;
use crate::key::KeyMaterial;
use crate::plan::RetrievalPlan;
use crate::retriever::FetchState;
use ssh2::{ErrorCode, Session};
use std::io::{ErrorKind, Read};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use tracing::debug;

/// SFTP status for a missing file (`LIBSSH2_FX_NO_SUCH_FILE`)
const SFTP_NO_SUCH_FILE: i32 = 2;

/// One blocking connect-authenticate-read of the remote kubeconfig
///
/// Implementations are called from a blocking task, once per attempt.
pub trait RemoteFetcher: Send + Sync {
    /// Fetch the remote file named by `plan`
    ///
    /// # Errors
    ///
    /// Returns an error if any of connect, authenticate or read fails.
    fn fetch(&self, plan: &RetrievalPlan, key: &KeyMaterial) -> Result<Vec<u8>, KubeconfigError>;
}

/// `ssh2`-backed fetcher
///
/// The host key is not verified; the master was created moments ago and its
/// key is not known yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshFetcher;

impl RemoteFetcher for SshFetcher {
    fn fetch(&self, plan: &RetrievalPlan, key: &KeyMaterial) -> Result<Vec<u8>, KubeconfigError> {
        debug!(state = %FetchState::Connecting, address = %plan.address);
        let tcp = TcpStream::connect(&plan.address).map_err(|source| {
            // Keep the classifier's wording regardless of platform message
            let source = if source.kind() == ErrorKind::ConnectionRefused {
                std::io::Error::new(ErrorKind::ConnectionRefused, "connection refused")
            } else {
                source
            };
            KubeconfigError::Connect {
                address: plan.address.clone(),
                source,
            }
        })?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;

        debug!(state = %FetchState::Authenticating, user = %plan.user);
        let auth_failed = || KubeconfigError::Authentication {
            user: plan.user.clone(),
            address: plan.address.clone(),
        };
        session
            .userauth_pubkey_memory(
                &plan.user,
                None,
                &key.private_key,
                key.passphrase.as_deref(),
            )
            .map_err(|e| {
                debug!(error = %e, "Public key authentication rejected");
                auth_failed()
            })?;
        if !session.authenticated() {
            return Err(auth_failed());
        }

        debug!(state = %FetchState::Fetching, path = %plan.remote_path);
        let sftp = session.sftp()?;
        let mut remote = sftp
            .open(Path::new(&plan.remote_path))
            .map_err(|e| match e.code() {
                ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => {
                    KubeconfigError::RemoteFileMissing(plan.remote_path.clone())
                }
                _ => KubeconfigError::Ssh(e),
            })?;

        let mut contents = Vec::new();
        remote
            .read_to_end(&mut contents)
            .map_err(|source| KubeconfigError::Io {
                path: PathBuf::from(&plan.remote_path),
                source,
            })?;

        Ok(contents)
    }
}
