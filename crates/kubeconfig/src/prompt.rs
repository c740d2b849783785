//! Passphrase input for encrypted private keys

use crate::error::KubeconfigError;
use dialoguer::Password;
use std::path::Path;

/// Source of key passphrases
pub trait PassphrasePrompt: Send + Sync {
    /// Ask for the passphrase of the key at `key_path`
    ///
    /// # Errors
    ///
    /// Returns an error if the passphrase cannot be read.
    fn passphrase(&self, key_path: &Path) -> Result<String, KubeconfigError>;
}

/// Reads the passphrase from the controlling terminal without echo
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl PassphrasePrompt for TerminalPrompt {
    fn passphrase(&self, key_path: &Path) -> Result<String, KubeconfigError> {
        Password::new()
            .with_prompt(format!("SSH Key Passphrase for {} [none]", key_path.display()))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| KubeconfigError::Prompt(e.to_string()))
    }
}
