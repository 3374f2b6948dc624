//! Durable credential storage for bearer-token sessions.
//!
//! The vault keeps the opaque bearer token issued at login so a session
//! survives a process restart. Two backends: a small JSON file in the
//! application data directory, or the OS keychain via `keyring`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Storage key the credential is kept under, in both backends.
pub const TOKEN_STORAGE_KEY: &str = "auth_token";

/// Credential file name inside the data directory.
const CREDENTIAL_FILE: &str = "credential.json";

/// On-disk shape of the persisted credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    auth_token: String,
    saved_at: DateTime<Utc>,
}

/// Durable storage for the bearer credential.
pub enum TokenVault {
    File { dir: PathBuf },
    Keychain { service: String },
}

impl TokenVault {
    /// Vault backed by a JSON file under `dir`.
    pub fn file(dir: PathBuf) -> Self {
        Self::File { dir }
    }

    /// Vault backed by the OS keychain entry for `service`.
    pub fn keychain(service: impl Into<String>) -> Self {
        Self::Keychain {
            service: service.into(),
        }
    }

    /// Read back the persisted token, if any.
    ///
    /// An unreadable or unparsable credential is treated as absent; the
    /// caller falls back to an interactive login.
    pub fn load(&self) -> Option<String> {
        match self {
            Self::File { dir } => {
                let path = dir.join(CREDENTIAL_FILE);
                if !path.exists() {
                    return None;
                }
                let contents = std::fs::read_to_string(&path).ok()?;
                match serde_json::from_str::<StoredCredential>(&contents) {
                    Ok(stored) => Some(stored.auth_token),
                    Err(e) => {
                        debug!(error = %e, "ignoring unparsable credential file");
                        None
                    }
                }
            }
            Self::Keychain { service } => Entry::new(service, TOKEN_STORAGE_KEY)
                .ok()?
                .get_password()
                .ok(),
        }
    }

    /// Persist the token, replacing any previous credential.
    pub fn store(&self, token: &str) -> Result<()> {
        match self {
            Self::File { dir } => {
                std::fs::create_dir_all(dir).context("Failed to create credential directory")?;
                let stored = StoredCredential {
                    auth_token: token.to_string(),
                    saved_at: Utc::now(),
                };
                let contents = serde_json::to_string_pretty(&stored)?;
                std::fs::write(dir.join(CREDENTIAL_FILE), contents)
                    .context("Failed to write credential file")?;
                Ok(())
            }
            Self::Keychain { service } => {
                let entry = Entry::new(service, TOKEN_STORAGE_KEY)
                    .context("Failed to create keyring entry")?;
                entry
                    .set_password(token)
                    .context("Failed to store token in keychain")?;
                Ok(())
            }
        }
    }

    /// Remove the persisted token. Removing an absent credential is not
    /// an error.
    pub fn clear(&self) -> Result<()> {
        match self {
            Self::File { dir } => {
                let path = dir.join(CREDENTIAL_FILE);
                if path.exists() {
                    std::fs::remove_file(path).context("Failed to remove credential file")?;
                }
                Ok(())
            }
            Self::Keychain { service } => {
                let entry = Entry::new(service, TOKEN_STORAGE_KEY)
                    .context("Failed to create keyring entry")?;
                match entry.delete_credential() {
                    Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                    Err(e) => Err(e).context("Failed to delete token from keychain"),
                }
            }
        }
    }
}
