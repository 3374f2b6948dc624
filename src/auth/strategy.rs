//! Credential attachment and storage strategies.
//!
//! The session state machine is shared between two credential designs;
//! only how the credential is carried and stored differs. `CookieStrategy`
//! leaves everything to the HTTP client's cookie jar and the remote
//! service. `BearerTokenStrategy` holds the token issued at login in a
//! [`TokenVault`] so it survives restarts.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::credentials::TokenVault;

/// Which credential design the client runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialMode {
    /// The cookie jar carries the session; nothing is stored locally.
    #[default]
    Cookie,
    /// A bearer token from the service, persisted across restarts.
    Bearer,
}

impl CredentialMode {
    /// Whether the HTTP client must be built with a cookie store.
    pub fn uses_cookie_jar(self) -> bool {
        matches!(self, Self::Cookie)
    }

    /// Whether a session check without a token can skip the network
    /// round trip entirely.
    pub fn requires_token(self) -> bool {
        matches!(self, Self::Bearer)
    }
}

impl std::str::FromStr for CredentialMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cookie" => Ok(Self::Cookie),
            "bearer" | "token" => Ok(Self::Bearer),
            other => bail!("Unknown credential mode: {other}"),
        }
    }
}

/// Seam between the shared state machine and the two credential designs.
pub trait CredentialStrategy: Send + Sync {
    fn mode(&self) -> CredentialMode;

    /// Credential persisted by an earlier process, if any.
    fn restore(&self) -> Option<String>;

    /// Persist a credential issued by login or registration.
    fn persist(&self, token: &str) -> Result<()>;

    /// Remove any persisted credential. Failure is logged, not surfaced:
    /// the in-memory session is already gone either way.
    fn discard(&self);
}

/// Cookie-jar sessions: the remote service owns the credential end to end.
pub struct CookieStrategy;

impl CredentialStrategy for CookieStrategy {
    fn mode(&self) -> CredentialMode {
        CredentialMode::Cookie
    }

    fn restore(&self) -> Option<String> {
        None
    }

    fn persist(&self, _token: &str) -> Result<()> {
        // The session landed in the cookie jar; nothing to keep here.
        Ok(())
    }

    fn discard(&self) {}
}

/// Bearer-token sessions persisted in a [`TokenVault`].
pub struct BearerTokenStrategy {
    vault: TokenVault,
}

impl BearerTokenStrategy {
    pub fn new(vault: TokenVault) -> Self {
        Self { vault }
    }
}

impl CredentialStrategy for BearerTokenStrategy {
    fn mode(&self) -> CredentialMode {
        CredentialMode::Bearer
    }

    fn restore(&self) -> Option<String> {
        self.vault.load()
    }

    fn persist(&self, token: &str) -> Result<()> {
        self.vault.store(token)
    }

    fn discard(&self) {
        if let Err(e) = self.vault.clear() {
            warn!(error = %e, "failed to remove persisted credential");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("cookie".parse::<CredentialMode>().unwrap(), CredentialMode::Cookie);
        assert_eq!("Bearer".parse::<CredentialMode>().unwrap(), CredentialMode::Bearer);
        assert_eq!("token".parse::<CredentialMode>().unwrap(), CredentialMode::Bearer);
        assert!("jwt".parse::<CredentialMode>().is_err());
    }

    #[test]
    fn test_cookie_strategy_holds_nothing() {
        let strategy = CookieStrategy;
        assert_eq!(strategy.restore(), None);
        strategy.persist("tok-123").expect("no-op persist");
        strategy.discard();
        assert_eq!(strategy.restore(), None);
    }

    #[test]
    fn test_bearer_strategy_round_trips_through_vault() {
        let dir = TempDir::new().expect("temp dir");
        let strategy = BearerTokenStrategy::new(TokenVault::file(dir.path().to_path_buf()));

        assert_eq!(strategy.restore(), None);
        strategy.persist("tok-123").expect("persist succeeds");
        assert_eq!(strategy.restore().as_deref(), Some("tok-123"));

        strategy.discard();
        assert_eq!(strategy.restore(), None);
    }
}
