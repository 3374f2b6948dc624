//! Session verification and mutation against the remote service.
//!
//! `SessionClient` drives the shared state machine: `Loading` at startup,
//! then `Authenticated` or `Anonymous` after the first check, with login,
//! registration, and logout moving between the two. Every network outcome
//! is absorbed here; callers only ever see booleans, [`AuthOutcome`], and
//! the mutated [`SessionStore`].

use tracing::{debug, error, warn};

use crate::api::{ApiError, AuthApi, SessionGrant};

use super::store::SessionStore;
use super::strategy::CredentialStrategy;

/// Message shown when login fails without a server-provided reason.
const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

/// Message shown when registration fails without a server-provided reason.
const REGISTER_FALLBACK_MESSAGE: &str = "Registration failed";

/// Outcome of a login or registration attempt.
///
/// A rejection is an ordinary result, not an error: it carries the message
/// the UI should show inline, and the session state is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Rejected { message: String },
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    fn from_error(err: &ApiError, fallback: &str) -> Self {
        let message = err
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        Self::Rejected { message }
    }
}

/// Verification/mutation protocol over one [`SessionStore`].
pub struct SessionClient {
    api: AuthApi,
    store: SessionStore,
    strategy: Box<dyn CredentialStrategy>,
}

impl SessionClient {
    /// Build a client over the given API and credential strategy.
    ///
    /// In bearer mode the store's token is pre-populated by a synchronous
    /// read of the vault, so a persisted session is visible before the
    /// first network check.
    pub fn new(api: AuthApi, strategy: Box<dyn CredentialStrategy>) -> Self {
        let store = SessionStore::new();
        if strategy.mode().requires_token() {
            store.set_token(strategy.restore());
        }
        Self {
            api,
            store,
            strategy,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Verify the current session with the remote service.
    ///
    /// Never fails toward the caller: every failure path (rejection,
    /// malformed body, transport error) resolves to `false` with the store
    /// cleared and, in bearer mode, the persisted credential discarded as
    /// revoked. This runs as silent background re-validation; surfacing an
    /// error here would crash unrelated UI.
    ///
    /// Concurrent calls interleave at the network await point; each
    /// response still applies as one atomic transition, and the last
    /// response to arrive wins.
    pub async fn check_auth_status(&self) -> bool {
        let bearer = self.store.token().or_else(|| self.strategy.restore());

        if self.strategy.mode().requires_token() && bearer.is_none() {
            debug!("no stored credential, skipping session check");
            self.store.clear();
            return false;
        }

        match self.api.check_session(bearer.as_deref()).await {
            Ok(user) => {
                debug!(user = %user.username, "session check succeeded");
                if self.strategy.mode().requires_token() {
                    self.store.set_token(bearer);
                }
                self.store.set_user(user);
                true
            }
            Err(err) => {
                debug!(error = %err, "session check failed");
                self.strategy.discard();
                self.store.clear();
                false
            }
        }
    }

    /// Sign in. On success the store reflects the new identity; on
    /// rejection the store is untouched and the message is suitable for
    /// inline display.
    pub async fn login(&self, username: &str, password: &str) -> AuthOutcome {
        match self.api.login(username, password).await {
            Ok(grant) => self.establish(grant, LOGIN_FALLBACK_MESSAGE),
            Err(err) => {
                Self::report(&err, "login");
                AuthOutcome::from_error(&err, LOGIN_FALLBACK_MESSAGE)
            }
        }
    }

    /// Create an account and sign in. Same contract as [`login`], against
    /// the registration endpoint.
    ///
    /// [`login`]: Self::login
    pub async fn register(&self, username: &str, password: &str) -> AuthOutcome {
        match self.api.register(username, password).await {
            Ok(grant) => self.establish(grant, REGISTER_FALLBACK_MESSAGE),
            Err(err) => {
                Self::report(&err, "register");
                AuthOutcome::from_error(&err, REGISTER_FALLBACK_MESSAGE)
            }
        }
    }

    /// Sign out, local-first: the store is cleared and the persisted
    /// credential discarded before the remote service hears anything. The
    /// remote invalidation is a detached best-effort call whose result is
    /// observed only for logging; it never blocks or rolls back the local
    /// clear.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn logout(&self) {
        let bearer = self.store.token();
        self.strategy.discard();
        self.store.clear();

        let api = self.api.clone();
        tokio::spawn(async move {
            if let Err(err) = api.logout(bearer.as_deref()).await {
                warn!(error = %err, "logout request failed");
            }
        });
    }

    fn establish(&self, grant: SessionGrant, fallback: &str) -> AuthOutcome {
        if self.strategy.mode().requires_token() {
            let Some(token) = grant.token else {
                warn!("grant response carried no token in bearer mode");
                return AuthOutcome::Rejected {
                    message: fallback.to_string(),
                };
            };
            // The durable copy must exist before the state flips to
            // authenticated; a session we cannot re-verify after restart
            // is not established.
            if let Err(err) = self.strategy.persist(&token) {
                error!(error = %err, "failed to persist credential");
                return AuthOutcome::Rejected {
                    message: fallback.to_string(),
                };
            }
            self.store.set_token(Some(token));
        }

        self.store.set_user(grant.user);
        AuthOutcome::Success
    }

    fn report(err: &ApiError, operation: &str) {
        match err {
            ApiError::Transport(_) => error!(error = %err, operation, "auth request failed"),
            _ => debug!(error = %err, operation, "auth request rejected"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
