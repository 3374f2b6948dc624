//! Scoped access to the session for the UI layer.
//!
//! `SessionProvider` owns the [`SessionClient`] for the lifetime of the UI
//! scope and hands out cheap [`SessionHandle`] capabilities. A handle used
//! after its provider is gone panics: that is a wiring defect in the
//! embedding application, not a runtime condition, and it must not be
//! papered over with silently-default state.

use std::sync::{Arc, Weak};

use anyhow::Result;
use tokio::sync::watch;

use crate::api::AuthApi;
use crate::config::Config;

use super::session::{AuthOutcome, SessionClient};
use super::store::{SessionState, User};
use super::strategy::{BearerTokenStrategy, CookieStrategy, CredentialMode, CredentialStrategy};

/// Owns the session client; UI components only ever hold handles.
pub struct SessionProvider {
    client: Arc<SessionClient>,
}

impl SessionProvider {
    /// Build the HTTP client, credential strategy, and store from
    /// configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let api = AuthApi::new(config.service_url.clone(), config.mode.uses_cookie_jar())?;
        let strategy: Box<dyn CredentialStrategy> = match config.mode {
            CredentialMode::Cookie => Box::new(CookieStrategy),
            CredentialMode::Bearer => Box::new(BearerTokenStrategy::new(config.token_vault()?)),
        };
        Ok(Self::with_client(SessionClient::new(api, strategy)))
    }

    /// Wrap an already-built client, e.g. one using a custom strategy.
    pub fn with_client(client: SessionClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Capability for UI components. Clones freely.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            client: Arc::downgrade(&self.client),
        }
    }

    pub fn client(&self) -> &SessionClient {
        &self.client
    }
}

/// What the UI gets: state reads plus the four session operations.
#[derive(Clone)]
pub struct SessionHandle {
    client: Weak<SessionClient>,
}

impl SessionHandle {
    /// Panics if the provider has been dropped; see the module docs.
    fn client(&self) -> Arc<SessionClient> {
        self.client
            .upgrade()
            .expect("session handle used after its SessionProvider was dropped")
    }

    pub fn user(&self) -> Option<User> {
        self.client().store().snapshot().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.client().store().snapshot().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.client().store().snapshot().is_loading
    }

    pub fn snapshot(&self) -> SessionState {
        self.client().store().snapshot()
    }

    /// Change notifications for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.client().store().subscribe()
    }

    pub async fn check_auth_status(&self) -> bool {
        self.client().check_auth_status().await
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthOutcome {
        self.client().login(username, password).await
    }

    pub async fn register(&self, username: &str, password: &str) -> AuthOutcome {
        self.client().register(username, password).await
    }

    pub fn logout(&self) {
        self.client().logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SessionProvider {
        let api = AuthApi::new("http://localhost:8001", true).expect("client builds");
        SessionProvider::with_client(SessionClient::new(api, Box::new(CookieStrategy)))
    }

    #[test]
    fn test_handle_reads_store_state() {
        let provider = provider();
        let handle = provider.handle();

        assert!(handle.is_loading());
        assert!(!handle.is_authenticated());
        assert!(handle.user().is_none());
    }

    #[test]
    fn test_handles_clone_and_share_one_store() {
        let provider = provider();
        let a = provider.handle();
        let b = a.clone();

        provider.client().store().set_loading(false);
        assert!(!a.is_loading());
        assert!(!b.is_loading());
    }

    #[test]
    #[should_panic(expected = "session handle used after its SessionProvider was dropped")]
    fn test_handle_outliving_provider_panics() {
        let provider = provider();
        let handle = provider.handle();
        drop(provider);

        let _ = handle.is_authenticated();
    }
}
