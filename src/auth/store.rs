//! Process-wide session state.
//!
//! `SessionStore` is the single source of truth for "who is logged in".
//! Every mutation is applied as one atomic transition and published over a
//! watch channel, so the UI layer can re-render from snapshots without ever
//! observing a half-applied state.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// An authenticated user as reported by the remote service.
///
/// Replaced wholesale on each successful verification, never mutated
/// field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Published session state.
///
/// Invariant: `is_authenticated == user.is_some()` in every reachable
/// state. `token` is set only in bearer mode, and only while a verified
/// session holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub token: Option<String>,
}

impl SessionState {
    /// State at process start: nothing known yet, a check is pending.
    fn starting() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }
}

/// Owner of the session state for the life of the process.
///
/// All writers funnel through the watch sender, one `send_modify` per
/// transition. Readers take snapshots or subscribe for change
/// notifications; they never hold a reference into the state.
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        Self {
            tx: watch::Sender::new(SessionState::starting()),
        }
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver that resolves whenever the state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// The in-memory bearer token, if one is held.
    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    /// Record a verified identity. In bearer mode the token must already
    /// be set (and persisted) before this is called.
    pub(crate) fn set_user(&self, user: User) {
        self.tx.send_modify(|state| {
            state.user = Some(user);
            state.is_authenticated = true;
            state.is_loading = false;
        });
    }

    pub(crate) fn set_token(&self, token: Option<String>) {
        self.tx.send_modify(|state| state.token = token);
    }

    /// Drop to signed-out: no user, no token, not loading.
    pub(crate) fn clear(&self) {
        self.tx.send_modify(|state| {
            state.user = None;
            state.is_authenticated = false;
            state.token = None;
            state.is_loading = false;
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.tx.send_modify(|state| state.is_loading = loading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(state: &SessionState) {
        assert_eq!(state.is_authenticated, state.user.is_some());
    }

    fn alice() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_initial_state_is_loading_and_anonymous() {
        let store = SessionStore::new();
        let state = store.snapshot();
        assert!(state.is_loading);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.token.is_none());
        assert_invariant(&state);
    }

    #[test]
    fn test_set_user_marks_authenticated_and_settles_loading() {
        let store = SessionStore::new();
        store.set_user(alice());

        let state = store.snapshot();
        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(state.user, Some(alice()));
        assert_invariant(&state);
    }

    #[test]
    fn test_clear_removes_user_and_token() {
        let store = SessionStore::new();
        store.set_token(Some("tok-123".to_string()));
        store.set_user(alice());
        store.clear();

        let state = store.snapshot();
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.token.is_none());
        assert!(!state.is_loading);
        assert_invariant(&state);
    }

    #[test]
    fn test_token_survives_user_replacement() {
        let store = SessionStore::new();
        store.set_token(Some("tok-123".to_string()));
        store.set_user(alice());
        store.set_user(User {
            id: 2,
            username: "bob".to_string(),
        });

        assert_eq!(store.token().as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn test_subscriber_sees_each_transition() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.set_user(alice());
        rx.changed().await.expect("sender alive");
        assert!(rx.borrow().is_authenticated);

        store.clear();
        rx.changed().await.expect("sender alive");
        assert!(!rx.borrow().is_authenticated);
    }
}
