//! Session state, credential strategies, and the verification protocol.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for "who is logged in"
//! - `SessionClient`: status check, login, registration, logout
//! - `CredentialStrategy`: cookie-jar vs persisted bearer-token sessions
//! - `SessionProvider`/`SessionHandle`: scoped access for the UI layer

pub mod credentials;
pub mod provider;
pub mod session;
pub mod store;
pub mod strategy;

pub use credentials::TokenVault;
pub use provider::{SessionHandle, SessionProvider};
pub use session::{AuthOutcome, SessionClient};
pub use store::{SessionState, SessionStore, User};
pub use strategy::{BearerTokenStrategy, CookieStrategy, CredentialMode, CredentialStrategy};
