//! Latchkey - client-side session reconciliation for a remote
//! authentication service.
//!
//! The library keeps a single answer to "am I logged in, and as whom",
//! synchronized with a remote service over a fixed HTTP contract. A UI
//! layer consumes it through [`SessionProvider`]/[`SessionHandle`] and
//! re-renders from published [`SessionState`] snapshots; network failures
//! never cross that boundary as errors.
//!
//! Two credential designs share one state machine: cookie-jar sessions
//! owned entirely by the service, and bearer-token sessions persisted
//! locally so they survive a process restart.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiError, AuthApi};
pub use auth::{
    AuthOutcome, CredentialMode, SessionClient, SessionHandle, SessionProvider, SessionState,
    SessionStore, TokenVault, User,
};
pub use config::Config;
