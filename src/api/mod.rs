//! HTTP layer for the remote authentication service.
//!
//! This module provides the `AuthApi` endpoint client and the `ApiError`
//! taxonomy. Requests carry either an ambient cookie-jar session or a
//! bearer token, depending on the configured credential mode.

pub mod client;
pub mod error;

pub use client::{AuthApi, SessionGrant};
pub use error::ApiError;
