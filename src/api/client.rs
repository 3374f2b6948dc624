//! HTTP client for the remote authentication service.
//!
//! One method per endpoint of the fixed contract: session check, login,
//! registration, logout. Responses are parsed into domain types here;
//! everything above this layer works with [`User`] and [`SessionGrant`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::auth::User;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Endpoint paths, relative to the service base URL.
const CHECK_PATH: &str = "/auth";
const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const LOGOUT_PATH: &str = "/auth/logout";

/// A successful login or registration response.
///
/// `token` is only issued by services running in bearer mode; cookie-mode
/// deployments establish the session via `Set-Cookie` instead.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub user: User,
    pub token: Option<String>,
}

/// Client for the remote authentication service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthApi {
    client: Client,
    base_url: String,
}

impl AuthApi {
    /// Create a new API client for the given base URL.
    ///
    /// `use_cookie_jar` must be set for cookie-mode deployments so the
    /// session cookie issued at login rides along on later requests.
    pub fn new(base_url: impl Into<String>, use_cookie_jar: bool) -> Result<Self, ApiError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        if use_cookie_jar {
            builder = builder.cookie_store(true);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Verify the current session via `GET /auth`.
    ///
    /// Returns the authenticated user on HTTP 200 with a `user` body.
    /// Any other status maps to [`ApiError::Rejected`]; a 200 body without
    /// a `user` object maps to [`ApiError::Malformed`].
    pub async fn check_session(&self, bearer: Option<&str>) -> Result<User, ApiError> {
        let mut request = self.client.get(self.url(CHECK_PATH));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        let envelope: SessionEnvelope = serde_json::from_str(&text)
            .map_err(|e| ApiError::Malformed(format!("session check body: {e}")))?;

        envelope
            .user
            .map(UserPayload::into_user)
            .ok_or_else(|| ApiError::Malformed("session check body missing user".to_string()))
    }

    /// Sign in via `POST /auth/login`. Success is HTTP 200, exactly.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionGrant, ApiError> {
        self.grant(LOGIN_PATH, StatusCode::OK, username, password)
            .await
    }

    /// Create an account via `POST /auth/register`. Success is HTTP 201,
    /// exactly; a 200 from this endpoint is not a success. The asymmetry
    /// with login is part of the service contract.
    pub async fn register(&self, username: &str, password: &str) -> Result<SessionGrant, ApiError> {
        self.grant(REGISTER_PATH, StatusCode::CREATED, username, password)
            .await
    }

    /// Ask the service to invalidate the session via `POST /auth/logout`.
    /// The response status is ignored.
    pub async fn logout(&self, bearer: Option<&str>) -> Result<(), ApiError> {
        let mut request = self.client.post(self.url(LOGOUT_PATH));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        debug!(status = %response.status(), "logout acknowledged");
        Ok(())
    }

    async fn grant(
        &self,
        path: &str,
        expect: StatusCode,
        username: &str,
        password: &str,
    ) -> Result<SessionGrant, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });

        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != expect {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        let envelope: GrantEnvelope = serde_json::from_str(&text)
            .map_err(|e| ApiError::Malformed(format!("grant body: {e}")))?;

        let user = envelope
            .user
            .ok_or_else(|| ApiError::Malformed("grant body missing user".to_string()))?;

        Ok(SessionGrant {
            user: user.into_user(),
            token: envelope.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// Internal wire types for parsing

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct GrantEnvelope {
    user: Option<UserPayload>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: i64,
    username: String,
}

impl UserPayload {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_envelope() {
        let json = r#"{"user":{"id":1,"username":"alice"}}"#;
        let envelope: SessionEnvelope = serde_json::from_str(json).expect("valid session body");
        let user = envelope.user.expect("user present").into_user();
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn test_parse_session_envelope_without_user() {
        let envelope: SessionEnvelope = serde_json::from_str("{}").expect("empty object parses");
        assert!(envelope.user.is_none());
    }

    #[test]
    fn test_parse_grant_envelope_with_and_without_token() {
        let json = r#"{"user":{"id":7,"username":"bob"},"token":"tok-123"}"#;
        let envelope: GrantEnvelope = serde_json::from_str(json).expect("valid grant body");
        assert_eq!(envelope.token.as_deref(), Some("tok-123"));

        // Cookie-mode services omit the token field entirely
        let json = r#"{"user":{"id":7,"username":"bob"}}"#;
        let envelope: GrantEnvelope = serde_json::from_str(json).expect("valid grant body");
        assert!(envelope.token.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = AuthApi::new("http://localhost:8001/", false).expect("client builds");
        assert_eq!(api.url(CHECK_PATH), "http://localhost:8001/auth");
    }
}
