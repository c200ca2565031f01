//! Hosted auth service client.
//!
//! Credential handling is a passthrough: this binary never hashes a
//! password or mints a token. It forwards the form input to the hosted auth
//! service and keeps only the returned identity and access token in the
//! session.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use hearthside_core::{Email, EmailError, UserId};

use crate::config::BackendConfig;

/// Errors from the hosted auth service.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email address is structurally invalid (rejected locally, before
    /// the request is made).
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailTaken,

    /// The auth service rejected the password.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The auth service returned an unexpected error.
    #[error("auth service error: {0}")]
    Api(String),
}

/// A signed-in shopper as reported by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub name: Option<String>,
}

/// A successful sign-in or sign-up response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Bearer token for user-scoped API calls.
    pub access_token: String,
    pub user: AuthUser,
}

/// Error payload shape used by the auth service.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> String {
        self.message
            .or(self.error)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Client for the hosted auth service.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    /// Create a new auth service client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                api_key: config.api_key.expose_secret().to_string(),
            }),
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on a 401, or an error if the
    /// request itself fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = CredentialsBody {
            email,
            password,
            name: None,
        };
        let response = self.post("auth/sign-in", &body).await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::BAD_REQUEST => {
                Err(AuthError::InvalidCredentials)
            }
            status => Err(AuthError::Api(format!(
                "HTTP {status}: {}",
                read_error_message(response).await
            ))),
        }
    }

    /// Register a new shopper account.
    ///
    /// The email is validated locally for structure before the request goes
    /// out; everything else (uniqueness, password policy) is the auth
    /// service's call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` on a 409 and
    /// `AuthError::WeakPassword` on a 422.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email)?;

        let body = CredentialsBody {
            email: email.as_str(),
            password,
            name,
        };
        let response = self.post("auth/sign-up", &body).await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            reqwest::StatusCode::CONFLICT => Err(AuthError::EmailTaken),
            reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                Err(AuthError::WeakPassword(read_error_message(response).await))
            }
            status => Err(AuthError::Api(format!(
                "HTTP {status}: {}",
                read_error_message(response).await
            ))),
        }
    }

    /// Revoke an access token.
    ///
    /// Best-effort: the session is cleared locally regardless, so failures
    /// here only mean the token lives until it expires upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .post(format!("{}/auth/sign-out", self.inner.base_url))
            .header("apikey", &self.inner.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                read_error_message(response).await
            )))
        }
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        Ok(self
            .inner
            .client
            .post(format!("{}/{path}", self.inner.base_url))
            .header("apikey", &self.inner.api_key)
            .json(body)
            .send()
            .await?)
    }
}

/// Pull a human-readable message out of an error response body.
async fn read_error_message(response: reqwest::Response) -> String {
    match response.json::<ApiErrorBody>().await {
        Ok(body) => body.into_message(),
        Err(_) => "unknown error".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_session_deserialize() {
        let json = r#"{
            "access_token": "tok_abc123",
            "token_type": "bearer",
            "user": {"id": 5, "email": "shopper@example.com", "name": "Sam"}
        }"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.access_token, "tok_abc123");
        assert_eq!(session.user.id, UserId::new(5));
        assert_eq!(session.user.email.as_str(), "shopper@example.com");
        assert_eq!(session.user.name.as_deref(), Some("Sam"));
    }

    #[test]
    fn test_auth_user_name_optional() {
        let json = r#"{"id": 5, "email": "shopper@example.com"}"#;
        let user: AuthUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.name, None);
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body = ApiErrorBody {
            message: Some("password too short".to_string()),
            error: Some("weak_password".to_string()),
        };
        assert_eq!(body.into_message(), "password too short");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "invalid credentials");
        assert_eq!(
            AuthError::WeakPassword("too short".to_string()).to_string(),
            "weak password: too short"
        );
    }
}
