//! Bearer-token verification.
//!
//! The API never inspects tokens itself. An [`IdentityProvider`] turns a raw
//! bearer token into a [`Principal`] or rejects it.
//!
//! - [`SupabaseIdentityProvider`]: asks the hosted auth service who the token
//!   belongs to (`GET {url}/auth/v1/user`)
//! - [`StaticIdentityProvider`]: fixed token table for tests and local runs

use async_trait::async_trait;
use eventify_core::{Principal, UserId};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Token verification failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Token is malformed, expired or revoked.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The provider could not be reached or answered unexpectedly.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves bearer tokens to verified principals.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify `token` and return who it belongs to.
    ///
    /// # Errors
    ///
    /// [`IdentityError::InvalidToken`] when the token is rejected,
    /// [`IdentityError::Unavailable`] when the provider cannot answer.
    async fn verify(&self, token: &str) -> Result<Principal, IdentityError>;
}

/// Hosted auth provider (Supabase GoTrue).
#[derive(Clone, Debug)]
pub struct SupabaseIdentityProvider {
    base_url: String,
    api_key: String,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
}

impl SupabaseIdentityProvider {
    /// Create a provider for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http_client,
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Principal, IdentityError> {
        let response = self
            .http_client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(IdentityError::InvalidToken);
            }
            status => {
                let error_body = response.text().await.unwrap_or_default();
                tracing::error!(%status, "Identity lookup failed: {}", error_body);
                return Err(IdentityError::Unavailable(format!(
                    "unexpected status {status}"
                )));
            }
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Principal {
            user_id: UserId::from_uuid(user.id),
            email: user.email,
        })
    }
}

/// Fixed token table.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, Principal>,
}

impl StaticIdentityProvider {
    /// Empty table; every token is rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `principal`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Principal, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider() {
        let principal = Principal {
            user_id: UserId::new(),
            email: Some("seeker@example.com".to_string()),
        };
        let provider = StaticIdentityProvider::new().with_token("good", principal.clone());

        assert_eq!(provider.verify("good").await.unwrap(), principal);
        assert_eq!(
            provider.verify("bad").await,
            Err(IdentityError::InvalidToken)
        );
    }

    #[test]
    fn test_supabase_base_url_is_normalized() {
        let provider =
            SupabaseIdentityProvider::new("https://abc.supabase.co/", "key", Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.base_url, "https://abc.supabase.co");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        let provider =
            SupabaseIdentityProvider::new("http://127.0.0.1:9", "key", Duration::from_millis(200))
                .unwrap();
        let err = provider.verify("token").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_)));
    }
}
