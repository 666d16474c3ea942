//! Access token refresh
//!
//! [`CredentialRefresher`] checks a [`CredentialRecord`] against the expiry
//! buffer and, only when it is stale, trades the refresh token for a new
//! access token through a [`TokenExchange`]. One attempt is made; wrap the
//! exchange in your own implementation if you need retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use crate::Result;
use crate::config::Settings;
use crate::error::Error;
use super::credentials::CredentialRecord;
use super::expiry::{is_expired, now_secs};

/// Successful response from the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the new access token in seconds
    pub expires_in: i64,
}

/// Token refresh request
#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

/// Remote side of a refresh: refresh token in, new tokens out.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse>;
}

/// [`TokenExchange`] over HTTP against the OAuth token endpoint
#[derive(Clone)]
pub struct HttpTokenClient {
    token_url: Url,
    http_client: Client,
}

impl HttpTokenClient {
    pub fn new(token_url: Url) -> Self {
        Self {
            token_url,
            http_client: Client::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.token_url.clone())
    }
}

#[async_trait]
impl TokenExchange for HttpTokenClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let request = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token,
        };

        let response = self.http_client
            .post(self.token_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TokenRefreshFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RefreshHttp {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::TokenRefreshFailed(e.to_string()))
    }
}

/// Refreshes credentials that are expired or about to expire
pub struct CredentialRefresher<E = HttpTokenClient> {
    exchange: E,
}

impl CredentialRefresher<HttpTokenClient> {
    /// Create a refresher talking to the configured token endpoint
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(HttpTokenClient::from_settings(settings))
    }
}

impl<E: TokenExchange> CredentialRefresher<E> {
    pub fn new(exchange: E) -> Self {
        Self { exchange }
    }

    /// Return `record` untouched if still fresh, otherwise refreshed credentials
    pub async fn refresh_if_needed(&self, record: CredentialRecord) -> Result<CredentialRecord> {
        let expires_at = record.expires_at_secs()?;

        if !is_expired(expires_at) {
            tracing::debug!(expires_at, "Access token still valid, skipping refresh");
            return Ok(record);
        }

        tracing::info!(expires_at, "Access token expired or expiring soon, refreshing...");
        let token = match self.exchange.refresh(&record.refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                return Err(e);
            }
        };

        // Preserve the refresh token if not returned in response
        let refresh_token = token.refresh_token.unwrap_or(record.refresh_token);
        let expires_at = now_secs().saturating_add(token.expires_in);

        Ok(CredentialRecord {
            access_token: token.access_token,
            refresh_token,
            expires_at: expires_at.to_string(),
        })
    }
}

/// Fake token exchange for testing.
#[cfg(test)]
pub(crate) struct FakeTokenExchange {
    response: std::sync::Mutex<Option<Result<TokenResponse>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FakeTokenExchange {
    pub fn new(response: Result<TokenResponse>) -> Self {
        Self {
            response: std::sync::Mutex::new(Some(response)),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl TokenExchange for FakeTokenExchange {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(Error::TokenRefreshFailed("No more fake responses".to_string())))
    }
}
