//! Authentication module for OAuth credential management
//!
//! This module provides:
//! - Expiry evaluation with a 5 minute safety buffer
//! - Refresh-token exchange against the OAuth token endpoint
//! - Credential file storage and retrieval
//! - [`setup_credentials`], which ties the three together

mod credentials;
mod expiry;
mod refresher;

use std::path::Path;
use crate::Result;

pub use credentials::{
    ClaudeAiOauth, CredentialRecord, PersistedCredentials, OAUTH_SCOPES,
    delete_credentials, load_credentials, persist,
};
pub use expiry::{EXPIRY_BUFFER_SECS, is_expired, is_expired_at, now_secs};
pub use refresher::{CredentialRefresher, HttpTokenClient, TokenExchange, TokenResponse};

/// Refresh `record` if it is stale, then write it to `path`
///
/// Nothing is written when the refresh fails. Returns the credentials that
/// were persisted.
pub async fn setup_credentials<E: TokenExchange>(
    record: CredentialRecord,
    path: &Path,
    refresher: &CredentialRefresher<E>,
) -> Result<CredentialRecord> {
    let record = refresher.refresh_if_needed(record).await?;
    persist(&record, path)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use super::refresher::FakeTokenExchange;
    use serde_json::json;
    use tempfile::TempDir;
    use url::Url;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_expired_credentials_are_refreshed_and_saved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh-access",
                "refresh_token": "fresh-refresh",
                "expires_in": 28800
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".claude").join(".credentials.json");
        let url = Url::parse(&format!("{}/api/oauth/token", server.uri())).unwrap();
        let refresher = CredentialRefresher::new(HttpTokenClient::new(url));
        let record = CredentialRecord::new("stale", "old-refresh", (now_secs() - 10).to_string());

        setup_credentials(record, &path, &refresher).await.unwrap();

        let saved = read_json(&path);
        let oauth = &saved["claudeAiOauth"];
        assert_eq!(oauth["accessToken"], "fresh-access");
        assert_eq!(oauth["refreshToken"], "fresh-refresh");
        assert!(oauth["expiresAt"].as_i64().unwrap() > now_secs());
        assert_eq!(oauth["scopes"], json!(["user:inference", "user:profile"]));
    }

    #[tokio::test]
    async fn test_second_call_replaces_first() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".credentials.json");
        let refresher = CredentialRefresher::new(FakeTokenExchange::new(Err(
            Error::TokenRefreshFailed("unused".into()),
        )));
        let later = now_secs() + 3600;

        setup_credentials(CredentialRecord::new("one", "r1", later.to_string()), &path, &refresher)
            .await
            .unwrap();
        setup_credentials(
            CredentialRecord::new("two", "r2", (later + 1).to_string()),
            &path,
            &refresher,
        )
        .await
        .unwrap();

        assert_eq!(
            read_json(&path),
            json!({
                "claudeAiOauth": {
                    "accessToken": "two",
                    "refreshToken": "r2",
                    "expiresAt": later + 1,
                    "scopes": ["user:inference", "user:profile"]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".credentials.json");
        std::fs::write(&path, "previous").unwrap();

        let refresher = CredentialRefresher::new(FakeTokenExchange::new(Err(Error::RefreshHttp {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        })));
        let record = CredentialRecord::new("stale", "r", (now_secs() - 10).to_string());

        let err = setup_credentials(record, &path, &refresher).await.unwrap_err();

        assert!(matches!(err, Error::RefreshHttp { status: 500, .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }

    #[tokio::test]
    async fn test_missing_directory_is_created() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("home").join(".claude");
        let path = dir.join(".credentials.json");
        assert!(!dir.exists());

        let refresher = CredentialRefresher::new(FakeTokenExchange::new(Err(
            Error::TokenRefreshFailed("unused".into()),
        )));
        let record = CredentialRecord::new("a", "r", (now_secs() + 3600).to_string());
        setup_credentials(record, &path, &refresher).await.unwrap();

        assert!(dir.is_dir());
        assert!(path.is_file());
    }
}
