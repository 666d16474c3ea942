//! Credential storage and management
//!
//! Writes OAuth tokens to `~/.claude/.credentials.json` in the layout the
//! Claude CLI reads:
//!
//! ```json
//! {
//!   "claudeAiOauth": {
//!     "accessToken": "...",
//!     "refreshToken": "...",
//!     "expiresAt": 1700000000,
//!     "scopes": ["user:inference", "user:profile"]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::Result;
use crate::error::Error;

/// Scopes recorded for every persisted credential
pub const OAUTH_SCOPES: [&str; 2] = ["user:inference", "user:profile"];

/// OAuth credentials as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// The access token for API requests
    pub access_token: String,

    /// The refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// Expiry as decimal Unix seconds
    pub expires_at: String,
}

impl CredentialRecord {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: expires_at.into(),
        }
    }

    /// Parse the expiry as Unix seconds
    pub fn expires_at_secs(&self) -> Result<i64> {
        self.expires_at
            .parse::<i64>()
            .map_err(|_| Error::MalformedExpiry(self.expires_at.clone()))
    }
}

/// On-disk credentials file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCredentials {
    #[serde(rename = "claudeAiOauth")]
    pub claude_ai_oauth: ClaudeAiOauth,
}

/// The `claudeAiOauth` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeAiOauth {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub scopes: Vec<String>,
}

impl PersistedCredentials {
    /// Build the on-disk form, fixing the scopes
    pub fn from_record(record: &CredentialRecord) -> Result<Self> {
        Ok(Self {
            claude_ai_oauth: ClaudeAiOauth {
                access_token: record.access_token.clone(),
                refresh_token: record.refresh_token.clone(),
                expires_at: record.expires_at_secs()?,
                scopes: OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
            },
        })
    }
}

/// Write credentials to `path`, replacing whatever was there
///
/// The JSON is written to a sibling temp file and renamed over the target, so
/// readers see either the old file or the new one.
pub fn persist(record: &CredentialRecord, path: &Path) -> Result<()> {
    let persisted = PersistedCredentials::from_record(record)?;

    // Create parent directory
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::storage(parent, e))?;
        }
    }

    let mut content = serde_json::to_string_pretty(&persisted)?;
    content.push('\n');

    let tmp = temp_path(path);
    if let Err(e) = write_private(&tmp, &content) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::storage(&tmp, e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::storage(path, e));
    }

    tracing::info!(path = %path.display(), "Saved credentials");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Load credentials from file
pub fn load_credentials(path: &Path) -> Result<Option<PersistedCredentials>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let creds: PersistedCredentials = serde_json::from_str(&content)?;
    Ok(Some(creds))
}

/// Delete stored credentials
pub fn delete_credentials(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| Error::storage(path, e))?;
    }
    Ok(())
}
