//! Configuration management
//!
//! The core takes its token endpoint and target path from [`Settings`] rather
//! than reading the environment, so tests can point both at temporary places.

use std::path::PathBuf;
use url::Url;
use crate::Result;
use crate::error::Error;

/// OAuth token endpoint used to exchange a refresh token
pub const DEFAULT_TOKEN_URL: &str = "https://claude.ai/api/oauth/token";

/// Credentials file name inside the Claude directory
const CREDENTIALS_FILE: &str = ".credentials.json";

/// Where to refresh tokens and where to write the result
#[derive(Debug, Clone)]
pub struct Settings {
    /// Token endpoint for the refresh exchange
    pub token_url: Url,

    /// Target credentials file
    pub credentials_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            credentials_path: default_credentials_path(),
        }
    }
}

impl Settings {
    /// Override the token endpoint, validating it as a URL
    pub fn with_token_url(mut self, token_url: &str) -> Result<Self> {
        self.token_url = Url::parse(token_url)
            .map_err(|e| Error::Config(format!("Invalid token URL {:?}: {}", token_url, e)))?;
        Ok(self)
    }

    /// Override the credentials file location
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }
}

fn default_token_url() -> Url {
    Url::parse(DEFAULT_TOKEN_URL).expect("DEFAULT_TOKEN_URL is a valid URL")
}

/// Get the Claude directory path (`~/.claude`)
pub fn claude_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude")
}

/// Get the default credentials file path
pub fn default_credentials_path() -> PathBuf {
    claude_dir().join(CREDENTIALS_FILE)
}
