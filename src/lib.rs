//! claude-credentials - keeps the local Claude OAuth credentials file fresh
//!
//! This library refreshes an access token that is expired or about to
//! expire and writes the result to `~/.claude/.credentials.json`.

pub mod auth;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{Error, Result};
