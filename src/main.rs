//! claude-credentials CLI entry point

use std::path::PathBuf;
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use claude_credentials::auth::{self, CredentialRecord, CredentialRefresher};
use claude_credentials::config::Settings;
use claude_credentials::ui;

#[derive(Parser)]
#[command(name = "claude-credentials")]
#[command(about = "Keep the Claude OAuth credentials file fresh")]
#[command(version)]
struct Cli {
    /// Credentials file to write (defaults to ~/.claude/.credentials.json)
    #[arg(long, global = true)]
    credentials_path: Option<PathBuf>,

    /// OAuth token endpoint used for refreshes
    #[arg(long, global = true)]
    token_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the token if needed and write the credentials file
    Setup {
        /// OAuth access token
        #[arg(long, env = "CLAUDE_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,

        /// OAuth refresh token
        #[arg(long, env = "CLAUDE_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: String,

        /// Access token expiry in Unix seconds
        #[arg(long, env = "CLAUDE_EXPIRES_AT")]
        expires_at: String,
    },

    /// Show the stored credentials' expiry
    Status,

    /// Remove the stored credentials file
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::default();
    if let Some(url) = &cli.token_url {
        settings = settings.with_token_url(url)?;
    }
    if let Some(path) = cli.credentials_path {
        settings = settings.with_credentials_path(path);
    }

    match cli.command {
        Commands::Setup { access_token, refresh_token, expires_at } => {
            let record = CredentialRecord::new(access_token, refresh_token, expires_at);
            run_setup(&settings, record).await?;
        }

        Commands::Status => {
            run_status(&settings)?;
        }

        Commands::Logout => {
            auth::delete_credentials(&settings.credentials_path)?;
            ui::print_success("Logged out successfully");
        }
    }

    Ok(())
}

async fn run_setup(settings: &Settings, record: CredentialRecord) -> Result<()> {
    ui::print_header("setup");

    let refresher = CredentialRefresher::from_settings(settings);
    let path = &settings.credentials_path;

    match auth::setup_credentials(record, path, &refresher).await {
        Ok(saved) => {
            if let Ok(expires_at) = saved.expires_at_secs() {
                ui::print_step(&format!("Access token valid until {}", format_expiry(expires_at)));
            }
            ui::print_success(&format!("Credentials saved to {}", path.display()));
            Ok(())
        }
        Err(e) => {
            ui::print_error(&format!("Failed to set up credentials: {}", e));
            Err(e.into())
        }
    }
}

fn run_status(settings: &Settings) -> Result<()> {
    let path = &settings.credentials_path;
    ui::print_header("status");
    ui::print_step(&format!("Credentials file: {}", path.display()));

    match auth::load_credentials(path)? {
        None => ui::print_warning("OAuth credentials: not set (run 'claude-credentials setup')"),
        Some(creds) => {
            let expires_at = creds.claude_ai_oauth.expires_at;
            let when = format_expiry(expires_at);
            if expires_at <= auth::now_secs() {
                ui::print_warning(&format!("Access token expired at {}", when));
            } else if auth::is_expired(expires_at) {
                ui::print_warning(&format!("Access token expires soon ({}), will refresh on next setup", when));
            } else {
                ui::print_success(&format!("Access token valid until {}", when));
            }
            ui::print_step(&format!("Scopes: {}", creds.claude_ai_oauth.scopes.join(", ")));
        }
    }

    Ok(())
}

fn format_expiry(expires_at: i64) -> String {
    DateTime::<Utc>::from_timestamp(expires_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| expires_at.to_string())
}
