//! Configuration management for SongSwipe.
//!
//! Configuration comes from environment variables, optionally pre-populated
//! from a `.env` file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Values are read once into [`Settings`] at start-up and the settings value
//! is handed to every component that needs it.

use dotenv;
use std::{env, path::PathBuf};

use crate::error::{Result, SwipeError};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives at:
/// - Linux: `~/.local/share/songswipe/.env`
/// - macOS: `~/Library/Application Support/songswipe/.env`
/// - Windows: `%LOCALAPPDATA%/songswipe/.env`
///
/// The parent directory is created when missing. A missing `.env` file is an
/// error, the caller decides whether that matters.
pub async fn load_env() -> std::result::Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Root of everything SongSwipe keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("songswipe");
    path
}

/// Runtime settings, resolved once from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Client id of the app registration at the provider.
    pub client_id: String,
    /// Callback URL registered with the provider.
    pub redirect_uri: String,
    /// Address the local callback listener binds to.
    pub server_addr: String,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    /// Lowercased approved emails. `None` admits every authenticated user.
    pub allowed_emails: Option<Vec<String>>,
}

impl Settings {
    /// Builds settings from the process environment.
    ///
    /// Only `SPOTIFY_API_AUTH_CLIENT_ID` is required, every other key falls
    /// back to a default pointing at Spotify and a listener on port 8888.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("SPOTIFY_API_AUTH_CLIENT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                SwipeError::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string())
            })?;

        Ok(Self {
            client_id,
            redirect_uri: var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            server_addr: var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            api_url: trim_url(var_or("SPOTIFY_API_URL", DEFAULT_API_URL)),
            auth_url: var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            allowed_emails: env::var("SONGSWIPE_ALLOWED_EMAILS")
                .ok()
                .and_then(|raw| parse_allow_list(&raw)),
        })
    }

    /// Settings pointing every endpoint at `base`. Used against mock servers.
    pub fn for_base_url(client_id: &str, base: &str) -> Self {
        let base = trim_url(base.to_string());
        Self {
            client_id: client_id.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            api_url: base.clone(),
            auth_url: format!("{base}/authorize"),
            token_url: format!("{base}/api/token"),
            allowed_emails: None,
        }
    }

    pub fn with_allowed_emails(mut self, emails: &[&str]) -> Self {
        self.allowed_emails = parse_allow_list(&emails.join(","));
        self
    }
}

/// Splits a comma separated allow-list. An empty list means no gate at all.
pub fn parse_allow_list(raw: &str) -> Option<Vec<String>> {
    let emails: Vec<String> = raw
        .split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    if emails.is_empty() { None } else { Some(emails) }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
