//! Configuration management for spotuser.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files and turning them into the typed configuration the client is
//! built from. The library itself never reads the environment; only the binary
//! calls into the `*_from_env` helpers.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (API and token endpoint URLs)

use std::{env, path::PathBuf, time::Duration};

/// Base URL of the Spotify Web API.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Spotify's OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist and loads environment
/// variables from `spotuser/.env` inside the platform-specific local data
/// directory. A missing file is not an error; variables may come from the
/// process environment alone.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotuser/.env`
/// - macOS: `~/Library/Application Support/spotuser/.env`
/// - Windows: `%LOCALAPPDATA%/spotuser/.env`
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the `.env`
/// file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotuser/.env");
    path
}

/// Endpoints and application credentials the [`Client`](crate::spotify::Client)
/// talks to the provider with.
///
/// `client_id` and `client_secret` identify the application, not the user.
/// They are only sent to the token endpoint as a basic-auth header when a
/// user's access token is refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Builds the configuration from the environment.
    ///
    /// | Variable | Required | Default |
    /// |---|---|---|
    /// | `SPOTIFY_API_AUTH_CLIENT_ID` | yes | |
    /// | `SPOTIFY_API_AUTH_CLIENT_SECRET` | yes | |
    /// | `SPOTIFY_API_URL` | no | [`DEFAULT_API_URL`] |
    /// | `SPOTIFY_API_TOKEN_URL` | no | [`DEFAULT_TOKEN_URL`] |
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            api_url: optional("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token_url: optional("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
        })
    }
}

/// The user the CLI acts as, together with the tokens obtained for it.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionConfig {
    /// Reads `SPOTIFY_USER_ID`, `SPOTIFY_ACCESS_TOKEN` and `SPOTIFY_REFRESH_TOKEN`.
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            user_id: required("SPOTIFY_USER_ID")?,
            access_token: required("SPOTIFY_ACCESS_TOKEN")?,
            refresh_token: required("SPOTIFY_REFRESH_TOKEN")?,
        })
    }
}

/// Request timeout for the HTTP transport, from `SPOTIFY_HTTP_TIMEOUT_SECS`.
///
/// Returns `Ok(None)` when the variable is unset, leaving the transport's
/// own default in place.
pub fn http_timeout() -> Result<Option<Duration>, String> {
    match optional("SPOTIFY_HTTP_TIMEOUT_SECS") {
        Some(secs) => secs
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| format!("SPOTIFY_HTTP_TIMEOUT_SECS must be a number of seconds: {}", e)),
        None => Ok(None),
    }
}

fn required(name: &str) -> Result<String, String> {
    optional(name).ok_or_else(|| format!("{} must be set", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
