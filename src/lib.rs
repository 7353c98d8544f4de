//! Spotify User Client Library
//!
//! This library provides a client for the user endpoints of the Spotify Web API.
//! It fetches user profiles, creates and lists a user's playlists, and refreshes
//! expired OAuth access tokens transparently while doing so.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - Credential storage shared by all clients
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spotuser::{config, management::CredentialStore, spotify::{Client, ReqwestTransport, User}};
//!
//! #[tokio::main]
//! async fn main() -> spotuser::Res<()> {
//!     config::load_env().await?;
//!     let store = Arc::new(CredentialStore::new());
//!     let client = Client::new(ReqwestTransport::new(), store, config::ClientConfig::from_env()?);
//!     let user = User::find(&client, "wizzler").await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod management;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias used by the binary layer, where errors of every module end up
/// being reported to the user rather than matched on.
///
/// # Example
///
/// ```
/// use spotuser::Res;
///
/// fn client_id() -> Res<String> {
///     Ok(std::env::var("SPOTIFY_API_AUTH_CLIENT_ID")?)
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line prefixed with a blue `o`.
///
/// ```
/// info!("User {} has no playlists", user_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line prefixed with a green checkmark.
///
/// ```
/// success!("Playlist {} created", name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line prefixed with a red `!` and exits with status 1.
///
/// Only for the binary; library code returns errors instead.
///
/// ```
/// error!("Cannot start session: {}", e);
/// // not reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line prefixed with a yellow `!`.
///
/// Used for conditions the caller should know about that are not errors,
/// such as operations the provider does not support.
///
/// ```
/// warning!("Spotify API does not support search for users");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
