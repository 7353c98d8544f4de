//! # CLI Module
//!
//! This module provides the command-line interface layer for spotuser. It
//! implements the user-facing commands and wires them to the Spotify client,
//! the credential store and the configuration loaded from the environment.
//!
//! ## Command Categories
//!
//! - [`show_user`] - Looks up the public profile of any user
//! - [`list_playlists`] - Lists the playlists of the configured user
//! - [`create_playlist`] - Creates a playlist for the configured user
//!
//! ## Sessions
//!
//! The authenticated commands act as the user named by `SPOTIFY_USER_ID` with
//! the tokens from `SPOTIFY_ACCESS_TOKEN` and `SPOTIFY_REFRESH_TOKEN`. The user
//! is built with that credentials block, which registers the tokens in the
//! client's credential store; an expired access token is refreshed on the fly.
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotuser user wizzler                    # Public profile
//! spotuser playlists                       # Your playlists
//! spotuser create-playlist "Road trip"     # New public playlist
//! spotuser create-playlist Drafts --private
//! ```
//!
//! Fatal problems (missing configuration, failed requests) are reported with
//! [`error!`](crate::error) and end the process.

mod playlist;
mod user;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use crate::{
    Res,
    config::{self, ClientConfig, SessionConfig},
    management::CredentialStore,
    spotify::{Client, ReqwestTransport, User},
};

pub use playlist::create_playlist;
pub use playlist::list_playlists;
pub use user::show_user;

/// Builds a client from the environment.
pub fn build_client() -> Res<Client<ReqwestTransport>> {
    let client_config = ClientConfig::from_env()?;

    let transport = match config::http_timeout()? {
        Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
        None => ReqwestTransport::new(),
    };

    Ok(Client::new(
        transport,
        Arc::new(CredentialStore::new()),
        client_config,
    ))
}

/// A client together with the configured session user, whose tokens are
/// registered in the client's credential store.
fn session() -> Res<(Client<ReqwestTransport>, User)> {
    let client = build_client()?;
    let session = SessionConfig::from_env()?;

    let json = json!({
        "info": { "id": session.user_id },
        "credentials": {
            "token": session.access_token,
            "refresh_token": session.refresh_token,
            "token_type": "Bearer",
        },
    });

    let user = User::from_json(&client, json)?;
    Ok((client, user))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
