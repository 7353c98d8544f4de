//! # Spotify Integration Module
//!
//! This module is the client side of the Spotify Web API used by spotuser. It
//! models the `User` resource, fetches users by id, and runs the OAuth
//! authenticated user operations (creating and listing playlists) while keeping
//! the user's access token fresh behind the caller's back.
//!
//! ## Architecture
//!
//! ```text
//! Caller (CLI, library user)
//!          ↓
//! User resource (find, search, create_playlist, playlists)
//!          ↓
//! Client::auth_request ──── CredentialStore (per user id)
//!          ↓        ↘
//!          ↓         TokenRefresher → POST <token endpoint>
//!          ↓
//! HttpTransport (reqwest by default)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Token Refresh
//!
//! Authenticated requests carry `Authorization: Bearer <access token>`. When the
//! provider answers 401 with an "access token expired" error, the client
//! exchanges the user's refresh token at the token endpoint (authenticating as
//! the application with basic auth), stores the new access token and sends the
//! original request once more. Any other 401 or 403 is handed to the caller
//! untouched as [`ApiError::AuthRejected`].
//!
//! Refreshes for one user are serialized. A caller that finds the token already
//! replaced by a concurrent refresh reuses it instead of spending the refresh
//! token again.
//!
//! ## API Coverage
//!
//! - `GET /users/{user_id}` - Public user profile
//! - `POST /users/{user_id}/playlists` - Create a playlist
//! - `GET /users/{user_id}/playlists` - List a user's playlists
//! - `POST /api/token` - Refresh token exchange
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use serde_json::json;
//! use spotuser::config::ClientConfig;
//! use spotuser::management::CredentialStore;
//! use spotuser::spotify::{Client, ReqwestTransport, User};
//!
//! let store = Arc::new(CredentialStore::new());
//! let client = Client::new(ReqwestTransport::new(), store, ClientConfig::new("id", "secret"));
//!
//! let user = User::from_json(&client, json!({
//!     "info": { "id": "wizzler" },
//!     "credentials": { "token": "BQC...", "refresh_token": "AQD..." }
//! }))?;
//! let playlist = user.create_playlist(&client, "my-first-playlist").await?;
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod user;

pub use auth::{TokenRefresher, is_token_expired};
pub use client::Client;
pub use error::ApiError;
pub use http::{HttpError, HttpTransport, RequestBody, ReqwestTransport, Verb};
pub use user::User;
