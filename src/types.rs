use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

/// OAuth credentials of a single user as stored in the
/// [`CredentialStore`](crate::management::CredentialStore).
///
/// Deserializes from the `credentials` block handed over after the OAuth
/// authorization, where the access token is named `token`. `access_token`
/// is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "token", alias = "access_token")]
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
            expires_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    pub href: Option<String>,
    pub total: u64,
}

/// Public profile fields of a user as returned by `GET /users/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub country: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub images: Option<Vec<Image>>,
    pub product: Option<String>,
    pub href: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
}

/// A playlist as returned by the provider.
///
/// The raw JSON is kept as is; accessors read the few fields callers
/// usually care about.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist(Value);

impl Playlist {
    pub fn new(raw: Value) -> Self {
        Playlist(raw)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn public(&self) -> Option<bool> {
        self.0.get("public").and_then(Value::as_bool)
    }

    pub fn track_count(&self) -> Option<u64> {
        self.0
            .get("tracks")
            .and_then(|tracks| tracks.get("total"))
            .and_then(Value::as_u64)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

/// Error body the provider sends along with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    pub error: ProviderError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub visibility: String,
    pub tracks: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct UserTableRow {
    pub id: String,
    pub name: String,
    pub country: String,
    pub product: String,
    pub followers: String,
}
