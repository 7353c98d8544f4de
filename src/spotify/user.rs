use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::{Map, Value, json};

use crate::{
    types::{CreatePlaylistRequest, Credentials, Followers, Image, Playlist, UserProfile},
    utils, warning,
};

use super::{Client, error::ApiError, http::HttpTransport};

/// A Spotify user.
///
/// The optional profile fields are only present when the user granted the
/// matching scope (`user-read-private`, `user-read-email`).
///
/// A user's OAuth credentials are not part of this value. They live in the
/// client's [`CredentialStore`](crate::management::CredentialStore) under the
/// user's id and are looked up whenever an authenticated call is made.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub country: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub images: Option<Vec<Image>>,
    pub product: Option<String>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub external_urls: HashMap<String, String>,
    pub followers: Option<Followers>,
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            country: profile.country,
            display_name: profile.display_name,
            email: profile.email,
            images: profile.images,
            product: profile.product,
            href: profile.href,
            uri: profile.uri,
            external_urls: profile.external_urls,
            followers: profile.followers,
        }
    }
}

impl User {
    /// Builds a user from a provider response or an OAuth result.
    ///
    /// Accepts either a flat profile object or `{"info": {...}, "credentials": {...}}`.
    /// A `credentials` block is registered in the client's credential store
    /// under the user's id, replacing whatever was stored before. This is the
    /// only way credentials get into the store.
    pub fn from_json<T: HttpTransport>(client: &Client<T>, json: Value) -> Result<Self, ApiError> {
        let Value::Object(mut fields) = json else {
            return Err(ApiError::Parse("user must be a JSON object".into()));
        };

        let credentials = match fields.remove("credentials") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<Credentials>(raw)
                    .map_err(|e| ApiError::Parse(format!("invalid credentials: {}", e)))?,
            ),
        };

        let info = match fields.remove("info") {
            Some(info) => info,
            None => Value::Object(fields),
        };

        let profile: UserProfile = serde_json::from_value(info)
            .map_err(|e| ApiError::Parse(format!("invalid user profile: {}", e)))?;
        let user = User::from(profile);

        if let Some(credentials) = credentials {
            client.credentials().set(&user.id, credentials);
        }

        Ok(user)
    }

    /// Fetches the public profile of the user with the given id.
    ///
    /// The id is percent-encoded, so it always addresses a single user.
    pub async fn find<T: HttpTransport>(client: &Client<T>, id: &str) -> Result<Self, ApiError> {
        let json = match client.get(&format!("users/{}", utils::path_segment(id))).await {
            Ok(json) => json,
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => {
                return Err(ApiError::NotFound(format!("user {}", id)));
            }
            Err(err) => return Err(err),
        };

        if json.is_null() {
            return Err(ApiError::NotFound(format!("user {}", id)));
        }

        Self::from_json(client, json)
    }

    /// Spotify does not support searching for users.
    ///
    /// Prints a warning and returns no users. Nothing is sent to the provider.
    pub fn search<T: HttpTransport>(_client: &Client<T>, _query: &str) -> Vec<User> {
        warning!("Spotify API does not support search for users");
        Vec::new()
    }

    /// Creates a public playlist in the user's account.
    ///
    /// Requires the `playlist-modify-public` scope; without it the provider's
    /// 403 comes back as [`ApiError::AuthRejected`].
    pub async fn create_playlist<T: HttpTransport>(
        &self,
        client: &Client<T>,
        name: &str,
    ) -> Result<Playlist, ApiError> {
        self.create_playlist_with_visibility(client, name, true).await
    }

    /// Creates a playlist in the user's account, public or private.
    ///
    /// Private playlists additionally need the `playlist-modify-private` scope.
    pub async fn create_playlist_with_visibility<T: HttpTransport>(
        &self,
        client: &Client<T>,
        name: &str,
        public: bool,
    ) -> Result<Playlist, ApiError> {
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            public,
        };
        let body = serde_json::to_value(&request).map_err(|e| ApiError::Parse(e.to_string()))?;

        let json = client.auth_post(&self.id, &self.playlists_path(), body).await?;
        Ok(Playlist::new(json))
    }

    /// Lists the playlists of the user.
    pub async fn playlists<T: HttpTransport>(
        &self,
        client: &Client<T>,
    ) -> Result<Vec<Playlist>, ApiError> {
        let json = client.auth_get(&self.id, &self.playlists_path()).await?;

        match json.get("items") {
            Some(Value::Array(items)) => Ok(items.iter().cloned().map(Playlist::new).collect()),
            Some(Value::Null) => Ok(Vec::new()),
            _ => Err(ApiError::Parse("playlist page without an items array".into())),
        }
    }

    /// Snapshot of the credentials stored for this user, if any.
    pub fn credentials<T: HttpTransport>(&self, client: &Client<T>) -> Option<Credentials> {
        client.credentials().get(&self.id).ok()
    }

    /// The user's public representation.
    ///
    /// Lists the profile fields explicitly; credentials are never included.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("type".into(), json!("user"));
        map.insert("country".into(), json!(self.country));
        map.insert("display_name".into(), json!(self.display_name));
        map.insert("email".into(), json!(self.email));
        map.insert("images".into(), json!(self.images));
        map.insert("product".into(), json!(self.product));
        map.insert("href".into(), json!(self.href));
        map.insert("uri".into(), json!(self.uri));
        map.insert("external_urls".into(), json!(self.external_urls));
        map.insert("followers".into(), json!(self.followers));
        Value::Object(map)
    }

    fn playlists_path(&self) -> String {
        format!("users/{}/playlists", utils::path_segment(&self.id))
    }
}
