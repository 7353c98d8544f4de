use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::{config::ClientConfig, management::CredentialStore, types::Credentials, utils};

use super::{
    auth::{self, TokenRefresher},
    error::ApiError,
    http::{HttpError, HttpTransport, RequestBody, Verb},
};

/// Entry point for talking to the provider.
///
/// A client bundles the HTTP transport, the shared [`CredentialStore`] and
/// the provider configuration. Cloning is cheap and every clone shares the
/// same store and transport.
pub struct Client<T> {
    transport: Arc<T>,
    credentials: Arc<CredentialStore>,
    refresher: TokenRefresher<T>,
    api_url: String,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            credentials: Arc::clone(&self.credentials),
            refresher: self.refresher.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

impl<T: HttpTransport> Client<T> {
    pub fn new(transport: T, credentials: Arc<CredentialStore>, config: ClientConfig) -> Self {
        let transport = Arc::new(transport);
        let refresher =
            TokenRefresher::new(Arc::clone(&transport), Arc::clone(&credentials), &config);
        Self {
            transport,
            credentials,
            refresher,
            api_url: config.api_url,
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn refresher(&self) -> &TokenRefresher<T> {
        &self.refresher
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issues an unauthenticated GET against the public API.
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = utils::join_url(&self.api_url, path);
        self.transport
            .get(&url, &HeaderMap::new())
            .await
            .map_err(ApiError::from)
    }

    /// Issues a request on behalf of `user_id` with its stored access token.
    ///
    /// If the provider reports the access token as expired, the token is
    /// refreshed and the request is sent one more time. The outcome of that
    /// second attempt is returned as is.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NoCredentials`] when `user_id` has no stored credentials;
    ///   nothing is sent in that case
    /// - [`ApiError::AuthRejected`] for a 401/403 that is not an expired token
    /// - [`ApiError::RefreshFailed`] when the token refresh fails; the request
    ///   is not retried
    /// - [`ApiError::Http`] for every other transport failure
    pub async fn auth_request(
        &self,
        user_id: &str,
        verb: Verb,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let stored = self
            .credentials
            .get(user_id)
            .map_err(|_| ApiError::NoCredentials(user_id.to_string()))?;

        let url = utils::join_url(&self.api_url, path);
        let body = body.map(RequestBody::Json);

        match self.send(verb, &url, body.as_ref(), &stored).await? {
            Ok(json) => Ok(json),
            Err(err) if auth::is_token_expired(&err) => {
                self.refresher
                    .refresh_if_stale(user_id, &stored.access_token)
                    .await?;

                let refreshed = self
                    .credentials
                    .get(user_id)
                    .map_err(|_| ApiError::NoCredentials(user_id.to_string()))?;

                self.send(verb, &url, body.as_ref(), &refreshed)
                    .await?
                    .map_err(ApiError::from)
            }
            Err(err) => Err(ApiError::from(err)),
        }
    }

    pub async fn auth_get(&self, user_id: &str, path: &str) -> Result<Value, ApiError> {
        self.auth_request(user_id, Verb::Get, path, None).await
    }

    pub async fn auth_post(
        &self,
        user_id: &str,
        path: &str,
        body: Value,
    ) -> Result<Value, ApiError> {
        self.auth_request(user_id, Verb::Post, path, Some(body)).await
    }

    // Outer error: the request could not be built. Inner: what the transport reported.
    async fn send(
        &self,
        verb: Verb,
        url: &str,
        body: Option<&RequestBody>,
        credentials: &Credentials,
    ) -> Result<Result<Value, HttpError>, ApiError> {
        let headers = oauth_headers(credentials)?;
        let result = match verb {
            Verb::Get => self.transport.get(url, &headers).await,
            Verb::Post => {
                let empty = RequestBody::Json(Value::Null);
                self.transport
                    .post(url, body.unwrap_or(&empty), &headers)
                    .await
            }
        };
        Ok(result)
    }
}

fn oauth_headers(credentials: &Credentials) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&utils::bearer_auth_value(&credentials.access_token))
            .map_err(|e| ApiError::InvalidHeader(e.to_string()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
