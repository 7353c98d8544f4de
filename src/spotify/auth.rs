use std::sync::Arc;

use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::Value;

use crate::{
    config::ClientConfig,
    management::{CredentialError, CredentialStore},
    types::ProviderErrorBody,
    utils,
};

use super::{
    error::ApiError,
    http::{HttpError, HttpTransport, RequestBody},
};

const EXPIRED_TOKEN_SIGNATURE: &str = "access token expired";

/// Tells whether a transport failure means the access token has expired.
///
/// Only a 401 qualifies. When the body is the provider's structured error
/// (`{"error": {"status": 401, "message": "The access token expired"}}`) the
/// message is checked; otherwise the raw body is searched for the signature.
/// Everything else, including other 401s such as revoked access, is not an
/// expiry.
pub fn is_token_expired(err: &HttpError) -> bool {
    let HttpError::Status { status, body } = err else {
        return false;
    };

    if *status != StatusCode::UNAUTHORIZED {
        return false;
    }

    match serde_json::from_str::<ProviderErrorBody>(body) {
        Ok(parsed) => parsed
            .error
            .message
            .to_lowercase()
            .contains(EXPIRED_TOKEN_SIGNATURE),
        // plain-text bodies from older endpoints
        Err(_) => body.to_lowercase().contains(EXPIRED_TOKEN_SIGNATURE),
    }
}

/// Exchanges stored refresh tokens for new access tokens.
///
/// Refreshes are silent; callers learn about them only through the updated
/// [`CredentialStore`] record.
///
/// Every exchange for a user runs under that user's refresh gate in the
/// [`CredentialStore`], so concurrent refreshes for the same user never
/// overlap.
pub struct TokenRefresher<T> {
    transport: Arc<T>,
    credentials: Arc<CredentialStore>,
    token_url: String,
    app_authorization: String,
}

impl<T> Clone for TokenRefresher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            credentials: Arc::clone(&self.credentials),
            token_url: self.token_url.clone(),
            app_authorization: self.app_authorization.clone(),
        }
    }
}

impl<T: HttpTransport> TokenRefresher<T> {
    pub fn new(
        transport: Arc<T>,
        credentials: Arc<CredentialStore>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            transport,
            credentials,
            token_url: config.token_url.clone(),
            app_authorization: utils::basic_auth_value(&config.client_id, &config.client_secret),
        }
    }

    /// Exchanges the refresh token of `user_id` and stores the new access token.
    ///
    /// The new token and its expiry are written together. The expiry is
    /// cleared when the reply has no usable `expires_in`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] if no credentials are registered for `user_id`
    /// - [`ApiError::RefreshFailed`] if the token endpoint rejects the refresh
    ///   token, cannot be reached, or answers without an `access_token`
    pub async fn refresh(&self, user_id: &str) -> Result<String, ApiError> {
        let gate = self.credentials.refresh_gate(user_id).map_err(not_found)?;
        let _guard = gate.lock().await;
        self.exchange(user_id).await
    }

    /// Refreshes the token of `user_id` unless it was already replaced.
    ///
    /// `stale_token` is the access token the provider just reported as
    /// expired. If the stored token differs by the time the refresh gate is
    /// acquired, another caller refreshed it in the meantime and the stored
    /// token is returned without a second exchange.
    pub async fn refresh_if_stale(
        &self,
        user_id: &str,
        stale_token: &str,
    ) -> Result<String, ApiError> {
        let gate = self.credentials.refresh_gate(user_id).map_err(not_found)?;
        let _guard = gate.lock().await;

        let current = self.credentials.get(user_id).map_err(not_found)?;
        if current.access_token != stale_token {
            return Ok(current.access_token);
        }

        self.exchange(user_id).await
    }

    async fn exchange(&self, user_id: &str) -> Result<String, ApiError> {
        let stored = self.credentials.get(user_id).map_err(not_found)?;

        let body = RequestBody::Form(vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), stored.refresh_token),
        ]);

        let json = self
            .transport
            .post(&self.token_url, &body, &self.headers()?)
            .await
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;

        let access_token = json["access_token"]
            .as_str()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::RefreshFailed("token endpoint answered without an access_token".into())
            })?
            .to_string();

        // an expires_in we cannot represent leaves the expiry unknown
        let expires_at = json
            .get("expires_in")
            .and_then(Value::as_i64)
            .and_then(utils::expires_at_from);

        self.credentials
            .record_refresh(user_id, access_token.clone(), expires_at)
            .map_err(not_found)?;

        Ok(access_token)
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.app_authorization)
                .map_err(|e| ApiError::InvalidHeader(e.to_string()))?,
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        Ok(headers)
    }
}

fn not_found(err: CredentialError) -> ApiError {
    ApiError::NotFound(err.to_string())
}
