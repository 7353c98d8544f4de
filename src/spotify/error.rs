use std::fmt;

use reqwest::StatusCode;

use super::http::HttpError;

/// Errors surfaced by [`Client`](super::Client) and the [`User`](super::User) resource.
///
/// Provider responses are carried unchanged so callers can inspect the
/// original status and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The requested resource does not exist upstream, or no credentials
    /// were found when refreshing a token.
    NotFound(String),
    /// An authenticated request was attempted for a user that was never
    /// constructed with credentials.
    NoCredentials(String),
    /// 401 or 403 that is not an expired access token (revoked access,
    /// missing scope, ...).
    AuthRejected(HttpError),
    /// The refresh token could not be exchanged for a new access token.
    RefreshFailed(String),
    /// Any other transport failure.
    Http(HttpError),
    /// The response did not have the expected shape.
    Parse(String),
    /// A token could not be turned into a header value.
    InvalidHeader(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthRejected(e) | ApiError::Http(e) => e.status(),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(what) => write!(f, "not found: {}", what),
            ApiError::NoCredentials(user_id) => {
                write!(f, "no credentials registered for user {}", user_id)
            }
            ApiError::AuthRejected(e) => write!(f, "authorization rejected: {}", e),
            ApiError::RefreshFailed(e) => write!(f, "token refresh failed: {}", e),
            ApiError::Http(e) => write!(f, "{}", e),
            ApiError::Parse(e) => write!(f, "unexpected response: {}", e),
            ApiError::InvalidHeader(e) => write!(f, "invalid header value: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::AuthRejected(e) | ApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        match err.status() {
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN) => {
                ApiError::AuthRejected(err)
            }
            _ => ApiError::Http(err),
        }
    }
}
