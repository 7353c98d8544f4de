use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};

/// Joins an API base URL and a relative resource path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{base}/{path}",
        base = base.trim_end_matches('/'),
        path = path.trim_start_matches('/')
    )
}

/// Value of the application's `Authorization` header for the token endpoint.
pub fn basic_auth_value(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", encoded)
}

/// Percent-encodes `value` so it stays a single path segment.
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn bearer_auth_value(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Absolute expiry time for a token the provider reports as valid for
/// `expires_in` seconds from now.
///
/// `None` when the result is not representable.
pub fn expires_at_from(expires_in: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(expires_in)
        .and_then(|valid_for| Utc::now().checked_add_signed(valid_for))
}
