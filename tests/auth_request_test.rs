mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;
use spotuser::{
    spotify::{ApiError, HttpError, Verb},
    types::Credentials,
    utils,
};

use common::{
    API_URL, CLIENT_ID, CLIENT_SECRET, RecordedRequest, StubTransport, api_url, client,
    expired_token, forbidden, invalid_token,
};

/// Answers API calls with the stale token as expired, everything else as ok,
/// and hands out `fresh` at the token endpoint.
fn refreshing_stub() -> StubTransport {
    StubTransport::new(|req: &RecordedRequest| {
        if req.is_token_request() {
            return Ok(json!({
                "access_token": "fresh",
                "token_type": "Bearer",
                "expires_in": 3600,
            }));
        }
        match req.authorization().as_deref() {
            Some("Bearer stale") => Err(expired_token()),
            _ => Ok(json!({ "ok": true })),
        }
    })
}

#[tokio::test]
async fn test_no_credentials_sends_nothing() {
    let client = client(StubTransport::new(|_| Ok(json!({}))));

    let result = client.auth_get("nobody", "users/nobody/playlists").await;

    assert_eq!(result, Err(ApiError::NoCredentials("nobody".to_string())));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_sends_bearer_and_json_headers() {
    let client = client(StubTransport::new(|_| Ok(json!({ "items": [] }))));
    client
        .credentials()
        .set("wizzler", Credentials::new("valid", "refresh"));

    let result = client
        .auth_request("wizzler", Verb::Get, "users/wizzler/playlists", None)
        .await;

    assert_eq!(result, Ok(json!({ "items": [] })));
    let requests = client.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].verb, Verb::Get);
    assert_eq!(requests[0].url, api_url("users/wizzler/playlists"));
    assert_eq!(requests[0].authorization().as_deref(), Some("Bearer valid"));
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried() {
    let client = client(refreshing_stub());
    client
        .credentials()
        .set("wizzler", Credentials::new("stale", "refresh-me"));

    let result = client
        .auth_post("wizzler", "users/wizzler/playlists", json!({ "name": "x" }))
        .await;

    assert_eq!(result, Ok(json!({ "ok": true })));

    let stored = client.credentials().get("wizzler").unwrap();
    assert_eq!(stored.access_token, "fresh");
    assert_eq!(stored.refresh_token, "refresh-me");
    assert!(stored.expires_at.is_some());

    let api_requests = client.transport().api_requests();
    assert_eq!(api_requests.len(), 2);
    assert_eq!(api_requests[0].authorization().as_deref(), Some("Bearer stale"));
    assert_eq!(api_requests[1].authorization().as_deref(), Some("Bearer fresh"));
    assert_eq!(api_requests[0].json_body(), api_requests[1].json_body());
    assert_eq!(api_requests[1].verb, Verb::Post);
}

#[tokio::test]
async fn test_refresh_request_uses_app_credentials() {
    let client = client(refreshing_stub());
    client
        .credentials()
        .set("wizzler", Credentials::new("stale", "refresh-me"));

    client
        .auth_get("wizzler", "users/wizzler/playlists")
        .await
        .unwrap();

    let token_requests = client.transport().token_requests();
    assert_eq!(token_requests.len(), 1);
    let refresh = &token_requests[0];
    assert_eq!(refresh.verb, Verb::Post);
    assert_eq!(
        refresh.authorization(),
        Some(utils::basic_auth_value(CLIENT_ID, CLIENT_SECRET))
    );
    assert_eq!(
        refresh.form_value("grant_type").as_deref(),
        Some("refresh_token")
    );
    assert_eq!(
        refresh.form_value("refresh_token").as_deref(),
        Some("refresh-me")
    );
}

#[tokio::test]
async fn test_unrelated_unauthorized_is_not_retried() {
    let client = client(StubTransport::new(|_| Err(invalid_token())));
    client
        .credentials()
        .set("wizzler", Credentials::new("revoked", "refresh"));

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert_eq!(result, Err(ApiError::AuthRejected(invalid_token())));
    assert_eq!(client.transport().requests().len(), 1);
    assert_eq!(
        client.credentials().get("wizzler").unwrap(),
        Credentials::new("revoked", "refresh")
    );
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let client = client(StubTransport::new(|_| Err(forbidden())));
    client
        .credentials()
        .set("wizzler", Credentials::new("valid", "refresh"));

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert_eq!(result, Err(ApiError::AuthRejected(forbidden())));
    assert!(client.transport().token_requests().is_empty());
}

#[tokio::test]
async fn test_server_errors_propagate_unchanged() {
    let unavailable = HttpError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "upstream down".to_string(),
    };
    let returned = unavailable.clone();
    let client = client(StubTransport::new(move |_| Err(returned.clone())));
    client
        .credentials()
        .set("wizzler", Credentials::new("valid", "refresh"));

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert_eq!(result, Err(ApiError::Http(unavailable)));
    assert_eq!(client.transport().requests().len(), 1);
}

#[tokio::test]
async fn test_network_errors_propagate_unchanged() {
    let client = client(StubTransport::new(|_| {
        Err(HttpError::Network("connection reset".to_string()))
    }));
    client
        .credentials()
        .set("wizzler", Credentials::new("valid", "refresh"));

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert_eq!(
        result,
        Err(ApiError::Http(HttpError::Network(
            "connection reset".to_string()
        )))
    );
}

#[tokio::test]
async fn test_retry_happens_only_once() {
    let client = client(StubTransport::new(|req: &RecordedRequest| {
        if req.is_token_request() {
            Ok(json!({ "access_token": "also-expired" }))
        } else {
            Err(expired_token())
        }
    }));
    client
        .credentials()
        .set("wizzler", Credentials::new("stale", "refresh"));

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert_eq!(result, Err(ApiError::AuthRejected(expired_token())));
    assert_eq!(client.transport().api_requests().len(), 2);
    assert_eq!(client.transport().token_requests().len(), 1);
}

#[tokio::test]
async fn test_failed_refresh_abandons_request() {
    let client = client(StubTransport::new(|req: &RecordedRequest| {
        if req.is_token_request() {
            Err(HttpError::Status {
                status: StatusCode::BAD_REQUEST,
                body: r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#
                    .to_string(),
            })
        } else {
            Err(expired_token())
        }
    }));
    client
        .credentials()
        .set("wizzler", Credentials::new("stale", "revoked-refresh"));

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert!(matches!(result, Err(ApiError::RefreshFailed(_))));
    assert_eq!(client.transport().api_requests().len(), 1);
    assert_eq!(
        client.credentials().get("wizzler").unwrap().access_token,
        "stale"
    );
}

#[tokio::test]
async fn test_refresh_without_access_token_fails() {
    let client = client(StubTransport::new(|req: &RecordedRequest| {
        if req.is_token_request() {
            Ok(json!({ "token_type": "Bearer" }))
        } else {
            Err(expired_token())
        }
    }));
    client
        .credentials()
        .set("wizzler", Credentials::new("stale", "refresh"));

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert!(matches!(result, Err(ApiError::RefreshFailed(_))));
    assert_eq!(
        client.credentials().get("wizzler").unwrap().access_token,
        "stale"
    );
}

#[tokio::test]
async fn test_unrepresentable_expires_in_leaves_expiry_unknown() {
    let client = client(StubTransport::new(|req: &RecordedRequest| {
        if req.is_token_request() {
            return Ok(json!({ "access_token": "fresh", "expires_in": i64::MAX }));
        }
        match req.authorization().as_deref() {
            Some("Bearer stale") => Err(expired_token()),
            _ => Ok(json!({ "ok": true })),
        }
    }));
    let mut credentials = Credentials::new("stale", "refresh");
    credentials.expires_at = Some(Utc::now());
    client.credentials().set("wizzler", credentials);

    let result = client.auth_get("wizzler", "users/wizzler/playlists").await;

    assert_eq!(result, Ok(json!({ "ok": true })));
    let stored = client.credentials().get("wizzler").unwrap();
    assert_eq!(stored.access_token, "fresh");
    assert_eq!(stored.expires_at, None);
}

#[tokio::test]
async fn test_refresh_without_expires_in_clears_old_expiry() {
    let client = client(StubTransport::new(|_| Ok(json!({ "access_token": "fresh" }))));
    let mut credentials = Credentials::new("stale", "refresh");
    credentials.expires_at = Some(Utc::now());
    client.credentials().set("wizzler", credentials);

    let token = client.refresher().refresh("wizzler").await.unwrap();

    assert_eq!(token, "fresh");
    let stored = client.credentials().get("wizzler").unwrap();
    assert_eq!(stored.access_token, "fresh");
    assert_eq!(stored.expires_at, None);
}

#[tokio::test]
async fn test_sequential_refreshes_last_write_wins() {
    let issued = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&issued);
    let client = client(StubTransport::new(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!({ "access_token": format!("token-{}", n) }))
    }));
    client
        .credentials()
        .set("wizzler", Credentials::new("initial", "refresh"));

    let first = client.refresher().refresh("wizzler").await.unwrap();
    assert_eq!(first, "token-1");
    assert_eq!(
        client.credentials().get("wizzler").unwrap().access_token,
        "token-1"
    );

    let second = client.refresher().refresh("wizzler").await.unwrap();
    assert_eq!(second, "token-2");
    assert_eq!(
        client.credentials().get("wizzler").unwrap().access_token,
        "token-2"
    );
    assert_eq!(issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_refresh_unknown_user() {
    let client = client(StubTransport::new(|_| Ok(json!({ "access_token": "x" }))));

    let result = client.refresher().refresh("ghost").await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_concurrent_expiry_refreshes_once() {
    let client = client(refreshing_stub());
    client
        .credentials()
        .set("wizzler", Credentials::new("stale", "single-use"));

    let (a, b) = tokio::join!(
        client.auth_get("wizzler", "users/wizzler/playlists"),
        client.auth_get("wizzler", "users/wizzler")
    );

    assert_eq!(a, Ok(json!({ "ok": true })));
    assert_eq!(b, Ok(json!({ "ok": true })));
    assert_eq!(client.transport().token_requests().len(), 1);
    assert_eq!(client.transport().api_requests().len(), 4);
    assert_eq!(
        client.credentials().get("wizzler").unwrap().access_token,
        "fresh"
    );
}

#[tokio::test]
async fn test_refresh_if_stale_skips_when_token_changed() {
    let client = client(refreshing_stub());
    client
        .credentials()
        .set("wizzler", Credentials::new("already-new", "refresh"));

    let token = client
        .refresher()
        .refresh_if_stale("wizzler", "stale")
        .await
        .unwrap();

    assert_eq!(token, "already-new");
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_public_get_has_no_authorization() {
    let client = client(StubTransport::new(|_| Ok(json!({ "id": "wizzler" }))));

    let result = client.get("users/wizzler").await.unwrap();

    assert_eq!(result["id"], "wizzler");
    let requests = client.transport().requests();
    assert_eq!(requests[0].url, format!("{}/users/wizzler", API_URL));
    assert!(requests[0].authorization().is_none());
}
