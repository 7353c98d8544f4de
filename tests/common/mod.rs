#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, HeaderMap},
};
use serde_json::Value;
use spotuser::{
    config::ClientConfig,
    management::CredentialStore,
    spotify::{Client, HttpError, HttpTransport, RequestBody, Verb},
};

pub const API_URL: &str = "https://api.test/v1";
pub const TOKEN_URL: &str = "https://accounts.test/api/token";
pub const CLIENT_ID: &str = "app-id";
pub const CLIENT_SECRET: &str = "app-secret";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RecordedRequest {
    pub fn authorization(&self) -> Option<String> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(json)) => Some(json),
            _ => None,
        }
    }

    pub fn form_value(&self, key: &str) -> Option<String> {
        match &self.body {
            Some(RequestBody::Form(pairs)) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    pub fn is_token_request(&self) -> bool {
        self.url == TOKEN_URL
    }
}

type Handler = Box<dyn Fn(&RecordedRequest) -> Result<Value, HttpError> + Send + Sync>;

/// Transport answering every request through a closure and recording it.
///
/// Each call yields to the scheduler once before answering so that
/// concurrently driven requests interleave.
pub struct StubTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubTransport {
    pub fn new(
        handler: impl Fn(&RecordedRequest) -> Result<Value, HttpError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn api_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| !r.is_token_request())
            .collect()
    }

    pub fn token_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.is_token_request())
            .collect()
    }

    fn respond(&self, request: RecordedRequest) -> Result<Value, HttpError> {
        let result = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

impl HttpTransport for StubTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, HttpError> {
        tokio::task::yield_now().await;
        self.respond(RecordedRequest {
            verb: Verb::Get,
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
        })
    }

    async fn post(
        &self,
        url: &str,
        body: &RequestBody,
        headers: &HeaderMap,
    ) -> Result<Value, HttpError> {
        tokio::task::yield_now().await;
        self.respond(RecordedRequest {
            verb: Verb::Post,
            url: url.to_string(),
            headers: headers.clone(),
            body: Some(body.clone()),
        })
    }
}

pub fn client(stub: StubTransport) -> Client<StubTransport> {
    let config = ClientConfig::new(CLIENT_ID, CLIENT_SECRET)
        .with_api_url(API_URL)
        .with_token_url(TOKEN_URL);
    Client::new(stub, Arc::new(CredentialStore::new()), config)
}

pub fn api_url(path: &str) -> String {
    format!("{}/{}", API_URL, path)
}

pub fn expired_token() -> HttpError {
    HttpError::Status {
        status: StatusCode::UNAUTHORIZED,
        body: r#"{"error":{"status":401,"message":"The access token expired"}}"#.to_string(),
    }
}

pub fn invalid_token() -> HttpError {
    HttpError::Status {
        status: StatusCode::UNAUTHORIZED,
        body: r#"{"error":{"status":401,"message":"Invalid access token"}}"#.to_string(),
    }
}

pub fn forbidden() -> HttpError {
    HttpError::Status {
        status: StatusCode::FORBIDDEN,
        body: r#"{"error":{"status":403,"message":"Insufficient client scope"}}"#.to_string(),
    }
}
