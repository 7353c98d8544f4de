use std::{fmt, future::Future, time::Duration};

use reqwest::{Client, Response, StatusCode, header::HeaderMap};
use serde_json::Value;

/// HTTP verbs the client issues against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Failure reported by an [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The provider answered with a non-success status.
    Status { status: StatusCode, body: String },
    /// The request never produced a response (connect, timeout, TLS...).
    Network(String),
    /// The response body was not valid JSON.
    Decode(String),
}

impl HttpError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            HttpError::Network(e) => write!(f, "network error: {}", e),
            HttpError::Decode(e) => write!(f, "invalid response body: {}", e),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HttpError::Decode(err.to_string())
        } else {
            HttpError::Network(err.to_string())
        }
    }
}

/// The HTTP collaborator every request goes through.
///
/// Implementations take absolute URLs and return the parsed JSON body of a
/// successful response (`Value::Null` for an empty one). Timeouts and
/// connection handling are the implementation's business.
pub trait HttpTransport: Send + Sync {
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send;

    fn post(
        &self,
        url: &str,
        body: &RequestBody,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send;
}

/// [`HttpTransport`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, HttpError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await?;
        read_body(response).await
    }

    async fn post(
        &self,
        url: &str,
        body: &RequestBody,
        headers: &HeaderMap,
    ) -> Result<Value, HttpError> {
        let request = self.client.post(url).headers(headers.clone());
        let request = match body {
            RequestBody::Json(json) => request.json(json),
            RequestBody::Form(pairs) => request.form(pairs),
        };
        read_body(request.send().await?).await
    }
}

async fn read_body(response: Response) -> Result<Value, HttpError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(HttpError::Status { status, body: text });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| HttpError::Decode(e.to_string()))
}
