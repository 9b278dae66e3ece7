// crates/titanic-e2e/src/client.rs
// ============================================================================
// Module: API Client
// Description: Thin HTTP client for the Titanic gateway and services.
// Purpose: Issue requests, capture transcripts, and expose raw status/body
//          pairs so suites can assert on exact service behavior.
// Dependencies: reqwest, serde, serde_json, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`ApiClient`] never interprets status codes: a 4xx or 5xx is a normal
//! [`ApiResponse`] that the calling scenario asserts on. Only transport
//! failures surface as [`ClientError`].
//! Invariants:
//! - Every request is bounded by the client timeout.
//! - Only connect failures are retried (the request never reached a server),
//!   so non-idempotent calls such as registration are never replayed.
//! - Every exchange, including failed ones, is appended to the transcript.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;

use crate::config::HarnessConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum attempts for connect failures.
const MAX_HTTP_SEND_ATTEMPTS: u32 = 3;
/// Base backoff delay between connect retries.
const BASE_HTTP_SEND_RETRY_DELAY_MS: u64 = 100;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transport-level failures raised by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying reqwest client could not be built.
    #[error("failed to build http client: {0}")]
    Build(String),
    /// A request body could not be serialized.
    #[error("request serialization failed: {0}")]
    Serialize(String),
    /// The request never produced a response.
    #[error("{method} {url} failed after {attempts} attempt(s): {message}")]
    Send {
        /// HTTP method.
        method: String,
        /// Absolute URL.
        url: String,
        /// Attempts made.
        attempts: u32,
        /// Transport error text.
        message: String,
    },
    /// The response body could not be read.
    #[error("failed to read response body from {url}: {message}")]
    Body {
        /// Absolute URL.
        url: String,
        /// Transport error text.
        message: String,
    },
    /// A response body did not match the expected type.
    #[error("unexpected response shape (status {status}): {message}")]
    Decode {
        /// HTTP status of the response.
        status: u16,
        /// Decoder error text.
        message: String,
    },
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One recorded HTTP exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// 1-based exchange number.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// JSON request body, if any.
    pub request: Option<Value>,
    /// Response status, if a response arrived.
    pub status: Option<u16>,
    /// Decoded response body (`null` for non-JSON bodies).
    pub response: Value,
    /// Transport error, if the exchange failed.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Response
// ============================================================================

/// Status, content type and body of one HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Body decoded as JSON, or `null` when the body is not JSON.
    pub body: Value,
    /// Raw body text.
    pub raw: String,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Looks up a value by JSON pointer (`/services/auth_service/status`).
    #[must_use]
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.body.pointer(pointer)
    }

    /// Looks up a string by JSON pointer.
    #[must_use]
    pub fn str_field(&self, pointer: &str) -> Option<&str> {
        self.field(pointer).and_then(Value::as_str)
    }

    /// Returns the `detail` message carried by error responses.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.str_field("/detail")
    }

    /// Returns true when the content type is HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().is_some_and(|value| value.contains("text/html"))
    }

    /// Decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_value(self.body.clone()).map_err(|err| ClientError::Decode {
            status: self.status,
            message: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Outgoing request description, rebuilt on each attempt.
struct Outgoing<'a> {
    /// HTTP method.
    method: Method,
    /// Absolute URL.
    url: String,
    /// Bearer token, if any.
    token: Option<&'a str>,
    /// Query pairs.
    query: &'a [(&'a str, &'a str)],
    /// JSON body, if any.
    body: Option<Value>,
}

/// HTTP client bound to one base URL, with transcript capture.
///
/// Clones share the underlying connection pool and transcript.
#[derive(Clone)]
pub struct ApiClient {
    /// Base URL without trailing slash.
    base_url: String,
    /// Shared reqwest client.
    client: Client,
    /// Shared transcript.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl ApiClient {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the reqwest client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            transcript: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Creates a client for the configured gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the reqwest client cannot be built.
    pub fn for_gateway(config: &HarnessConfig) -> Result<Self, ClientError> {
        Self::new(config.gateway_base(), config.http_timeout)
    }

    /// Returns a client for another base URL sharing this client's pool and
    /// transcript.
    #[must_use]
    pub fn rebased(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: self.client.clone(),
            transcript: Arc::clone(&self.transcript),
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Issues `GET path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(self.outgoing(Method::GET, path, None, &[], None)).await
    }

    /// Issues `GET path?query`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, ClientError> {
        self.send(self.outgoing(Method::GET, path, None, query, None)).await
    }

    /// Issues `GET path` with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn get_authed(&self, path: &str, token: &str) -> Result<ApiResponse, ClientError> {
        self.send(self.outgoing(Method::GET, path, Some(token), &[], None)).await
    }

    /// Issues `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on serialization or transport failure.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let body = to_json(body)?;
        self.send(self.outgoing(Method::POST, path, None, &[], Some(body))).await
    }

    /// Issues `POST path` with a JSON body and a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on serialization or transport failure.
    pub async fn post_json_authed<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let body = to_json(body)?;
        self.send(self.outgoing(Method::POST, path, Some(token), &[], Some(body))).await
    }

    /// Issues `PUT path` with a JSON body and a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on serialization or transport failure.
    pub async fn put_json_authed<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let body = to_json(body)?;
        self.send(self.outgoing(Method::PUT, path, Some(token), &[], Some(body))).await
    }

    /// Issues `DELETE path` with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn delete_authed(&self, path: &str, token: &str) -> Result<ApiResponse, ClientError> {
        self.send(self.outgoing(Method::DELETE, path, Some(token), &[], None)).await
    }

    /// Builds an outgoing request description.
    fn outgoing<'a>(
        &self,
        method: Method,
        path: &str,
        token: Option<&'a str>,
        query: &'a [(&'a str, &'a str)],
        body: Option<Value>,
    ) -> Outgoing<'a> {
        Outgoing {
            method,
            url: self.resolve(path),
            token,
            query,
            body,
        }
    }

    /// Resolves `path` against the base URL; absolute URLs pass through.
    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Sends the request, retrying connect failures with linear backoff.
    async fn send(&self, outgoing: Outgoing<'_>) -> Result<ApiResponse, ClientError> {
        for attempt in 1..=MAX_HTTP_SEND_ATTEMPTS {
            let mut request = self.client.request(outgoing.method.clone(), &outgoing.url);
            if !outgoing.query.is_empty() {
                request = request.query(outgoing.query);
            }
            if let Some(token) = outgoing.token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &outgoing.body {
                request = request.json(body);
            }
            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    if err.is_connect() && attempt < MAX_HTTP_SEND_ATTEMPTS {
                        tracing::debug!(url = %outgoing.url, attempt, "connect failed, retrying");
                        sleep(retry_delay_for_attempt(attempt)).await;
                        continue;
                    }
                    let error = ClientError::Send {
                        method: outgoing.method.to_string(),
                        url: outgoing.url.clone(),
                        attempts: attempt,
                        message: err.to_string(),
                    };
                    self.record(&outgoing, None, Value::Null, Some(error.to_string()));
                    return Err(error);
                }
            };
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string);
            let raw = match response.text().await {
                Ok(raw) => raw,
                Err(err) => {
                    let error = ClientError::Body {
                        url: outgoing.url.clone(),
                        message: err.to_string(),
                    };
                    self.record(&outgoing, Some(status), Value::Null, Some(error.to_string()));
                    return Err(error);
                }
            };
            let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
            tracing::debug!(method = %outgoing.method, url = %outgoing.url, status, "http exchange");
            self.record(&outgoing, Some(status), body.clone(), None);
            return Ok(ApiResponse {
                status,
                content_type,
                body,
                raw,
            });
        }
        Err(ClientError::Send {
            method: outgoing.method.to_string(),
            url: outgoing.url,
            attempts: MAX_HTTP_SEND_ATTEMPTS,
            message: "exhausted retry attempts".to_string(),
        })
    }

    /// Appends an exchange to the transcript.
    fn record(
        &self,
        outgoing: &Outgoing<'_>,
        status: Option<u16>,
        response: Value,
        error: Option<String>,
    ) {
        let Ok(mut guard) = self.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method: outgoing.method.to_string(),
            url: outgoing.url.clone(),
            request: outgoing.body.clone(),
            status,
            response,
            error,
        });
    }
}

/// Serializes a request body.
fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|err| ClientError::Serialize(err.to_string()))
}

/// Returns bounded linear backoff for connect retries.
fn retry_delay_for_attempt(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt) * BASE_HTTP_SEND_RETRY_DELAY_MS)
}
