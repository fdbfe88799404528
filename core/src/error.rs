//! Error types for the CRM client.
//!
//! # Design
//! Errors are categorized rather than free-form. `NotFound` is split out of
//! `Api` because callers frequently branch on "the record does not exist"
//! versus "the remote rejected the call". Both carry the same `ApiError`
//! payload so the status, raw body and parsed CRM error document stay
//! available for inspection either way.

use std::collections::BTreeMap;

use serde::Deserialize;
use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the dispatch layer and the resource services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not complete the round-trip.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The remote API answered with a non-2xx status other than 404.
    #[error("{0}")]
    Api(ApiError),

    /// The remote API answered 404.
    #[error("resource not found: {0}")]
    NotFound(ApiError),

    /// The response body did not match the expected envelope or field shape.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// A single tri-state field held JSON of the wrong type.
    #[error(transparent)]
    FieldDecode(#[from] FieldDecodeError),

    /// The request payload could not be serialized to JSON.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A required construction parameter was missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The remote error payload, for both `Api` and `NotFound`.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) | Error::NotFound(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Failures below the HTTP layer. Never retried by this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// A non-2xx answer from the remote API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub body: String,
    /// The CRM error document, when the body parses as one.
    pub details: Option<ErrorDetails>,
}

impl ApiError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let details = serde_json::from_str(&body).ok();
        Self { status, body, details }
    }

    pub fn message(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.message.as_str())
    }

    pub fn category(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.category.as_deref())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(message) => write!(f, "HTTP {}: {message}", self.status),
            None => write!(f, "HTTP {}: {}", self.status, self.body),
        }
    }
}

/// Error document returned by the CRM on failed calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(default)]
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub correlation_id: Option<Uuid>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub context: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub context: BTreeMap<String, Vec<String>>,
}

/// A tri-state field whose JSON did not match its declared type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for field `{field}`: {reason} (raw: {raw})")]
pub struct FieldDecodeError {
    /// Wire name of the offending field.
    pub field: String,
    /// The JSON fragment as received.
    pub raw: String,
    pub reason: String,
}
