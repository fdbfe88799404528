//! Transport and credential seams.
//!
//! # Design
//! The dispatch layer never opens sockets itself. It asks a `Transport` to
//! execute an `HttpRequest` and a `CredentialProvider` for the
//! `Authorization` header value, once per request. Both traits are
//! `Send + Sync` so one client can serve concurrent callers. Retries,
//! pooling and deadlines belong to the transport.

use std::time::Duration;

use crate::error::{Error, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a request and returns the response as data, whatever its status.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Produces the `Authorization` header value for a request.
pub trait CredentialProvider: Send + Sync {
    fn authorization(&self) -> Result<String>;
}

/// Private-app or OAuth access token sent as `Bearer <token>`.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(token) if !token.is_empty() => Ok(Self(token)),
            _ => Err(Error::Config(format!("environment variable {var} is not set"))),
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

impl CredentialProvider for BearerToken {
    fn authorization(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.0))
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// Non-2xx statuses are returned as data so the dispatch layer can interpret
/// them.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .user_agent(user_agent)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), crate::config::DEFAULT_USER_AGENT)
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            TransportError::Connect(err.to_string())
        }
        other => TransportError::Other(other.to_string()),
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.full_url();
        let body = request.body.unwrap_or_default();
        let headers = &request.headers;

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&url), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), headers).call(),
            HttpMethod::Post => with_headers(self.agent.post(&url), headers).send(body.as_bytes()),
            HttpMethod::Patch => {
                with_headers(self.agent.patch(&url), headers).send(body.as_bytes())
            }
            HttpMethod::Put => with_headers(self.agent.put(&url), headers).send(body.as_bytes()),
        };
        let mut response = result.map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;

        Ok(HttpResponse { status, headers, body })
    }
}
