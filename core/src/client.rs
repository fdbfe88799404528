//! Resource dispatch layer.
//!
//! # Design
//! `Client` is the single chokepoint through which every resource service
//! issues HTTP verbs. It holds only the base URL and shared handles to the
//! transport and credential provider; every call builds its own request,
//! query and body, so concurrent calls through one client share nothing
//! mutable.
//!
//! Each call is split into `build_request` (produces an `HttpRequest`) and
//! `parse_response` (consumes an `HttpResponse`). The verb methods run both
//! halves around the transport; callers that own their I/O can use the
//! halves directly.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::envelope::RequestPayload;
use crate::error::{ApiError, Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::QueryOption;
use crate::transport::{CredentialProvider, Transport, UreqTransport};

/// Stateless dispatcher for the CRM REST API.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            credentials,
        }
    }

    /// Client over the default `ureq` transport.
    pub fn from_config(
        config: &ClientConfig,
        credentials: impl CredentialProvider + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let transport = UreqTransport::new(config.timeout(), &config.user_agent);
        Ok(Self::new(
            &config.base_url,
            Arc::new(transport),
            Arc::new(credentials),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<String>,
    ) -> Result<HttpRequest> {
        let path = path.trim_start_matches('/');
        let url = if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{path}", self.base_url)
        };

        let mut headers = vec![
            ("authorization".to_string(), self.credentials.authorization()?),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method,
            url,
            query,
            headers,
            body,
        })
    }

    pub fn parse_response<D: DeserializeOwned>(&self, response: HttpResponse) -> Result<D> {
        check_status(&response)?;
        decode_body(&response.body)
    }

    /// Read `path`, decoding the response into `D`.
    pub fn get<D: DeserializeOwned>(&self, path: &str, option: Option<&QueryOption>) -> Result<D> {
        let query = option.map(QueryOption::to_query).unwrap_or_default();
        let request = self.build_request(HttpMethod::Get, path, query, None)?;
        self.parse_response(self.send(request)?)
    }

    /// Create: `entity` is sent wrapped as `{"properties": entity}`.
    pub fn post<E, D>(&self, path: &str, entity: &E) -> Result<D>
    where
        E: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        self.post_raw(path, &RequestPayload::new(entity))
    }

    /// POST `body` as-is, without the `properties` envelope.
    pub fn post_raw<B, D>(&self, path: &str, body: &B) -> Result<D>
    where
        B: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        let request = self.build_request(HttpMethod::Post, path, Vec::new(), Some(encode(body)?))?;
        self.parse_response(self.send(request)?)
    }

    /// Partial update: `entity` is sent wrapped as `{"properties": entity}`.
    /// Absent fields are omitted and null fields are sent as `null`.
    pub fn patch<E, D>(&self, path: &str, entity: &E) -> Result<D>
    where
        E: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        self.patch_raw(path, &RequestPayload::new(entity))
    }

    /// PATCH `body` as-is, without the `properties` envelope.
    pub fn patch_raw<B, D>(&self, path: &str, body: &B) -> Result<D>
    where
        B: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        let request = self.build_request(HttpMethod::Patch, path, Vec::new(), Some(encode(body)?))?;
        self.parse_response(self.send(request)?)
    }

    pub fn put<B, D>(&self, path: &str, body: &B) -> Result<D>
    where
        B: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        let request = self.build_request(HttpMethod::Put, path, Vec::new(), Some(encode(body)?))?;
        self.parse_response(self.send(request)?)
    }

    /// PUT without a body. The remote may answer with an empty body, which
    /// decodes as `null` or `{}`.
    pub fn put_empty<D: DeserializeOwned>(&self, path: &str) -> Result<D> {
        let request = self.build_request(HttpMethod::Put, path, Vec::new(), None)?;
        let response = self.send(request)?;
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return decode_empty();
        }
        decode_body(&response.body)
    }

    pub fn delete(&self, path: &str, option: Option<&QueryOption>) -> Result<()> {
        let query = option.map(QueryOption::to_query).unwrap_or_default();
        let request = self.build_request(HttpMethod::Delete, path, query, None)?;
        check_status(&self.send(request)?)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "sending crm request");

        let response = self.transport.execute(request).map_err(|e| {
            warn!(%method, %url, error = %e, "crm transport failed");
            Error::Transport(e)
        })?;

        debug!(%method, %url, status = response.status, "received crm response");
        if !response.is_success() {
            warn!(%method, %url, status = response.status, "crm api returned error status");
        }
        Ok(response)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String> {
    serde_json::to_string(body).map_err(Error::Encode)
}

/// Map non-2xx status codes to the matching `Error` variant.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let err = ApiError::new(response.status, response.body.clone());
    if response.status == 404 {
        return Err(Error::NotFound(err));
    }
    Err(Error::Api(err))
}

/// An empty body is malformed here; only `put_empty` tolerates one.
fn decode_body<D: DeserializeOwned>(body: &str) -> Result<D> {
    serde_json::from_str(body).map_err(Error::Decode)
}

/// `null`, falling back to `{}`.
fn decode_empty<D: DeserializeOwned>() -> Result<D> {
    serde_json::from_value(Value::Null)
        .or_else(|_| serde_json::from_value(Value::Object(Map::new())))
        .map_err(Error::Decode)
}
