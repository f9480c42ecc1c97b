//! Marathon API client: request assembly, invocation and response parsing.
//!
//! # Design
//! `Client` holds only the validated base address and a `Transport`; it
//! carries no mutable state between calls. A call is split the same way every
//! time:
//!
//! 1. `build_request` serializes the payload and produces an `HttpRequest`.
//! 2. The transport executes it.
//! 3. `check_status` turns a status >= 400 into `ApiError::Status`.
//! 4. `parse_response` decodes the JSON body into a `Response`.
//!
//! Steps 1, 3 and 4 are pure, so they are tested without a network.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{RequestOptions, Response};

/// Value of the `User-Agent` header sent with every request.
pub const USER_AGENT: &str = "gomarathon";

const CONTENT_TYPE: &str = "application/json";

/// Synchronous client for a Marathon `/v2` API.
///
/// The client is immutable once built; clone it or share it by reference to
/// issue calls from several threads.
#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    base_url: Url,
    transport: T,
}

impl Client {
    /// Validate `host` and build a client with the default `ureq` transport.
    ///
    /// `tls` configures trusted roots, client certificates and verification;
    /// `None` keeps the transport's defaults. No I/O happens here.
    pub fn new(host: &str, tls: Option<crate::tls::TlsConfig>) -> Result<Self, ApiError> {
        let mut builder = Client::builder(host);
        if let Some(tls) = tls {
            builder = builder.tls(tls);
        }
        builder.build()
    }

    pub fn builder(host: &str) -> ClientBuilder {
        ClientBuilder::new(host)
    }
}

impl<T: Transport> Client<T> {
    /// Build a client around an already-configured transport.
    pub fn with_transport(host: &str, transport: T) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: parse_base_url(host)?,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve `options`, perform the call and decode the JSON body into `R`.
    ///
    /// A body that is not valid JSON for `R` yields `ApiError::Decode`, which
    /// still carries the status code.
    pub fn request<B, R>(&self, options: &RequestOptions<B>) -> Result<Response<R>, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let path = options.resolved_path();
        let response = self.send(options.resolved_method(), &path, options.body.as_ref())?;
        self.parse_response(response)
    }

    /// Send one request to `path` (version prefix and query included) and
    /// return the raw response if its status is below 400.
    pub fn send<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&B>,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(method, path, payload)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.execute(&request)?;
        debug!(
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );

        check_status(response)
    }

    /// Serialize `payload` and describe the request without sending it.
    pub fn build_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&B>,
    ) -> Result<HttpRequest, ApiError> {
        let body = payload
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ApiError::Serialization)?;

        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.base_url.as_str().trim_end_matches('/')),
            headers: vec![
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
            ],
            body,
        })
    }

    /// Decode a successful response into the envelope.
    pub fn parse_response<R: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<Response<R>, ApiError> {
        let code = response.status;
        let body = serde_json::from_slice(&response.body).map_err(|source| ApiError::Decode {
            code,
            body: response.body_text(),
            source,
        })?;
        Ok(Response { code, body })
    }
}

/// Map a status code >= 400 to `ApiError::Status`, keeping the raw body.
fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.status >= 400 {
        return Err(ApiError::Status {
            status: response.status,
            body: response.body_text(),
        });
    }
    Ok(response)
}

fn parse_base_url(host: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidUrl {
        input: host.to_string(),
        reason,
    };

    let url = Url::parse(host).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Builder for a `Client`.
///
/// ```
/// use std::time::Duration;
///
/// let client = marathon_core::Client::builder("http://marathon.local:8080")
///     .timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(client.base_url().port(), Some(8080));
/// ```
pub struct ClientBuilder {
    host: String,
    tls: Option<crate::tls::TlsConfig>,
    timeout: Option<Duration>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("host", &self.host)
            .field("tls", &self.tls.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientBuilder {
    fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            tls: None,
            timeout: None,
        }
    }

    pub fn tls(mut self, tls: crate::tls::TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Upper bound for a whole call: connect, send and read. Unset by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        let base_url = parse_base_url(&self.host)?;
        Ok(Client {
            base_url,
            transport: UreqTransport::new(self.tls, self.timeout),
        })
    }

    /// Finish with a custom transport.
    ///
    /// TLS and timeout only configure the default transport; setting either
    /// before calling this is an `ApiError::Config`.
    pub fn transport<T: Transport>(self, transport: T) -> Result<Client<T>, ApiError> {
        if self.tls.is_some() || self.timeout.is_some() {
            return Err(ApiError::Config(
                "tls and timeout apply only to the default transport",
            ));
        }
        Client::with_transport(&self.host, transport)
    }
}
