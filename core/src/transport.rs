//! The I/O boundary of the client.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and hands back the full
//! `HttpResponse`, whatever its status code. Status classification and JSON
//! decoding stay in `client`, so a transport only reports failures where no
//! response (or no complete body) was obtained.
//!
//! `UreqTransport` is the default implementation. It wraps a `ureq::Agent`,
//! which pools connections and is cheap to clone and share between threads.

use std::fmt;
use std::time::Duration;

use ureq::http;
use ureq::tls::TlsConfig;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes HTTP requests on behalf of a `Client`.
pub trait Transport: Send + Sync {
    /// Send `request` and read the whole response body.
    ///
    /// Responses with 4xx/5xx status codes are returned as `Ok`.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// Build an agent with the given TLS settings and global per-call timeout.
    ///
    /// Without `tls` the platform defaults of `ureq` apply (rustls with the
    /// bundled web PKI roots).
    pub fn new(tls: Option<TlsConfig>, timeout: Option<Duration>) -> Self {
        let mut config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout);
        if let Some(tls) = tls {
            config = config.tls_config(tls);
        }
        Self {
            agent: config.build().new_agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = match &request.body {
            Some(body) => {
                let req = builder
                    .body(body.clone())
                    .map_err(|e| ApiError::Transport(Box::new(e)))?;
                self.agent.run(req)
            }
            None => {
                let req = builder
                    .body(())
                    .map_err(|e| ApiError::Transport(Box::new(e)))?;
                self.agent.run(req)
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(Box::new(e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::Read(Box::new(e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
