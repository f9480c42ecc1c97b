//! Synchronous client core for the Marathon `/v2` REST API.
//!
//! # Overview
//! A `Client` is bound to one validated base address and one `Transport`.
//! Callers describe a call with `RequestOptions` (method, resource path,
//! query parameters, JSON payload) and get back a `Response` holding the
//! status code and the decoded body.
//!
//! # Design
//! - The client is stateless apart from `base_url` and the transport.
//! - Request assembly and response parsing are pure; only the `Transport`
//!   touches the network, so the pipeline is testable with a fake.
//! - Payload and response types are generic over serde and default to
//!   `serde_json::Value`.
//! - Endpoint-specific helpers (apps, tasks, deployments) are left to callers.
//!
//! ```no_run
//! use marathon_core::{Client, RequestOptions, Response};
//!
//! let client = Client::new("http://marathon.local:8080", None)?;
//! let info: Response = client.request(&RequestOptions::<serde_json::Value>::new().path("info"))?;
//! println!("{} {}", info.code, info.body["version"]);
//! # Ok::<(), marathon_core::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

/// TLS settings for the default transport (re-exported from `ureq`).
pub use ureq::tls;

pub use client::{Client, ClientBuilder, USER_AGENT};
pub use error::{ApiError, BoxError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{QueryParams, RequestOptions, Response, API_VERSION, DEFAULT_PATH};
