//! Request options and the response envelope.
//!
//! # Design
//! Every optional knob is an `Option`, so "not set" never has to be guessed
//! from an empty string or `false`. Payload and response body types are
//! generic and default to `serde_json::Value` for untyped use.

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::http::HttpMethod;

/// Version prefix put in front of every resource path.
pub const API_VERSION: &str = "/v2";

/// Resource path used when a request does not name one.
pub const DEFAULT_PATH: &str = "apps";

/// Query parameters understood by the Marathon API.
///
/// Only fields that are set and non-empty are encoded; `scale` is encoded as
/// `scale=true` when `Some(true)` and left out otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub cmd: Option<String>,
    pub host: Option<String>,
    pub scale: Option<bool>,
    pub callback_url: Option<String>,
}

impl QueryParams {
    /// Form-urlencode the set fields. Returns an empty string when nothing is set.
    ///
    /// Keys come out in byte order: `CallbackUrl`, `cmd`, `host`, `scale`.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(url) = non_empty(&self.callback_url) {
            serializer.append_pair("CallbackUrl", url);
        }
        if let Some(cmd) = non_empty(&self.cmd) {
            serializer.append_pair("cmd", cmd);
        }
        if let Some(host) = non_empty(&self.host) {
            serializer.append_pair("host", host);
        }
        if self.scale == Some(true) {
            serializer.append_pair("scale", "true");
        }
        serializer.finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Description of a single API call.
///
/// ```
/// use marathon_core::{HttpMethod, QueryParams, RequestOptions};
///
/// let options = RequestOptions::new()
///     .method(HttpMethod::Put)
///     .path("apps/web")
///     .params(QueryParams { scale: Some(true), ..Default::default() })
///     .body(serde_json::json!({ "instances": 3 }));
/// assert_eq!(options.resolved_path(), "/v2/apps/web?scale=true");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions<B = Value> {
    pub method: Option<HttpMethod>,
    pub path: Option<String>,
    pub params: Option<QueryParams>,
    pub body: Option<B>,
}

impl<B> Default for RequestOptions<B> {
    fn default() -> Self {
        Self {
            method: None,
            path: None,
            params: None,
            body: None,
        }
    }
}

impl<B: Serialize> RequestOptions<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// The method to send, `GET` when unset.
    pub fn resolved_method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    /// Version prefix, resource path (`apps` when unset or empty) and the
    /// encoded query string, if any parameter is set.
    pub fn resolved_path(&self) -> String {
        let resource = self
            .path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PATH);
        let mut path = format!("{API_VERSION}/{resource}");

        if let Some(params) = &self.params {
            let query = params.encode();
            if !query.is_empty() {
                path.push('?');
                path.push_str(&query);
            }
        }
        path
    }
}

/// Decoded response body together with the HTTP status code.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<R = Value> {
    pub code: u16,
    pub body: R,
}
