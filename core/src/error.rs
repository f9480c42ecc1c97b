//! Error types for the Marathon API client.
//!
//! # Design
//! One variant per failure stage of a call: address validation, payload
//! serialization, transport, body read, status classification and JSON
//! decoding. `Status` and `Decode` both carry the HTTP status code; a decode
//! failure still tells the caller what the server answered.

use thiserror::Error;

/// Boxed error raised by a transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Client` and `ClientBuilder`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base address is not an absolute `http`/`https` URL.
    #[error("can't parse host {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),

    /// The response arrived but its body could not be read in full.
    #[error("reading response body failed: {0}")]
    Read(#[source] BoxError),

    /// The server answered with a status code >= 400.
    #[error("{status}: {body}")]
    Status { status: u16, body: String },

    /// The response body is not valid JSON for the requested type.
    #[error("deserialization failed (status {code}): {source}")]
    Decode {
        code: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The builder settings cannot be applied together.
    #[error("invalid client configuration: {0}")]
    Config(&'static str),
}

impl ApiError {
    /// HTTP status code of the response behind this error, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Decode { code, .. } => Some(*code),
            _ => None,
        }
    }
}
