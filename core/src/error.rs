//! Error types for the gateway.
//!
//! # Design
//! Only failures upstream of validation are errors. A response that decodes
//! but does not match its schema is an expected outcome and comes back as
//! `ValidationResult::Failure`, never as a `GatewayError`.

use thiserror::Error;

/// Failure reported by a `Transport` when no complete response came back.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be completed (DNS, refused connection, reset).
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The status line arrived but the body exceeded the transport's limit.
    #[error("response from {url} (HTTP {status}) exceeds the {limit} byte body limit")]
    BodyTooLarge { url: String, status: u16, limit: u64 },

    /// The request could not be handed to a worker, or the worker died
    /// before returning.
    #[error("transport worker failed: {0}")]
    Worker(String),
}

/// Errors returned by a bound verb call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The transport failed; the error is passed through untouched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not valid JSON.
    #[error("response from {url} (HTTP {status}) is not valid JSON: {source}")]
    Decode {
        url: String,
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("request body could not be serialized: {0}")]
    Serialization(#[source] serde_json::Error),
}
