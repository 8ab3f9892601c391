//! Turns a merged request head and an optional payload into the exact
//! request handed to the transport.

use serde::Serialize;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::headers::RequestHead;
use crate::http::RequestDescriptor;

/// A descriptor paired with the URL it is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub descriptor: RequestDescriptor,
}

/// Serialize `body`, build the descriptor and run the request hook.
///
/// The URL is `base_url` followed by `path` with no normalization. Whatever
/// the hook returns is sent as is.
pub fn assemble<B>(
    config: &GatewayConfig,
    path: &str,
    head: RequestHead,
    body: Option<&B>,
) -> Result<PreparedRequest, GatewayError>
where
    B: Serialize + ?Sized,
{
    let body = body
        .map(serde_json::to_string)
        .transpose()
        .map_err(GatewayError::Serialization)?;

    let descriptor = RequestDescriptor {
        method: head.method,
        headers: head.headers,
        body,
    };

    let descriptor = match config.request_hook() {
        Some(hook) => {
            tracing::trace!(method = %descriptor.method, path, "running request hook");
            hook(descriptor)
        }
        None => descriptor,
    };

    Ok(PreparedRequest {
        url: format!("{}{}", config.base_url(), path),
        descriptor,
    })
}
