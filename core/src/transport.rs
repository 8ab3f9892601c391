//! The network boundary.
//!
//! # Design
//! `Transport` is the only place the gateway waits. Anything that can turn
//! a `RequestDescriptor` into a `TransportResponse` can stand behind it: the
//! bundled `UreqTransport`, a stub in tests, or a wrapper that adds
//! timeouts, retries or cancellation around another transport.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HeaderSet, HttpMethod, RequestDescriptor, TransportResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `url` and read the whole response body.
    ///
    /// Any status code counts as a response. Fails when the request could
    /// not be completed or the body could not be read in full; the body's
    /// content is never inspected here.
    async fn send(&self, url: &str, request: &RequestDescriptor) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, url: &str, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        (**self).send(url, request).await
    }
}

/// Body size `UreqTransport` accepts unless told otherwise: 10 MiB.
pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

/// Blocking `ureq` agent driven from tokio's blocking pool.
///
/// HTTP status codes are never turned into errors. Response bodies larger
/// than the body limit (`DEFAULT_BODY_LIMIT` unless set with
/// `with_body_limit`) fail with `TransportError::BodyTooLarge`, even though
/// the status line has already arrived.
///
/// `send` must be polled inside a Tokio runtime. Polled anywhere else it
/// fails with `TransportError::Worker` instead of sending.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Use a preconfigured agent. The caller decides how it treats status
    /// codes.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Accept response bodies of up to `bytes` bytes.
    pub fn with_body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn body_limit(&self) -> u64 {
        self.body_limit
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, url: &str, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::Worker(format!("no Tokio runtime to run the request on: {e}")))?;
        let agent = self.agent.clone();
        let body_limit = self.body_limit;
        let url = url.to_string();
        let request = request.clone();
        runtime
            .spawn_blocking(move || execute(&agent, body_limit, &url, &request))
            .await
            .map_err(|e| TransportError::Worker(e.to_string()))?
    }
}

fn execute(
    agent: &ureq::Agent,
    body_limit: u64,
    url: &str,
    request: &RequestDescriptor,
) -> Result<TransportResponse, TransportError> {
    let result = match request.method {
        HttpMethod::Get => send_without_body(agent.get(url), request),
        HttpMethod::Delete => send_without_body(agent.delete(url), request),
        HttpMethod::Post => send_with_body(agent.post(url), request),
        HttpMethod::Put => send_with_body(agent.put(url), request),
        HttpMethod::Patch => send_with_body(agent.patch(url), request),
    };
    let request_failed = |e: ureq::Error| TransportError::Request {
        url: url.to_string(),
        message: e.to_string(),
    };
    let mut response = result.map_err(request_failed)?;

    let status = response.status().as_u16();
    let headers: HeaderSet = response
        .headers()
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(body_limit)
        .read_to_vec()
        .map_err(|e| match e {
            ureq::Error::BodyExceedsLimit(limit) => TransportError::BodyTooLarge {
                url: url.to_string(),
                status,
                limit,
            },
            other => request_failed(other),
        })?;

    Ok(TransportResponse { status, headers, body })
}

fn send_without_body(
    mut builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
    request: &RequestDescriptor,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    // a request hook may attach a body to a bodiless verb
    match &request.body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}

fn send_with_body(
    mut builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    request: &RequestDescriptor,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
