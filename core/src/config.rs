//! Base configuration shared by every call made through one gateway.
//!
//! # Design
//! `GatewayConfig` is built once and then frozen behind an `Arc` inside the
//! `Gateway`; nothing in a call mutates it. The serializable half (base URL
//! and headers) can also be loaded from JSON through `GatewaySettings`;
//! hooks are code and are attached afterwards with the builder methods.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::http::{HeaderSet, RequestDescriptor};

/// Rewrites a request just before it is handed to the transport.
pub type RequestHook = Arc<dyn Fn(RequestDescriptor) -> RequestDescriptor + Send + Sync>;

/// Rewrites a decoded response body just before schema validation.
pub type ResponseHook = Arc<dyn Fn(Value) -> Value + Send + Sync>;

#[derive(Clone)]
pub struct GatewayConfig {
    base_url: String,
    base_headers: Option<HeaderSet>,
    on_req: Option<RequestHook>,
    on_res: Option<ResponseHook>,
}

impl GatewayConfig {
    /// `base_url` is used verbatim as the prefix of every request path.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_headers: None,
            on_req: None,
            on_res: None,
        }
    }

    pub fn with_base_headers(mut self, headers: HeaderSet) -> Self {
        self.base_headers = Some(headers);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_headers
            .get_or_insert_with(HeaderSet::new)
            .insert(name, value);
        self
    }

    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(RequestDescriptor) -> RequestDescriptor + Send + Sync + 'static,
    {
        self.on_req = Some(Arc::new(hook));
        self
    }

    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.on_res = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn base_headers(&self) -> Option<&HeaderSet> {
        self.base_headers.as_ref()
    }

    pub fn request_hook(&self) -> Option<&RequestHook> {
        self.on_req.as_ref()
    }

    pub fn response_hook(&self) -> Option<&ResponseHook> {
        self.on_res.as_ref()
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("base_headers", &self.base_headers)
            .field("on_req", &self.on_req.is_some())
            .field("on_res", &self.on_res.is_some())
            .finish()
    }
}

/// The declarative part of a `GatewayConfig`.
///
/// ```json
/// { "base_url": "https://jsonplaceholder.typicode.com",
///   "base_headers": { "Content-Type": "application/json" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySettings {
    pub base_url: String,
    #[serde(default)]
    pub base_headers: Option<HeaderSet>,
}

impl GatewaySettings {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl From<GatewaySettings> for GatewayConfig {
    fn from(settings: GatewaySettings) -> Self {
        let config = GatewayConfig::new(settings.base_url);
        match settings.base_headers {
            Some(headers) => config.with_base_headers(headers),
            None => config,
        }
    }
}
