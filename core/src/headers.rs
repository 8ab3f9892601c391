//! Header merging for a single call.

use crate::http::{HeaderSet, HttpMethod};

/// Method and merged headers of a request, before a body is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: HttpMethod,
    pub headers: HeaderSet,
}

/// Overlay `call` headers on `base` headers and pair them with `method`.
///
/// Neither input is modified. A name present in both takes the call value.
/// The method never appears among the headers.
pub fn merge(base: Option<&HeaderSet>, call: Option<&HeaderSet>, method: HttpMethod) -> RequestHead {
    let mut headers = base.cloned().unwrap_or_default();
    if let Some(call) = call {
        headers.overlay(call);
    }
    RequestHead { method, headers }
}
