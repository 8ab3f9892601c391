//! Verb-bound, schema-validated calls against one base URL.
//!
//! # Design
//! `Gateway` holds the frozen config and the transport behind `Arc`s, so it
//! is cheap to clone and safe to share between tasks. Each verb method binds
//! a schema and returns a small call value (`Retrieve`, `Create`, ...). The
//! call value fixes the HTTP method; invoking it runs one round-trip:
//! merge headers, assemble, request hook, send, decode, response hook,
//! validate.
//!
//! Body types follow the schema: `post` and `put` take the schema's output
//! type, `patch` takes any serializable partial, `get` and `delete` take no
//! body at all.

use std::sync::Arc;

use serde::Serialize;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::headers::merge;
use crate::http::{HeaderSet, HttpMethod};
use crate::request::assemble;
use crate::response::validate;
use crate::schema::{Schema, ValidationResult};
use crate::transport::{Transport, UreqTransport};

/// Result of a bound call: `Err` for transport, decode and serialization
/// failures, `Ok(Failure)` for a body the schema rejected.
pub type CallResult<T> = Result<ValidationResult<T>, GatewayError>;

#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, transport: impl Transport + 'static) -> Self {
        Self::shared(Arc::new(config), Arc::new(transport))
    }

    /// Gateway over the default `UreqTransport`. Its calls must be awaited
    /// inside a Tokio runtime; elsewhere they fail with
    /// `TransportError::Worker`.
    pub fn from_config(config: GatewayConfig) -> Self {
        Self::new(config, UreqTransport::new())
    }

    /// Build from a config and transport already shared elsewhere.
    pub fn shared(config: Arc<GatewayConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn get<S: Schema>(&self, schema: S) -> Retrieve<S> {
        Retrieve(self.bind(schema, HttpMethod::Get))
    }

    pub fn post<S: Schema>(&self, schema: S) -> Create<S> {
        Create(self.bind(schema, HttpMethod::Post))
    }

    pub fn put<S: Schema>(&self, schema: S) -> Replace<S> {
        Replace(self.bind(schema, HttpMethod::Put))
    }

    pub fn patch<S: Schema>(&self, schema: S) -> PartialUpdate<S> {
        PartialUpdate(self.bind(schema, HttpMethod::Patch))
    }

    pub fn delete<S: Schema>(&self, schema: S) -> Remove<S> {
        Remove(self.bind(schema, HttpMethod::Delete))
    }

    fn bind<S: Schema>(&self, schema: S, method: HttpMethod) -> Bound<S> {
        Bound {
            gateway: self.clone(),
            schema,
            method,
        }
    }
}

/// A schema and method bound to a gateway.
#[derive(Clone)]
struct Bound<S> {
    gateway: Gateway,
    schema: S,
    method: HttpMethod,
}

impl<S: Schema> Bound<S> {
    async fn invoke<B>(&self, path: &str, body: Option<&B>, headers: Option<&HeaderSet>) -> CallResult<S::Output>
    where
        B: Serialize + ?Sized,
    {
        let config = &self.gateway.config;
        let head = merge(config.base_headers(), headers, self.method);
        let prepared = assemble(config, path, head, body)?;

        tracing::debug!(
            method = %prepared.descriptor.method,
            url = %prepared.url,
            has_body = prepared.descriptor.body.is_some(),
            "dispatching request"
        );
        let response = self
            .gateway
            .transport
            .send(&prepared.url, &prepared.descriptor)
            .await?;
        tracing::debug!(url = %prepared.url, status = response.status, "received response");

        validate(&self.schema, &prepared.url, response, config.response_hook())
    }
}

/// `GET` with a bound schema.
#[derive(Clone)]
pub struct Retrieve<S>(Bound<S>);

impl<S: Schema> Retrieve<S> {
    pub async fn call(&self, path: &str, headers: Option<&HeaderSet>) -> CallResult<S::Output> {
        self.0.invoke::<()>(path, None, headers).await
    }
}

/// `POST` with a bound schema; the body has the schema's output type.
#[derive(Clone)]
pub struct Create<S>(Bound<S>);

impl<S> Create<S>
where
    S: Schema,
    S::Output: Serialize,
{
    pub async fn call(&self, path: &str, data: &S::Output, headers: Option<&HeaderSet>) -> CallResult<S::Output> {
        self.0.invoke(path, Some(data), headers).await
    }
}

/// `PUT` with a bound schema; the body has the schema's output type.
#[derive(Clone)]
pub struct Replace<S>(Bound<S>);

impl<S> Replace<S>
where
    S: Schema,
    S::Output: Serialize,
{
    pub async fn call(&self, path: &str, data: &S::Output, headers: Option<&HeaderSet>) -> CallResult<S::Output> {
        self.0.invoke(path, Some(data), headers).await
    }
}

/// `PATCH` with a bound schema.
///
/// The body is meant to be a subset of the schema's shape (an update struct
/// with optional fields, a partial JSON object). That is not checked.
#[derive(Clone)]
pub struct PartialUpdate<S>(Bound<S>);

impl<S: Schema> PartialUpdate<S> {
    pub async fn call<B>(&self, path: &str, data: &B, headers: Option<&HeaderSet>) -> CallResult<S::Output>
    where
        B: Serialize + ?Sized,
    {
        self.0.invoke(path, Some(data), headers).await
    }
}

/// `DELETE` with a bound schema.
#[derive(Clone)]
pub struct Remove<S>(Bound<S>);

impl<S: Schema> Remove<S> {
    pub async fn call(&self, path: &str, headers: Option<&HeaderSet>) -> CallResult<S::Output> {
        self.0.invoke::<()>(path, None, headers).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::error::TransportError;
    use crate::http::{RequestDescriptor, TransportResponse};
    use crate::schema::{from_fn, Passthrough, ValidationError};

    const BASE_URL: &str = "https://api.example.com";

    /// Replies with a fixed body and records every request it sees.
    struct StubTransport {
        body: Vec<u8>,
        seen: Mutex<Vec<(String, RequestDescriptor)>>,
    }

    impl StubTransport {
        fn replying(body: Value) -> Arc<Self> {
            Arc::new(Self {
                body: body.to_string().into_bytes(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<(String, RequestDescriptor)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, url: &str, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push((url.to_string(), request.clone()));
            Ok(TransportResponse {
                status: 200,
                headers: HeaderSet::new(),
                body: self.body.clone(),
            })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, url: &str, _request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
            Err(TransportError::Request {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    fn numeric_id() -> impl Schema<Output = Value> + Clone {
        from_fn(|value: Value| match value.get("id") {
            Some(id) if id.is_number() => Ok(value),
            _ => Err(ValidationError::at("id", "expected a number")),
        })
    }

    fn gateway(transport: Arc<StubTransport>) -> Gateway {
        let config = GatewayConfig::new(BASE_URL).with_header("Content-Type", "application/json");
        Gateway::shared(Arc::new(config), transport)
    }

    #[tokio::test]
    async fn get_returns_validated_body() {
        let transport = StubTransport::replying(json!({"id": 1, "title": "x"}));
        let result = gateway(transport.clone())
            .get(numeric_id())
            .call("/todos/1", None)
            .await
            .unwrap();

        assert_eq!(
            result,
            ValidationResult::Success {
                data: json!({"id": 1, "title": "x"})
            }
        );
        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "https://api.example.com/todos/1");
        assert_eq!(seen[0].1.method, HttpMethod::Get);
        assert!(seen[0].1.body.is_none());
    }

    #[tokio::test]
    async fn get_with_wrong_shape_resolves_to_failure() {
        let transport = StubTransport::replying(json!({"id": "not-a-number"}));
        let result = gateway(transport)
            .get(numeric_id())
            .call("/todos/1", None)
            .await
            .unwrap();

        let error = result.error().expect("validation should fail");
        assert!(!error.to_string().is_empty());
    }

    #[tokio::test]
    async fn post_sends_merged_headers_and_serialized_body() {
        let transport = StubTransport::replying(json!({"id": 5}));
        let call_headers = HeaderSet::from([("x-request-id", "abc")]);

        let result = gateway(transport.clone())
            .post(Passthrough)
            .call("/todos", &json!({"id": 5}), Some(&call_headers))
            .await
            .unwrap();

        assert!(result.is_success());
        let (url, request) = transport.seen().remove(0);
        assert_eq!(url, "https://api.example.com/todos");
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body.as_deref(), Some(r#"{"id":5}"#));
        assert_eq!(
            request.headers,
            HeaderSet::from([("Content-Type", "application/json"), ("x-request-id", "abc")])
        );
    }

    #[tokio::test]
    async fn each_verb_fixes_its_method() {
        let transport = StubTransport::replying(json!({}));
        let gateway = gateway(transport.clone());
        let body = json!({});

        gateway.get(Passthrough).call("/a", None).await.unwrap();
        gateway.post(Passthrough).call("/a", &body, None).await.unwrap();
        gateway.put(Passthrough).call("/a", &body, None).await.unwrap();
        gateway.patch(Passthrough).call("/a", &body, None).await.unwrap();
        gateway.delete(Passthrough).call("/a", None).await.unwrap();

        let methods: Vec<_> = transport.seen().into_iter().map(|(_, r)| r.method).collect();
        assert_eq!(
            methods,
            vec![
                HttpMethod::Get,
                HttpMethod::Post,
                HttpMethod::Put,
                HttpMethod::Patch,
                HttpMethod::Delete,
            ]
        );
    }

    #[tokio::test]
    async fn patch_accepts_a_partial_body() {
        #[derive(Serialize)]
        struct TitleOnly<'a> {
            title: &'a str,
        }

        let transport = StubTransport::replying(json!({"id": 1, "title": "new"}));
        let result = gateway(transport.clone())
            .patch(numeric_id())
            .call("/todos/1", &TitleOnly { title: "new" }, None)
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(transport.seen()[0].1.body.as_deref(), Some(r#"{"title":"new"}"#));
    }

    #[tokio::test]
    async fn transport_failure_propagates_unchanged() {
        let gateway = Gateway::new(GatewayConfig::new(BASE_URL), Unreachable);
        let err = gateway.get(Passthrough).call("/todos/1", None).await.unwrap_err();
        match err {
            GatewayError::Transport(TransportError::Request { url, message }) => {
                assert_eq!(url, "https://api.example.com/todos/1");
                assert_eq!(message, "connection refused");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn serialization_failure_skips_transport() {
        let transport = StubTransport::replying(json!({}));
        let mut body = std::collections::BTreeMap::new();
        body.insert((1, 2), "tuple keys are not JSON keys");

        let err = gateway(transport.clone())
            .patch(Passthrough)
            .call("/todos/1", &body, None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Serialization(_)));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn bound_call_is_reusable() {
        let transport = StubTransport::replying(json!({"id": 1}));
        let todo = gateway(transport.clone()).get(numeric_id());
        for path in ["/todos/1", "/todos/2"] {
            assert!(todo.call(path, None).await.unwrap().is_success());
        }
        assert_eq!(transport.seen().len(), 2);
    }
}
