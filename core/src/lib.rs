//! Schema-validated HTTP gateway.
//!
//! # Overview
//! A `Gateway` is built once from a `GatewayConfig` (base URL, base headers,
//! optional request and response hooks) and a `Transport`. Its five verb
//! methods bind a `Schema` and return reusable call values; each call sends
//! one request and validates the decoded JSON body.
//!
//! ```no_run
//! use gateway_core::{Gateway, GatewayConfig, Typed};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Todo {
//!     id: u64,
//!     title: String,
//! }
//!
//! # async fn run() -> Result<(), gateway_core::GatewayError> {
//! let gateway = Gateway::from_config(
//!     GatewayConfig::new("https://jsonplaceholder.typicode.com")
//!         .with_header("Content-Type", "application/json"),
//! );
//! match gateway.get(Typed::<Todo>::new()).call("/todos/1", None).await? {
//!     gateway_core::ValidationResult::Success { data } => println!("{}", data.title),
//!     gateway_core::ValidationResult::Failure { error } => eprintln!("unexpected shape: {error}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - Validation failures are values (`ValidationResult::Failure`); transport,
//!   decode and serialization failures are `GatewayError`s.
//! - The config is frozen behind an `Arc`; a `Gateway` is cheap to clone and
//!   safe to use from many tasks at once.
//! - Hooks are synchronous so their order relative to the network call is
//!   fixed: request hook right before send, response hook right after decode.
//! - Status codes are not interpreted; a 4xx/5xx JSON body is validated like
//!   any other.

pub mod config;
pub mod error;
pub mod gateway;
pub mod headers;
pub mod http;
pub mod request;
pub mod response;
pub mod schema;
pub mod transport;

pub use config::{GatewayConfig, GatewaySettings, RequestHook, ResponseHook};
pub use error::{GatewayError, TransportError};
pub use gateway::{CallResult, Create, Gateway, PartialUpdate, Remove, Replace, Retrieve};
pub use headers::{merge, RequestHead};
pub use http::{HeaderSet, HttpMethod, RequestDescriptor, TransportResponse};
pub use request::{assemble, PreparedRequest};
pub use response::validate;
pub use schema::{from_fn, FnSchema, Passthrough, Schema, Typed, ValidationError, ValidationIssue, ValidationResult};
pub use transport::{Transport, UreqTransport, DEFAULT_BODY_LIMIT};
