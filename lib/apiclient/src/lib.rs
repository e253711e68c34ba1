//! Thin helper for typed REST API clients.
//!
//! A [`Client`] resolves paths against a base URL, encodes query structs and
//! JSON bodies, attaches credentials through a per-client [`Authenticator`],
//! and reports every failure as one [`Error`] carrying the request path, HTTP
//! status, raw response body and cause.
//!
//! # Example
//!
//! ```ignore
//! use apiclient::prelude::*;
//!
//! #[derive(Debug, Serialize)]
//! struct ListUsers {
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     cursor: Option<String>,
//!     #[serde(rename = "per_page")]
//!     limit: u32,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = Client::builder("https://api.example.com/v1/")
//!     .authenticator(BearerToken::new("my-token"))
//!     .validator(RejectNonSuccess)
//!     .build()?;
//!
//! let query = ListUsers { cursor: None, limit: 25 };
//! let users: Vec<User> = client
//!     .call(Method::GET, "users", None::<&()>, Some(&query))
//!     .await?;
//! ```
//!
//! # Transports
//!
//! Clients built without a transport share [`HyperTransport::shared`]. Any
//! [`Transport`] can be supplied instead, and [`ServiceTransport`] adapts a
//! tower service (handy for tests).
//!
//! # Traffic dumps
//!
//! With [`ClientBuilder::dump_traffic`] enabled, full requests and responses
//! are emitted as `tracing` events with target [`DUMP_TARGET`]. Sensitive
//! header values are redacted.

mod auth;
mod client;
mod config;
mod connector;
mod dump;
pub mod middleware;
pub mod prelude;
mod transport;
mod validate;

pub use auth::{BasicAuth, BearerToken, HeaderAuth, NoAuth};
pub use client::{Client, ClientBuilder};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use dump::DUMP_TARGET;
pub use transport::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceTransport};
pub use validate::{RejectNonSuccess, UnexpectedStatus};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use apiclient_core::{
    APPLICATION_JSON, AuthFn, Authenticator, BoxError, ByteStream, Cause, Error, HookError,
    Request, RequestBuilder, Response, ResponseHead, ResponseValidator, Result, Transport,
    TransportError, TransportFuture, TransportResponse, ValidatorFn, auth_fn, from_json,
    to_json, to_query_string, validator_fn,
};

// Re-export http types for methods, status codes and headers
pub use apiclient_core::{HeaderMap, HeaderValue, Method, StatusCode, header};
