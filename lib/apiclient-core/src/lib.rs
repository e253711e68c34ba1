//! Core types and traits for the apiclient REST helper.
//!
//! This crate provides the transport-agnostic building blocks:
//! - [`Request`] and [`RequestBuilder`] - outbound HTTP requests
//! - [`Response`], [`ResponseHead`] and [`TransportResponse`] - inbound responses
//! - [`read_body`] - buffers a streamed body, keeping partial bytes on failure
//! - [`Error`], [`Cause`] and [`Result`] - the normalized error
//! - [`Transport`] - the seam used to execute requests
//! - [`Authenticator`] and [`ResponseValidator`] - per-client hooks
//! - [`Method`], [`StatusCode`] and [`header`] - re-exported from the `http` crate

mod codec;
mod error;
mod hooks;
pub mod prelude;
mod request;
mod response;
mod transport;

pub use codec::{from_json, to_json, to_query_string};
pub use error::{BoxError, Cause, Error, HookError, Result, TransportError};
pub use hooks::{AuthFn, Authenticator, ResponseValidator, ValidatorFn, auth_fn, validator_fn};
pub use request::{Request, RequestBuilder};
pub use response::{
    ByteStream, PartialBody, Response, ResponseHead, TransportResponse, read_body,
};
pub use transport::{Transport, TransportFuture};

// Re-export http crate types for methods, status codes and headers
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};

/// MIME type used for both `Accept` and `Content-Type`.
pub const APPLICATION_JSON: &str = "application/json";
