//! HTTP response handling.
//!
//! A [`Transport`](crate::Transport) yields a [`TransportResponse`]: the
//! [`ResponseHead`] plus a [`ByteStream`] body. [`read_body`] buffers the stream
//! into a [`Response`], which offers JSON/text accessors.

use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;
use http::HeaderMap;
use http::header::AsHeaderName;

use crate::{Cause, TransportError};

// ============================================================================
// Response Head
// ============================================================================

/// Status line and headers of a response, available before the body is read.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    status: u16,
    headers: HeaderMap,
}

impl ResponseHead {
    /// Creates a new response head.
    #[must_use]
    pub const fn new(status: u16, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Single header value by name, if it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

// ============================================================================
// Streamed Response
// ============================================================================

/// A response body: chunks of bytes arriving over time.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// What a [`Transport`](crate::Transport) returns once the head is received.
pub struct TransportResponse {
    head: ResponseHead,
    body: ByteStream,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

impl TransportResponse {
    /// Creates a response with a streaming body.
    #[must_use]
    pub fn new(head: ResponseHead, body: ByteStream) -> Self {
        Self { head, body }
    }

    /// Creates a response whose body is already buffered.
    #[must_use]
    pub fn from_bytes(head: ResponseHead, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(
            head,
            Box::pin(futures_util::stream::once(std::future::ready(Ok(body)))),
        )
    }

    /// Status line and headers.
    #[must_use]
    pub const fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// Consume into (head, body stream).
    #[must_use]
    pub fn into_parts(self) -> (ResponseHead, ByteStream) {
        (self.head, self.body)
    }
}

/// Bytes received before a body stream failed.
#[derive(Debug)]
pub struct PartialBody {
    /// Everything read before the failure.
    pub bytes: Bytes,
    /// The stream failure.
    pub error: TransportError,
}

/// Read a body stream to the end.
///
/// The stream is owned by this function and dropped exactly once when it
/// returns, whether reading succeeded or not.
pub async fn read_body(mut body: ByteStream) -> Result<Bytes, PartialBody> {
    let mut collected = BytesMut::new();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => collected.extend_from_slice(&chunk),
            Err(error) => {
                return Err(PartialBody {
                    bytes: collected.freeze(),
                    error,
                });
            }
        }
    }

    Ok(collected.freeze())
}

// ============================================================================
// Buffered Response
// ============================================================================

/// HTTP response with status, headers, and a buffered body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    head: ResponseHead,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub const fn new(head: ResponseHead, body: B) -> Self {
        Self { head, body }
    }

    /// Status line and headers.
    #[must_use]
    pub const fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.head.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.head.header(name)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (head, body).
    #[must_use]
    pub fn into_parts(self) -> (ResponseHead, B) {
        (self.head, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.head.is_success()
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.head.is_client_error()
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.head.is_server_error()
    }

    /// Transform the body with a function.
    pub fn map_body<F, B2>(self, f: F) -> Response<B2>
    where
        F: FnOnce(B) -> B2,
    {
        Response {
            head: self.head,
            body: f(self.body),
        }
    }
}

impl Response<Bytes> {
    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, Cause> {
        crate::from_json(&self.body)
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
