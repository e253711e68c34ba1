//! The transport seam.
//!
//! A [`Transport`] sends a fully built request and resolves once the response
//! head is available. The body is handed back as a stream so the caller
//! controls buffering and release.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, TransportError, TransportResponse};

/// Future returned by [`Transport::send`].
pub type TransportFuture =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'static>>;

/// Executes HTTP requests.
///
/// The trait is object safe so clients can share one transport as
/// `Arc<dyn Transport>`.
///
/// # Example
///
/// ```
/// use apiclient_core::{
///     Request, ResponseHead, Transport, TransportFuture, TransportResponse,
/// };
/// use bytes::Bytes;
///
/// /// Answers every request with `204 No Content`.
/// struct NoContent;
///
/// impl Transport for NoContent {
///     fn send(&self, _request: Request<Bytes>) -> TransportFuture {
///         Box::pin(async {
///             Ok(TransportResponse::from_bytes(
///                 ResponseHead::new(204, Default::default()),
///                 Bytes::new(),
///             ))
///         })
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Send the request and resolve with the response head and body stream.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was obtained:
    /// - Network errors
    /// - TLS errors
    /// - Transport-level timeouts
    /// - Requests that cannot be encoded
    fn send(&self, request: Request<Bytes>) -> TransportFuture;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: Request<Bytes>) -> TransportFuture {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: Request<Bytes>) -> TransportFuture {
        (**self).send(request)
    }
}
