//! Per-client hooks.
//!
//! - [`Authenticator`] mutates every outgoing request (credentials, signatures)
//! - [`ResponseValidator`] inspects every response after its body is read
//!
//! Closures are adapted with [`auth_fn`] and [`validator_fn`].

use std::sync::Arc;

use bytes::Bytes;

use crate::{BoxError, Request, ResponseHead};

/// Adds credentials to an outgoing request.
///
/// Runs once per request, after the URL, headers and body are set.
pub trait Authenticator: Send + Sync {
    /// Mutate the request in place.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials cannot be attached; the request is
    /// not sent.
    fn authenticate(&self, request: &mut Request<Bytes>) -> Result<(), BoxError>;
}

/// Flags application-level failures in a completed response.
///
/// Typical use: an API answering `200 OK` with an error payload.
///
/// # Example
///
/// ```
/// use apiclient_core::{BoxError, ResponseHead, ResponseValidator};
///
/// #[derive(serde::Deserialize)]
/// struct Envelope {
///     #[serde(default)]
///     error: Option<String>,
/// }
///
/// struct EnvelopeValidator;
///
/// impl ResponseValidator for EnvelopeValidator {
///     fn validate(&self, _head: &ResponseHead, body: &[u8]) -> Result<(), BoxError> {
///         match serde_json::from_slice::<Envelope>(body) {
///             Ok(Envelope { error: Some(message) }) => Err(message.into()),
///             _ => Ok(()),
///         }
///     }
/// }
/// ```
pub trait ResponseValidator: Send + Sync {
    /// Inspect the response head and raw body.
    ///
    /// # Errors
    ///
    /// Returns an error to turn the response into a normalized error.
    fn validate(&self, head: &ResponseHead, body: &[u8]) -> Result<(), BoxError>;
}

impl<T: Authenticator + ?Sized> Authenticator for Arc<T> {
    fn authenticate(&self, request: &mut Request<Bytes>) -> Result<(), BoxError> {
        (**self).authenticate(request)
    }
}

impl<T: ResponseValidator + ?Sized> ResponseValidator for Arc<T> {
    fn validate(&self, head: &ResponseHead, body: &[u8]) -> Result<(), BoxError> {
        (**self).validate(head, body)
    }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// An [`Authenticator`] backed by a closure. See [`auth_fn`].
#[derive(Clone, Copy)]
pub struct AuthFn<F>(F);

impl<F> std::fmt::Debug for AuthFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFn").finish_non_exhaustive()
    }
}

/// Build an [`Authenticator`] from a closure.
///
/// # Example
///
/// ```
/// use apiclient_core::{HeaderValue, auth_fn};
///
/// let auth = auth_fn(|request| {
///     request
///         .headers_mut()
///         .insert("x-api-key", HeaderValue::from_static("secret"));
///     Ok(())
/// });
/// # let _ = auth;
/// ```
pub fn auth_fn<F>(f: F) -> AuthFn<F>
where
    F: Fn(&mut Request<Bytes>) -> Result<(), BoxError> + Send + Sync,
{
    AuthFn(f)
}

impl<F> Authenticator for AuthFn<F>
where
    F: Fn(&mut Request<Bytes>) -> Result<(), BoxError> + Send + Sync,
{
    fn authenticate(&self, request: &mut Request<Bytes>) -> Result<(), BoxError> {
        (self.0)(request)
    }
}

/// A [`ResponseValidator`] backed by a closure. See [`validator_fn`].
#[derive(Clone, Copy)]
pub struct ValidatorFn<F>(F);

impl<F> std::fmt::Debug for ValidatorFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorFn").finish_non_exhaustive()
    }
}

/// Build a [`ResponseValidator`] from a closure.
///
/// # Example
///
/// ```
/// use apiclient_core::validator_fn;
///
/// let validator = validator_fn(|head, _body| {
///     if head.status() == 429 {
///         return Err("rate limited".into());
///     }
///     Ok(())
/// });
/// # let _ = validator;
/// ```
pub fn validator_fn<F>(f: F) -> ValidatorFn<F>
where
    F: Fn(&ResponseHead, &[u8]) -> Result<(), BoxError> + Send + Sync,
{
    ValidatorFn(f)
}

impl<F> ResponseValidator for ValidatorFn<F>
where
    F: Fn(&ResponseHead, &[u8]) -> Result<(), BoxError> + Send + Sync,
{
    fn validate(&self, head: &ResponseHead, body: &[u8]) -> Result<(), BoxError> {
        (self.0)(head, body)
    }
}
