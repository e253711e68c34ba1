//! Error types for apiclient.
//!
//! Every failure reaching a caller is an [`Error`]: the request path, the HTTP
//! status (0 when no response was obtained), the raw response body and the
//! underlying [`Cause`].

use derive_more::{Display, Error, From};

/// Boxed error produced by caller-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using [`crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// Transport Error
// ============================================================================

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, Display, Error)]
pub enum TransportError {
    /// Network/connection errors (refused, reset, DNS).
    #[display("connection error: {_0}")]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    Tls(#[error(not(source))] String),

    /// The transport's own deadline elapsed.
    #[display("request timeout")]
    Timeout,

    /// The request could not be turned into a wire request.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),

    /// The response body stream failed.
    #[display("body stream error: {_0}")]
    Body(#[error(not(source))] String),
}

impl TransportError {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a body stream error.
    #[must_use]
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body(message.into())
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

// ============================================================================
// Hook Error
// ============================================================================

/// Error raised by an [`Authenticator`](crate::Authenticator) or a
/// [`ResponseValidator`](crate::ResponseValidator).
///
/// Displays as the wrapped error; use [`HookError::downcast_ref`] to recover
/// the concrete type.
#[derive(Debug, Display)]
#[display("{_0}")]
pub struct HookError(BoxError);

impl HookError {
    /// Wrap a hook failure.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(error.into())
    }

    /// Borrow the concrete error if it is an `E`.
    #[must_use]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref()
    }

    /// Consume into the boxed error.
    #[must_use]
    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl std::error::Error for HookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

// ============================================================================
// Cause
// ============================================================================

/// What went wrong underneath an [`Error`].
#[derive(Debug, Display, Error, From)]
pub enum Cause {
    /// The client is missing a required hook.
    #[display("configuration error: {_0}")]
    #[from(skip)]
    Configuration(#[error(not(source))] String),

    /// Base URL or request path could not be parsed.
    #[display("invalid URL: {_0}")]
    #[from]
    Url(url::ParseError),

    /// Request body serialization failed.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonEncoding(serde_json::Error),

    /// Query parameters serialization failed.
    #[display("query serialization error: {_0}")]
    #[from]
    QueryEncoding(serde_html_form::ser::Error),

    /// The authenticator rejected the request.
    #[display("authentication error: {_0}")]
    #[from(skip)]
    Authentication(HookError),

    /// The request never produced a response.
    #[display("transport error: {_0}")]
    #[from]
    Transport(TransportError),

    /// The response body stream failed after the head was received.
    #[display("body read error: {_0}")]
    #[from(skip)]
    BodyRead(TransportError),

    /// The response body did not match the decode target.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    Decode {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// The response validator rejected the response.
    #[display("validation error: {_0}")]
    #[from(skip)]
    Validation(HookError),
}

impl Cause {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a decode error with path context.
    #[must_use]
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error from a hook failure.
    pub fn authentication(error: impl Into<BoxError>) -> Self {
        Self::Authentication(HookError::new(error))
    }

    /// Create a validation error from a hook failure.
    pub fn validation(error: impl Into<BoxError>) -> Self {
        Self::Validation(HookError::new(error))
    }
}

// ============================================================================
// Normalized Error
// ============================================================================

/// The single error type returned by apiclient operations.
///
/// Formats as `api error: <path> -> <status> <body>: <cause>`. The cause is
/// exposed through [`std::error::Error::source`] and [`Error::cause`].
#[derive(Debug, Display, Error)]
#[display("api error: {path} -> {status} {body}: {cause}")]
pub struct Error {
    path: String,
    status: u16,
    body: String,
    #[error(source)]
    cause: Cause,
}

impl Error {
    /// Create an error from all four parts.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
        cause: Cause,
    ) -> Self {
        Self {
            path: path.into(),
            status,
            body: body.into(),
            cause,
        }
    }

    /// Create an error for a call that never obtained a response.
    #[must_use]
    pub fn without_response(path: impl Into<String>, cause: Cause) -> Self {
        Self::new(path, 0, String::new(), cause)
    }

    /// Request path (escaped, without query string).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP status code, or 0 if no response was obtained.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Raw response body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Underlying cause.
    #[must_use]
    pub const fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Consume into the underlying cause.
    #[must_use]
    pub fn into_cause(self) -> Cause {
        self.cause
    }

    /// Returns `true` if a response was received.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        self.status != 0
    }

    /// Returns `true` if the transport failed before a response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.cause, Cause::Transport(_))
    }

    /// Returns `true` if the response validator rejected the response.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.cause, Cause::Validation(_))
    }

    /// Returns `true` if the body did not match the decode target.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self.cause, Cause::Decode { .. })
    }

    /// Returns `true` if the status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Returns `true` if the status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Returns `true` if the status is 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Try to decode the response body as JSON.
    ///
    /// Returns `None` when the body is empty.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct ApiMessage {
    ///     message: String,
    /// }
    ///
    /// if let Err(err) = client.execute(request).await {
    ///     if let Some(Ok(api)) = err.decode_body::<ApiMessage>() {
    ///         eprintln!("server said: {}", api.message);
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T, Cause>> {
        (!self.body.is_empty()).then(|| crate::from_json(self.body.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn error_display() {
        let err = Error::new(
            "/users/1",
            404,
            r#"{"message":"not found"}"#,
            Cause::decode("id", "missing field `id`"),
        );
        assert_eq!(
            err.to_string(),
            r#"api error: /users/1 -> 404 {"message":"not found"}: JSON deserialization error at 'id': missing field `id`"#
        );
    }

    #[test]
    fn error_without_response() {
        let err = Error::without_response(
            "/users",
            TransportError::connection("connection refused").into(),
        );
        check!(err.status() == 0);
        check!(err.body().is_empty());
        check!(!err.has_response());
        check!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "api error: /users -> 0 : transport error: connection error: connection refused"
        );
    }

    #[test]
    fn error_source_is_cause() {
        let err = Error::new("/", 500, "", Cause::configuration("no authenticator"));
        let_assert!(Some(source) = err.source());
        assert_eq!(source.to_string(), "configuration error: no authenticator");
    }

    #[test]
    fn error_status_predicates() {
        let err = Error::new("/", 404, "", Cause::validation("nope"));
        check!(err.is_not_found());
        check!(err.is_client_error());
        check!(!err.is_server_error());
        check!(err.is_validation());

        let err = Error::new("/", 503, "", Cause::validation("down"));
        check!(err.is_server_error());
        check!(!err.is_client_error());
    }

    #[test]
    fn hook_error_downcast() {
        #[derive(Debug, derive_more::Display, derive_more::Error)]
        #[display("quota exceeded")]
        struct QuotaExceeded;

        let cause = Cause::validation(QuotaExceeded);
        let_assert!(Cause::Validation(hook) = cause);
        check!(hook.downcast_ref::<QuotaExceeded>().is_some());
        assert_eq!(hook.to_string(), "quota exceeded");
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiMessage {
            message: String,
        }

        let err = Error::new(
            "/users/1",
            404,
            r#"{"message":"not found"}"#,
            Cause::validation("not found"),
        );
        let_assert!(Some(Ok(decoded)) = err.decode_body::<ApiMessage>());
        assert_eq!(
            decoded,
            ApiMessage {
                message: "not found".to_string()
            }
        );

        let err = Error::without_response("/users/1", TransportError::Timeout.into());
        check!(err.decode_body::<ApiMessage>().is_none());
    }
}
