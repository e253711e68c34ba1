//! Built-in authenticators.
//!
//! - [`NoAuth`] - explicit opt-out for public APIs
//! - [`BearerToken`] - `Authorization: Bearer <token>`
//! - [`BasicAuth`] - `Authorization: Basic <base64(user:pass)>`
//! - [`HeaderAuth`] - a fixed header, e.g. an API key
//!
//! Credential header values are marked sensitive, so traffic dumps and
//! `Debug` output never show them.

use std::sync::Arc;

use apiclient_core::{Authenticator, BoxError, HeaderValue, Request, header};
use base64::Engine;
use bytes::Bytes;
use http::HeaderName;

/// Sends requests without credentials.
///
/// A client must have an authenticator; register this one to make the
/// absence of credentials explicit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl Authenticator for NoAuth {
    fn authenticate(&self, _request: &mut Request<Bytes>) -> Result<(), BoxError> {
        Ok(())
    }
}

fn sensitive_value(value: &str) -> Result<HeaderValue, BoxError> {
    let mut value = HeaderValue::try_from(value)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Adds an `Authorization: Bearer <token>` header.
///
/// # Example
///
/// ```
/// use apiclient::{BearerToken, Client};
///
/// let client = Client::builder("https://api.example.com/v1/")
///     .authenticator(BearerToken::new("my-secret-token"))
///     .build()?;
/// # let _ = client;
/// # Ok::<_, apiclient::Error>(())
/// ```
#[derive(Clone)]
pub struct BearerToken {
    token: Arc<str>,
}

impl BearerToken {
    /// Create a new bearer authenticator with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BearerToken {
    fn authenticate(&self, request: &mut Request<Bytes>) -> Result<(), BoxError> {
        let value = sensitive_value(&format!("Bearer {}", self.token))?;
        request.headers_mut().insert(header::AUTHORIZATION, value);
        Ok(())
    }
}

/// Adds an `Authorization: Basic <base64(user:pass)>` header.
#[derive(Clone)]
pub struct BasicAuth {
    /// Base64-encoded "username:password".
    encoded_credentials: Arc<str>,
}

impl BasicAuth {
    /// Create a new basic authenticator with the given username and password.
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        Self {
            encoded_credentials: Arc::from(encoded),
        }
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth").finish_non_exhaustive()
    }
}

impl Authenticator for BasicAuth {
    fn authenticate(&self, request: &mut Request<Bytes>) -> Result<(), BoxError> {
        let value = sensitive_value(&format!("Basic {}", self.encoded_credentials))?;
        request.headers_mut().insert(header::AUTHORIZATION, value);
        Ok(())
    }
}

/// Sets a fixed header on every request, e.g. `X-Api-Key`.
///
/// The value is checked when the request is authenticated; an invalid value
/// fails the request with an authentication cause.
#[derive(Clone)]
pub struct HeaderAuth {
    name: HeaderName,
    value: Arc<str>,
}

impl HeaderAuth {
    /// Create an authenticator setting `name: value`.
    pub fn new(name: HeaderName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Arc::from(value.into()),
        }
    }

    /// The header this authenticator sets.
    #[must_use]
    pub const fn name(&self) -> &HeaderName {
        &self.name
    }
}

impl std::fmt::Debug for HeaderAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderAuth")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Authenticator for HeaderAuth {
    fn authenticate(&self, request: &mut Request<Bytes>) -> Result<(), BoxError> {
        let value = sensitive_value(&self.value)?;
        request.headers_mut().insert(self.name.clone(), value);
        Ok(())
    }
}
