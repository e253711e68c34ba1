//! The REST client: request building and response handling.

use std::sync::Arc;
use std::time::Instant;

use apiclient_core::{
    APPLICATION_JSON, Authenticator, Cause, Error, HeaderValue, Method, PartialBody, Request,
    RequestBuilder, Response, ResponseValidator, Result, Transport, from_json, header, read_body,
};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::HyperTransport;
use crate::dump::{self, DUMP_TARGET};

/// A typed REST API client.
///
/// Resolves paths against a base URL, sends JSON, attaches credentials with
/// the registered [`Authenticator`], and turns every failure into one
/// [`Error`] carrying the path, status, raw body and cause.
///
/// Paths are resolved like links in a document: with a base of
/// `https://api.example.com/v1/`, `users` becomes `/v1/users` while `/users`
/// replaces the whole path. A base without a trailing slash drops its last
/// segment when joined.
///
/// Cloning is cheap; clones share the transport and hooks.
///
/// # Example
///
/// ```ignore
/// use apiclient::{BearerToken, Client, Method};
///
/// #[derive(serde::Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// let client = Client::builder("https://api.example.com/v1/")
///     .authenticator(BearerToken::new("my-token"))
///     .build()?;
///
/// let user: User = client
///     .call(Method::GET, "users/42", None::<&()>, None::<&()>)
///     .await?;
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: Url,
    authenticator: Option<Arc<dyn Authenticator>>,
    validator: Option<Arc<dyn ResponseValidator>>,
    dump_traffic: bool,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_validator", &self.validator.is_some())
            .field("dump_traffic", &self.dump_traffic)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client using the process-wide [`HyperTransport::shared`].
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Create a client sending through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn with_transport(transport: impl Transport + 'static, base_url: &str) -> Result<Self> {
        Self::builder(base_url).transport(transport).build()
    }

    /// Start configuring a client.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// The URL paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether requests and responses are dumped to [`DUMP_TARGET`].
    #[must_use]
    pub const fn dump_traffic(&self) -> bool {
        self.dump_traffic
    }

    /// Set the authenticator, replacing any previous one.
    ///
    /// Clones made before this call keep their authenticator.
    pub fn register_authenticator(&mut self, authenticator: impl Authenticator + 'static) {
        self.authenticator = Some(Arc::new(authenticator));
    }

    /// Set the response validator, replacing any previous one.
    pub fn register_validator(&mut self, validator: impl ResponseValidator + 'static) {
        self.validator = Some(Arc::new(validator));
    }

    /// Enable or disable traffic dumps.
    pub const fn set_dump_traffic(&mut self, enabled: bool) {
        self.dump_traffic = enabled;
    }

    // ========================================================================
    // Request building
    // ========================================================================

    /// Start a request to `path`, resolved against the base URL.
    ///
    /// `Accept` and `Content-Type` are set to `application/json`. Finish the
    /// builder with [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// Returns an error with a URL cause if `path` cannot be resolved.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder<Bytes>> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| Error::without_response(path, Cause::from(err)))?;

        Ok(Request::builder(method, url)
            .header(header::ACCEPT, HeaderValue::from_static(APPLICATION_JSON))
            .header(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)))
    }

    /// Authenticate a request started with [`request`](Self::request).
    ///
    /// # Errors
    ///
    /// Returns an error with a configuration cause when no authenticator is
    /// registered, or an authentication cause when the authenticator fails.
    pub fn prepare(&self, builder: RequestBuilder<Bytes>) -> Result<Request<Bytes>> {
        let mut request = builder.build();

        let Some(authenticator) = &self.authenticator else {
            return Err(Error::without_response(
                request.path(),
                Cause::configuration("no authenticator registered"),
            ));
        };
        if let Err(err) = authenticator.authenticate(&mut request) {
            return Err(Error::without_response(request.path(), Cause::authentication(err)));
        }

        if self.dump_traffic {
            info!(target: DUMP_TARGET, "{}", dump::request(&request));
        }
        debug!(method = %request.method(), url = %request.url(), "request built");

        Ok(request)
    }

    /// Build an authenticated JSON request.
    ///
    /// `query` replaces any query string present in `path`. A `None` body
    /// sends no payload.
    ///
    /// # Errors
    ///
    /// Returns an error with status 0 and an empty body if the path, query or
    /// body cannot be encoded, or if authentication fails.
    pub fn build_request<B, Q>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Option<&Q>,
    ) -> Result<Request<Bytes>>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let mut builder = self.request(method, path)?;
        let resolved = builder.url().path().to_owned();

        if let Some(query) = query {
            builder = builder
                .query(query)
                .map_err(|cause| Error::without_response(resolved.as_str(), cause))?;
        }
        if let Some(body) = body {
            builder = builder
                .json(body)
                .map_err(|cause| Error::without_response(resolved.as_str(), cause))?;
        }

        self.prepare(builder)
    }

    // ========================================================================
    // Response handling
    // ========================================================================

    /// Send a request and buffer the response.
    ///
    /// A non-2xx status is not an error unless the validator says so.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, body read failure or
    /// validator rejection.
    pub async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let (response, ()) = self.round_trip(request, |_| Ok(())).await?;
        Ok(response)
    }

    /// Send a request and decode the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus a decode cause when the body does
    /// not match `T`. A validator rejection replaces a decode failure.
    pub async fn execute_json<T>(&self, request: Request<Bytes>) -> Result<(Response<Bytes>, T)>
    where
        T: DeserializeOwned,
    {
        self.round_trip(request, from_json::<T>).await
    }

    /// Build, send and decode in one call.
    ///
    /// # Errors
    ///
    /// Any error from [`build_request`](Self::build_request) or
    /// [`execute_json`](Self::execute_json).
    pub async fn call<B, Q, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Option<&Q>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, body, query)?;
        let (_, value) = self.execute_json(request).await?;
        Ok(value)
    }

    async fn round_trip<T, F>(
        &self,
        request: Request<Bytes>,
        decode: F,
    ) -> Result<(Response<Bytes>, T)>
    where
        F: FnOnce(&[u8]) -> std::result::Result<T, Cause>,
    {
        let method = request.method().clone();
        let path = request.path().to_owned();
        let start = Instant::now();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, path = %path, error = %err, "transport failed");
                return Err(Error::without_response(path, Cause::Transport(err)));
            }
        };

        let (head, stream) = response.into_parts();
        let body = match read_body(stream).await {
            Ok(body) => body,
            Err(PartialBody { bytes, error }) => {
                warn!(
                    %method,
                    path = %path,
                    status = head.status(),
                    error = %error,
                    "body read failed"
                );
                return Err(Error::new(
                    path,
                    head.status(),
                    String::from_utf8_lossy(&bytes),
                    Cause::BodyRead(error),
                ));
            }
        };

        if self.dump_traffic {
            info!(target: DUMP_TARGET, "{}", dump::response(&head, &body));
        }

        let mut outcome = decode(&body);
        if let Some(validator) = &self.validator
            && let Err(err) = validator.validate(&head, &body)
        {
            outcome = Err(Cause::validation(err));
        }

        // Saturating conversion to u64 (truncates after ~584 million years)
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(value) => {
                debug!(
                    %method,
                    path = %path,
                    status = head.status(),
                    elapsed_ms,
                    "request completed"
                );
                Ok((Response::new(head, body), value))
            }
            Err(cause) => {
                let error = Error::new(path, head.status(), String::from_utf8_lossy(&body), cause);
                warn!(%method, elapsed_ms, error = %error, "request failed");
                Err(error)
            }
        }
    }
}

/// Builder for [`Client`].
#[must_use]
pub struct ClientBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    validator: Option<Arc<dyn ResponseValidator>>,
    dump_traffic: bool,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("has_transport", &self.transport.is_some())
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_validator", &self.validator.is_some())
            .field("dump_traffic", &self.dump_traffic)
            .finish()
    }
}

impl ClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            transport: None,
            authenticator: None,
            validator: None,
            dump_traffic: false,
        }
    }

    /// Send through `transport` instead of the shared [`HyperTransport`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the authenticator.
    pub fn authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Set the response validator.
    pub fn validator(mut self, validator: impl ResponseValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Dump full requests and responses as `tracing` events.
    pub fn dump_traffic(mut self, enabled: bool) -> Self {
        self.dump_traffic = enabled;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error with a URL cause if the base URL is malformed.
    pub fn build(self) -> Result<Client> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|err| Error::without_response(self.base_url.as_str(), Cause::from(err)))?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HyperTransport::shared()),
        };

        Ok(Client {
            transport,
            base_url,
            authenticator: self.authenticator,
            validator: self.validator,
            dump_traffic: self.dump_traffic,
        })
    }
}
