//! Integration tests for `Client` using wiremock.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use apiclient::{
    BearerToken, ByteStream, Cause, Client, HeaderMap, HyperTransport, Method, NoAuth,
    RejectNonSuccess, Request, ResponseHead, Transport, TransportError, TransportFuture,
    TransportResponse, validator_fn,
};
use assert2::{check, let_assert};
use bytes::Bytes;
use futures_util::{Stream, stream};
use serde::{Deserialize, Serialize};
use wiremock::{
    Match, Mock, MockServer, ResponseTemplate,
    matchers::{body_string, header, method, path},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

#[derive(Debug, Serialize)]
struct Page {
    #[serde(skip_serializing_if = "is_zero")]
    page: u32,
    limit: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Matches requests that carry no payload at all.
struct EmptyBody;

impl Match for EmptyBody {
    fn matches(&self, request: &wiremock::Request) -> bool {
        request.body.is_empty()
    }
}

/// Matches an exact raw query string.
struct RawQuery(&'static str);

impl Match for RawQuery {
    fn matches(&self, request: &wiremock::Request) -> bool {
        request.url.query() == Some(self.0)
    }
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_raw(r#"{"message":"not found"}"#, "application/json")
}

fn client_for(server: &MockServer) -> Client {
    Client::builder(format!("{}/api/", server.uri()))
        .transport(HyperTransport::new())
        .authenticator(NoAuth)
        .build()
        .expect("valid base URL")
}

// ============================================================================
// Request building
// ============================================================================

#[tokio::test]
async fn test_get_without_body_sends_no_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(EmptyBody)
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<User>::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let users: Vec<User> = client
        .call(Method::GET, "users", None::<&()>, None::<&()>)
        .await
        .expect("users");

    check!(users.is_empty());
}

#[tokio::test]
async fn test_query_omits_empty_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(RawQuery("limit=10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<User>::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let query = Page { page: 0, limit: 10 };
    let result = client
        .call::<(), _, Vec<User>>(Method::GET, "users", None, Some(&query))
        .await;

    check!(result.is_ok());
}

#[tokio::test]
async fn test_json_body_is_not_html_escaped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("Content-Type", "application/json"))
        .and(header("Accept", "application/json"))
        .and(body_string(r#"{"name":"<b>"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(User {
            id: 1,
            name: "<b>".to_string(),
        }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body = serde_json::json!({ "name": "<b>" });
    let user: User = client
        .call(Method::POST, "users", Some(&body), None::<&()>)
        .await
        .expect("created user");

    check!(user.name == "<b>");
}

#[tokio::test]
async fn test_authenticator_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(User {
            id: 7,
            name: "Ada".to_string(),
        }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder(format!("{}/api/", mock_server.uri()))
        .transport(HyperTransport::new())
        .authenticator(BearerToken::new("secret"))
        .build()
        .expect("valid base URL");

    let user: User = client
        .call(Method::GET, "me", None::<&()>, None::<&()>)
        .await
        .expect("user");
    check!(user.id == 7);
}

#[tokio::test]
async fn test_missing_authenticator_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let base_url = format!("{}/api/", mock_server.uri());
    let client = Client::with_transport(HyperTransport::new(), &base_url)
        .expect("valid base URL");

    let result = client
        .call::<(), (), User>(Method::GET, "users", None, None)
        .await;

    let_assert!(Err(error) = result);
    check!(error.status() == 0);
    let_assert!(Cause::Configuration(_) = error.cause());
}

#[tokio::test]
async fn test_absolute_path_replaces_base_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = client
        .build_request(Method::GET, "/health", None::<&()>, None::<&()>)
        .expect("request");
    let response = client.execute(request).await.expect("response");

    check!(response.status() == 204);
}

#[tokio::test]
async fn test_custom_request_through_prepare() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/3"))
        .and(header("X-Request-Id", "abc"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder(format!("{}/api/", mock_server.uri()))
        .transport(HyperTransport::new())
        .authenticator(BearerToken::new("secret"))
        .build()
        .expect("valid base URL");

    let builder = client
        .request(Method::DELETE, "users/3")
        .expect("builder")
        .header(
            http::HeaderName::from_static("x-request-id"),
            http::HeaderValue::from_static("abc"),
        );
    let request = client.prepare(builder).expect("request");
    let response = client.execute(request).await.expect("response");

    check!(response.status() == 204);
}

// ============================================================================
// Response handling
// ============================================================================

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let client = Client::builder(format!("http://127.0.0.1:{port}/api/"))
        .transport(HyperTransport::new())
        .authenticator(NoAuth)
        .build()
        .expect("valid base URL");

    let result = client
        .call::<(), (), User>(Method::GET, "users", None, None)
        .await;

    let_assert!(Err(error) = result);
    check!(error.status() == 0);
    check!(error.path() == "/api/users");
    check!(error.body().is_empty());
    check!(error.is_transport());
}

#[tokio::test]
async fn test_not_found_with_mismatched_target_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/9"))
        .respond_with(not_found())
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .call::<(), (), User>(Method::GET, "users/9", None, None)
        .await;

    let_assert!(Err(error) = result);
    check!(error.status() == 404);
    check!(error.body() == r#"{"message":"not found"}"#);
    check!(error.path() == "/api/users/9");
    check!(error.is_decode());
    check!(error.is_not_found());
}

#[tokio::test]
async fn test_not_found_without_target_returns_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/9"))
        .respond_with(not_found())
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = client
        .build_request(Method::GET, "users/9", None::<&()>, None::<&()>)
        .expect("request");
    let response = client.execute(request).await.expect("response");

    check!(response.status() == 404);
    check!(response.text_lossy() == r#"{"message":"not found"}"#);
}

#[tokio::test]
async fn test_reject_non_success_validator() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let client = Client::builder(format!("{}/api/", mock_server.uri()))
        .transport(HyperTransport::new())
        .authenticator(NoAuth)
        .validator(RejectNonSuccess)
        .build()
        .expect("valid base URL");

    let request = client
        .build_request(Method::GET, "users/9", None::<&()>, None::<&()>)
        .expect("request");
    let_assert!(Err(error) = client.execute(request).await);

    check!(error.is_validation());
    check!(error.body() == "gone");
    let expected = "api error: /api/users/9 -> 404 gone: validation error: unexpected status 404 Not Found";
    check!(error.to_string() == expected);
}

#[tokio::test]
async fn test_validator_error_overrides_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"error":"quota exceeded"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client.register_validator(validator_fn(|_head, body| {
        if body.starts_with(br#"{"error""#) {
            Err("api reported an error".into())
        } else {
            Ok(())
        }
    }));

    let result = client
        .call::<(), (), User>(Method::GET, "users/1", None, None)
        .await;

    let_assert!(Err(error) = result);
    check!(error.status() == 200);
    let_assert!(Cause::Validation(hook) = error.cause());
    check!(hook.to_string() == "api reported an error");
}

#[tokio::test]
async fn test_dump_does_not_alter_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/1"))
        .and(header("Authorization", "Bearer secret"))
        .and(body_string(r#"{"id":1,"name":"Ada"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(User {
            id: 1,
            name: "Ada".to_string(),
        }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder(format!("{}/api/", mock_server.uri()))
        .transport(HyperTransport::new())
        .authenticator(BearerToken::new("secret"))
        .dump_traffic(true)
        .build()
        .expect("valid base URL");

    let input = User {
        id: 1,
        name: "Ada".to_string(),
    };
    let user: User = client
        .call(Method::PUT, "users/1", Some(&input), None::<&()>)
        .await
        .expect("user");

    check!(user == input);
}

#[tokio::test]
async fn test_default_shared_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = Client::new(&mock_server.uri()).expect("valid base URL");
    client.register_authenticator(NoAuth);

    let value: serde_json::Value = client
        .call(Method::GET, "/ping", None::<&()>, None::<&()>)
        .await
        .expect("pong");
    check!(value["ok"] == true);
}

// ============================================================================
// Body stream lifetime
// ============================================================================

struct CountDrops(Arc<AtomicUsize>);

impl Drop for CountDrops {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Tracked {
    inner: ByteStream,
    _guard: CountDrops,
}

impl Stream for Tracked {
    type Item = Result<Bytes, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Replies with a fixed body whose stream records when it is dropped.
struct TrackedTransport {
    status: u16,
    chunks: Vec<&'static str>,
    fail_after_chunks: bool,
    drops: Arc<AtomicUsize>,
}

impl TrackedTransport {
    fn new(status: u16, chunks: Vec<&'static str>) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        let transport = Self {
            status,
            chunks,
            fail_after_chunks: false,
            drops: Arc::clone(&drops),
        };
        (transport, drops)
    }

    fn failing(mut self) -> Self {
        self.fail_after_chunks = true;
        self
    }
}

impl Transport for TrackedTransport {
    fn send(&self, _request: Request<Bytes>) -> TransportFuture {
        let mut items: Vec<Result<Bytes, TransportError>> = self
            .chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
            .collect();
        if self.fail_after_chunks {
            items.push(Err(TransportError::body("connection reset")));
        }

        let body: ByteStream = Box::pin(Tracked {
            inner: Box::pin(stream::iter(items)),
            _guard: CountDrops(Arc::clone(&self.drops)),
        });
        let head = ResponseHead::new(self.status, HeaderMap::new());
        let response = TransportResponse::new(head, body);
        Box::pin(async move { Ok(response) })
    }
}

fn tracked_client(transport: TrackedTransport) -> Client {
    Client::builder("https://api.example.com/v1/")
        .transport(transport)
        .authenticator(NoAuth)
        .build()
        .expect("valid base URL")
}

#[tokio::test]
async fn test_body_released_once_on_success() {
    let (transport, drops) = TrackedTransport::new(200, vec![r#"{"id":1,"#, r#""name":"Ada"}"#]);
    let client = tracked_client(transport);

    let user: User = client
        .call(Method::GET, "users/1", None::<&()>, None::<&()>)
        .await
        .expect("user");

    check!(user.name == "Ada");
    check!(drops.load(Ordering::SeqCst) == 1);
}

#[tokio::test]
async fn test_body_released_once_on_decode_failure() {
    let (transport, drops) = TrackedTransport::new(200, vec!["not json"]);
    let client = tracked_client(transport);

    let result = client
        .call::<(), (), User>(Method::GET, "users/1", None, None)
        .await;

    check!(result.is_err());
    check!(drops.load(Ordering::SeqCst) == 1);
}

#[tokio::test]
async fn test_body_released_once_on_validation_failure() {
    let (transport, drops) = TrackedTransport::new(500, vec![r#"{"id":1,"name":"Ada"}"#]);
    let mut client = tracked_client(transport);
    client.register_validator(RejectNonSuccess);

    let result = client
        .call::<(), (), User>(Method::GET, "users/1", None, None)
        .await;

    let_assert!(Err(error) = result);
    check!(error.is_validation());
    check!(drops.load(Ordering::SeqCst) == 1);
}

#[tokio::test]
async fn test_body_read_failure_keeps_partial_bytes() {
    let (transport, drops) = TrackedTransport::new(200, vec![r#"{"id":"#]);
    let client = tracked_client(transport.failing());

    let result = client
        .call::<(), (), User>(Method::GET, "users/1", None, None)
        .await;

    let_assert!(Err(error) = result);
    check!(error.status() == 200);
    check!(error.body() == r#"{"id":"#);
    let_assert!(Cause::BodyRead(TransportError::Body(message)) = error.cause());
    check!(message == "connection reset");
    check!(drops.load(Ordering::SeqCst) == 1);
}
