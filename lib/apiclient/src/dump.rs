//! HTTP/1.1-style traffic dumps.
//!
//! Rendered only when a client has traffic dumps enabled, and emitted as
//! `tracing` events under [`DUMP_TARGET`]. Header values marked sensitive are
//! replaced with `<redacted>`.

use std::borrow::Cow;
use std::fmt::Write as _;

use apiclient_core::{HeaderMap, Request, ResponseHead, StatusCode};
use bytes::Bytes;

/// `tracing` target of request and response dumps.
pub const DUMP_TARGET: &str = "apiclient::dump";

const REDACTED: &str = "<redacted>";

/// Render a request: request line, `Host`, headers, blank line, body.
pub(crate) fn request(request: &Request<Bytes>) -> String {
    let url = request.url();
    let mut out = String::new();

    let _ = write!(out, "{} {}", request.method(), url.path());
    if let Some(query) = url.query() {
        let _ = write!(out, "?{query}");
    }
    out.push_str(" HTTP/1.1\n");

    if let Some(host) = url.host_str() {
        match url.port() {
            Some(port) => {
                let _ = writeln!(out, "Host: {host}:{port}");
            }
            None => {
                let _ = writeln!(out, "Host: {host}");
            }
        }
    }
    write_headers(&mut out, request.headers());
    out.push('\n');

    if let Some(body) = request.body() {
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}

/// Render a response: status line, headers, blank line, body.
pub(crate) fn response(head: &ResponseHead, body: &[u8]) -> String {
    let mut out = String::new();

    let reason = StatusCode::from_u16(head.status())
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or_default();
    let _ = writeln!(out, "HTTP/1.1 {} {reason}", head.status());
    write_headers(&mut out, head.headers());
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(body));
    out
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = if value.is_sensitive() {
            Cow::Borrowed(REDACTED)
        } else {
            String::from_utf8_lossy(value.as_bytes())
        };
        let _ = writeln!(out, "{name}: {value}");
    }
}
