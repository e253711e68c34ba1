//! JSON and query-string codecs.

use bytes::Bytes;

use crate::{Cause, Result};

/// Serialize a value to JSON bytes.
///
/// `serde_json` never escapes HTML-sensitive characters, so `<`, `>` and `&`
/// appear verbatim in the payload.
///
/// # Example
///
/// ```
/// use apiclient_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Tag { name: String }
///
/// let tag = Tag { name: "<b>".to_string() };
/// let bytes = to_json(&tag).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"<b>"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes, Cause> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a struct to a URL-encoded query string.
///
/// Field names follow serde attributes: `#[serde(rename = "...")]` maps a
/// field to a parameter name and `#[serde(skip_serializing_if = "...")]`
/// drops empty values. `Vec<T>` fields produce repeated parameters.
///
/// # Example
///
/// ```
/// use apiclient_core::to_query_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Page {
///     #[serde(skip_serializing_if = "is_zero")]
///     page: u32,
///     limit: u32,
/// }
///
/// fn is_zero(value: &u32) -> bool { *value == 0 }
///
/// let query = to_query_string(&Page { page: 0, limit: 10 }).expect("serialize");
/// assert_eq!(query, "limit=10");
/// ```
pub fn to_query_string<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, Cause> {
    serde_html_form::to_string(value).map_err(Into::into)
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// Failures carry the path to the offending field (e.g. `user.address.city`).
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, Cause> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Cause::decode(e.path().to_string(), e.inner().to_string()))?;
    // Trailing data after the value
    deserializer
        .end()
        .map_err(|e| Cause::decode(".", e.to_string()))?;
    Ok(value)
}
