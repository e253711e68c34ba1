//! Built-in response validators.

use apiclient_core::{BoxError, ResponseHead, ResponseValidator, StatusCode};
use derive_more::{Display, Error};

/// Rejects every response whose status is not 2xx.
///
/// Without a validator a non-2xx response is returned to the caller as a
/// regular [`Response`](crate::Response) unless its body fails to decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectNonSuccess;

/// Error produced by [`RejectNonSuccess`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("unexpected status {status} {reason}")]
pub struct UnexpectedStatus {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase, empty for unknown codes.
    pub reason: &'static str,
}

impl UnexpectedStatus {
    /// Build the error for a status code.
    #[must_use]
    pub fn new(status: u16) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default();
        Self { status, reason }
    }
}

impl ResponseValidator for RejectNonSuccess {
    fn validate(&self, head: &ResponseHead, _body: &[u8]) -> Result<(), BoxError> {
        if head.is_success() {
            Ok(())
        } else {
            Err(UnexpectedStatus::new(head.status()).into())
        }
    }
}
