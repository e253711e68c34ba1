//! Prelude module for convenient imports.
//!
//! ```ignore
//! use apiclient_core::prelude::*;
//! ```

pub use crate::{
    Authenticator, BoxError, Cause, Error, Method, Request, RequestBuilder, Response,
    ResponseHead, ResponseValidator, Result, Transport, TransportError, auth_fn, validator_fn,
};
