//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions for
//! easy glob importing:
//!
//! ```ignore
//! use apiclient::prelude::*;
//! ```

pub use crate::{
    Authenticator, BasicAuth, BearerToken, Cause, Client, ClientBuilder, Error, HeaderAuth,
    HyperTransport, Method, NoAuth, RejectNonSuccess, Request, RequestBuilder, Response,
    ResponseValidator, Result, StatusCode, auth_fn, header, validator_fn,
};
pub use serde::{Deserialize, Serialize};
