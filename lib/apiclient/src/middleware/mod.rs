//! Tower middleware for [`HyperTransport`](crate::HyperTransport).
//!
//! Layers wrap the raw hyper service and see every exchange before the
//! client reads the body. They are added through
//! [`HyperTransportBuilder::layer`](crate::HyperTransportBuilder::layer);
//! the first layer added is the innermost.
//!
//! - [`LoggingLayer`] - logs requests and response heads using `tracing`
//!
//! # Example
//!
//! ```ignore
//! use apiclient::HyperTransport;
//! use apiclient::middleware::LoggingLayer;
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
