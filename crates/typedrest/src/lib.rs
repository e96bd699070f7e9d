//! # typedrest
//!
//! Runtime for generated, typed HTTP API clients:
//! - `{name}` path templates resolved against a host
//! - An onion-style middleware chain around a pluggable transport
//! - Strict response decoding (status 200 only) into serde types
//! - Three failure kinds: transport, validation, unexpected response
//! - Async entry points plus blocking ones for synchronous callers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use typedrest::{ApiClient, ApiRequest, middleware::TracingMiddleware};
//!
//! #[derive(Debug, Deserialize)]
//! struct Pet {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("https://petstore.example.com/v2")?;
//!     client.add_middleware(TracingMiddleware);
//!
//!     let pet: Pet = client
//!         .request(ApiRequest::get("/pet/{petId}").path_param("petId", 42))
//!         .await?;
//!
//!     println!("{pet:?}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{ClientConfig, RateLimitConfig};
pub use decode::RawResponse;
pub use error::{DecodeCategory, DecodeDiagnostics, Error, Result, UnexpectedResponse};
pub use path::{PathParams, PathTemplateError};
pub use request::ApiRequest;
pub use resource::Resource;

// Module declarations
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod path;
pub mod request;
pub mod resource;

// Transport boundary types
pub use typedrest_transport::{
    HttpRequest, HttpResponse, HttpTransport, HttpTransportConfig, Method, Transport,
    TransportError,
};

// Re-export key dependencies for convenience
pub use async_trait::async_trait;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use typedrest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ApiClient, ApiRequest, ClientConfig, Error, PathParams, RawResponse, Resource, Result,
        middleware::{Middleware, Next},
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
