//! Transport boundary for the typedrest API client
//!
//! The request pipeline in `typedrest` never talks to the network directly. It hands a
//! fully prepared [`HttpRequest`] to a [`Transport`] and gets back an [`HttpResponse`]
//! or a [`TransportError`] meaning "no usable response was obtained".
//!
//! # Architecture
//!
//! - **Transport trait**: one async operation, `send_http`
//! - **HTTP transport**: a reqwest adapter; pooling, TLS and timeouts are reqwest's job
//! - **Error handling**: every failure to get a response maps onto [`TransportError`]
//!
//! # Usage
//!
//! ```no_run
//! use typedrest_transport::{HttpRequest, HttpTransport, Method, Transport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new(Method::GET, "https://api.example.com/pets/42")
//!     .with_header("accept", "application/json");
//! let response = transport.send_http(request).await?;
//! println!("status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod traits;

pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};

// HTTP method type shared by requests on both sides of the boundary
pub use ::http::Method;
