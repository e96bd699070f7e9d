//! HTTP transport implementation
//!
//! Provides a reqwest-backed client that implements the Transport trait.
//! Retries, rate limiting and auth are middleware concerns and live in `typedrest`.

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
