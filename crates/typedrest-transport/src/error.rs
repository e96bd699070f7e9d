//! Transport error types

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failure to obtain a usable response from the remote side.
///
/// A `TransportError` never carries an HTTP status: once a status line has been
/// received the exchange succeeded as far as the transport is concerned.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established or was dropped (refused, DNS, TLS).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request or the response body did not complete in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The exchange broke at the protocol level after the connection was up.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request could not be turned into something sendable (bad URL, bad header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other transport failure, typically raised by custom transports.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether sending the same request again could reasonably succeed.
    ///
    /// Timeouts and connection failures are transient. Protocol errors, invalid
    /// requests and I/O errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
