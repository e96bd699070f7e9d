//! Error types for the typedrest client
//!
//! A sent request ends in exactly one of three failure kinds:
//!
//! - [`Error::Transport`]: no usable response was obtained
//! - [`Error::Validation`]: a 200 response whose body does not match the expected type
//! - [`Error::UnexpectedResponse`]: any status other than 200
//!
//! The remaining variants are raised before anything is sent (bad template, bad request
//! options, bad configuration) or by misuse of the blocking entry points.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use typedrest_transport::{HttpResponse, TransportError};

use crate::path::PathTemplateError;

/// Result type alias for operations that can fail with a typedrest error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the typedrest client.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not produce a response (connection, timeout, protocol).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A 200 response body did not conform to the expected type.
    #[error(
        "Response body does not match `{}`: {}",
        .diagnostics.target,
        .diagnostics.message
    )]
    Validation {
        /// Where and why decoding stopped
        diagnostics: DecodeDiagnostics,
        /// Underlying decoder error
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a status other than 200.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(UnexpectedResponse),

    /// The URL template could not be filled in.
    #[error(transparent)]
    PathTemplate(#[from] PathTemplateError),

    /// Request options could not be turned into a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A blocking entry point was called from inside an async runtime.
    #[error("Blocking request issued from within an async runtime; await the async variant instead")]
    BlockingInAsyncContext,

    /// The runtime backing the blocking entry points could not be started.
    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    /// Build a validation error for a body that failed to decode as `T`.
    pub(crate) fn validation<T: ?Sized>(source: serde_json::Error) -> Self {
        Error::Validation {
            diagnostics: DecodeDiagnostics::from_json_error::<T>(&source),
            source,
        }
    }

    /// No response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// A 200 response failed to decode.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// A non-200 response was received.
    pub fn is_unexpected_response(&self) -> bool {
        matches!(self, Error::UnexpectedResponse(_))
    }

    /// HTTP status code, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedResponse(response) => Some(response.status),
            _ => None,
        }
    }

    /// Whether the same request could succeed if sent again.
    ///
    /// Only transient transport failures qualify. The client itself never retries; this
    /// is what [`RetryMiddleware`](crate::middleware::RetryMiddleware) consults.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// A non-200 response, kept whole so the caller can inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercase
    pub headers: HashMap<String, String>,
    /// Raw response body
    pub body: Bytes,
}

impl UnexpectedResponse {
    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response body decoded as UTF-8, lossy
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl From<HttpResponse> for UnexpectedResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

impl fmt::Display for UnexpectedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_BODY: usize = 200;

        write!(f, "status {}", self.status)?;
        if !self.body.is_empty() {
            let text = self.body_text();
            match text.char_indices().nth(MAX_BODY) {
                Some((cut, _)) => write!(f, ": {}...", &text[..cut])?,
                None => write!(f, ": {}", text)?,
            }
        }
        Ok(())
    }
}

/// Field-level diagnostics for a body that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeDiagnostics {
    /// Rust type the body was decoded into
    pub target: &'static str,
    /// What kind of mismatch stopped decoding
    pub category: DecodeCategory,
    /// 1-based line of the offending input, 0 when unknown
    pub line: usize,
    /// 1-based column of the offending input, 0 when unknown
    pub column: usize,
    /// Decoder message, e.g. "missing field `name`"
    pub message: String,
}

impl DecodeDiagnostics {
    fn from_json_error<T: ?Sized>(err: &serde_json::Error) -> Self {
        use serde_json::error::Category;

        let category = match err.classify() {
            Category::Io => DecodeCategory::Io,
            Category::Syntax => DecodeCategory::Syntax,
            Category::Data => DecodeCategory::Data,
            Category::Eof => DecodeCategory::Eof,
        };

        Self {
            target: std::any::type_name::<T>(),
            category,
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Classification of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeCategory {
    /// Body is not valid JSON
    Syntax,
    /// Valid JSON of the wrong shape (missing field, wrong type)
    Data,
    /// Body ended early
    Eof,
    /// Reading the body failed
    Io,
}
