//! Transport trait and the request/response values that cross it
//!
//! Both values are plain data. Middleware stages receive an [`HttpRequest`] by value and
//! forward a request derived from it, so a stage can never observe another stage
//! mutating a request it still holds.

use crate::error::Result;
use ::http::Method;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

/// Outgoing HTTP request
///
/// Represents a fully resolved HTTP request to be sent via a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,

    /// Absolute request URL, without the query string
    pub url: String,

    /// Request headers, names stored lowercase
    pub headers: HashMap<String, String>,

    /// Query string pairs, in insertion order
    pub query: Vec<(String, String)>,

    /// Request body (optional)
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a new HTTP request
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Add a header to the request, replacing any previous value for that name
    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Append a query string pair
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body from string
    pub fn with_text_body(self, text: impl Into<String>) -> Self {
        self.with_body(text.into())
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// HTTP response
///
/// Represents an HTTP response received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers, names stored lowercase
    pub headers: HashMap<String, String>,

    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Create a response with the given status and no headers or body
    pub fn with_status(status: u16) -> Self {
        Self::new(status, HashMap::new(), Bytes::new())
    }

    /// Add a header to the response, replacing any previous value for that name
    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Replace the response body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as a string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// The one operation the request pipeline needs from the network layer.
///
/// Implementations must tolerate many outstanding calls at once: a single transport is
/// shared by every request issued through a client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTTP request and receive a response
    ///
    /// Any response with a status line, whatever the status code, is `Ok`. `Err` means
    /// no usable response was obtained.
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Short name used in log output
    fn name(&self) -> &'static str {
        "custom"
    }
}
