//! Structured logging helpers shared by the client and its middleware
//!
//! Every request that goes through [`TracingMiddleware`](crate::middleware::TracingMiddleware)
//! is logged through this layer, so field names stay consistent across log lines.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use typedrest_transport::{HttpRequest, HttpResponse};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Resolved request URL
    pub url: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            body_size: None,
        }
    }

    /// Capture method, URL and body size of a request about to be sent
    pub fn from_request(request: &HttpRequest) -> Self {
        let metadata = Self::new(request.method.as_str(), request.url.as_str());
        match &request.body {
            Some(body) => metadata.with_body_size(body.len()),
            None => metadata,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log request being sent
    pub fn log_request(&self) {
        debug!(
            method = %self.method,
            url = %self.url,
            body_size = self.body_size,
            "Sending HTTP request"
        );
    }

    /// Log a request that produced no response
    pub fn log_failure(&self, elapsed: Duration, error: &str) {
        warn!(
            method = %self.method,
            url = %self.url,
            elapsed_ms = elapsed.as_millis(),
            error = %error,
            "HTTP request failed without a response"
        );
    }
}

/// Response metadata for structured logging
///
/// Only status 200 counts as success; every other status is logged as the
/// unexpected response the caller will receive.
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the request
    pub elapsed: Duration,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            body_size: None,
            elapsed,
        }
    }

    /// Capture status and body size of a received response
    pub fn from_response(response: &HttpResponse, elapsed: Duration) -> Self {
        Self::new(response.status, elapsed).with_body_size(response.body.len())
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Whether the client will decode this response rather than reject it
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Log as success or as an unexpected status, whichever the client will report
    pub fn log_outcome(&self, request: &RequestMetadata) {
        if self.is_success() {
            self.log_success(request);
        } else {
            self.log_error(request, "unexpected status");
        }
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            url = %request.url,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            "HTTP request succeeded"
        );
    }

    /// Log a response the caller will see as an error
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            method = %request.method,
            url = %request.url,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            error = %error,
            "HTTP request returned an error status"
        );
    }
}

/// Timer for measuring request duration
#[derive(Debug)]
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `typedrest=info`).
///
/// Returns `false` when a global subscriber was already set.
#[cfg(feature = "trace")]
pub fn init_tracing() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typedrest=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use typedrest_transport::Method;

    #[test]
    fn test_request_metadata_creation() {
        let metadata = RequestMetadata::new("GET", "https://api.example.com/pets/1");
        assert_eq!(metadata.method, "GET");
        assert_eq!(metadata.url, "https://api.example.com/pets/1");
        assert_eq!(metadata.body_size, None);
    }

    #[test]
    fn test_request_metadata_from_request() {
        let request = HttpRequest::new(Method::POST, "https://api.example.com/pet")
            .with_text_body(r#"{"name":"Rex"}"#);
        let metadata = RequestMetadata::from_request(&request);

        assert_eq!(metadata.method, "POST");
        assert_eq!(metadata.body_size, Some(14));

        let bodiless = HttpRequest::new(Method::GET, "https://api.example.com/pet/1");
        assert_eq!(RequestMetadata::from_request(&bodiless).body_size, None);
    }

    #[test]
    fn test_response_metadata_from_response() {
        let elapsed = Duration::from_millis(500);
        let response = HttpResponse::with_status(200).with_body(vec![0u8; 64]);
        let metadata = ResponseMetadata::from_response(&response, elapsed);

        assert_eq!(metadata.status, 200);
        assert_eq!(metadata.elapsed, elapsed);
        assert_eq!(metadata.body_size, Some(64));
        assert!(metadata.is_success());

        assert!(!ResponseMetadata::new(201, elapsed).is_success());
        assert!(!ResponseMetadata::new(404, elapsed).is_success());
    }

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed().as_millis() >= 10);
    }

    #[test]
    fn test_logging_without_subscriber_is_noop() {
        let request = RequestMetadata::new("GET", "/store/inventory");
        request.log_request();
        request.log_failure(Duration::from_millis(3), "connection refused");

        let response = ResponseMetadata::new(404, Duration::from_millis(3));
        response.log_success(&request);
        response.log_error(&request, "unexpected status");
        response.log_outcome(&request);
    }
}
