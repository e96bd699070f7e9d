//! Middleware that adds headers to outgoing requests.

use std::collections::HashMap;

use async_trait::async_trait;
use http::{HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use typedrest_transport::{HttpRequest, HttpResponse};

use super::{Middleware, Next};
use crate::error::{Error, Result};

/// Adds a fixed set of headers to every request that does not already carry them.
///
/// Headers set explicitly on a request always win.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeadersMiddleware {
    headers: HashMap<String, String>,
}

impl DefaultHeadersMiddleware {
    /// Create an empty set of default headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the name or value is not a valid HTTP header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        HeaderName::from_bytes(key_str.as_bytes())
            .map_err(|_| Error::InvalidRequest(format!("Invalid header name '{key_str}'")))?;
        HeaderValue::from_str(&value_str)
            .map_err(|_| Error::InvalidRequest(format!("Invalid value for header '{key_str}'")))?;

        self.headers.insert(key_str.to_ascii_lowercase(), value_str);
        Ok(self)
    }

    /// Whether no headers are configured.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[async_trait]
impl Middleware for DefaultHeadersMiddleware {
    fn name(&self) -> &'static str {
        "default-headers"
    }

    async fn handle(&self, mut request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        for (key, value) in &self.headers {
            if request.header(key).is_none() {
                request = request.with_header(key, value.clone());
            }
        }
        next.run(request).await
    }
}

/// Sends `Authorization: Bearer <token>` unless the request already has an
/// `authorization` header.
pub struct BearerAuthMiddleware {
    token: SecretString,
}

impl BearerAuthMiddleware {
    /// Create the middleware from a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into().into_boxed_str()),
        }
    }

    /// Create the middleware from an already wrapped secret.
    pub fn from_secret(token: SecretString) -> Self {
        Self { token }
    }
}

impl std::fmt::Debug for BearerAuthMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthMiddleware")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Middleware for BearerAuthMiddleware {
    fn name(&self) -> &'static str {
        "bearer-auth"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let request = if request.header("authorization").is_some() {
            request
        } else {
            request.with_header(
                "authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
        };
        next.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::MiddlewareChain;
    use std::sync::{Arc, Mutex};
    use typedrest_transport::{Method, Transport};

    #[derive(Default)]
    struct Capture(Mutex<Option<HttpRequest>>);

    #[async_trait]
    impl Transport for Capture {
        async fn send_http(
            &self,
            request: HttpRequest,
        ) -> typedrest_transport::Result<HttpResponse> {
            *self.0.lock().unwrap() = Some(request);
            Ok(HttpResponse::with_status(200))
        }
    }

    impl Capture {
        fn last(&self) -> HttpRequest {
            self.0.lock().unwrap().clone().expect("no request captured")
        }
    }

    #[tokio::test]
    async fn test_default_headers_fill_gaps_only() {
        let stage = DefaultHeadersMiddleware::new()
            .header("Accept", "application/json")
            .unwrap()
            .header("x-client", "typedrest")
            .unwrap();
        let chain = MiddlewareChain::new().with(Arc::new(stage));
        let transport = Capture::default();

        let request = HttpRequest::new(Method::GET, "https://api.example.com/pets")
            .with_header("accept", "text/plain");
        chain.dispatch(&transport, request).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.header("accept"), Some("text/plain"));
        assert_eq!(sent.header("x-client"), Some("typedrest"));
    }

    #[test]
    fn test_default_headers_reject_invalid_names() {
        assert!(DefaultHeadersMiddleware::new().header("bad name", "x").is_err());
        assert!(DefaultHeadersMiddleware::new().header("x-ok", "bad\r\n").is_err());
    }

    #[tokio::test]
    async fn test_bearer_auth_adds_header() {
        let chain = MiddlewareChain::new().with(Arc::new(BearerAuthMiddleware::new("s3cret")));
        let transport = Capture::default();

        chain
            .dispatch(
                &transport,
                HttpRequest::new(Method::GET, "https://api.example.com/user/login"),
            )
            .await
            .unwrap();

        assert_eq!(transport.last().header("authorization"), Some("Bearer s3cret"));
    }

    #[tokio::test]
    async fn test_bearer_auth_keeps_explicit_authorization() {
        let chain = MiddlewareChain::new().with(Arc::new(BearerAuthMiddleware::new("s3cret")));
        let transport = Capture::default();

        let request = HttpRequest::new(Method::GET, "https://api.example.com/user/login")
            .with_header("Authorization", "Basic abc");
        chain.dispatch(&transport, request).await.unwrap();

        assert_eq!(transport.last().header("authorization"), Some("Basic abc"));
    }

    #[test]
    fn test_bearer_auth_debug_redacts_token() {
        let debug = format!("{:?}", BearerAuthMiddleware::new("s3cret"));
        assert!(!debug.contains("s3cret"));
    }
}
