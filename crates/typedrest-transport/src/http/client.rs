//! HTTP transport client implementation
//!
//! Implements the Transport trait over a pooled reqwest client.

use crate::error::{Result, TransportError};
use crate::traits::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace};

/// Default `user-agent` sent by [`HttpTransport`]
pub const DEFAULT_USER_AGENT: &str = concat!("typedrest/", env!("CARGO_PKG_VERSION"));

/// HTTP transport implementation
///
/// Handles HTTP requests with:
/// - Connection pooling (shared across clones)
/// - Timeout handling
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new HTTP transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Wrap an already configured reqwest client
    pub fn from_reqwest(client: ReqwestClient) -> Self {
        Self {
            client,
            timeout: HttpTransportConfig::default().timeout,
        }
    }

    /// Get a reference to the underlying reqwest client
    pub fn reqwest_client(&self) -> &ReqwestClient {
        &self.client
    }

    /// Set the per-request timeout applied on top of the client default
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            query,
            body,
        } = request;

        debug!(method = %method, url = %url, "Dispatching HTTP request");

        let mut req = self.client.request(method, &url).timeout(self.timeout);

        if !query.is_empty() {
            req = req.query(&query);
        }

        for (key, value) in &headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req.send().await.map_err(TransportError::from)?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());

        // A body that fails mid-read leaves no usable response
        let body = response.bytes().await.map_err(TransportError::from)?;

        trace!(status, body_size = body.len(), "Received HTTP response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Value of the `user-agent` header
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Flatten response headers into one string per name.
///
/// Repeated names are joined with `", "` in arrival order. Values that are not valid
/// UTF-8 are kept with replacement characters.
fn collect_headers(map: &HeaderMap) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::with_capacity(map.keys_len());
    for (key, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(key.as_str().to_string())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    headers
}
