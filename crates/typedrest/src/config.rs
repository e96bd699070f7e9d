//! Configuration for the API client

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use typedrest_transport::HttpTransportConfig;

use crate::middleware::RetryPolicy;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Everything needed to build an [`ApiClient`](crate::ApiClient) over the default
/// HTTP transport, including which built-in middleware to install.
///
/// # Example
///
/// ```rust
/// use typedrest::{ApiClient, ClientConfig};
/// use std::time::Duration;
///
/// let config = ClientConfig {
///     host: Some("https://petstore.example.com/v2".into()),
///     timeout: Duration::from_secs(10),
///     ..Default::default()
/// };
/// let client = ApiClient::from_config(config).unwrap();
/// assert_eq!(client.host(), Some("https://petstore.example.com/v2"));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and authority (plus optional base path) prepended to every path
    pub host: Option<String>,

    /// Default timeout for requests
    pub timeout: Duration,

    /// Timeout for establishing a connection
    pub connect_timeout: Duration,

    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,

    /// `User-Agent` header value; the transport default when unset
    pub user_agent: Option<String>,

    /// Headers added to every request that does not set them itself
    pub default_headers: HashMap<String, String>,

    /// Token sent as `Authorization: Bearer <token>`
    pub bearer_token: Option<SecretString>,

    /// Retry policy; no retries when unset
    pub retry: Option<RetryPolicy>,

    /// Client-side rate limiting; unlimited when unset
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            user_agent: None,
            default_headers: HashMap::new(),
            bearer_token: None,
            retry: None,
            rate_limit: None,
        }
    }
}

impl ClientConfig {
    /// Configuration for `host` with everything else at its default.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first, if present. Recognized:
    /// - `TYPEDREST_HOST` for the API host
    /// - `TYPEDREST_TIMEOUT` for request timeout (in seconds)
    /// - `TYPEDREST_CONNECT_TIMEOUT` for connect timeout (in seconds)
    /// - `TYPEDREST_MAX_RETRIES` to enable retries with the default policy
    /// - `TYPEDREST_BEARER_TOKEN` for bearer authentication
    /// - `TYPEDREST_USER_AGENT` for the `User-Agent` header
    ///
    /// Values that fail to parse are ignored.
    #[cfg(feature = "env")]
    pub fn from_env() -> Self {
        use std::env;

        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(host) = env::var("TYPEDREST_HOST") {
            config.host = Some(host);
        }

        if let Ok(timeout_str) = env::var("TYPEDREST_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(timeout_str) = env::var("TYPEDREST_CONNECT_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.connect_timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(max_retries_str) = env::var("TYPEDREST_MAX_RETRIES")
            && let Ok(max_retries) = max_retries_str.parse::<u32>()
        {
            config.retry = Some(RetryPolicy::builder().max_retries(max_retries).build());
        }

        if let Ok(token) = env::var("TYPEDREST_BEARER_TOKEN") {
            config.bearer_token = Some(SecretString::new(token.into_boxed_str()));
        }

        if let Ok(user_agent) = env::var("TYPEDREST_USER_AGENT") {
            config.user_agent = Some(user_agent);
        }

        config
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// Durations and the pool limit only override when `other` changed them from the
    /// default.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        if other.connect_timeout != DEFAULT_CONNECT_TIMEOUT {
            self.connect_timeout = other.connect_timeout;
        }
        if other.pool_max_idle_per_host != DEFAULT_POOL_MAX_IDLE_PER_HOST {
            self.pool_max_idle_per_host = other.pool_max_idle_per_host;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        self.default_headers.extend(other.default_headers);
        if other.bearer_token.is_some() {
            self.bearer_token = other.bearer_token;
        }
        if other.retry.is_some() {
            self.retry = other.retry;
        }
        if other.rate_limit.is_some() {
            self.rate_limit = other.rate_limit;
        }

        self
    }

    /// Settings for the default reqwest transport.
    pub fn transport_config(&self) -> HttpTransportConfig {
        let mut transport = HttpTransportConfig {
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            pool_max_idle_per_host: self.pool_max_idle_per_host,
            ..Default::default()
        };
        if let Some(user_agent) = &self.user_agent {
            transport.user_agent = user_agent.clone();
        }
        transport
    }
}

/// Configuration for client-side rate limiting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum requests per second; fractional rates such as 0.5 are allowed
    pub requests_per_second: f64,

    /// Burst size for the token bucket; 0 means one second's worth
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10.0,
            burst: 0,
        }
    }
}
