//! Client facade: host, transport and middleware chain behind one cloneable handle

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use tracing::debug;
use typedrest_transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

use crate::{
    config::ClientConfig,
    decode::{self, RawResponse},
    error::{Error, Result},
    middleware::{
        BearerAuthMiddleware, DefaultHeadersMiddleware, Middleware, MiddlewareChain,
        RateLimitMiddleware, RetryMiddleware,
    },
    request::ApiRequest,
};

/// Typed API client.
///
/// Resolves [`ApiRequest`]s against the host, runs them through the middleware chain
/// and the transport, and decodes 200 responses into the caller's type.
///
/// Cloning is cheap and every clone shares the same transport and chain, so one
/// client can back any number of resource wrappers.
///
/// # Example
///
/// ```rust,no_run
/// use serde::Deserialize;
/// use typedrest::{ApiClient, ApiRequest};
///
/// #[derive(Deserialize)]
/// struct Pet {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> typedrest::Result<()> {
/// let client = ApiClient::new("https://petstore.example.com/v2")?;
/// let pet: Pet = client
///     .request(ApiRequest::get("/pet/{petId}").path_param("petId", 42))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    host: Option<String>,
    transport: Arc<dyn Transport>,
    // Replaced wholesale on `add_middleware`; in-flight calls keep their snapshot
    middleware: RwLock<Arc<MiddlewareChain>>,
}

impl ApiClient {
    /// Create a client for `host` over the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `host` is not an absolute http(s) URL, or
    /// [`Error::Transport`] if the HTTP transport cannot be built.
    pub fn new(host: impl Into<String>) -> Result<Self> {
        Self::builder().host(host).build()
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Create a client from a configuration object.
    ///
    /// Installs the built-in middleware the configuration asks for, innermost first:
    /// default headers, bearer auth, rate limiting, retry.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(config.transport_config())?;

        let mut builder = Self::builder().transport(transport);
        if let Some(host) = config.host {
            builder = builder.host(host);
        }

        if !config.default_headers.is_empty() {
            let mut headers = DefaultHeadersMiddleware::new();
            for (key, value) in config.default_headers {
                headers = headers.header(key, value)?;
            }
            builder = builder.middleware(headers);
        }
        if let Some(token) = config.bearer_token {
            builder = builder.middleware(BearerAuthMiddleware::from_secret(token));
        }
        if let Some(rate_limit) = config.rate_limit {
            builder = builder.middleware(RateLimitMiddleware::with_burst(
                rate_limit.requests_per_second,
                rate_limit.burst,
            ));
        }
        if let Some(policy) = config.retry {
            builder = builder.middleware(RetryMiddleware::new(policy));
        }

        builder.build()
    }

    /// Host prefix, without a trailing slash.
    pub fn host(&self) -> Option<&str> {
        self.inner.host.as_deref()
    }

    /// Add `middleware` as the new outermost stage.
    ///
    /// Visible to every clone of this client. Requests already in flight finish with
    /// the chain they started with.
    pub fn add_middleware(&self, middleware: impl Middleware) {
        self.add_shared_middleware(Arc::new(middleware));
    }

    /// [`add_middleware`](Self::add_middleware) for a stage that is already shared.
    pub fn add_shared_middleware(&self, middleware: Arc<dyn Middleware>) {
        let mut chain = self
            .inner
            .middleware
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        debug!(middleware = middleware.name(), "Adding middleware");
        *chain = Arc::new(chain.with(middleware));
    }

    /// Installed stage names, outermost first.
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.chain().names()
    }

    fn chain(&self) -> Arc<MiddlewareChain> {
        self.inner
            .middleware
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let chain = self.chain();
        debug!(
            method = %request.method,
            url = %request.url,
            stages = chain.len(),
            transport = self.inner.transport.name(),
            "Dispatching request"
        );
        chain.dispatch(self.inner.transport.as_ref(), request).await
    }

    /// Send a prepared request and decode the 200 body as `T`.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] when no response was obtained, [`Error::UnexpectedResponse`]
    /// for any status other than 200, [`Error::Validation`] when the body does not
    /// match `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        decode::decode_json(self.dispatch(request).await?)
    }

    /// Send a prepared request that returns no value; the body of a 200 is ignored.
    pub async fn send_void(&self, request: HttpRequest) -> Result<()> {
        decode::expect_no_content(self.dispatch(request).await?)
    }

    /// Like [`send`](Self::send), keeping the response status and headers.
    pub async fn send_raw<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<RawResponse<T>> {
        decode::decode_raw(self.dispatch(request).await?)
    }

    /// Resolve `request` against the host, send it and decode the result as `T`.
    ///
    /// # Errors
    ///
    /// [`Error::PathTemplate`] or [`Error::InvalidRequest`] if the request cannot be
    /// built (nothing is sent), otherwise as [`send`](Self::send).
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let request = request.build(self.host())?;
        self.send(request).await
    }

    /// Resolve and send a request that returns no value.
    pub async fn request_void(&self, request: ApiRequest) -> Result<()> {
        let request = request.build(self.host())?;
        self.send_void(request).await
    }

    /// Resolve and send `request`, keeping the response status and headers.
    pub async fn request_raw<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<RawResponse<T>> {
        let request = request.build(self.host())?;
        self.send_raw(request).await
    }

    /// Blocking [`request`](Self::request).
    ///
    /// Runs the call on a shared background runtime and parks the calling thread
    /// until it completes.
    ///
    /// # Errors
    ///
    /// [`Error::BlockingInAsyncContext`] when called from inside a Tokio runtime,
    /// otherwise as [`request`](Self::request).
    #[cfg(feature = "blocking")]
    pub fn request_sync<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        blocking::block_on(self.request(request))?
    }

    /// Blocking [`request_void`](Self::request_void).
    #[cfg(feature = "blocking")]
    pub fn request_void_sync(&self, request: ApiRequest) -> Result<()> {
        blocking::block_on(self.request_void(request))?
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("host", &self.inner.host)
            .field("transport", &self.inner.transport.name())
            .field("middleware", &self.middleware_names())
            .finish()
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    host: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    middleware: MiddlewareChain,
}

impl ApiClientBuilder {
    /// Set the host prefix (scheme, authority and optional base path).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Use a custom transport instead of the default reqwest one.
    pub fn transport<T: Transport + 'static>(self, transport: T) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Use a transport shared with other clients.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Add a middleware stage; later calls wrap earlier ones.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an invalid host, [`Error::Transport`] if the default
    /// transport cannot be built.
    pub fn build(self) -> Result<ApiClient> {
        let host = self.host.map(|host| validate_host(&host)).transpose()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        debug!(
            host = host.as_deref().unwrap_or_default(),
            transport = transport.name(),
            stages = self.middleware.len(),
            "Building API client"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                host,
                transport,
                middleware: RwLock::new(Arc::new(self.middleware)),
            }),
        })
    }
}

impl fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("host", &self.host)
            .field("transport", &self.transport.as_ref().map(|t| t.name()))
            .field("middleware", &self.middleware)
            .finish()
    }
}

/// Check that `host` is an absolute http(s) URL and strip trailing slashes.
fn validate_host(host: &str) -> Result<String> {
    let url = url::Url::parse(host)
        .map_err(|e| Error::Config(format!("Invalid host '{host}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Invalid host '{host}': scheme must be http or https"
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::Config(format!("Invalid host '{host}': missing host")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::Config(format!(
            "Invalid host '{host}': query and fragment are not allowed"
        )));
    }

    Ok(host.trim_end_matches('/').to_string())
}

#[cfg(feature = "blocking")]
mod blocking {
    use std::future::Future;
    use std::sync::OnceLock;

    use tokio::runtime::{Builder, Handle, Runtime};

    use crate::error::{Error, Result};

    /// Drive `future` to completion from synchronous code.
    pub(super) fn block_on<F: Future>(future: F) -> Result<F::Output> {
        if Handle::try_current().is_ok() {
            return Err(Error::BlockingInAsyncContext);
        }
        Ok(runtime()?.block_on(future))
    }

    // Lives for the whole process, so it is never dropped inside an async context
    fn runtime() -> Result<&'static Runtime> {
        static RUNTIME: OnceLock<Runtime> = OnceLock::new();

        if let Some(runtime) = RUNTIME.get() {
            return Ok(runtime);
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("typedrest-blocking")
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        // A thread that lost the race drops its runtime here, outside any runtime
        Ok(RUNTIME.get_or_init(|| runtime))
    }
}
