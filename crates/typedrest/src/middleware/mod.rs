//! HTTP middleware for request/response processing
//!
//! A middleware stage wraps "the rest of the chain". It receives the request and a
//! [`Next`] cursor, may rewrite the request, decides whether to call `next.run(..)`,
//! and may rewrite the response or error that comes back.
//!
//! Stages are kept in a [`MiddlewareChain`] in the order they were added. The last one
//! added is the outermost: it sees the request first and the response last. The
//! innermost step is always the transport; nothing can sit below it.
//!
//! ```text
//! add(M1); add(M2);
//!
//!   request  ──▶ M2 ──▶ M1 ──▶ transport
//!   response ◀── M2 ◀── M1 ◀──
//! ```
//!
//! # Example
//!
//! ```rust
//! use typedrest::middleware::{Middleware, Next};
//! use typedrest::{HttpRequest, HttpResponse, Result};
//!
//! struct RequestId;
//!
//! #[async_trait::async_trait]
//! impl Middleware for RequestId {
//!     fn name(&self) -> &'static str {
//!         "request-id"
//!     }
//!
//!     async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
//!         let request = request.with_header("x-request-id", "generated-id");
//!         next.run(request).await
//!     }
//! }
//! ```

mod headers;
mod logging;
mod rate_limit;
mod retry;

pub use headers::{BearerAuthMiddleware, DefaultHeadersMiddleware};
pub use logging::TracingMiddleware;
pub use rate_limit::RateLimitMiddleware;
pub use retry::{RetryMiddleware, RetryPolicy, RetryPolicyBuilder};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use typedrest_transport::{HttpRequest, HttpResponse, Transport};

use crate::error::{Error, Result};

/// A boxed, sendable future, as returned by closure middleware.
pub type BoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;

/// Trait for HTTP middleware.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Name used in log output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Process one request.
    ///
    /// Call `next.run(request)` to continue down the chain, or return without calling it
    /// to short-circuit. `next` is `Copy`, so it may be run more than once.
    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse>;
}

/// Cursor over the stages that have not run yet.
///
/// Holds no per-request state, only borrowed views of the chain snapshot and the
/// transport, which is why it is `Copy`.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Middleware>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub(crate) fn new(stages: &'a [Arc<dyn Middleware>], transport: &'a dyn Transport) -> Self {
        Self { stages, transport }
    }

    /// Run the rest of the chain.
    ///
    /// With no stages left this sends the request through the transport; a transport
    /// failure comes back as [`Error::Transport`].
    pub async fn run(self, request: HttpRequest) -> Result<HttpResponse> {
        match self.stages.split_last() {
            Some((stage, inner)) => {
                let next = Next {
                    stages: inner,
                    transport: self.transport,
                };
                stage.handle(request, next).await
            }
            None => self
                .transport
                .send_http(request)
                .await
                .map_err(Error::Transport),
        }
    }

    /// Number of stages between this cursor and the transport.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.stages.len())
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// Ordered list of middleware stages, in the order they were added.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create an empty chain (requests go straight to the transport).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage as the new outermost wrapper.
    pub fn push(&mut self, stage: Arc<dyn Middleware>) {
        self.stages.push(stage);
    }

    /// Copy of this chain with `stage` added as the outermost wrapper.
    pub fn with(&self, stage: Arc<dyn Middleware>) -> Self {
        let mut chain = self.clone();
        chain.push(stage);
        chain
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names, outermost first (the order a request visits them).
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().rev().map(|stage| stage.name()).collect()
    }

    /// Cursor at the outermost stage, i.e. the chain head.
    pub fn head<'a>(&'a self, transport: &'a dyn Transport) -> Next<'a> {
        Next::new(&self.stages, transport)
    }

    /// Run `request` through every stage and the transport.
    pub async fn dispatch(
        &self,
        transport: &dyn Transport,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        self.head(transport).run(request).await
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("stages", &self.names())
            .finish()
    }
}

/// Middleware built from a closure, see [`from_fn`].
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

/// Turn a closure into a middleware stage.
///
/// The closure returns a boxed future so it can borrow `next`:
///
/// ```rust
/// use typedrest::middleware::from_fn;
///
/// let stage = from_fn("add-accept", |request, next| {
///     Box::pin(async move {
///         next.run(request.with_header("accept", "application/json")).await
///     })
/// });
/// ```
pub fn from_fn<F>(name: &'static str, func: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(HttpRequest, Next<'a>) -> BoxFuture<'a, Result<HttpResponse>>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware { name, func }
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(HttpRequest, Next<'a>) -> BoxFuture<'a, Result<HttpResponse>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        (self.func)(request, next).await
    }
}
