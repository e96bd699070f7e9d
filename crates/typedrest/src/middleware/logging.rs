//! Middleware that adds logging/tracing.

use async_trait::async_trait;
use typedrest_transport::{HttpRequest, HttpResponse};

use super::{Middleware, Next};
use crate::error::Result;
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};

/// Logs every request that passes through it, with its outcome and latency.
///
/// Add it last to time the whole chain, or first to time only the transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

#[async_trait]
impl Middleware for TracingMiddleware {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let metadata = RequestMetadata::from_request(&request);
        metadata.log_request();

        let timer = RequestTimer::start();
        let outcome = next.run(request).await;

        match &outcome {
            Ok(response) => {
                ResponseMetadata::from_response(response, timer.elapsed()).log_outcome(&metadata)
            }
            Err(err) => metadata.log_failure(timer.elapsed(), &err.to_string()),
        }

        outcome
    }
}
