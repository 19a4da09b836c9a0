//! Axum adapter for the replay interceptor.
//!
//! The inbound body is buffered once so both passes can see it. Each pass
//! rebuilds a request from its view, runs the rest of the router, and copies
//! the resulting status and headers into its sink while streaming the body
//! into the sink's byte output.

use std::io::Write;
use std::path::PathBuf;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;

use crate::config::ReplayConfig;
use crate::replay::interceptor::{Chain, ReplayInterceptor};
use crate::replay::sink::{LiveResponse, ResponseSink};
use crate::replay::view::{InboundRequest, RequestView};

/// Errors raised while replaying a request.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Buffering the inbound request body failed or exceeded its limit.
    #[error("request body error: {0}")]
    Body(#[source] axum::Error),
    /// Collecting a pass's response body failed or exceeded the capture limit.
    #[error("response body error: {0}")]
    ResponseBody(#[source] axum::Error),
    /// Writing to a pass's sink failed.
    #[error("sink write failed: {0}")]
    Sink(#[from] std::io::Error),
    /// The downstream chain answered with a server error.
    #[error("downstream handler failed with {status}")]
    Downstream { status: StatusCode },
}

impl IntoResponse for ReplayError {
    fn into_response(self) -> Response {
        match self {
            ReplayError::Body(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body could not be buffered for replay").into_response()
            }
            ReplayError::ResponseBody(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Response body could not be captured").into_response()
            }
            ReplayError::Sink(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Replay sink failure").into_response()
            }
            ReplayError::Downstream { status } => {
                (status, "Downstream handler failed during replay").into_response()
            }
        }
    }
}

/// The remaining middleware stack and handler, driven once per pass.
pub struct NextChain {
    next: Next,
    max_capture_bytes: usize,
}

impl NextChain {
    pub fn new(next: Next, max_capture_bytes: usize) -> Self {
        Self {
            next,
            max_capture_bytes,
        }
    }
}

impl Chain for NextChain {
    type Error = ReplayError;

    fn call<'a>(
        &'a mut self,
        request: &'a dyn RequestView,
        response: &'a mut dyn ResponseSink,
    ) -> BoxFuture<'a, Result<(), ReplayError>> {
        let next = self.next.clone();
        let limit = self.max_capture_bytes;
        tracing::debug!(url = %request.request_url(), path = %request.path_info(), "Dispatching replay pass");
        let rebuilt = rebuild_request(request);

        Box::pin(async move {
            let (parts, body) = next.run(rebuilt).await.into_parts();
            response.set_status(parts.status);
            replace_headers(&parts.headers, response.headers_mut());

            let bytes = axum::body::to_bytes(body, limit)
                .await
                .map_err(ReplayError::ResponseBody)?;
            response.output_stream().write_all(&bytes)?;

            if parts.status.is_server_error() {
                return Err(ReplayError::Downstream {
                    status: parts.status,
                });
            }
            Ok(())
        })
    }
}

/// Fresh request carrying everything the view exposes.
fn rebuild_request(view: &dyn RequestView) -> Request {
    let mut request = Request::new(Body::from(view.body().clone()));
    *request.method_mut() = view.method().clone();
    *request.uri_mut() = view.uri().clone();
    *request.version_mut() = view.version();
    *request.headers_mut() = view.headers().clone();
    *request.extensions_mut() = view.extensions().clone();
    request
}

/// Overwrite every header present in `src`, keeping multi-valued entries.
fn replace_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for name in src.keys() {
        dst.remove(name);
        for value in src.get_all(name) {
            dst.append(name.clone(), value.clone());
        }
    }
}

/// State for [`replay_middleware`].
#[derive(Debug, Clone)]
pub struct ReplayState {
    interceptor: ReplayInterceptor,
    max_body_bytes: usize,
    max_capture_bytes: usize,
    document_root: Option<PathBuf>,
}

impl ReplayState {
    pub fn from_config(config: &ReplayConfig) -> Self {
        Self {
            interceptor: ReplayInterceptor::new(config.failure_mode),
            max_body_bytes: config.max_body_bytes,
            max_capture_bytes: config.max_capture_bytes,
            document_root: config.document_root.clone(),
        }
    }

    /// Live view over a buffered request, rooted when a document root is set.
    fn inbound(&self, parts: Parts, body: Bytes) -> InboundRequest {
        let request = InboundRequest::from_parts(parts, body);
        match &self.document_root {
            Some(root) => request.with_document_root(root),
            None => request,
        }
    }
}

/// Middleware running the rest of the stack twice per request.
///
/// The client receives the status and headers set by the passes and an empty
/// body.
pub async fn replay_middleware(
    State(state): State<ReplayState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer request body for replay");
            return ReplayError::Body(e).into_response();
        }
    };

    let inbound = state.inbound(parts, body);
    let mut chain = NextChain::new(next, state.max_capture_bytes);
    let mut live = LiveResponse::new();

    match state.interceptor.intercept(&inbound, &mut live, &mut chain).await {
        Ok(report) => {
            tracing::debug!(
                path = %inbound.path_info(),
                passes = report.passes.len(),
                discarded_bytes = report.captured_bytes(),
                "Replay complete"
            );
            live.into_response()
        }
        Err(e) => {
            tracing::warn!(path = %inbound.path_info(), error = %e, "Replay aborted");
            e.into_response()
        }
    }
}
