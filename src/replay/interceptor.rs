//! Two-pass replay of a request through the downstream chain.
//!
//! Each pass gets a fresh [`ObservedRequest`] over the inbound request and a
//! fresh [`BufferedSink`] over the real response, built right before the pass
//! runs. Passes run strictly one after the other. Captured body bytes are
//! counted and then dropped; nothing a pass writes to its body output reaches
//! the client.
//!
//! Running business logic twice per request is observable (the identity
//! registry is consulted twice, a request counter moves by two). It is kept
//! as-is and only enabled on request.

use futures_util::future::BoxFuture;

use crate::config::FailureMode;
use crate::observability::metrics;
use crate::replay::sink::{BufferedSink, ResponseSink};
use crate::replay::view::{ObservedRequest, RequestView};

/// Number of times the chain runs per intercepted request.
pub const REPLAY_PASSES: usize = 2;

/// The remainder of request processing, as seen by the interceptor.
pub trait Chain: Send {
    type Error: Send;

    fn call<'a>(
        &'a mut self,
        request: &'a dyn RequestView,
        response: &'a mut dyn ResponseSink,
    ) -> BoxFuture<'a, Result<(), Self::Error>>;
}

/// Outcome of a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    pub pass: usize,
    pub captured_bytes: usize,
    pub succeeded: bool,
}

/// What happened across all passes of one interception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub passes: Vec<PassOutcome>,
}

impl ReplayReport {
    pub fn captured_bytes(&self) -> usize {
        self.passes.iter().map(|p| p.captured_bytes).sum()
    }
}

/// Runs the chain [`REPLAY_PASSES`] times against isolated wrappers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayInterceptor {
    failure_mode: FailureMode,
}

impl ReplayInterceptor {
    pub fn new(failure_mode: FailureMode) -> Self {
        Self { failure_mode }
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Replay `request` through `next`.
    ///
    /// `response` only ever sees metadata forwarded by the pass wrappers. In
    /// fail-fast mode the first error ends the interception and is returned
    /// as-is. In isolated mode every pass runs and the first error is returned
    /// afterwards.
    pub async fn intercept<C: Chain>(
        &self,
        request: &dyn RequestView,
        response: &mut dyn ResponseSink,
        next: &mut C,
    ) -> Result<ReplayReport, C::Error> {
        let mut report = ReplayReport::default();
        let mut first_error = None;

        for pass in 1..=REPLAY_PASSES {
            let view = ObservedRequest::new(request, pass);
            let mut sink = BufferedSink::new(&mut *response);

            let result = next.call(&view, &mut sink).await;
            let outcome = PassOutcome {
                pass,
                captured_bytes: sink.captured().len(),
                succeeded: result.is_ok(),
            };
            drop(sink);

            tracing::debug!(
                pass,
                captured_bytes = outcome.captured_bytes,
                succeeded = outcome.succeeded,
                "Replay pass finished"
            );
            metrics::record_replay_pass(outcome.succeeded, outcome.captured_bytes);
            report.passes.push(outcome);

            if let Err(e) = result {
                match self.failure_mode {
                    FailureMode::FailFast => return Err(e),
                    FailureMode::Isolated => {
                        first_error.get_or_insert(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::sink::LiveResponse;
    use crate::replay::view::InboundRequest;
    use axum::body::Bytes;
    use axum::http::{header, HeaderValue, Request, StatusCode};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Eq)]
    struct Boom(usize);

    /// Writes a JSON body and headers, optionally failing on given passes.
    #[derive(Default)]
    struct RecordingChain {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
        seen_paths: Mutex<Vec<String>>,
    }

    impl Chain for RecordingChain {
        type Error = Boom;

        fn call<'a>(
            &'a mut self,
            request: &'a dyn RequestView,
            response: &'a mut dyn ResponseSink,
        ) -> BoxFuture<'a, Result<(), Boom>> {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                self.seen_paths.lock().unwrap().push(request.path_info().to_string());

                response.set_status(StatusCode::OK);
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response.output_stream().write_all(b"{\"id\":1}").ok();
                std::fmt::Write::write_str(&mut response.writer(), "\n").ok();

                if self.fail_on.contains(&call) {
                    Err(Boom(call))
                } else {
                    Ok(())
                }
            })
        }
    }

    fn inbound() -> InboundRequest {
        let (parts, ()) = Request::builder()
            .uri("/greeting?name=Ada")
            .body(())
            .unwrap()
            .into_parts();
        InboundRequest::from_parts(parts, Bytes::new())
    }

    #[tokio::test]
    async fn test_chain_runs_twice_without_touching_body() {
        let mut chain = RecordingChain::default();
        let request = inbound();
        let mut live = LiveResponse::new();

        let report = ReplayInterceptor::default()
            .intercept(&request, &mut live, &mut chain)
            .await
            .unwrap();

        assert_eq!(chain.calls.load(Ordering::SeqCst), 2);
        assert_eq!(*chain.seen_paths.lock().unwrap(), vec!["/greeting", "/greeting"]);
        assert_eq!(report.passes.len(), 2);
        assert_eq!(report.passes[0].captured_bytes, 9);
        assert_eq!(report.captured_bytes(), 18);

        assert_eq!(live.body_writes(), 0);
        assert!(live.body().is_empty());
        assert_eq!(live.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_fail_fast_skips_second_pass() {
        let mut chain = RecordingChain {
            fail_on: vec![1],
            ..Default::default()
        };
        let request = inbound();
        let mut live = LiveResponse::new();

        let err = ReplayInterceptor::new(FailureMode::FailFast)
            .intercept(&request, &mut live, &mut chain)
            .await
            .unwrap_err();

        assert_eq!(err, Boom(1));
        assert_eq!(chain.calls.load(Ordering::SeqCst), 1);
        assert_eq!(live.body_writes(), 0);
    }

    #[tokio::test]
    async fn test_second_pass_failure_propagates() {
        let mut chain = RecordingChain {
            fail_on: vec![2],
            ..Default::default()
        };
        let request = inbound();
        let mut live = LiveResponse::new();

        let err = ReplayInterceptor::default()
            .intercept(&request, &mut live, &mut chain)
            .await
            .unwrap_err();

        assert_eq!(err, Boom(2));
        assert_eq!(chain.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_isolated_runs_every_pass() {
        let mut chain = RecordingChain {
            fail_on: vec![1, 2],
            ..Default::default()
        };
        let request = inbound();
        let mut live = LiveResponse::new();

        let err = ReplayInterceptor::new(FailureMode::Isolated)
            .intercept(&request, &mut live, &mut chain)
            .await
            .unwrap_err();

        assert_eq!(err, Boom(1));
        assert_eq!(chain.calls.load(Ordering::SeqCst), 2);
        assert_eq!(live.body_writes(), 0);
    }
}
