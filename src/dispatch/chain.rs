//! Ordered, re-entrancy-safe guard chains.
//!
//! # Responsibilities
//! - Run a route's guards strictly sequentially, in declaration order
//! - Advance only on an explicit `proceed()`, stop on a written response
//! - Contain misbehaving guards (double-proceed, silent return, hang)
//!
//! # Design Decisions
//! - A redundant `proceed()` by the same guard consumes the rest of the
//!   chain: execution jumps to the terminal handler instead of looping
//! - A guard that neither proceeds nor responds is a programming error,
//!   surfaced as an internal error rather than a hung request
//! - Each guard invocation runs under a timeout, so an awaiting-forever
//!   guard degrades to the same internal error
//! - Flow state lives per request; guards keep no cross-request state

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use super::descriptor::RequestHandler;
use crate::http::error::ApiError;

/// An authorization step gating progress toward the terminal handler.
///
/// A guard must either call [`ChainFlow::proceed`] to advance the chain or
/// terminate it by writing a response via [`ChainFlow::respond`].
#[async_trait]
pub trait Guard: Send + Sync {
    async fn handle(&self, req: &mut Request<Body>, flow: &ChainFlow);
}

/// Per-invocation flow control handed to a guard.
///
/// Fresh for every guard of every request; nothing here outlives the
/// request that created it.
#[derive(Default)]
pub struct ChainFlow {
    proceeds: AtomicUsize,
    response: Mutex<Option<Response>>,
}

impl ChainFlow {
    fn new() -> Self {
        Self::default()
    }

    /// Advance past this guard. Calling it more than once marks the whole
    /// chain as consumed (see [`GuardChain::run`]).
    pub fn proceed(&self) {
        self.proceeds.fetch_add(1, Ordering::SeqCst);
    }

    /// Terminate the chain with a rejection (or any other) response.
    pub fn respond(&self, response: impl IntoResponse) {
        let mut slot = self.response.lock().expect("chain flow poisoned");
        // First write wins; a guard responding twice keeps its first answer.
        if slot.is_none() {
            *slot = Some(response.into_response());
        }
    }

    fn proceed_count(&self) -> usize {
        self.proceeds.load(Ordering::SeqCst)
    }

    fn take_response(&self) -> Option<Response> {
        self.response.lock().expect("chain flow poisoned").take()
    }
}

/// Driver executing a compiled chain for one request.
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
    handler: Arc<dyn RequestHandler>,
    guard_timeout: Duration,
}

impl GuardChain {
    pub fn new(
        guards: Vec<Arc<dyn Guard>>,
        handler: Arc<dyn RequestHandler>,
        guard_timeout: Duration,
    ) -> Self {
        Self {
            guards,
            handler,
            guard_timeout,
        }
    }

    /// Run the chain to completion for one request.
    ///
    /// Starting at index 0: one `proceed()` advances, a written response
    /// ends the chain without the handler, a redundant `proceed()` jumps
    /// straight to the handler. Past the last guard the terminal handler
    /// runs.
    pub async fn run(&self, mut req: Request<Body>) -> Result<Response, ApiError> {
        let mut index = 0;
        while index < self.guards.len() {
            let flow = ChainFlow::new();
            let outcome =
                tokio::time::timeout(self.guard_timeout, self.guards[index].handle(&mut req, &flow))
                    .await;
            if outcome.is_err() {
                return Err(ApiError::internal(format!(
                    "guard {index} exceeded its {}ms budget",
                    self.guard_timeout.as_millis()
                )));
            }

            // A rejection ends the chain regardless of proceed calls.
            if let Some(response) = flow.take_response() {
                return Ok(response);
            }

            match flow.proceed_count() {
                0 => {
                    return Err(ApiError::internal(format!(
                        "guard {index} neither proceeded nor responded"
                    )))
                }
                1 => index += 1,
                // Redundant proceed: the chain is already consumed.
                _ => break,
            }
        }

        self.handler.handle(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::descriptor::handler_fn;
    use axum::http::StatusCode;
    use std::sync::atomic::AtomicBool;

    struct Proceeds;
    #[async_trait]
    impl Guard for Proceeds {
        async fn handle(&self, _req: &mut Request<Body>, flow: &ChainFlow) {
            flow.proceed();
        }
    }

    struct Rejects;
    #[async_trait]
    impl Guard for Rejects {
        async fn handle(&self, _req: &mut Request<Body>, flow: &ChainFlow) {
            flow.respond((StatusCode::UNAUTHORIZED, "rejected"));
        }
    }

    struct DoubleProceeds;
    #[async_trait]
    impl Guard for DoubleProceeds {
        async fn handle(&self, _req: &mut Request<Body>, flow: &ChainFlow) {
            flow.proceed();
            flow.proceed();
        }
    }

    struct DoesNothing;
    #[async_trait]
    impl Guard for DoesNothing {
        async fn handle(&self, _req: &mut Request<Body>, _flow: &ChainFlow) {}
    }

    struct Hangs;
    #[async_trait]
    impl Guard for Hangs {
        async fn handle(&self, _req: &mut Request<Body>, _flow: &ChainFlow) {
            std::future::pending::<()>().await;
        }
    }

    /// Guard that records whether a later stage ran.
    struct Tattletale(Arc<AtomicBool>);
    #[async_trait]
    impl Guard for Tattletale {
        async fn handle(&self, _req: &mut Request<Body>, flow: &ChainFlow) {
            self.0.store(true, Ordering::SeqCst);
            flow.proceed();
        }
    }

    fn chain(guards: Vec<Arc<dyn Guard>>, reached: Arc<AtomicBool>) -> GuardChain {
        let handler = handler_fn(move |_req| {
            let reached = reached.clone();
            async move {
                reached.store(true, Ordering::SeqCst);
                Ok("terminal".into_response())
            }
        });
        GuardChain::new(guards, handler, Duration::from_millis(200))
    }

    fn request() -> Request<Body> {
        Request::builder().body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn empty_chain_reaches_the_handler() {
        let reached = Arc::new(AtomicBool::new(false));
        let resp = chain(vec![], reached.clone()).run(request()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn rejection_short_circuits_the_handler() {
        let reached = Arc::new(AtomicBool::new(false));
        let guards: Vec<Arc<dyn Guard>> = vec![Arc::new(Proceeds), Arc::new(Rejects)];
        let resp = chain(guards, reached.clone()).run(request()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!reached.load(Ordering::SeqCst), "handler must not run");
    }

    #[tokio::test]
    async fn guards_run_in_declaration_order() {
        let first_ran = Arc::new(AtomicBool::new(false));
        let reached = Arc::new(AtomicBool::new(false));
        let guards: Vec<Arc<dyn Guard>> =
            vec![Arc::new(Tattletale(first_ran.clone())), Arc::new(Rejects)];
        let resp = chain(guards, reached.clone()).run(request()).await.unwrap();
        assert!(first_ran.load(Ordering::SeqCst));
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn double_proceed_jumps_to_the_handler() {
        let later_ran = Arc::new(AtomicBool::new(false));
        let reached = Arc::new(AtomicBool::new(false));
        // The guard after the double-proceed must be skipped entirely.
        let guards: Vec<Arc<dyn Guard>> = vec![
            Arc::new(DoubleProceeds),
            Arc::new(Tattletale(later_ran.clone())),
        ];
        chain(guards, reached.clone()).run(request()).await.unwrap();
        assert!(reached.load(Ordering::SeqCst), "handler must run");
        assert!(!later_ran.load(Ordering::SeqCst), "later guard must be skipped");
    }

    #[tokio::test]
    async fn silent_guard_is_an_internal_error() {
        let reached = Arc::new(AtomicBool::new(false));
        let guards: Vec<Arc<dyn Guard>> = vec![Arc::new(DoesNothing)];
        let err = chain(guards, reached.clone()).run(request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn hanging_guard_times_out() {
        let reached = Arc::new(AtomicBool::new(false));
        let guards: Vec<Arc<dyn Guard>> = vec![Arc::new(Hangs)];
        let err = chain(guards, reached.clone()).run(request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn rejection_wins_over_a_stray_proceed() {
        struct Both;
        #[async_trait]
        impl Guard for Both {
            async fn handle(&self, _req: &mut Request<Body>, flow: &ChainFlow) {
                flow.proceed();
                flow.respond((StatusCode::FORBIDDEN, "no"));
            }
        }

        let reached = Arc::new(AtomicBool::new(false));
        let guards: Vec<Arc<dyn Guard>> = vec![Arc::new(Both)];
        let resp = chain(guards, reached.clone()).run(request()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(!reached.load(Ordering::SeqCst));
    }
}
