//! Deadline enforcement around a backend invocation.
//!
//! # Data Flow
//! ```text
//! HostRequest
//!     → health probe?      ── yes ──▶ commit 200 "ok"
//!     → InboundRequest::parse ─ err ─▶ commit 400
//!     → translate → Invoker::spawn
//!     → select (biased)
//!         invocation settles ──▶ commit result | commit 500
//!         deadline elapses   ──▶ commit 500 timeout
//!                                 └─▶ late result offered to the gate, discarded
//! ```
//!
//! # Design Decisions
//! - The deadline is fixed when `run` starts, not when the backend is called
//! - Ties go to the invocation: it is polled first, and a backend due on the
//!   deadline tick gets one scheduler turn before the timeout commits
//! - The backend is never cancelled; after the deadline it runs to completion
//!   on its own task and its result is dropped at the gate
//! - Failure detail goes to the log only, never into the response body

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::adapter::commitment::ResponseCommitment;
use crate::adapter::event::InvocationResult;
use crate::adapter::invoker::{Invocation, Invoker};
use crate::adapter::translate::translate;
use crate::backend::BackendError;
use crate::health::probe;
use crate::http::request::{HostRequest, InboundRequest};
use crate::http::response::{write_result, ResponseSink};
use crate::observability::metrics;

/// Default invocation deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend returned a result before the deadline.
    Completed,
    /// The backend failed before the deadline.
    Failed,
    /// The deadline elapsed first.
    TimedOut,
    /// The request was malformed and never reached the backend.
    Rejected,
    /// Liveness/readiness probe answered locally.
    Probe,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed => "failed",
            Outcome::TimedOut => "timed_out",
            Outcome::Rejected => "rejected",
            Outcome::Probe => "probe",
        }
    }
}

/// Races a backend invocation against a fixed deadline and commits exactly
/// one response per request.
#[derive(Debug, Clone)]
pub struct DeadlineGuard {
    invoker: Invoker,
    timeout: Duration,
}

impl DeadlineGuard {
    pub fn new(invoker: Invoker, timeout: Duration) -> Self {
        Self { invoker, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Handle one request, writing exactly one response onto `sink`.
    ///
    /// Returns once the response has been committed. A backend call that
    /// outlives the deadline keeps running in the background.
    pub async fn run<S: ResponseSink>(&self, request: HostRequest, sink: S) -> Outcome {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let request_id = request.request_id().to_string();
        let commitment = Arc::new(ResponseCommitment::new(sink));

        if probe::is_probe(&request.method, request.url.as_deref()) {
            commit(&commitment, &InvocationResult::probe_ok(), &request_id);
            return finish(Outcome::Probe, started);
        }

        let inbound = match InboundRequest::parse(request) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejecting malformed request");
                commit(&commitment, &InvocationResult::bad_request(), &request_id);
                return finish(Outcome::Rejected, started);
            }
        };

        let path = inbound.path().to_string();
        let event = translate(&inbound);

        tracing::debug!(
            request_id = %request_id,
            method = %inbound.method(),
            path = %path,
            "Invoking backend"
        );

        let mut invocation = self.invoker.spawn(event);
        let mut timer = Box::pin(tokio::time::sleep_until(deadline));

        let mut settled = tokio::select! {
            biased;
            settled = &mut invocation => Some(settled),
            () = &mut timer => None,
        };

        // A backend woken on the same tick as the deadline gets one turn
        // before the timeout is committed.
        if settled.is_none() {
            tokio::task::yield_now().await;
            settled = tokio::select! {
                biased;
                settled = &mut invocation => Some(settled),
                () = std::future::ready(()) => None,
            };
        }

        match settled {
            Some(Ok(result)) => {
                drop(timer);
                commit(&commitment, &result, &request_id);
                finish(Outcome::Completed, started)
            }
            Some(Err(e)) => {
                drop(timer);
                log_backend_failure(&e, &path, &request_id);
                commit(&commitment, &InvocationResult::internal_error(), &request_id);
                finish(Outcome::Failed, started)
            }
            None => {
                let timeout_ms = self.timeout.as_millis() as u64;
                tracing::error!(
                    request_id = %request_id,
                    path = %path,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    timeout_ms,
                    "Backend invocation timed out"
                );
                commit(&commitment, &InvocationResult::timeout(timeout_ms), &request_id);
                tokio::spawn(discard_late(invocation, commitment, path, request_id, started));
                finish(Outcome::TimedOut, started)
            }
        }
    }
}

/// Claim the gate and write `result`. Returns false when already committed.
fn commit<S: ResponseSink>(
    commitment: &ResponseCommitment<S>,
    result: &InvocationResult,
    request_id: &str,
) -> bool {
    let Some(mut sink) = commitment.claim() else {
        tracing::debug!(request_id = %request_id, "Response already committed, skipping write");
        return false;
    };

    if let Err(e) = write_result(&mut sink, result) {
        tracing::error!(request_id = %request_id, error = %e, "Failed to write response");
    }
    true
}

/// Wait for an invocation that lost the race and offer its result to the gate.
async fn discard_late<S: ResponseSink>(
    invocation: Invocation,
    commitment: Arc<ResponseCommitment<S>>,
    path: String,
    request_id: String,
    started: Instant,
) {
    let settled = invocation.await;
    metrics::record_late_result();

    let succeeded = settled.is_ok();
    let result = settled.unwrap_or_else(|_| InvocationResult::internal_error());
    if !commit(&commitment, &result, &request_id) {
        tracing::debug!(
            request_id = %request_id,
            path = %path,
            elapsed_ms = started.elapsed().as_millis() as u64,
            succeeded,
            "Discarding late invocation result"
        );
    }
}

fn log_backend_failure(e: &BackendError, path: &str, request_id: &str) {
    tracing::error!(
        request_id = %request_id,
        path = %path,
        error.name = e.kind(),
        error.message = %e.message(),
        error.stack = e.stack().unwrap_or_default(),
        "Backend invocation failed"
    );
}

fn finish(outcome: Outcome, started: Instant) -> Outcome {
    metrics::record_request(outcome.as_str(), started.elapsed());
    outcome
}
