//! Backend invocation on a detached task.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::adapter::event::{InvocationEvent, InvocationResult};
use crate::backend::{Backend, BackendError};

/// Calls the backend exactly once per event.
///
/// The call runs on its own task so that whoever awaits it can stop waiting
/// without cancelling it. Failures are returned as-is; mapping them to a
/// response is the caller's job.
#[derive(Clone)]
pub struct Invoker {
    backend: Arc<dyn Backend>,
}

impl Invoker {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Start the backend call. Dropping the returned handle detaches it.
    pub fn spawn(&self, event: InvocationEvent) -> Invocation {
        let backend = Arc::clone(&self.backend);
        let handle = tokio::spawn(async move { backend.handle(event).await });
        Invocation { handle }
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker").finish_non_exhaustive()
    }
}

/// A running backend call.
#[derive(Debug)]
pub struct Invocation {
    handle: JoinHandle<Result<InvocationResult, BackendError>>,
}

impl Future for Invocation {
    type Output = Result<InvocationResult, BackendError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(settled) => settled,
            Err(e) => Err(BackendError::Panicked(e.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl Backend for Echo {
        async fn handle(&self, event: InvocationEvent) -> Result<InvocationResult, BackendError> {
            Ok(InvocationResult {
                status_code: Some(200),
                body: Some(event.path),
                ..Default::default()
            })
        }
    }

    struct Panics;

    #[async_trait]
    impl Backend for Panics {
        async fn handle(&self, _event: InvocationEvent) -> Result<InvocationResult, BackendError> {
            panic!("backend exploded");
        }
    }

    struct Slow {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Backend for Slow {
        async fn handle(&self, _event: InvocationEvent) -> Result<InvocationResult, BackendError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(InvocationResult::default())
        }
    }

    fn event(path: &str) -> InvocationEvent {
        InvocationEvent {
            path: path.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn returns_backend_result() {
        let invoker = Invoker::new(Arc::new(Echo));
        let result = invoker.spawn(event("img.png")).await.unwrap();
        assert_eq!(result.body.as_deref(), Some("img.png"));
    }

    #[tokio::test]
    async fn panic_surfaces_as_backend_error() {
        let invoker = Invoker::new(Arc::new(Panics));
        let err = invoker.spawn(event("x")).await.unwrap_err();
        assert!(matches!(err, BackendError::Panicked(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_invocation_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let invoker = Invoker::new(Arc::new(Slow {
            finished: finished.clone(),
        }));

        drop(invoker.spawn(event("x")));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(finished.load(Ordering::SeqCst));
    }
}
