//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the gateway handler
//! - Wire up middleware (request ID, tracing, concurrency budget)
//! - Bind server to listener with graceful shutdown
//! - Hand every request to the deadline guard and return what it committed

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::adapter::{DeadlineGuard, Invoker};
use crate::backend::Backend;
use crate::config::GatewayConfig;
use crate::http::request::{HostRequest, MakeRequestUuidV4};
use crate::http::response::HttpResponseSink;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub guard: DeadlineGuard,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server invoking `backend` for every request.
    pub fn new(config: GatewayConfig, backend: Arc<dyn Backend>) -> Self {
        let guard = DeadlineGuard::new(
            Invoker::new(backend),
            Duration::from_millis(config.timeouts.invocation_ms),
        );

        let state = AppState { guard };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4));

        if let Some(limit) = config.listener.max_concurrent_requests {
            router = router.layer(ConcurrencyLimitLayer::new(limit));
        }

        router
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_ms = self.config.timeouts.invocation_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with all layers, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Gateway handler.
/// Captures the request, runs it through the deadline guard, and returns the
/// response the guard committed.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let host = HostRequest::from_http(&request);
    let (sink, committed) = HttpResponseSink::channel();

    state.guard.run(host, sink).await;

    match committed.await {
        Ok(response) => response,
        Err(_) => {
            tracing::error!("Guard returned without writing a response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
