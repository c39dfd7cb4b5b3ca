//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;

use invocation_gateway::{
    Backend, BackendError, GatewayConfig, HttpServer, InvocationEvent, InvocationResult, Shutdown,
};

/// Path served by the mock invoke endpoint.
pub const INVOKE_PATH: &str = "/2015-03-31/functions/function/invocations";

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(
    mut config: GatewayConfig,
    backend: Arc<dyn Backend>,
) -> (SocketAddr, Shutdown) {
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, backend);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Config with a short invocation deadline.
pub fn config_with_timeout(ms: u64) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.timeouts.invocation_ms = ms;
    config
}

/// HTTP client that never reuses connections or goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Backend that waits, records the call, and returns a fixed outcome.
pub struct StubBackend {
    pub delay: Duration,
    pub result: Result<InvocationResult, String>,
    pub calls: Arc<AtomicUsize>,
    pub finished: Arc<AtomicBool>,
}

impl StubBackend {
    pub fn ok(result: InvocationResult) -> Self {
        Self::delayed(Duration::ZERO, result)
    }

    pub fn delayed(delay: Duration, result: InvocationResult) -> Self {
        Self {
            delay,
            result: Ok(result),
            calls: Arc::default(),
            finished: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(message.to_string()),
            calls: Arc::default(),
            finished: Arc::default(),
        }
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn handle(&self, _event: InvocationEvent) -> Result<InvocationResult, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        match &self.result {
            Ok(result) => Ok(result.clone()),
            Err(message) => Err(BackendError::Function {
                name: "Error".into(),
                message: message.clone(),
                stack: None,
            }),
        }
    }
}

/// Start a programmable invoke endpoint that receives the raw event body.
pub async fn start_invoke_endpoint<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(Bytes) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (StatusCode, HeaderMap, String)> + Send + 'static,
{
    let app = Router::new().route(
        INVOKE_PATH,
        post(move |body: Bytes| {
            let f = f.clone();
            async move { f(body).await }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

pub fn invoke_url(addr: SocketAddr) -> String {
    format!("http://{}{}", addr, INVOKE_PATH)
}
