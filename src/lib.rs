//! Invocation gateway library.
//!
//! Serves plain HTTP in front of a backend that only understands
//! "invocation event in, invocation result out", with a hard per-request
//! deadline and exactly one response per request.

pub mod adapter;
pub mod backend;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use adapter::{DeadlineGuard, InvocationEvent, InvocationResult, Outcome};
pub use backend::{Backend, BackendError, HttpBackend};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
