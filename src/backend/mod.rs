//! Backend invocation contract.
//!
//! # Data Flow
//! ```text
//! InvocationEvent
//!     → Backend::handle (opaque function, may take arbitrarily long)
//!     → InvocationResult | BackendError
//! ```
//!
//! # Design Decisions
//! - The backend is a trait object so the server can hold any implementation
//! - No cancellation contract is assumed; callers must tolerate a backend
//!   that keeps running after they stop waiting
//! - Errors carry a name, a message and an optional stack so failures can be
//!   logged in full without leaking into the response

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::adapter::event::{InvocationEvent, InvocationResult};

pub use self::http::HttpBackend;

/// A function that turns one event into one result.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn handle(&self, event: InvocationEvent) -> Result<InvocationResult, BackendError>;
}

/// Failures raised while invoking the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The function itself raised an error.
    #[error("{name}: {message}")]
    Function {
        name: String,
        message: String,
        stack: Option<String>,
    },

    /// Connection or protocol failure talking to the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// The invoke endpoint answered with a non-success status.
    #[error("invoke endpoint returned status {status}")]
    Status { status: u16 },

    /// The backend answered with something that is not an invocation result.
    #[error("undecodable invocation result: {0}")]
    Decode(#[from] serde_json::Error),

    /// The invocation task panicked or was aborted.
    #[error("invocation task failed: {0}")]
    Panicked(String),
}

impl BackendError {
    /// Stable name used in log entries.
    pub fn kind(&self) -> &str {
        match self {
            BackendError::Function { name, .. } => name,
            BackendError::Transport(_) => "TransportError",
            BackendError::Status { .. } => "StatusError",
            BackendError::Decode(_) => "DecodeError",
            BackendError::Panicked(_) => "PanicError",
        }
    }

    /// Error message without the name prefix.
    pub fn message(&self) -> String {
        match self {
            BackendError::Function { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Stack trace reported by the backend, if any.
    pub fn stack(&self) -> Option<&str> {
        match self {
            BackendError::Function { stack, .. } => stack.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_error_exposes_its_parts() {
        let err = BackendError::Function {
            name: "ImageHandlerError".into(),
            message: "boom".into(),
            stack: Some("at handler (index.js:1:1)".into()),
        };
        assert_eq!(err.kind(), "ImageHandlerError");
        assert_eq!(err.message(), "boom");
        assert_eq!(err.stack(), Some("at handler (index.js:1:1)"));
        assert_eq!(err.to_string(), "ImageHandlerError: boom");
    }

    #[test]
    fn transport_error_has_generic_name() {
        let err = BackendError::Transport("connection refused".into());
        assert_eq!(err.kind(), "TransportError");
        assert!(err.message().contains("connection refused"));
        assert_eq!(err.stack(), None);
    }
}
