//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, capture HostRequest, parse InboundRequest)
//!     → adapter (translate, invoke, race the deadline)
//!     → response.rs (write the committed result)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{HostRequest, InboundRequest, RequestError, X_REQUEST_ID};
pub use response::{write_result, HttpResponseSink, ResponseSink, WriteError};
pub use server::HttpServer;
