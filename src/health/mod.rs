//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /healthz | GET /readyz
//!     → probe.rs (exact match on method and request target)
//!     → 200 "ok", answered before translation or invocation
//! ```
//!
//! # Design Decisions
//! - Probes never touch the backend, so a slow backend cannot fail them
//! - Only `GET` with the bare path matches; anything else is ordinary traffic

pub mod probe;
