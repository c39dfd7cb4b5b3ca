//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → logging.rs (structured JSON log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log collection
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - One JSON object per log event for machine parsing
//! - Request ID is a field on every request-scoped event
//! - Metrics are cheap and disabled unless configured

pub mod logging;
pub mod metrics;
