//! Request/invocation adapter.
//!
//! # Data Flow
//! ```text
//! HostRequest
//!     → translate.rs (InboundRequest → InvocationEvent)
//!     → invoker.rs (backend call on its own task)
//!     → deadline.rs (race against the deadline)
//!     → commitment.rs (one-shot gate, exactly one write)
//!     → http::response (InvocationResult → host response)
//! ```
//!
//! # Design Decisions
//! - Translation is pure; all I/O happens in the invoker and the writer
//! - The gate, not the caller, decides who writes
//! - Event and result shapes in event.rs are a hard compatibility boundary

pub mod commitment;
pub mod deadline;
pub mod event;
pub mod invoker;
pub mod translate;

pub use commitment::ResponseCommitment;
pub use deadline::{DeadlineGuard, Outcome};
pub use event::{InvocationEvent, InvocationResult};
pub use invoker::{Invocation, Invoker};
pub use translate::translate;
