//! One-shot response gate.
//!
//! # States
//! ```text
//! Pending ──claim()──▶ Committed
//! ```
//!
//! The sink lives inside the gate while it is pending. `claim` takes it out
//! under a lock, so exactly one caller ever holds the sink and every later
//! caller sees `None`. The transition cannot be undone.

use std::sync::Mutex;

use crate::http::response::ResponseSink;

/// Gate guarding the single write of a host response.
#[derive(Debug)]
pub struct ResponseCommitment<S> {
    sink: Mutex<Option<S>>,
}

impl<S: ResponseSink> ResponseCommitment<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(Some(sink)),
        }
    }

    /// Commit and take the sink. Returns `None` once already committed.
    pub fn claim(&self) -> Option<S> {
        // A poisoned lock still holds a valid Option; keep the gate usable.
        let mut slot = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        slot.take()
    }

    #[cfg(test)]
    fn is_committed(&self) -> bool {
        self.sink
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}
