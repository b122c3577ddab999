//! Per-connection call numbering for the binary bindings.
//!
//! Every request frame carries a sequence number and the server copies it
//! onto the reply.  A client that reads back a different number knows the
//! stream is out of step and drops the connection rather than hand the
//! wrong [`crate::domain::Response`] to the caller.
//!
//! The counter is an `AtomicU64` so a client handle shared between tasks
//! never issues the same number twice.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing, wrapping counter of call numbers.
///
/// # Examples
///
/// ```rust
/// use inventory_core::protocol::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// assert_eq!(counter.current(), 2);
/// ```
#[derive(Debug, Default)]
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    /// Creates a counter whose first call number is 0.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next call number.  Wraps from `u64::MAX` to 0.
    pub fn next(&self) -> u64 {
        // Relaxed: the value only labels frames, it guards no other memory.
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the number the next call to [`next`](Self::next) will hand out.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}
