//! Single-slot busy flag that serialises mutating operations.
//!
//! # Why not a `Mutex`? (for beginners)
//!
//! A `Mutex` makes the second caller *wait*.  Here the second writer must be
//! told "busy" straight away and go home, so the guard is a single
//! `AtomicBool` flipped with `compare_exchange`: whoever flips it from
//! `false` to `true` owns the slot, everybody else fails immediately.
//!
//! Ownership is represented by a [`BusyGuard`] value.  Dropping it clears the
//! flag, so every exit path of a write (success, not found, persistence
//! failure, even a panic) releases the slot without an explicit call.

use std::sync::atomic::{AtomicBool, Ordering};

/// The process-wide writer slot.  Owned by the service, never global.
#[derive(Debug, Default)]
pub struct BusyFlag {
    held: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the slot if it is free.  Never blocks.
    ///
    /// Returns `None` when another writer holds it.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard { flag: self })
    }

    /// Returns `true` while a writer holds the slot.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Proof of holding the writer slot.  Releases it on drop.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the guard is dropped"]
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.held.store(false, Ordering::Release);
    }
}
