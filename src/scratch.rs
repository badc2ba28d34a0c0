use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Hands out temporary working copies and counts the ones still alive, so
/// callers can check that every exit path released its scratch instances.
#[derive(Debug, Clone, Default)]
pub struct ScratchPool {
    live: Arc<AtomicUsize>,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire<T>(&self, value: T) -> Scratch<T> {
        self.live.fetch_add(1, Ordering::Relaxed);
        Scratch { value, _lease: Lease { live: Arc::clone(&self.live) } }
    }

    pub fn outstanding(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

/// A working copy released when dropped, or handed over with `into_inner`.
pub struct Scratch<T> {
    value: T,
    _lease: Lease,
}

impl<T> Scratch<T> {
    /// Stops tracking the value and returns it; it is no longer temporary.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Scratch<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Scratch<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

struct Lease {
    live: Arc<AtomicUsize>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
        trace!("released scratch instance");
    }
}
