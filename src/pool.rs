//! Lock-guarded free lists for pooled records and tags.
//!
//! Acquire pops a recycled instance or builds a fresh one; release resets
//! the instance *before* it re-enters the free list, so a pooled object can
//! never be observed carrying a previous owner's state.

use std::sync::Mutex;

/// A bounded free list of reusable instances.
///
/// The pool never blocks producers on exhaustion: an empty free list simply
/// allocates. Releases beyond `capacity` are dropped on the floor and left
/// to the allocator.
pub(crate) struct Pool<T> {
    slots: Mutex<Vec<T>>,
    capacity: usize,
    make: fn() -> T,
    reset: fn(&mut T),
}

impl<T> Pool<T> {
    /// Create a pool retaining at most `capacity` idle instances.
    pub(crate) fn new(capacity: usize, make: fn() -> T, reset: fn(&mut T)) -> Self {
        Pool {
            slots: Mutex::new(Vec::new()),
            capacity,
            make,
            reset,
        }
    }

    /// Take an instance out of the pool, allocating when the pool is empty.
    pub(crate) fn acquire(&self) -> T {
        let recycled = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();
        recycled.unwrap_or_else(|| (self.make)())
    }

    /// Reset an instance and hand it back for reuse.
    pub(crate) fn release(&self, mut item: T) {
        (self.reset)(&mut item);
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slots.len() < self.capacity {
            slots.push(item);
        }
    }

    /// Number of idle instances currently parked in the pool.
    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
