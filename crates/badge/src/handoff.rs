//! Double-buffered handoff between the two periodic contexts.
//!
//! The writer fills its own back buffer without holding any lock, then
//! swaps it with the shared front buffer in a short critical section. A
//! reader copies the front buffer under the same lock. Readers therefore
//! always see one complete publication, never a mix of two.

use std::sync::{Mutex, MutexGuard, PoisonError};

struct Front<T> {
    value: T,
    generation: u64,
}

/// Single-producer handoff slot.
pub struct DoubleBuffer<T> {
    front: Mutex<Front<T>>,
}

impl<T> DoubleBuffer<T> {
    pub fn new(initial: T) -> Self {
        Self {
            front: Mutex::new(Front {
                value: initial,
                generation: 0,
            }),
        }
    }

    /// Swap `back` into the front. `back` receives the previous front value,
    /// ready to be overwritten for the next publication. Returns the new
    /// generation number.
    pub fn publish(&self, back: &mut T) -> u64 {
        let mut front = self.lock();
        std::mem::swap(&mut front.value, back);
        front.generation += 1;
        front.generation
    }

    /// Number of publications so far.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    // A panicking peer cannot leave the value half-written: the only
    // mutation under the lock is a swap.
    fn lock(&self) -> MutexGuard<'_, Front<T>> {
        self.front.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> DoubleBuffer<T> {
    /// Copy the current front into `out`, reusing its allocation. Returns the
    /// generation that was read.
    pub fn read_into(&self, out: &mut T) -> u64 {
        let front = self.lock();
        out.clone_from(&front.value);
        front.generation
    }

    pub fn snapshot(&self) -> T {
        self.lock().value.clone()
    }
}
