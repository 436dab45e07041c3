//! Bounded FIFO of deferred work.
//!
//! Producers run in interrupt context and must never wait: a push onto a
//! full queue drops the new item and bumps a counter. The single consumer
//! is the main loop.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;

use crate::work::Work;

/// Default queue depth.
pub const QUEUE_DEPTH: usize = 8;

/// Interrupt-safe work queue.
pub struct WorkQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, Work, N>,
    dropped: Mutex<M, Cell<u32>>,
}

impl<M: RawMutex, const N: usize> WorkQueue<M, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Enqueue without blocking.
    ///
    /// Returns `false` if the queue was full; the item is discarded and
    /// counted in [`dropped`](Self::dropped).
    pub fn push(&self, work: Work) -> bool {
        match self.channel.try_send(work) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.lock(|d| d.set(d.get().wrapping_add(1)));
                #[cfg(feature = "defmt")]
                defmt::warn!("work queue full, dropped {}", work);
                false
            }
        }
    }

    /// Enqueue a group of items only if all of them fit.
    ///
    /// On a short queue nothing is pushed and every item of the group is
    /// counted as dropped. Callers must be the only producers while this
    /// runs, otherwise the room checked here can be taken before the pushes.
    pub fn push_all(&self, items: &[Work]) -> bool {
        if self.channel.free_capacity() < items.len() {
            self.dropped
                .lock(|d| d.set(d.get().wrapping_add(items.len() as u32)));
            #[cfg(feature = "defmt")]
            defmt::warn!("work queue short, dropped group of {}", items.len());
            return false;
        }
        items.iter().all(|&work| self.push(work))
    }

    /// Free slots.
    pub fn free_capacity(&self) -> usize {
        self.channel.free_capacity()
    }

    /// Oldest pending item.
    pub fn pop(&self) -> Option<Work> {
        self.channel.try_receive().ok()
    }

    /// Wait until at least one item is queued. Does not consume it.
    pub async fn ready(&self) {
        self.channel.ready_to_receive().await
    }

    /// Items dropped on overflow since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.lock(|d| d.get())
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Discard everything pending.
    pub fn clear(&self) {
        self.channel.clear();
    }
}

impl<M: RawMutex, const N: usize> Default for WorkQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
