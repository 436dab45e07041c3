//! Per-button debounce guard.
//!
//! A press is accepted only when the button's slot is [`Clear`]. The slot
//! stays [`Held`] until the deferred `EndDebounce` item runs, which opens a
//! release window; the main loop clears the slot once the window has passed.
//! Edges arriving in any non-clear state are ignored.
//!
//! [`Clear`]: DebounceState::Clear
//! [`Held`]: DebounceState::Held

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant};

use crate::work::{Button, BUTTON_COUNT};

/// State of one button's guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    Clear,
    /// Press accepted, work still queued or running.
    Held,
    /// Work done, guard clears at `at`.
    Releasing { at: Instant },
}

/// Guard slots for all buttons, shareable between interrupt and main
/// contexts.
pub struct DebounceGuard<M: RawMutex> {
    slots: Mutex<M, Cell<[DebounceState; BUTTON_COUNT]>>,
}

impl<M: RawMutex> DebounceGuard<M> {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(Cell::new([DebounceState::Clear; BUTTON_COUNT])),
        }
    }

    /// Test-and-set from interrupt context.
    ///
    /// Returns `true` and moves the slot to `Held` only if it was `Clear`.
    pub fn try_begin_press(&self, button: Button) -> bool {
        self.slots.lock(|cell| {
            let mut slots = cell.get();
            let slot = &mut slots[button.index()];
            if *slot != DebounceState::Clear {
                return false;
            }
            *slot = DebounceState::Held;
            cell.set(slots);
            true
        })
    }

    /// Start the release window. A clear slot stays clear.
    pub fn end_debounce(&self, button: Button, now: Instant, window: Duration) {
        self.update(button, |slot| {
            if *slot != DebounceState::Clear {
                *slot = DebounceState::Releasing { at: now + window };
            }
        });
    }

    /// Force a slot back to `Clear`.
    pub fn clear(&self, button: Button) {
        self.update(button, |slot| *slot = DebounceState::Clear);
    }

    /// Clear every slot whose release time has been reached.
    pub fn release_due(&self, now: Instant) {
        self.slots.lock(|cell| {
            let mut slots = cell.get();
            for slot in slots.iter_mut() {
                if let DebounceState::Releasing { at } = *slot {
                    if at <= now {
                        *slot = DebounceState::Clear;
                    }
                }
            }
            cell.set(slots);
        });
    }

    /// Earliest pending release, if any.
    pub fn next_release(&self) -> Option<Instant> {
        self.slots.lock(|cell| {
            cell.get()
                .iter()
                .filter_map(|slot| match slot {
                    DebounceState::Releasing { at } => Some(*at),
                    _ => None,
                })
                .min()
        })
    }

    pub fn state(&self, button: Button) -> DebounceState {
        self.slots.lock(|cell| cell.get()[button.index()])
    }

    fn update(&self, button: Button, f: impl FnOnce(&mut DebounceState)) {
        self.slots.lock(|cell| {
            let mut slots = cell.get();
            f(&mut slots[button.index()]);
            cell.set(slots);
        });
    }
}

impl<M: RawMutex> Default for DebounceGuard<M> {
    fn default() -> Self {
        Self::new()
    }
}
