//! State shared between interrupt context and the main loop.
//!
//! Everything that crosses contexts lives in one [`SharedState`], built in a
//! `static` with the const constructor. Interrupt-side code only ever sees
//! an [`InterruptContext`], which can test-and-set debounce guards and push
//! work but cannot touch hardware or the display.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::debounce::DebounceGuard;
use crate::queue::WorkQueue;
use crate::work::{ActiveDemo, Button, Work};

#[derive(Debug, Clone, Copy)]
struct Flags {
    active: ActiveDemo,
    /// Animation tick source is running.
    animation_enabled: bool,
    /// An `AdvanceAnimation` is queued and not yet drained.
    animation_pending: bool,
    /// Shutdown has been drained; interrupts are no longer serviced.
    halted: bool,
}

/// Cross-context state: the work queue, the debounce guards, the active
/// demo tag and the animation source flags.
pub struct SharedState<M: RawMutex, const N: usize> {
    queue: WorkQueue<M, N>,
    debounce: DebounceGuard<M>,
    flags: Mutex<M, Cell<Flags>>,
}

impl<M: RawMutex, const N: usize> SharedState<M, N> {
    pub const fn new() -> Self {
        Self {
            queue: WorkQueue::new(),
            debounce: DebounceGuard::new(),
            flags: Mutex::new(Cell::new(Flags {
                active: ActiveDemo::Idle,
                animation_enabled: false,
                animation_pending: false,
                halted: false,
            })),
        }
    }

    /// Capability handle for interrupt-context producers.
    pub fn interrupt_context(&self) -> InterruptContext<'_, M, N> {
        InterruptContext { shared: self }
    }

    pub fn queue(&self) -> &WorkQueue<M, N> {
        &self.queue
    }

    pub fn debounce(&self) -> &DebounceGuard<M> {
        &self.debounce
    }

    pub fn active_demo(&self) -> ActiveDemo {
        self.flags.lock(|f| f.get().active)
    }

    pub fn animation_enabled(&self) -> bool {
        self.flags.lock(|f| f.get().animation_enabled)
    }

    pub fn is_halted(&self) -> bool {
        self.flags.lock(|f| f.get().halted)
    }

    /// Let the tick source start requesting animation frames.
    pub fn enable_animation(&self) {
        self.modify(|f| f.animation_enabled = true);
    }

    /// Stop the tick source. Ticks already queued are still drained but
    /// no new ones are accepted.
    pub fn disable_animation(&self) {
        self.modify(|f| f.animation_enabled = false);
    }

    /// Pop the next work item for the main loop.
    pub fn next_work(&self) -> Option<Work> {
        let work = self.queue.pop()?;
        if work == Work::AdvanceAnimation {
            self.modify(|f| f.animation_pending = false);
        }
        Some(work)
    }

    pub(crate) fn set_active(&self, active: ActiveDemo) {
        self.modify(|f| f.active = active);
    }

    pub(crate) fn halt(&self) {
        self.modify(|f| {
            f.halted = true;
            f.animation_enabled = false;
        });
        self.queue.clear();
    }

    fn modify(&self, update: impl FnOnce(&mut Flags)) {
        self.flags.lock(|cell| {
            let mut flags = cell.get();
            update(&mut flags);
            cell.set(flags);
        });
    }
}

impl<M: RawMutex, const N: usize> Default for SharedState<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// What interrupt handlers are allowed to do.
///
/// Every method is non-blocking and allocation-free.
pub struct InterruptContext<'a, M: RawMutex, const N: usize> {
    shared: &'a SharedState<M, N>,
}

impl<M: RawMutex, const N: usize> Clone for InterruptContext<'_, M, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, const N: usize> Copy for InterruptContext<'_, M, N> {}

impl<'a, M: RawMutex, const N: usize> InterruptContext<'a, M, N> {
    /// Button edge. Returns `true` if the press was accepted and its work
    /// (stop, start, end-debounce) enqueued.
    ///
    /// The three items go in together or not at all. A press that does not
    /// fit is dropped whole and the guard cleared again, so the button does
    /// not stay locked out and no half switch reaches the main loop.
    pub fn on_button(&self, button: Button) -> bool {
        if self.shared.is_halted() {
            return false;
        }
        if !self.shared.debounce.try_begin_press(button) {
            return false;
        }

        let press = [
            Work::StopCurrent,
            Work::Start(button.demo()),
            Work::EndDebounce(button),
        ];
        if !self.shared.queue.push_all(&press) {
            self.shared.debounce.clear(button);
            #[cfg(feature = "defmt")]
            defmt::warn!("press {} dropped, queue short", button);
            return false;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("press {} accepted", button);
        true
    }

    /// Animation tick. Coalesced: a tick while a previous advance is still
    /// queued is dropped, as is any tick after the source was disabled.
    pub fn on_animation_tick(&self) -> bool {
        let mut claimed = false;
        self.shared.modify(|f| {
            if f.animation_enabled && !f.animation_pending && !f.halted {
                f.animation_pending = true;
                claimed = true;
            }
        });
        if !claimed {
            return false;
        }

        if !self.shared.queue.push(Work::AdvanceAnimation) {
            self.shared.modify(|f| f.animation_pending = false);
            return false;
        }
        true
    }

    /// External stop signal.
    pub fn request_shutdown(&self) -> bool {
        if self.shared.is_halted() {
            return false;
        }
        self.shared.queue.push(Work::Shutdown)
    }

    /// Whether the tick source should keep running.
    pub fn animation_ticks_enabled(&self) -> bool {
        self.shared.animation_enabled()
    }

    pub fn active_demo(&self) -> ActiveDemo {
        self.shared.active_demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::DebounceState;
    use crate::queue::QUEUE_DEPTH;
    use crate::work::Demo;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    type State = SharedState<CriticalSectionRawMutex, QUEUE_DEPTH>;

    fn drain(state: &State) -> heapless::Vec<Work, 16> {
        let mut out = heapless::Vec::new();
        while let Some(w) = state.next_work() {
            let _ = out.push(w);
        }
        out
    }

    // ── Buttons ──────────────────────────────────────────────────────

    #[test]
    fn press_enqueues_stop_start_end() {
        let state = State::new();
        let ctx = state.interrupt_context();
        assert!(ctx.on_button(Button::Ain0));
        assert_eq!(
            drain(&state).as_slice(),
            &[Work::StopCurrent, Work::Start(Demo::Adc), Work::EndDebounce(Button::Ain0)]
        );
    }

    #[test]
    fn bounce_is_ignored_while_held() {
        let state = State::new();
        let ctx = state.interrupt_context();
        assert!(ctx.on_button(Button::Dio1));
        assert!(!ctx.on_button(Button::Dio1));
        assert_eq!(state.queue().len(), 3);
    }

    #[test]
    fn short_queue_drops_whole_press() {
        let state = State::new();
        let ctx = state.interrupt_context();
        for _ in 0..QUEUE_DEPTH - 1 {
            state.queue().push(Work::AdvanceAnimation);
        }
        assert!(!ctx.on_button(Button::Uart));
        assert_eq!(state.debounce().state(Button::Uart), DebounceState::Clear);
        // Nothing of the press got in.
        assert_eq!(state.queue().len(), QUEUE_DEPTH - 1);
        assert_eq!(state.queue().dropped(), 3);
    }

    #[test]
    fn bounce_after_dropped_press_switches_once() {
        let state = State::new();
        let ctx = state.interrupt_context();
        for _ in 0..QUEUE_DEPTH - 2 {
            state.queue().push(Work::AdvanceAnimation);
        }
        assert!(!ctx.on_button(Button::Dio1));

        // Main loop catches up, then the contact bounces.
        drain(&state);
        assert!(ctx.on_button(Button::Dio1));
        assert!(!ctx.on_button(Button::Dio1));

        let starts = drain(&state)
            .iter()
            .filter(|w| matches!(w, Work::Start(_)))
            .count();
        assert_eq!(starts, 1);
    }

    // ── Animation ticks ──────────────────────────────────────────────

    #[test]
    fn ticks_ignored_until_enabled() {
        let state = State::new();
        let ctx = state.interrupt_context();
        assert!(!ctx.on_animation_tick());
        state.enable_animation();
        assert!(ctx.on_animation_tick());
    }

    #[test]
    fn ticks_coalesce_while_pending() {
        let state = State::new();
        state.enable_animation();
        let ctx = state.interrupt_context();
        assert!(ctx.on_animation_tick());
        assert!(!ctx.on_animation_tick());
        assert!(!ctx.on_animation_tick());
        assert_eq!(drain(&state).as_slice(), &[Work::AdvanceAnimation]);

        // Drained, so the next tick queues again.
        assert!(ctx.on_animation_tick());
        assert_eq!(state.queue().dropped(), 0);
    }

    #[test]
    fn ticks_stop_after_disable() {
        let state = State::new();
        state.enable_animation();
        state.disable_animation();
        let ctx = state.interrupt_context();
        assert!(!ctx.on_animation_tick());
        assert!(!ctx.animation_ticks_enabled());
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    #[test]
    fn halted_state_ignores_interrupts() {
        let state = State::new();
        state.enable_animation();
        let ctx = state.interrupt_context();
        assert!(ctx.request_shutdown());
        state.halt();
        assert!(state.queue().is_empty());
        assert!(!ctx.on_button(Button::Ain0));
        assert!(!ctx.on_animation_tick());
        assert!(!ctx.request_shutdown());
    }

    #[test]
    fn static_construction() {
        static STATE: State = State::new();
        STATE.set_active(ActiveDemo::Gpio);
        assert_eq!(STATE.interrupt_context().active_demo(), ActiveDemo::Gpio);
    }
}
