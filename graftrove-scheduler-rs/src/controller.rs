//! Demo lifecycle controller: the consumer side of the work queue.
//!
//! The controller runs in the main loop and is the only place hardware or
//! the display is touched. It owns the running demo's session (and with it
//! any PWM or UART handle), the animation and the step schedule.
//!
//! # Main loop
//!
//! ```text
//! loop {
//!     now = clock
//!     controller.service(hw, surface, now)   // release guards, drain, step
//!     sleep until work arrives or controller.next_deadline()
//! }
//! ```
//!
//! # Switching demos
//!
//! A press queues `StopCurrent`, `Start(demo)`, `EndDebounce(button)`.
//! Stop releases the session's handle and blanks the panel before the next
//! demo is started, so two demos never hold hardware at once. A `Start`
//! arriving while a demo is still active (its stop was dropped on overflow)
//! stops that demo first.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant};

use crate::animation::{Animation, Frame};
use crate::config::{DemoConfig, SchedulerConfig};
use crate::demos::{AdcDemo, GpioDemo, I2cScanDemo, PwmDemo, Step, UartDemo};
use crate::hardware::{DemoHardware, Surface};
use crate::screen::{Render, Screen};
use crate::shared::SharedState;
use crate::work::{ActiveDemo, Demo, Work};

/// Running demo plus the hardware it owns.
pub enum Session<H: DemoHardware> {
    Adc(AdcDemo),
    Pwm(PwmDemo<H::Pwm>),
    Gpio(GpioDemo),
    I2cScan(I2cScanDemo),
    Uart(UartDemo<H::Uart>),
    /// Setup failed; the error screen stays up until another demo starts.
    Faulted(Demo),
}

impl<H: DemoHardware> Session<H> {
    pub fn demo(&self) -> Demo {
        match self {
            Session::Adc(_) => Demo::Adc,
            Session::Pwm(_) => Demo::Pwm,
            Session::Gpio(_) => Demo::Gpio,
            Session::I2cScan(_) => Demo::I2cScan,
            Session::Uart(_) => Demo::Uart,
            Session::Faulted(demo) => *demo,
        }
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Session::Faulted(_))
    }

    fn cadence(&self, config: &SchedulerConfig) -> Duration {
        match self {
            Session::Adc(_) => config.adc_cadence,
            Session::Pwm(_) => config.pwm_cadence,
            Session::Gpio(_) => config.gpio_cadence,
            Session::I2cScan(_) => config.i2c_cadence,
            Session::Uart(_) => config.uart_poll,
            Session::Faulted(_) => config.fault_hold,
        }
    }

    async fn step(&mut self, hw: &mut H, now: Instant) -> Step {
        match self {
            Session::Adc(demo) => demo.step(hw).await,
            Session::Pwm(demo) => demo.step(),
            Session::Gpio(demo) => demo.step(hw),
            Session::I2cScan(demo) => demo.step(hw).await,
            Session::Uart(demo) => demo.step(hw, now),
            Session::Faulted(_) => Step::Quiet,
        }
    }

    /// Give any owned handle back to the hardware.
    fn release(self, hw: &mut H) {
        match self {
            Session::Pwm(demo) => hw.release_pwm(demo.into_handle()),
            Session::Uart(demo) => {
                if let Some(uart) = demo.into_handle() {
                    hw.release_uart(uart);
                }
            }
            _ => {}
        }
    }
}

/// Shutdown progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    Running,
    /// Panel blanked; the farewell screen goes up at `at`.
    Closing { at: Instant },
    Halted,
}

pub struct Controller<'a, H: DemoHardware, M: RawMutex, const N: usize> {
    shared: &'a SharedState<M, N>,
    scheduler: SchedulerConfig,
    demos: DemoConfig,
    session: Option<Session<H>>,
    next_step: Option<Instant>,
    animation: Animation,
    halt: Halt,
}

impl<'a, H: DemoHardware, M: RawMutex, const N: usize> Controller<'a, H, M, N> {
    pub fn new(
        shared: &'a SharedState<M, N>,
        scheduler: SchedulerConfig,
        demos: DemoConfig,
        animation: Animation,
    ) -> Self {
        Self {
            shared,
            scheduler,
            demos,
            session: None,
            next_step: None,
            animation,
            halt: Halt::Running,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn active_demo(&self) -> ActiveDemo {
        self.shared.active_demo()
    }

    pub fn session(&self) -> Option<&Session<H>> {
        self.session.as_ref()
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn is_halted(&self) -> bool {
        self.halt == Halt::Halted
    }

    /// Earliest time [`poll`](Self::poll) or a debounce release has
    /// something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let closing = match self.halt {
            Halt::Closing { at } => Some(at),
            _ => None,
        };
        [self.next_step, closing, self.shared.debounce().next_release()]
            .into_iter()
            .flatten()
            .min()
    }

    // ── Animation ────────────────────────────────────────────────────

    /// Start the sweep and let the tick source run.
    pub fn start_animation(&mut self, now: Instant) {
        self.animation.start(now);
        self.shared.enable_animation();
        #[cfg(feature = "defmt")]
        defmt::info!("animation started");
    }

    // ── Main-loop entry points ───────────────────────────────────────

    /// One main-loop iteration: release due debounce guards, drain all
    /// queued work, then run a demo step if one is due.
    pub async fn service<S: Surface>(&mut self, hw: &mut H, surface: &mut S, now: Instant) {
        self.shared.debounce().release_due(now);
        self.drain(hw, surface, now).await;
        if let Some(render) = self.poll(now, hw).await {
            surface.present(&render).await;
        }
    }

    /// Execute queued work in push order until the queue is empty.
    pub async fn drain<S: Surface>(&mut self, hw: &mut H, surface: &mut S, now: Instant) {
        while let Some(work) = self.shared.next_work() {
            if let Some(render) = self.handle(work, now, hw).await {
                surface.present(&render).await;
            }
        }
    }

    /// Execute one work item.
    pub async fn handle(&mut self, work: Work, now: Instant, hw: &mut H) -> Option<Render> {
        if self.halt != Halt::Running {
            return None;
        }

        match work {
            Work::StopCurrent => self.stop_current(hw),
            Work::Start(demo) => {
                if !self.active_demo().is_idle() || self.session.is_some() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("start {} while {} active, stopping it", demo, self.active_demo());
                    self.stop_current(hw);
                }
                self.start(demo, now, hw).await
            }
            Work::EndDebounce(button) => {
                self.shared
                    .debounce()
                    .end_debounce(button, now, self.scheduler.debounce_window);
                None
            }
            Work::AdvanceAnimation => {
                let frame = self.animation.advance(now, self.scheduler.animation_duration)?;
                let render = match frame {
                    Frame::Sweep(render) => render,
                    Frame::Final(render) => {
                        self.shared.disable_animation();
                        render
                    }
                };
                // The sweep keeps its schedule but only draws on an idle panel.
                self.active_demo().is_idle().then_some(render)
            }
            Work::Shutdown => {
                #[cfg(feature = "defmt")]
                defmt::info!("shutdown requested");
                self.shared.disable_animation();
                self.stop_current(hw);
                self.shared.halt();
                self.halt = Halt::Closing {
                    at: now + self.scheduler.shutdown_hold,
                };
                Some(Render::Clear)
            }
        }
    }

    /// Run whatever is due at `now`: the farewell screen during shutdown,
    /// otherwise the active demo's next step.
    pub async fn poll(&mut self, now: Instant, hw: &mut H) -> Option<Render> {
        match self.halt {
            Halt::Halted => return None,
            Halt::Closing { at } => {
                if now < at {
                    return None;
                }
                self.halt = Halt::Halted;
                #[cfg(feature = "defmt")]
                defmt::info!("halted");
                return Some(Render::Full(Screen::new().text(25, 30, "Exit Success!")));
            }
            Halt::Running => {}
        }

        match self.next_step {
            Some(due) if due <= now => self.step(now, hw).await,
            _ => None,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Tear down the active demo. Returns a clear command if anything was
    /// running.
    fn stop_current(&mut self, hw: &mut H) -> Option<Render> {
        let was_active = !self.active_demo().is_idle();
        if let Some(session) = self.session.take() {
            #[cfg(feature = "defmt")]
            defmt::info!("stopping {}", session.demo());
            session.release(hw);
        }
        self.next_step = None;
        self.shared.set_active(ActiveDemo::Idle);
        was_active.then_some(Render::Clear)
    }

    async fn start(&mut self, demo: Demo, now: Instant, hw: &mut H) -> Option<Render> {
        #[cfg(feature = "defmt")]
        defmt::info!("starting {}", demo);

        let session = match demo {
            Demo::Adc => Ok(Session::Adc(AdcDemo::new(&self.demos))),
            Demo::Pwm => match hw.open_pwm(self.demos.pwm_frequency_hz) {
                Ok(pwm) => Ok(Session::Pwm(PwmDemo::new(pwm, &self.demos))),
                Err(err) => Err(PwmDemo::<H::Pwm>::init_error(&err)),
            },
            Demo::Gpio => Ok(Session::Gpio(GpioDemo::new())),
            Demo::I2cScan => match hw.scan_bus() {
                Ok(_) => Ok(Session::I2cScan(I2cScanDemo::new())),
                Err(err) => Err(I2cScanDemo::init_error(&err)),
            },
            Demo::Uart => Ok(Session::Uart(UartDemo::new(&self.demos))),
        };

        self.shared.set_active(demo.into());
        match session {
            Ok(session) => {
                self.session = Some(session);
                // First frame within this drain.
                self.step(now, hw).await
            }
            Err(screen) => {
                #[cfg(feature = "defmt")]
                defmt::error!("{} failed to start", demo);
                self.session = Some(Session::Faulted(demo));
                self.next_step = Some(now + self.scheduler.fault_hold);
                Some(Render::Full(screen))
            }
        }
    }

    /// Step the session once, after checking it still owns the demo slot.
    async fn step(&mut self, now: Instant, hw: &mut H) -> Option<Render> {
        let session = self.session.as_mut()?;
        let demo = session.demo();

        if ActiveDemo::from(demo) != self.shared.active_demo() {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} no longer active, dropping session", demo);
            if let Some(stale) = self.session.take() {
                stale.release(hw);
            }
            self.next_step = None;
            return None;
        }

        let result = session.step(hw, now).await;
        self.next_step = Some(now + session.cadence(&self.scheduler));

        match result {
            Step::Frame(screen) => Some(Render::Full(screen)),
            Step::Quiet => None,
            Step::Fault(screen) => {
                if let Some(failed) = self.session.take() {
                    failed.release(hw);
                }
                self.session = Some(Session::Faulted(demo));
                self.next_step = Some(now + self.scheduler.fault_hold);
                Some(Render::Full(screen))
            }
            Step::Finished(screen) => {
                if let Some(done) = self.session.take() {
                    done.release(hw);
                }
                self.next_step = None;
                self.shared.set_active(ActiveDemo::Idle);
                #[cfg(feature = "defmt")]
                defmt::info!("{} finished", demo);
                Some(Render::Full(screen))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::animation::AnimationGeometry;
    use crate::debounce::DebounceState;
    use crate::error::PeripheralError;
    use crate::queue::QUEUE_DEPTH;
    use crate::testing::{FakeHardware, RecordingSurface};
    use crate::work::Button;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    type State = SharedState<CriticalSectionRawMutex, QUEUE_DEPTH>;
    type Ctl<'a> = Controller<'a, FakeHardware, CriticalSectionRawMutex, QUEUE_DEPTH>;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn controller(state: &State) -> Ctl<'_> {
        let geometry = AnimationGeometry {
            display_width: 128,
            text_width: 55,
            y: 10,
            band_height: 8,
        };
        Controller::new(
            state,
            SchedulerConfig::default(),
            DemoConfig::default(),
            Animation::new("FreakStudio", geometry),
        )
    }

    struct Rig {
        hw: FakeHardware,
        surface: RecordingSurface,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                hw: FakeHardware::default(),
                surface: RecordingSurface::default(),
            }
        }

        fn service(&mut self, ctl: &mut Ctl<'_>, ms: u64) {
            block_on(ctl.service(&mut self.hw, &mut self.surface, at(ms)));
        }

        fn last_screen(&self) -> &Screen {
            match self.surface.renders.last() {
                Some(Render::Full(screen)) => screen,
                other => panic!("last render was {:?}", other),
            }
        }
    }

    // ── Switching ────────────────────────────────────────────────────

    #[test]
    fn press_adc_shows_voltages_within_one_drain() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();

        assert!(state.interrupt_context().on_button(Button::Ain0));
        rig.service(&mut ctl, 0);

        assert_eq!(ctl.active_demo(), ActiveDemo::Adc);
        let screen = rig.last_screen();
        assert_eq!(screen.text_at(0), Some("ADC0~3 Voltage"));
        assert_eq!(screen.lines().len(), 5);
    }

    #[test]
    fn switching_adc_to_pwm() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        let irq = state.interrupt_context();

        irq.on_button(Button::Ain0);
        rig.service(&mut ctl, 0);
        irq.on_button(Button::Dio1);
        rig.service(&mut ctl, 10);

        assert_eq!(ctl.active_demo(), ActiveDemo::Pwm);
        let n = rig.surface.renders.len();
        // Stop blanks the panel before the PWM frame replaces it.
        assert_eq!(rig.surface.renders[n - 2], Render::Clear);
        let screen = rig.last_screen();
        assert!(!screen.contains("ADC0~3 Voltage"));
        assert_eq!(screen.text_at(30), Some("Duty: 10%"));
        assert_eq!(rig.hw.log.borrow().pwm_live, 1);

        // Steps follow the 100 ms cadence.
        for ms in [110, 210, 310] {
            rig.service(&mut ctl, ms);
        }
        assert_eq!(rig.hw.log.borrow().duties, [10, 15, 20, 25]);
    }

    #[test]
    fn only_one_handle_live_across_switches() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        let irq = state.interrupt_context();

        let sequence = [Button::Dio1, Button::Uart, Button::Dio1, Button::Ain0, Button::Dio1];
        let mut t = 0;
        for button in sequence {
            state.debounce().release_due(at(t + 1_000));
            assert!(irq.on_button(button));
            rig.service(&mut ctl, t);
            // Bring the UART dialogue to the running phase.
            rig.hw.terminal.input.extend(["", ""]);
            for _ in 0..3 {
                t += 20;
                rig.service(&mut ctl, t);
            }
            assert!(rig.hw.log.borrow().live_handles() <= 1);
            t += 1_000;
        }
        assert_eq!(rig.hw.log.borrow().pwm_opened, 3);
        assert_eq!(rig.hw.log.borrow().pwm_live, 1);
    }

    #[test]
    fn start_without_stop_stops_previous() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();

        state.queue().push(Work::Start(Demo::Pwm));
        rig.service(&mut ctl, 0);
        // StopCurrent lost to overflow; only the start arrives.
        state.queue().push(Work::Start(Demo::Gpio));
        rig.service(&mut ctl, 10);

        assert_eq!(ctl.active_demo(), ActiveDemo::Gpio);
        assert_eq!(rig.hw.log.borrow().pwm_live, 0);
        assert_eq!(rig.last_screen().text_at(0), Some("GP7 Level"));
    }

    #[test]
    fn stop_when_idle_draws_nothing() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut hw = FakeHardware::default();
        assert_eq!(block_on(ctl.handle(Work::StopCurrent, at(0), &mut hw)), None);
        assert!(ctl.active_demo().is_idle());
    }

    #[test]
    fn stale_session_dropped_before_step() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();

        state.queue().push(Work::Start(Demo::Pwm));
        rig.service(&mut ctl, 0);
        let frames = rig.surface.renders.len();

        state.set_active(ActiveDemo::Idle);
        rig.service(&mut ctl, 100);

        assert!(ctl.session().is_none());
        assert_eq!(rig.hw.log.borrow().pwm_live, 0);
        assert_eq!(rig.surface.renders.len(), frames);
        assert_eq!(ctl.next_deadline(), None);
    }

    // ── Faults ───────────────────────────────────────────────────────

    #[test]
    fn pwm_init_failure_is_inert() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        rig.hw.pwm_error = Some(PeripheralError::Unavailable);

        state.queue().push(Work::Start(Demo::Pwm));
        rig.service(&mut ctl, 0);

        assert_eq!(ctl.active_demo(), ActiveDemo::Pwm);
        assert!(ctl.session().is_some_and(Session::is_faulted));
        assert_eq!(rig.last_screen().text_at(0), Some("PWM Init Error"));
        assert_eq!(ctl.next_deadline(), Some(at(500)));

        let frames = rig.surface.renders.len();
        rig.service(&mut ctl, 500);
        rig.service(&mut ctl, 1_000);
        assert_eq!(rig.surface.renders.len(), frames);
        assert_eq!(rig.hw.log.borrow().pwm_opened, 0);
    }

    #[test]
    fn i2c_init_failure_then_switch_away() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        rig.hw.bus_error = Some(PeripheralError::Unavailable);

        state.queue().push(Work::Start(Demo::I2cScan));
        rig.service(&mut ctl, 0);
        assert_eq!(rig.last_screen().text_at(0), Some("I2C Init Error"));

        state.queue().push(Work::StopCurrent);
        state.queue().push(Work::Start(Demo::Gpio));
        rig.service(&mut ctl, 100);
        assert_eq!(ctl.active_demo(), ActiveDemo::Gpio);
    }

    // ── I2C scan ─────────────────────────────────────────────────────

    #[test]
    fn i2c_scan_lists_devices() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        rig.hw.bus.present = [0x20, 0x3c, 0x68].to_vec();

        state.interrupt_context().on_button(Button::I2c1);
        rig.service(&mut ctl, 0);
        let screen = rig.last_screen();
        assert_eq!(screen.text_at(20), Some("Found: 3 Dev"));
        assert_eq!(screen.text_at(48), Some("Addr2: 0x68"));
    }

    // ── UART ─────────────────────────────────────────────────────────

    #[test]
    fn uart_exit_releases_and_goes_idle() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();

        state.interrupt_context().on_button(Button::Uart);
        rig.service(&mut ctl, 0);
        assert_eq!(rig.last_screen().text_at(25), Some("UART RW Terminal"));

        rig.hw.terminal.input.extend(["", "", "exit"]);
        for ms in [10, 20, 30] {
            rig.service(&mut ctl, ms);
        }

        assert_eq!(ctl.active_demo(), ActiveDemo::Idle);
        assert!(ctl.session().is_none());
        assert_eq!(rig.hw.log.borrow().uart_live, 0);
        assert_eq!(rig.last_screen().text_at(25), Some("UART Closed"));
        assert_eq!(rig.last_screen().lines()[0].x, 10);
    }

    // ── Debounce ─────────────────────────────────────────────────────

    #[test]
    fn guard_released_one_window_after_drain() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        let irq = state.interrupt_context();

        assert!(irq.on_button(Button::Dio0));
        rig.service(&mut ctl, 1_000);
        assert_eq!(
            state.debounce().state(Button::Dio0),
            DebounceState::Releasing { at: at(1_100) }
        );
        assert!(!irq.on_button(Button::Dio0));
        assert_eq!(ctl.next_deadline(), Some(at(1_100)));

        rig.service(&mut ctl, 1_100);
        assert!(irq.on_button(Button::Dio0));
    }

    // ── Animation ────────────────────────────────────────────────────

    #[test]
    fn animation_sweeps_then_freezes_centred() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        let irq = state.interrupt_context();
        ctl.start_animation(at(0));

        let mut t = 0;
        while t < 1_000 {
            t += 50;
            irq.on_animation_tick();
            rig.service(&mut ctl, t);
            let max = 128 - 55;
            assert!((0..=max).contains(&ctl.animation().position()));
        }

        assert!(ctl.animation().is_frozen());
        assert_eq!(ctl.animation().position(), 36);
        assert!(!irq.animation_ticks_enabled());
        assert_eq!(rig.last_screen().lines()[0].x, 36);

        // Further ticks are refused.
        assert!(!irq.on_animation_tick());
    }

    #[test]
    fn animation_hidden_while_demo_active() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        let irq = state.interrupt_context();
        ctl.start_animation(at(0));

        irq.on_button(Button::Dio0);
        rig.service(&mut ctl, 0);
        let frames = rig.surface.renders.len();

        irq.on_animation_tick();
        rig.service(&mut ctl, 50);
        assert_eq!(rig.surface.renders.len(), frames);
        assert_eq!(ctl.animation().position(), 1);
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    #[test]
    fn shutdown_sequence() {
        let state = State::new();
        let mut ctl = controller(&state);
        let mut rig = Rig::new();
        let irq = state.interrupt_context();
        ctl.start_animation(at(0));

        irq.on_button(Button::Dio1);
        rig.service(&mut ctl, 0);
        assert!(irq.request_shutdown());
        rig.service(&mut ctl, 100);

        assert_eq!(rig.surface.renders.last(), Some(&Render::Clear));
        assert_eq!(rig.hw.log.borrow().pwm_live, 0);
        assert!(ctl.active_demo().is_idle());
        assert!(!irq.animation_ticks_enabled());
        assert_eq!(ctl.next_deadline(), Some(at(1_100)));

        rig.service(&mut ctl, 1_100);
        assert_eq!(rig.last_screen().text_at(30), Some("Exit Success!"));
        assert!(ctl.is_halted());

        // Buttons are no longer serviced.
        assert!(!irq.on_button(Button::Ain0));
        state.queue().push(Work::Start(Demo::Adc));
        rig.service(&mut ctl, 2_000);
        assert!(ctl.active_demo().is_idle());
        assert_eq!(rig.last_screen().text_at(30), Some("Exit Success!"));
    }
}
