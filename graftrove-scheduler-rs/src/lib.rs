//! Deferred-work scheduler and demo lifecycle for the Graftrove demo board.
//!
//! Button and timer interrupts never touch hardware. They go through an
//! [`InterruptContext`], which debounces presses and pushes plain-data
//! [`Work`] items onto a bounded queue. The main loop hands the queue to a
//! [`Controller`], which executes items strictly in push order, keeps at
//! most one demo (and its PWM/UART handle) alive, steps the running demo at
//! its cadence and drives the boot animation.
//!
//! # Architecture
//!
//! ```text
//!  IRQ: buttons, ticker, terminal          main loop
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ InterruptContext             │      │ Controller                   │
//! │  on_button ─▶ DebounceGuard  │      │  drain ─▶ handle(Work)       │
//! │            └▶ WorkQueue ─────┼──────┼─▶ poll  ─▶ Session::step     │
//! │  on_animation_tick (coalesce)│      │  Render ─▶ Surface::present  │
//! └──────────────────────────────┘      └──────────────────────────────┘
//!                  SharedState (static, const-constructed)
//! ```
//!
//! Hardware is reached only through the [`DemoHardware`], [`Terminal`] and
//! [`Surface`] traits; the core never reads the clock, every entry point
//! takes `now` from the caller.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation; all buffers are `heapless`. The optional `defmt`
//! feature enables structured logging and `defmt::Format` on public types.

#![no_std]

pub mod animation;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod demos;
pub mod error;
pub mod hardware;
pub mod queue;
pub mod screen;
pub mod shared;
pub mod work;

#[cfg(test)]
mod testing;

pub use animation::{Animation, AnimationGeometry, Frame, Phase};
pub use config::{DemoConfig, SchedulerConfig};
pub use controller::{Controller, Session};
pub use debounce::{DebounceGuard, DebounceState};
pub use error::PeripheralError;
pub use hardware::{DemoHardware, Surface, Terminal, TerminalLine, UartConfig, TERMINAL_LINE};
pub use queue::{WorkQueue, QUEUE_DEPTH};
pub use screen::{Outline, Render, Screen, TextLine, LINE_CHARS, MAX_LINES};
pub use shared::{InterruptContext, SharedState};
pub use work::{ActiveDemo, Button, Demo, Work, BUTTON_COUNT};
