//! Boot animation: a short left-right sweep of one text line.
//!
//! Each advance moves the text one pixel, bouncing off the display edges.
//! Once the configured duration has elapsed the text snaps to the centre
//! and the animation freezes for good.

use embassy_time::{Duration, Instant};

use crate::screen::{Render, Screen};

/// Where the animated text lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationGeometry {
    pub display_width: i32,
    /// Rendered width of the text in pixels.
    pub text_width: i32,
    /// Top of the text row.
    pub y: i32,
    /// Height of the strip cleared before each frame.
    pub band_height: u32,
}

impl AnimationGeometry {
    /// Largest x that keeps the whole text on screen.
    pub fn max_position(&self) -> i32 {
        (self.display_width - self.text_width).max(0)
    }

    pub fn centre(&self) -> i32 {
        self.max_position() / 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Not started yet.
    Pending,
    Sweeping,
    Frozen,
}

/// What an advance produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Intermediate position; partial refresh.
    Sweep(Render),
    /// The final, centred frame. The tick source should be disabled.
    Final(Render),
}

pub struct Animation {
    text: &'static str,
    geometry: AnimationGeometry,
    position: i32,
    direction: i32,
    start: Instant,
    phase: Phase,
}

impl Animation {
    pub fn new(text: &'static str, geometry: AnimationGeometry) -> Self {
        Self {
            text,
            geometry,
            position: 0,
            direction: 1,
            start: Instant::from_ticks(0),
            phase: Phase::Pending,
        }
    }

    /// Begin sweeping from the left edge, timing from `now`.
    pub fn start(&mut self, now: Instant) {
        self.position = 0;
        self.direction = 1;
        self.start = now;
        self.phase = Phase::Sweeping;
    }

    /// Step the state machine. Returns `None` unless sweeping.
    pub fn advance(&mut self, now: Instant, duration: Duration) -> Option<Frame> {
        if self.phase != Phase::Sweeping {
            return None;
        }

        if now.saturating_duration_since(self.start) >= duration {
            self.phase = Phase::Frozen;
            self.position = self.geometry.centre();
            #[cfg(feature = "defmt")]
            defmt::info!("animation frozen at x={}", self.position);
            let screen = Screen::new().text(self.position, self.geometry.y, self.text);
            return Some(Frame::Final(Render::Full(screen)));
        }

        let max = self.geometry.max_position();
        let mut next = self.position + self.direction;
        if !(0..=max).contains(&next) {
            self.direction = -self.direction;
            next = self.position + self.direction;
        }
        self.position = next.clamp(0, max);

        Some(Frame::Sweep(Render::Band {
            y: self.geometry.y,
            height: self.geometry.band_height,
            x: self.position,
            text: self.text,
        }))
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == Phase::Frozen
    }
}
