//! The five hardware demos.
//!
//! Each demo is a small state machine. The lifecycle controller calls its
//! `step` once per cadence tick; a step does one unit of hardware I/O and
//! describes what the display should show.
//!
//! ```text
//! Demo      Cadence  Hardware
//! ADC       500 ms   GP26..GP29 analog inputs
//! PWM       100 ms   GP9 (slice 4 B), 1 kHz
//! GPIO      200 ms   GP7 input, pull-up
//! I2C scan  500 ms   I2C1 on GP2/GP3, 100 kHz
//! UART       10 ms   UART0 on GP0/GP1 + USB terminal
//! ```

use core::fmt::Write;

use crate::error::PeripheralError;
use crate::screen::Screen;

mod adc;
mod gpio;
mod i2c_scan;
mod pwm;
mod uart;

pub use adc::AdcDemo;
pub use gpio::GpioDemo;
pub use i2c_scan::{I2cScanDemo, MAX_LISTED_ADDRESSES};
pub use pwm::PwmDemo;
pub use uart::{UartDemo, UartPhase};

/// Result of one demo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// New frame; keep stepping.
    Frame(Screen),
    /// Nothing new to draw; keep stepping.
    Quiet,
    /// Setup failed. Show the screen and go inert until switched away.
    Fault(Screen),
    /// The demo gave up the hardware by itself.
    Finished(Screen),
}

/// Characters of an error message shown on screen.
const ERROR_CHARS: usize = 10;

/// Append `Err: <first 10 chars of err>` at (`x`, `y`).
pub(crate) fn push_error(screen: &mut Screen, x: i32, y: i32, err: &PeripheralError) {
    let mut text: heapless::String<32> = heapless::String::new();
    let _ = write!(text, "{}", err);
    let cut = text
        .char_indices()
        .nth(ERROR_CHARS)
        .map_or(text.len(), |(i, _)| i);
    screen.push_line(x, y, format_args!("Err: {}", &text[..cut]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    #[test]
    fn error_text_cut_to_ten_chars() {
        let mut s = Screen::new();
        push_error(
            &mut s,
            0,
            20,
            &PeripheralError::Bus(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        );
        assert_eq!(s.text_at(20), Some("Err: no acknowl"));
    }

    #[test]
    fn short_error_text_kept() {
        let mut s = Screen::new();
        push_error(&mut s, 0, 20, &PeripheralError::Config);
        assert_eq!(s.text_at(20), Some("Err: bad config"));
    }
}
