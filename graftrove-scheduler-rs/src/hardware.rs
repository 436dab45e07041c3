//! Seams between the core and the board.
//!
//! The firmware implements these traits over `embassy-rp` drivers; tests
//! implement them with small fakes.

use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::i2c::I2c;
use embedded_hal_nb::serial;

use crate::error::PeripheralError;
use crate::screen::Render;

/// Maximum length of one terminal input line.
pub const TERMINAL_LINE: usize = 64;

/// One line read from the terminal, without its terminator.
pub type TerminalLine = heapless::String<TERMINAL_LINE>;

/// Serial settings for the UART demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    pub baud_rate: u32,
    /// Idle gap that closes a received burst.
    pub timeout_ms: u32,
}

/// Line-oriented text terminal (USB CDC-ACM on the board).
///
/// Output is best-effort: write errors mean nobody is listening and are
/// ignored by callers.
pub trait Terminal: core::fmt::Write {
    /// Next complete input line, if one has arrived.
    fn poll_line(&mut self) -> Option<TerminalLine>;
}

/// Everything the demos touch.
///
/// PWM and UART handles are created per demo start and handed back on stop;
/// the core guarantees at most one of them is live at a time.
#[allow(async_fn_in_trait)]
pub trait DemoHardware {
    type Pwm: SetDutyCycle;
    type Uart: serial::Read<u8> + serial::Write<u8>;
    type ScanBus: I2c;
    type Terminal: Terminal;

    /// Raw conversion of ADC input `channel` (0 = GP26).
    async fn read_analog(&mut self, channel: usize) -> Result<u16, PeripheralError>;

    /// Raw code corresponding to the reference voltage.
    fn analog_full_scale(&self) -> u16;

    /// Level of the GPIO demo input; `true` is high.
    fn read_level(&mut self) -> Result<bool, PeripheralError>;

    fn open_pwm(&mut self, frequency_hz: u32) -> Result<Self::Pwm, PeripheralError>;

    /// Disable the output and give the slice back.
    fn release_pwm(&mut self, pwm: Self::Pwm);

    fn open_uart(&mut self, config: &UartConfig) -> Result<Self::Uart, PeripheralError>;

    fn release_uart(&mut self, uart: Self::Uart);

    /// The secondary I2C bus, or why it is not usable.
    fn scan_bus(&mut self) -> Result<&mut Self::ScanBus, PeripheralError>;

    fn terminal(&mut self) -> &mut Self::Terminal;
}

/// Something that can show [`Render`] commands.
#[allow(async_fn_in_trait)]
pub trait Surface {
    async fn present(&mut self, render: &Render);
}
