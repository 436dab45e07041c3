//! [`DemoHardware`] over the RP235x peripherals.
//!
//! The ADC, the GPIO input and the secondary I2C bus live for the whole
//! run. PWM and UART drivers are built on each demo start and dropped on
//! stop, so a pin is only driven while its demo is active.

use core::convert::Infallible;

use defmt::*;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::Input;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, PIN_0, PIN_1, PIN_9, PWM_SLICE4, UART0};
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::uart::{self, Blocking, Uart};
use embassy_rp::Peri;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use graftrove::{DemoHardware, PeripheralError, UartConfig};

use crate::terminal::UsbTerminal;

/// 12-bit converter.
const ADC_FULL_SCALE: u16 = 4095;

/// Fixed clock divider for the demo PWM slice.
const PWM_DIVIDER: u8 = 10;

pub type ScanBus = I2c<'static, I2C1, i2c::Async>;

// ── PWM handle ───────────────────────────────────────────────────────────

/// Channel B of slice 4 (GP9).
pub struct PwmHandle {
    pwm: Pwm<'static>,
    config: pwm::Config,
}

impl ErrorType for PwmHandle {
    type Error = Infallible;
}

impl SetDutyCycle for PwmHandle {
    fn max_duty_cycle(&self) -> u16 {
        // Compare value top + 1 keeps the output high for the whole period.
        self.config.top.saturating_add(1)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.config.compare_b = duty;
        self.pwm.set_config(&self.config);
        Ok(())
    }
}

/// Counter wrap value giving `frequency_hz` after [`PWM_DIVIDER`].
fn pwm_top(clock_hz: u32, frequency_hz: u32) -> Option<u16> {
    let ticks = clock_hz.checked_div(u32::from(PWM_DIVIDER) * frequency_hz)?;
    u16::try_from(ticks.checked_sub(1)?).ok()
}

// ── Board ────────────────────────────────────────────────────────────────

/// Peripherals the demos own.
pub struct BoardParts {
    pub adc: Adc<'static, adc::Async>,
    pub analog: [Channel<'static>; 4],
    pub level: Input<'static>,
    pub pwm_slice: Peri<'static, PWM_SLICE4>,
    pub pwm_pin: Peri<'static, PIN_9>,
    pub uart: Peri<'static, UART0>,
    pub uart_tx: Peri<'static, PIN_0>,
    pub uart_rx: Peri<'static, PIN_1>,
    pub scan_bus: ScanBus,
}

pub struct Board {
    parts: BoardParts,
    terminal: UsbTerminal,
}

impl Board {
    pub fn new(parts: BoardParts) -> Self {
        Self {
            parts,
            terminal: UsbTerminal::new(),
        }
    }
}

impl DemoHardware for Board {
    type Pwm = PwmHandle;
    type Uart = Uart<'static, Blocking>;
    type ScanBus = ScanBus;
    type Terminal = UsbTerminal;

    async fn read_analog(&mut self, channel: usize) -> Result<u16, PeripheralError> {
        let parts = &mut self.parts;
        let input = parts
            .analog
            .get_mut(channel)
            .ok_or(PeripheralError::Unavailable)?;
        parts
            .adc
            .read(input)
            .await
            .map_err(|_| PeripheralError::Conversion)
    }

    fn analog_full_scale(&self) -> u16 {
        ADC_FULL_SCALE
    }

    fn read_level(&mut self) -> Result<bool, PeripheralError> {
        Ok(self.parts.level.is_high())
    }

    fn open_pwm(&mut self, frequency_hz: u32) -> Result<PwmHandle, PeripheralError> {
        let top = pwm_top(clk_sys_freq(), frequency_hz).ok_or(PeripheralError::Config)?;

        let mut config = pwm::Config::default();
        config.divider = PWM_DIVIDER.into();
        config.top = top;
        config.compare_b = 0;

        // SAFETY: the controller holds at most one PWM handle and returns it
        // through `release_pwm` before opening another, so slice 4 and GP9
        // never have two live drivers.
        let (slice, pin) = unsafe {
            (
                self.parts.pwm_slice.clone_unchecked(),
                self.parts.pwm_pin.clone_unchecked(),
            )
        };
        let pwm = Pwm::new_output_b(slice, pin, config.clone());

        info!("PWM open: {} Hz, top {}", frequency_hz, top);
        Ok(PwmHandle { pwm, config })
    }

    fn release_pwm(&mut self, mut pwm: PwmHandle) {
        pwm.config.compare_b = 0;
        pwm.config.enable = false;
        pwm.pwm.set_config(&pwm.config);
        info!("PWM released");
    }

    fn open_uart(&mut self, config: &UartConfig) -> Result<Self::Uart, PeripheralError> {
        if config.baud_rate == 0 {
            return Err(PeripheralError::Config);
        }
        let mut uart_config = uart::Config::default();
        uart_config.baudrate = config.baud_rate;

        // SAFETY: same single-handle rule as the PWM; the UART is dropped in
        // `release_uart` before the pins can be claimed again.
        let (uart, tx, rx) = unsafe {
            (
                self.parts.uart.clone_unchecked(),
                self.parts.uart_tx.clone_unchecked(),
                self.parts.uart_rx.clone_unchecked(),
            )
        };

        info!("UART0 open: {} baud", config.baud_rate);
        Ok(Uart::new_blocking(uart, tx, rx, uart_config))
    }

    fn release_uart(&mut self, mut uart: Self::Uart) {
        if uart.blocking_flush().is_err() {
            warn!("UART0 flush failed on release");
        }
        info!("UART0 released");
    }

    fn scan_bus(&mut self) -> Result<&mut ScanBus, PeripheralError> {
        Ok(&mut self.parts.scan_bus)
    }

    fn terminal(&mut self) -> &mut UsbTerminal {
        &mut self.terminal
    }
}
