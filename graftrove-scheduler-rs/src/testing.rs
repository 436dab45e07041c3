//! In-memory board used by the unit tests.

extern crate std;

use core::cell::RefCell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::i2c::{ErrorKind, ErrorType as I2cErrorType, NoAcknowledgeSource, Operation};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};
use embedded_hal_async::i2c::I2c;
use embedded_hal_nb::nb;
use embedded_hal_nb::serial::{self, ErrorType as SerialErrorType};

use crate::error::PeripheralError;
use crate::hardware::{DemoHardware, Surface, Terminal, TerminalLine, UartConfig};
use crate::screen::Render;

/// Everything the fakes record.
#[derive(Default)]
pub struct Log {
    pub pwm_live: i32,
    pub pwm_opened: u32,
    pub pwm_frequency: Option<u32>,
    /// Duty percentages applied, in order.
    pub duties: Vec<u16>,
    pub uart_live: i32,
    pub uart_config: Option<UartConfig>,
    pub uart_tx: Vec<u8>,
    pub uart_rx: VecDeque<u8>,
}

impl Log {
    /// Handles of all kinds currently open.
    pub fn live_handles(&self) -> i32 {
        self.pwm_live + self.uart_live
    }
}

pub type SharedLog = Rc<RefCell<Log>>;

// ── PWM ──────────────────────────────────────────────────────────────

pub struct FakePwm {
    log: SharedLog,
}

impl PwmErrorType for FakePwm {
    type Error = Infallible;
}

impl SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        100
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.log.borrow_mut().duties.push(duty);
        Ok(())
    }
}

// ── UART ─────────────────────────────────────────────────────────────

pub struct FakeUart {
    log: SharedLog,
}

impl SerialErrorType for FakeUart {
    type Error = serial::ErrorKind;
}

impl serial::Read<u8> for FakeUart {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.log
            .borrow_mut()
            .uart_rx
            .pop_front()
            .ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for FakeUart {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.log.borrow_mut().uart_tx.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

// ── I2C ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeBus {
    pub present: Vec<u8>,
    pub fault: Option<ErrorKind>,
}

impl I2cErrorType for FakeBus {
    type Error = ErrorKind;
}

impl I2c for FakeBus {
    async fn transaction(
        &mut self,
        address: u8,
        _operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if let Some(kind) = self.fault {
            return Err(kind);
        }
        if self.present.contains(&address) {
            Ok(())
        } else {
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        }
    }
}

// ── Terminal ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeTerminal {
    pub input: VecDeque<&'static str>,
    pub output: String,
}

impl core::fmt::Write for FakeTerminal {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl Terminal for FakeTerminal {
    fn poll_line(&mut self) -> Option<TerminalLine> {
        let line = self.input.pop_front()?;
        let mut out = TerminalLine::new();
        out.push_str(line).ok()?;
        Some(out)
    }
}

// ── Board ────────────────────────────────────────────────────────────

pub struct FakeHardware {
    pub log: SharedLog,
    pub analog: [Result<u16, PeripheralError>; 4],
    pub full_scale: u16,
    pub level: Result<bool, PeripheralError>,
    pub pwm_error: Option<PeripheralError>,
    pub uart_error: Option<PeripheralError>,
    pub bus: FakeBus,
    pub bus_error: Option<PeripheralError>,
    pub terminal: FakeTerminal,
}

impl Default for FakeHardware {
    fn default() -> Self {
        Self {
            log: SharedLog::default(),
            analog: [Ok(0); 4],
            full_scale: 4095,
            level: Ok(true),
            pwm_error: None,
            uart_error: None,
            bus: FakeBus::default(),
            bus_error: None,
            terminal: FakeTerminal::default(),
        }
    }
}

impl DemoHardware for FakeHardware {
    type Pwm = FakePwm;
    type Uart = FakeUart;
    type ScanBus = FakeBus;
    type Terminal = FakeTerminal;

    async fn read_analog(&mut self, channel: usize) -> Result<u16, PeripheralError> {
        self.analog
            .get(channel)
            .copied()
            .unwrap_or(Err(PeripheralError::Unavailable))
    }

    fn analog_full_scale(&self) -> u16 {
        self.full_scale
    }

    fn read_level(&mut self) -> Result<bool, PeripheralError> {
        self.level
    }

    fn open_pwm(&mut self, frequency_hz: u32) -> Result<FakePwm, PeripheralError> {
        if let Some(e) = self.pwm_error {
            return Err(e);
        }
        let mut log = self.log.borrow_mut();
        log.pwm_live += 1;
        log.pwm_opened += 1;
        log.pwm_frequency = Some(frequency_hz);
        Ok(FakePwm {
            log: self.log.clone(),
        })
    }

    fn release_pwm(&mut self, pwm: FakePwm) {
        pwm.log.borrow_mut().pwm_live -= 1;
    }

    fn open_uart(&mut self, config: &UartConfig) -> Result<FakeUart, PeripheralError> {
        if let Some(e) = self.uart_error {
            return Err(e);
        }
        let mut log = self.log.borrow_mut();
        log.uart_live += 1;
        log.uart_config = Some(*config);
        Ok(FakeUart {
            log: self.log.clone(),
        })
    }

    fn release_uart(&mut self, uart: FakeUart) {
        uart.log.borrow_mut().uart_live -= 1;
    }

    fn scan_bus(&mut self) -> Result<&mut FakeBus, PeripheralError> {
        match self.bus_error {
            Some(e) => Err(e),
            None => Ok(&mut self.bus),
        }
    }

    fn terminal(&mut self) -> &mut FakeTerminal {
        &mut self.terminal
    }
}

/// Surface that keeps every command it was given.
#[derive(Default)]
pub struct RecordingSurface {
    pub renders: Vec<Render>,
}

impl Surface for RecordingSurface {
    async fn present(&mut self, render: &Render) {
        self.renders.push(render.clone());
    }
}
