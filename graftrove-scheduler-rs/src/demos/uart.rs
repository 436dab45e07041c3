//! UART passthrough with an interactive setup dialogue on the terminal.
//!
//! ```text
//! Intro ──▶ Baud ──▶ Timeout ──▶ Running
//!             ▲ bad     ▲ bad        │
//!             └─────┘   └─────┘      │
//!   "exit" from any phase ──────────▶ Finished
//! ```
//!
//! While running, bytes from the UART are collected into bursts. A burst
//! is printed on the terminal (hex and text) once the line has been idle
//! for the configured timeout or the burst buffer is full. Each terminal
//! line is sent out on the UART followed by `\n`.

use core::fmt::Write as _;

use embassy_time::{Duration, Instant};
use embedded_hal_nb::nb;
use embedded_hal_nb::serial::{self, Error as _};

use crate::config::DemoConfig;
use crate::demos::Step;
use crate::hardware::{DemoHardware, Terminal, UartConfig};
use crate::screen::Screen;

/// Bytes collected before a burst is printed regardless of timing.
const BURST_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartPhase {
    /// Nothing printed yet.
    Intro,
    /// Waiting for the baud rate.
    Baud,
    /// Waiting for the burst timeout.
    Timeout,
    /// Handle open, passing data both ways.
    Running,
}

pub struct UartDemo<U> {
    phase: UartPhase,
    uart: Option<U>,
    settings: UartConfig,
    burst: heapless::Vec<u8, BURST_BYTES>,
    last_rx: Instant,
    default_baud: u32,
    baud_rates: &'static [u32],
    default_timeout_ms: u32,
    timeout_range: (u32, u32),
}

impl<U> UartDemo<U>
where
    U: serial::Read<u8> + serial::Write<u8>,
{
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            phase: UartPhase::Intro,
            uart: None,
            settings: UartConfig {
                baud_rate: config.uart_default_baud,
                timeout_ms: config.uart_default_timeout_ms,
            },
            burst: heapless::Vec::new(),
            last_rx: Instant::from_ticks(0),
            default_baud: config.uart_default_baud,
            baud_rates: config.uart_baud_rates,
            default_timeout_ms: config.uart_default_timeout_ms,
            timeout_range: (config.uart_timeout_min_ms, config.uart_timeout_max_ms),
        }
    }

    pub fn phase(&self) -> UartPhase {
        self.phase
    }

    pub fn settings(&self) -> UartConfig {
        self.settings
    }

    /// Hand back the UART, if it was opened.
    pub fn into_handle(self) -> Option<U> {
        self.uart
    }

    pub fn step<H>(&mut self, hw: &mut H, now: Instant) -> Step
    where
        H: DemoHardware<Uart = U>,
    {
        match self.phase {
            UartPhase::Intro => {
                let term = hw.terminal();
                let _ = write!(term, "\r\n===== UART config =====\r\n");
                self.prompt_baud(term);
                self.phase = UartPhase::Baud;
                Step::Frame(Screen::new().text(5, 25, "UART RW Terminal"))
            }
            UartPhase::Baud => {
                let Some(line) = hw.terminal().poll_line() else {
                    return Step::Quiet;
                };
                let input = line.trim();
                if is_exit(input) {
                    return finished(hw.terminal());
                }
                let term = hw.terminal();
                match self.parse_baud(input, term) {
                    Ok(baud) => {
                        self.settings.baud_rate = baud;
                        self.phase = UartPhase::Timeout;
                        self.prompt_timeout(term);
                    }
                    Err(()) => self.prompt_baud(term),
                }
                Step::Quiet
            }
            UartPhase::Timeout => {
                let Some(line) = hw.terminal().poll_line() else {
                    return Step::Quiet;
                };
                let input = line.trim();
                if is_exit(input) {
                    return finished(hw.terminal());
                }
                match self.parse_timeout(input, hw.terminal()) {
                    Ok(timeout_ms) => {
                        self.settings.timeout_ms = timeout_ms;
                        self.open(hw)
                    }
                    Err(()) => {
                        self.prompt_timeout(hw.terminal());
                        Step::Quiet
                    }
                }
            }
            UartPhase::Running => self.pump(hw, now),
        }
    }

    // ── Setup dialogue ───────────────────────────────────────────────

    fn prompt_baud(&self, term: &mut impl Terminal) {
        let _ = write!(term, "Baud rate (default {}): ", self.default_baud);
    }

    fn prompt_timeout(&self, term: &mut impl Terminal) {
        let _ = write!(term, "Timeout ms (default {}): ", self.default_timeout_ms);
    }

    /// Empty input takes the default. Rejections print a warning; the
    /// caller re-prompts.
    fn parse_baud(&self, input: &str, term: &mut impl Terminal) -> Result<u32, ()> {
        if input.is_empty() {
            return Ok(self.default_baud);
        }
        match input.parse::<u32>() {
            Ok(baud) if self.baud_rates.contains(&baud) => Ok(baud),
            Ok(_) => {
                let _ = term.write_str("! use one of ");
                for (i, rate) in self.baud_rates.iter().enumerate() {
                    let sep = if i == 0 { "" } else { "/" };
                    let _ = write!(term, "{}{}", sep, rate);
                }
                let _ = term.write_str("\r\n");
                Err(())
            }
            Err(_) => {
                let _ = write!(term, "! enter a number\r\n");
                Err(())
            }
        }
    }

    fn parse_timeout(&self, input: &str, term: &mut impl Terminal) -> Result<u32, ()> {
        if input.is_empty() {
            return Ok(self.default_timeout_ms);
        }
        let (min, max) = self.timeout_range;
        match input.parse::<u32>() {
            Ok(ms) if (min..=max).contains(&ms) => Ok(ms),
            Ok(_) => {
                let _ = write!(term, "! timeout must be {}~{} ms\r\n", min, max);
                Err(())
            }
            Err(_) => {
                let _ = write!(term, "! enter a number\r\n");
                Err(())
            }
        }
    }

    fn open<H>(&mut self, hw: &mut H) -> Step
    where
        H: DemoHardware<Uart = U>,
    {
        match hw.open_uart(&self.settings) {
            Ok(uart) => {
                self.uart = Some(uart);
                self.phase = UartPhase::Running;
                #[cfg(feature = "defmt")]
                defmt::info!("UART open: {}", self.settings);
                let _ = write!(
                    hw.terminal(),
                    "\r\nUART ready: {}bps | timeout {}ms\r\n\
                     ===== passthrough started =====\r\n\
                     terminal -> UART | UART -> terminal\r\n\
                     type 'exit' to leave\r\n\r\n",
                    self.settings.baud_rate,
                    self.settings.timeout_ms
                );
                Step::Quiet
            }
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::error!("UART open failed: {}", err);
                let _ = write!(hw.terminal(), "\r\nUART config failed: {}\r\n", err);
                Step::Fault(Screen::new().text(10, 25, "UART Config Err"))
            }
        }
    }

    // ── Passthrough ──────────────────────────────────────────────────

    fn pump<H>(&mut self, hw: &mut H, now: Instant) -> Step
    where
        H: DemoHardware<Uart = U>,
    {
        let Some(uart) = self.uart.as_mut() else {
            return Step::Quiet;
        };
        let term = hw.terminal();

        // UART -> terminal
        loop {
            match uart.read() {
                Ok(byte) => {
                    // Room is guaranteed: a full burst is printed below.
                    let _ = self.burst.push(byte);
                    self.last_rx = now;
                    if self.burst.is_full() {
                        print_burst(term, &mut self.burst);
                    }
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => {
                    let _ = write!(term, "\r\n! UART error: {:?}\r\n", e.kind());
                    break;
                }
            }
        }
        let idle = Duration::from_millis(u64::from(self.settings.timeout_ms));
        if !self.burst.is_empty() && now.saturating_duration_since(self.last_rx) >= idle {
            print_burst(term, &mut self.burst);
        }

        // terminal -> UART
        let Some(line) = term.poll_line() else {
            return Step::Quiet;
        };
        let input = line.trim();
        if input.is_empty() {
            return Step::Quiet;
        }
        if is_exit(input) {
            print_burst(term, &mut self.burst);
            return finished(hw.terminal());
        }

        let sent = input
            .bytes()
            .chain(core::iter::once(b'\n'))
            .try_for_each(|b| nb::block!(uart.write(b)))
            .and_then(|()| nb::block!(uart.flush()));
        match sent {
            Ok(()) => {
                let _ = write!(term, "[terminal tx] {}\r\n\r\n", input);
            }
            Err(e) => {
                let _ = write!(term, "\r\n! UART error: {:?}\r\n", e.kind());
            }
        }
        Step::Quiet
    }
}

fn finished(term: &mut impl Terminal) -> Step {
    let _ = write!(term, "\r\nleaving UART passthrough\r\n");
    #[cfg(feature = "defmt")]
    defmt::info!("UART demo exited from terminal");
    Step::Finished(Screen::new().text(10, 25, "UART Closed"))
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit")
}

/// Print a burst as hex pairs and printable text, then empty it.
fn print_burst<const N: usize>(term: &mut impl Terminal, burst: &mut heapless::Vec<u8, N>) {
    if burst.is_empty() {
        return;
    }
    let _ = write!(term, "[uart rx]\r\n  hex:  ");
    for (i, b) in burst.iter().enumerate() {
        let sep = if i == 0 { "" } else { " " };
        let _ = write!(term, "{}{:02X}", sep, b);
    }
    let _ = write!(term, "\r\n  text: ");
    for &b in burst.iter() {
        let c = if (0x20..=0x7E).contains(&b) { b as char } else { '.' };
        let _ = term.write_char(c);
    }
    let _ = write!(term, "\r\n\r\n");
    burst.clear();
}
