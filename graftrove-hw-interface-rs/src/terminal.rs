//! USB CDC-ACM text terminal.
//!
//! Two pipes decouple the USB endpoints from the main loop. The RX task
//! runs on the high-priority executor, turns Ctrl-C into the shutdown
//! request and queues every other byte for [`UsbTerminal::poll_line`].
//! Output is written into the TX pipe without waiting and dropped when the
//! pipe is full (nobody connected).

use core::fmt;

use defmt::*;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_usb::class::cdc_acm::{Receiver, Sender};
use embassy_usb::UsbDevice;
use graftrove::{InterruptContext, Terminal, TerminalLine, QUEUE_DEPTH};

pub type UsbDriver = Driver<'static, USB>;

/// Full-speed bulk packet size.
pub const MAX_PACKET: usize = 64;

const PIPE_SIZE: usize = 256;
const CTRL_C: u8 = 0x03;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

static INPUT: Pipe<CriticalSectionRawMutex, PIPE_SIZE> = Pipe::new();
static OUTPUT: Pipe<CriticalSectionRawMutex, PIPE_SIZE> = Pipe::new();

/// Best-effort write into the TX pipe.
fn send(bytes: &[u8]) {
    let mut rest = bytes;
    while !rest.is_empty() {
        match OUTPUT.try_write(rest) {
            Ok(n) => rest = &rest[n..],
            Err(_) => return,
        }
    }
}

// ── Main-loop side ───────────────────────────────────────────────────────

/// Line assembler over the RX pipe.
pub struct UsbTerminal {
    line: TerminalLine,
    /// Last terminator was `\r`, so a following `\n` belongs to it.
    after_cr: bool,
}

impl UsbTerminal {
    pub const fn new() -> Self {
        Self {
            line: TerminalLine::new(),
            after_cr: false,
        }
    }
}

impl fmt::Write for UsbTerminal {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        send(s.as_bytes());
        Ok(())
    }
}

impl Terminal for UsbTerminal {
    fn poll_line(&mut self) -> Option<TerminalLine> {
        let mut byte = [0u8; 1];
        // One byte at a time so input after the line end stays queued.
        while let Ok(1) = INPUT.try_read(&mut byte) {
            let after_cr = core::mem::replace(&mut self.after_cr, false);
            match byte[0] {
                b'\n' if after_cr => {}
                b'\r' | b'\n' => {
                    self.after_cr = byte[0] == b'\r';
                    return Some(core::mem::take(&mut self.line));
                }
                BACKSPACE | DELETE => {
                    self.line.pop();
                }
                b if b.is_ascii_graphic() || b == b' ' => {
                    // Overlong lines are cut, not split.
                    let _ = self.line.push(b as char);
                }
                _ => {}
            }
        }
        None
    }
}

// ── Tasks ────────────────────────────────────────────────────────────────

#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    device.run().await
}

/// Drain the TX pipe into the IN endpoint.
#[embassy_executor::task]
pub async fn terminal_tx_task(mut sender: Sender<'static, UsbDriver>) {
    let mut buf = [0u8; MAX_PACKET];
    loop {
        sender.wait_connection().await;
        info!("terminal connected");
        loop {
            let n = OUTPUT.read(&mut buf).await;
            if sender.write_packet(&buf[..n]).await.is_err() {
                break;
            }
        }
        info!("terminal disconnected");
    }
}

/// Read the OUT endpoint, echo, and feed the line assembler.
#[embassy_executor::task]
pub async fn terminal_rx_task(
    mut receiver: Receiver<'static, UsbDriver>,
    ctx: InterruptContext<'static, CriticalSectionRawMutex, QUEUE_DEPTH>,
) {
    let mut buf = [0u8; MAX_PACKET];
    loop {
        receiver.wait_connection().await;
        while let Ok(n) = receiver.read_packet(&mut buf).await {
            for &byte in &buf[..n] {
                match byte {
                    CTRL_C => {
                        if ctx.request_shutdown() {
                            info!("stop signal received");
                        }
                    }
                    b'\r' => {
                        send(b"\r\n");
                        let _ = INPUT.try_write(&[byte]);
                    }
                    b'\n' => {
                        let _ = INPUT.try_write(&[byte]);
                    }
                    _ => {
                        send(&[byte]);
                        let _ = INPUT.try_write(&[byte]);
                    }
                }
            }
        }
    }
}
