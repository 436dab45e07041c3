//! Async I2C bus scanner for the Graftrove demo board.
//!
//! This crate walks the 7-bit I2C address space and reports which addresses
//! acknowledge. The firmware uses it twice: at boot on the display bus to
//! discover the SSD1306 address, and in the I2C-scan demo on the secondary
//! bus.
//!
//! # Architecture
//!
//! The crate is split into two layers:
//!
//! - **`probe`** (crate-private) — single-address presence check built on a
//!   one-byte read, mapping a NACK to "absent" and any other bus error to a
//!   failure.
//! - **[`BusScanner`]** (public) — validated range handling and the full
//!   scan returning a fixed-capacity list of addresses.
//!
//! # Quick start
//!
//! ```no_run
//! use bus_scan::BusScanner;
//!
//! # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
//! let mut scanner = BusScanner::new(i2c);
//! let devices = scanner.scan().await.unwrap();
//! for addr in &devices {
//!     // 0x3c, 0x68, ...
//! }
//! # }
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on error types
//!   for embedded logging.

#![no_std]

pub use addresses::{
    display_address, DEFAULT_DISPLAY_ADDRESS, DISPLAY_ADDRESSES, FIRST_ADDRESS, LAST_ADDRESS,
};
pub use error::ScanError;
pub use scanner::{BusScanner, Devices, MAX_DEVICES};

mod addresses;
mod error;
mod probe;
mod scanner;
