//! Single-address presence check.
//!
//! A device is present when it acknowledges its address. The check issues a
//! one-byte read: many I2C controllers (the RP2040/RP2350 among them) refuse
//! zero-length transfers, and a read never changes device state the way a
//! stray write could.
//!
//! This module is crate-private — consumers interact with [`BusScanner`]
//! in `scanner.rs` instead.
//!
//! [`BusScanner`]: crate::BusScanner

use embedded_hal_async::i2c::{Error, ErrorKind, I2c};

use crate::error::ScanError;

/// Probe one address.
///
/// Returns `Ok(true)` on acknowledge, `Ok(false)` on a NACK, and the bus
/// error for anything else (arbitration loss, bus fault, overrun...).
pub(crate) async fn probe<I2C>(i2c: &mut I2C, address: u8) -> Result<bool, ScanError<I2C::Error>>
where
    I2C: I2c,
{
    let mut scratch = [0u8; 1];
    match i2c.read(address, &mut scratch).await {
        Ok(()) => Ok(true),
        Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => Ok(false),
        Err(e) => Err(ScanError::I2c(e)),
    }
}
