//! Range-validated scanning over any async I2C bus.
//!
//! [`BusScanner`] owns (or mutably borrows, since `&mut I2C` is itself an
//! [`I2c`]) a bus and probes every address in its configured range.

use embedded_hal_async::i2c::I2c;

use crate::addresses::{FIRST_ADDRESS, LAST_ADDRESS, MAX_7BIT_ADDRESS};
use crate::error::ScanError;
use crate::probe::probe;

/// Upper bound on responders: every address in `0x08..=0x77`.
pub const MAX_DEVICES: usize = (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize;

/// Addresses that acknowledged, in ascending order.
pub type Devices = heapless::Vec<u8, MAX_DEVICES>;

/// Async I2C bus scanner.
///
/// # Example
///
/// ```no_run
/// use bus_scan::BusScanner;
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// // Scan only the upper half of the address space
/// let mut scanner = BusScanner::with_range(i2c, 0x40, 0x77).unwrap();
/// let devices = scanner.scan().await.unwrap();
/// # }
/// ```
pub struct BusScanner<I2C> {
    i2c: I2C,
    first: u8,
    last: u8,
}

impl<I2C> BusScanner<I2C>
where
    I2C: I2c,
{
    /// Scanner over the full non-reserved range `0x08..=0x77`.
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            first: FIRST_ADDRESS,
            last: LAST_ADDRESS,
        }
    }

    /// Scanner over `first..=last`.
    ///
    /// # Errors
    /// * [`ScanError::InvalidAddress`] if either bound exceeds `0x7F` or
    ///   `first > last`
    pub fn with_range(i2c: I2C, first: u8, last: u8) -> Result<Self, ScanError<I2C::Error>> {
        if first > last || last > MAX_7BIT_ADDRESS {
            return Err(ScanError::InvalidAddress);
        }
        Ok(Self { i2c, first, last })
    }

    // -----------------------------------------------------------------------
    // Scanning
    // -----------------------------------------------------------------------

    /// Probe every address in range, lowest first.
    ///
    /// A NACK simply leaves the address out of the result.
    ///
    /// # Errors
    /// Returns the first non-NACK bus error. No partial list is returned,
    /// so a caller never mistakes a half-finished scan for a quiet bus.
    pub async fn scan(&mut self) -> Result<Devices, ScanError<I2C::Error>> {
        let mut devices = Devices::new();

        for address in self.first..=self.last {
            if probe(&mut self.i2c, address).await? {
                // Capacity covers the whole valid range, so this cannot fail.
                let _ = devices.push(address);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "scan {=u8:#x}..={=u8:#x}: {} device(s)",
            self.first,
            self.last,
            devices.len()
        );

        Ok(devices)
    }

    /// Check a single address.
    ///
    /// # Errors
    /// * [`ScanError::InvalidAddress`] if `address > 0x7F`
    /// * [`ScanError::I2c`] on a bus error other than NACK
    pub async fn probe(&mut self, address: u8) -> Result<bool, ScanError<I2C::Error>> {
        if address > MAX_7BIT_ADDRESS {
            return Err(ScanError::InvalidAddress);
        }
        probe(&mut self.i2c, address).await
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
