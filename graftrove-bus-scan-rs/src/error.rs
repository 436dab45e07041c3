//! Error types for the bus scanner.

use core::fmt;

/// Errors that can occur while scanning an I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError<E> {
    /// Underlying I2C bus error other than a missing acknowledge.
    I2c(E),

    /// Address outside the 7-bit range, or an empty scan range.
    InvalidAddress,
}

impl<E> ScanError<E> {
    /// The wrapped bus error, if any.
    pub fn bus_error(&self) -> Option<&E> {
        match self {
            ScanError::I2c(e) => Some(e),
            ScanError::InvalidAddress => None,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for ScanError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanError::I2c(e) => write!(f, "bus error: {:?}", e),
            ScanError::InvalidAddress => write!(f, "address outside 0x00-0x7F or empty range"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for ScanError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ScanError::I2c(e) => defmt::write!(f, "bus error: {}", e),
            ScanError::InvalidAddress => defmt::write!(f, "address outside 0x00-0x7F or empty range"),
        }
    }
}
