//! Error types shared by the demo bodies and the hardware traits.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

/// Failures reported by a [`DemoHardware`](crate::DemoHardware)
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralError {
    /// I2C transfer failed.
    Bus(ErrorKind),
    /// ADC conversion did not complete.
    Conversion,
    /// Requested configuration is not supported by the peripheral.
    Config,
    /// No device answered where one was required.
    NoDevice,
    /// Peripheral has not been set up or is owned elsewhere.
    Unavailable,
}

impl From<ErrorKind> for PeripheralError {
    fn from(kind: ErrorKind) -> Self {
        PeripheralError::Bus(kind)
    }
}

impl fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PeripheralError::Bus(kind) => match kind {
                ErrorKind::Bus => f.write_str("bus fault"),
                ErrorKind::ArbitrationLoss => f.write_str("arbitration lost"),
                ErrorKind::NoAcknowledge(_) => f.write_str("no acknowledge"),
                ErrorKind::Overrun => f.write_str("overrun"),
                _ => f.write_str("i2c error"),
            },
            PeripheralError::Conversion => f.write_str("conversion failed"),
            PeripheralError::Config => f.write_str("bad config"),
            PeripheralError::NoDevice => f.write_str("no device"),
            PeripheralError::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PeripheralError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            PeripheralError::Bus(kind) => defmt::write!(f, "Bus({})", defmt::Debug2Format(kind)),
            PeripheralError::Conversion => defmt::write!(f, "Conversion"),
            PeripheralError::Config => defmt::write!(f, "Config"),
            PeripheralError::NoDevice => defmt::write!(f, "NoDevice"),
            PeripheralError::Unavailable => defmt::write!(f, "Unavailable"),
        }
    }
}
