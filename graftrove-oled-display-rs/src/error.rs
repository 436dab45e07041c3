//! Error types for the OLED display.

use core::fmt;

use display_interface::DisplayError;

/// Errors that can occur while driving the panel.
///
/// The `ssd1306` crate folds every bus error into [`DisplayError`], so this
/// enum is not generic over the I2C type.
#[derive(Debug)]
pub enum OledError {
    /// Interface failure while sending commands or pixel data.
    Display(DisplayError),
    /// The panel did not accept the init sequence (wrong address, not
    /// connected).
    InitializationFailed,
    /// Drawing or flushing before a successful
    /// [`OledDriver::init()`](crate::OledDriver::init).
    NotInitialized,
}

impl From<DisplayError> for OledError {
    fn from(e: DisplayError) -> Self {
        OledError::Display(e)
    }
}

impl fmt::Display for OledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OledError::Display(e) => write!(f, "display interface error: {:?}", e),
            OledError::InitializationFailed => f.write_str("panel did not initialise"),
            OledError::NotInitialized => f.write_str("panel not initialised"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OledError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OledError::Display(e) => {
                defmt::write!(f, "Display interface error: {}", defmt::Debug2Format(e))
            }
            OledError::InitializationFailed => defmt::write!(f, "Initialization failed"),
            OledError::NotInitialized => defmt::write!(f, "Not initialized"),
        }
    }
}
