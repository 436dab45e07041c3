//! SSD1306 panel wrapper in async buffered-graphics mode.
//!
//! Construction sends nothing on the bus; [`OledDriver::init()`] brings the
//! panel up. Drawing happens in RAM through [`OledDriver::frame()`] and
//! reaches the glass only on [`OledDriver::flush()`].

use display_interface_i2c::I2CInterface;
use embedded_hal_async::i2c::I2c;
use ssd1306::{mode::BufferedGraphicsModeAsync, prelude::*, I2CDisplayInterface, Ssd1306Async};

use crate::error::OledError;

/// Concrete panel type behind [`OledDriver`].
pub type Panel<I2C> =
    Ssd1306Async<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsModeAsync<DisplaySize128x64>>;

/// Async driver for an SSD1306 128×64 OLED over I2C.
///
/// # Example
///
/// ```no_run
/// use graftrove_oled_display_rs::OledDriver;
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut oled = OledDriver::new(i2c, 0x3C);
/// oled.init().await.unwrap();
/// oled.clear_buffer();
/// oled.flush().await.unwrap();
/// # }
/// ```
pub struct OledDriver<I2C> {
    panel: Panel<I2C>,
    address: u8,
    ready: bool,
}

impl<I2C> OledDriver<I2C>
where
    I2C: I2c,
{
    /// Wrap the bus. No I2C traffic until [`init()`](Self::init).
    ///
    /// `address` is the 7-bit panel address, normally found by scanning
    /// for 0x3C/0x3D at boot.
    pub fn new(i2c: I2C, address: u8) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let panel = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self {
            panel,
            address,
            ready: false,
        }
    }

    /// Send the SSD1306 init sequence.
    ///
    /// # Errors
    ///
    /// [`OledError::InitializationFailed`] if the panel does not respond.
    /// The driver stays unusable and every later draw is refused.
    pub async fn init(&mut self) -> Result<(), OledError> {
        self.panel
            .init()
            .await
            .map_err(|_| OledError::InitializationFailed)?;
        self.ready = true;

        #[cfg(feature = "defmt")]
        defmt::info!("OLED ready at {=u8:#x}", self.address);

        Ok(())
    }

    /// Blank the RAM frame buffer. No bus traffic.
    pub fn clear_buffer(&mut self) {
        self.panel.clear_buffer();
    }

    /// Frame buffer as an `embedded-graphics` draw target.
    ///
    /// # Errors
    ///
    /// [`OledError::NotInitialized`] before a successful init.
    pub fn frame(&mut self) -> Result<&mut Panel<I2C>, OledError> {
        if self.ready {
            Ok(&mut self.panel)
        } else {
            Err(OledError::NotInitialized)
        }
    }

    /// Push the frame buffer to the panel (about 20 ms at 400 kHz).
    pub async fn flush(&mut self) -> Result<(), OledError> {
        if !self.ready {
            return Err(OledError::NotInitialized);
        }
        self.panel.flush().await?;
        Ok(())
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}
