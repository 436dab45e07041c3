//! [`Surface`] implementation over the SSD1306 driver.

use embedded_hal_async::i2c::I2c;
use graftrove::{Render, Screen, Surface};

use crate::driver::OledDriver;
use crate::error::OledError;
use crate::layout::{self, DisplayConfig};

/// Shows core [`Render`] commands on the panel.
///
/// A full screen identical to the one already shown is skipped, so demos
/// may repeat their frame every step without costing a flush. A panel that
/// failed to initialise turns every command into a no-op.
pub struct OledSurface<I2C> {
    driver: OledDriver<I2C>,
    config: DisplayConfig,
    /// Contents known to be on the glass, `None` after a partial update.
    last: Option<Screen>,
}

impl<I2C> OledSurface<I2C>
where
    I2C: I2c,
{
    pub fn new(driver: OledDriver<I2C>, config: DisplayConfig) -> Self {
        Self {
            driver,
            config,
            last: None,
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn driver(&mut self) -> &mut OledDriver<I2C> {
        &mut self.driver
    }

    /// Draw and flush one command.
    ///
    /// # Errors
    ///
    /// [`OledError::NotInitialized`] if the panel never came up, or the
    /// interface error from the flush.
    pub async fn show(&mut self, render: &Render) -> Result<(), OledError> {
        if !self.driver.is_ready() {
            return Err(OledError::NotInitialized);
        }
        let shown = match render {
            Render::Clear => Some(Screen::new()),
            Render::Full(screen) => Some(screen.clone()),
            Render::Band { .. } => None,
        };
        if shown.is_some() && shown == self.last {
            return Ok(());
        }

        layout::render(self.driver.frame()?, render, &self.config)?;
        // Forget the cache first so a failed flush forces a redraw.
        self.last = None;
        self.driver.flush().await?;
        self.last = shown;
        Ok(())
    }
}

impl<I2C> Surface for OledSurface<I2C>
where
    I2C: I2c,
{
    async fn present(&mut self, render: &Render) {
        match self.show(render).await {
            Ok(()) | Err(OledError::NotInitialized) => {}
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("OLED update failed: {}", _e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorType, Operation};

    /// Bus that accepts everything and counts transactions.
    struct CountingBus<'a> {
        transactions: &'a Cell<usize>,
    }

    impl ErrorType for CountingBus<'_> {
        type Error = Infallible;
    }

    impl I2c for CountingBus<'_> {
        async fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.transactions.set(self.transactions.get() + 1);
            Ok(())
        }
    }

    fn surface(count: &Cell<usize>, init: bool) -> OledSurface<CountingBus<'_>> {
        let mut driver = OledDriver::new(CountingBus { transactions: count }, 0x3C);
        if init {
            block_on(driver.init()).unwrap();
        }
        OledSurface::new(driver, DisplayConfig::default())
    }

    #[test]
    fn uninitialised_panel_is_silent() {
        let count = Cell::new(0);
        let mut s = surface(&count, false);
        block_on(s.present(&Render::Full(Screen::new().text(0, 0, "x"))));
        assert_eq!(count.get(), 0);
        assert!(matches!(
            block_on(s.show(&Render::Clear)),
            Err(OledError::NotInitialized)
        ));
    }

    #[test]
    fn identical_screen_is_not_reflushed() {
        let count = Cell::new(0);
        let mut s = surface(&count, true);
        let screen = Screen::new().text(0, 20, "Status: LOW (0)");

        block_on(s.present(&Render::Full(screen.clone())));
        let after_first = count.get();
        block_on(s.present(&Render::Full(screen)));
        assert_eq!(count.get(), after_first);
    }

    #[test]
    fn changed_screen_is_flushed() {
        let count = Cell::new(0);
        let mut s = surface(&count, true);
        block_on(s.present(&Render::Full(Screen::new().text(0, 20, "Status: LOW (0)"))));
        let after_first = count.get();
        block_on(s.present(&Render::Full(Screen::new().text(0, 20, "Status: HIGH (1)"))));
        assert!(count.get() > after_first);
    }

    #[test]
    fn band_invalidates_cache() {
        let count = Cell::new(0);
        let mut s = surface(&count, true);
        let screen = s.config().banner_screen();
        block_on(s.present(&Render::Full(screen.clone())));

        let band = Render::Band {
            y: 10,
            height: 8,
            x: 0,
            text: "FreakStudio",
        };
        block_on(s.present(&band));
        let after_band = count.get();

        block_on(s.present(&Render::Full(screen)));
        assert!(count.get() > after_band);
    }

    #[test]
    fn repeated_clear_flushes_once() {
        let count = Cell::new(0);
        let mut s = surface(&count, true);
        block_on(s.present(&Render::Clear));
        let after_first = count.get();
        block_on(s.present(&Render::Clear));
        assert_eq!(count.get(), after_first);
    }
}
