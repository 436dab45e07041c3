//! SSD1306 (128×64) rendering of Graftrove screens.
//!
//! The scheduler core describes what to show as [`graftrove::Render`]
//! commands. This crate turns them into pixels: [`layout::render()`] draws
//! a command into any `embedded-graphics` target, and [`OledSurface`] wraps
//! an [`OledDriver`] to implement [`graftrove::Surface`] for the main loop.
//!
//! # Quick Start
//!
//! ```ignore
//! use graftrove_oled_display_rs::{DisplayConfig, OledDriver, OledSurface};
//!
//! let mut oled = OledDriver::new(i2c_oled, address);
//! if let Err(e) = oled.init().await {
//!     defmt::warn!("OLED init failed: {}", e);
//! }
//! let config = DisplayConfig::default();
//! let mut surface = OledSurface::new(oled, config);
//! surface.present(&Render::Full(config.banner_screen())).await;
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via [`defmt`].

#![no_std]

pub mod driver;
pub mod error;
pub mod layout;
pub mod present;

pub use driver::{OledDriver, Panel};
pub use error::OledError;
pub use layout::{render, DisplayConfig, FONT};
pub use present::OledSurface;
