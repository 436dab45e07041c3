use bus_scan::{BusScanner, ScanError};
use embedded_hal_async::i2c::Error as _;

use crate::demos::{push_error, Step};
use crate::error::PeripheralError;
use crate::hardware::DemoHardware;
use crate::screen::Screen;

/// Addresses listed under the device count; more would run off the panel.
pub const MAX_LISTED_ADDRESSES: usize = 4;

/// First address row and row pitch.
const ADDRESS_Y: i32 = 32;
const ADDRESS_PITCH: i32 = 8;

/// Repeatedly scans the secondary I2C bus and lists what answers.
#[derive(Default)]
pub struct I2cScanDemo;

impl I2cScanDemo {
    pub fn new() -> Self {
        Self
    }

    /// Screen shown when the bus could not be brought up.
    pub fn init_error(err: &PeripheralError) -> Screen {
        let mut screen = Screen::new().text(0, 0, "I2C Init Error");
        push_error(&mut screen, 0, 20, err);
        screen
    }

    /// One scan. Failures are shown and the next step scans again.
    pub async fn step<H: DemoHardware>(&mut self, hw: &mut H) -> Step {
        match scan(hw).await {
            Ok(devices) => Step::Frame(found_screen(&devices)),
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("I2C scan error: {}", err);
                let mut screen = Screen::new().text(0, 0, "I2C Scan Error");
                push_error(&mut screen, 0, 20, &err);
                Step::Frame(screen)
            }
        }
    }
}

async fn scan<H: DemoHardware>(hw: &mut H) -> Result<bus_scan::Devices, PeripheralError> {
    let bus = hw.scan_bus()?;
    BusScanner::new(bus).scan().await.map_err(|e| match e {
        ScanError::I2c(bus_err) => PeripheralError::Bus(bus_err.kind()),
        ScanError::InvalidAddress => PeripheralError::Config,
    })
}

fn found_screen(devices: &[u8]) -> Screen {
    let mut screen = Screen::new()
        .text(0, 0, "I2C (GP2/GP3) Scan")
        .text(0, 10, "Rate: 100KHz");

    if devices.is_empty() {
        screen.push_text(0, 20, "No Device Found");
        return screen;
    }

    screen.push_line(0, 20, format_args!("Found: {} Dev", devices.len()));
    for (i, addr) in devices.iter().take(MAX_LISTED_ADDRESSES).enumerate() {
        let y = ADDRESS_Y + ADDRESS_PITCH * i as i32;
        screen.push_line(0, y, format_args!("Addr{}: 0x{:02x}", i, addr));
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("I2C1 devices: {=[u8]:#x}", devices);

    screen
}
