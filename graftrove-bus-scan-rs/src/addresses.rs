//! Address-space constants for 7-bit I2C scanning.
//!
//! Addresses `0x00..=0x07` and `0x78..=0x7F` are reserved by the I2C
//! specification (general call, CBUS, 10-bit prefixes, ...) and are never
//! probed.

// ---------------------------------------------------------------------------
// Scan range
// ---------------------------------------------------------------------------

/// Lowest non-reserved 7-bit address.
pub const FIRST_ADDRESS: u8 = 0x08;

/// Highest non-reserved 7-bit address.
pub const LAST_ADDRESS: u8 = 0x77;

/// Largest valid 7-bit address. Anything above is rejected by
/// [`BusScanner::probe`](crate::BusScanner::probe).
pub(crate) const MAX_7BIT_ADDRESS: u8 = 0x7F;

// ---------------------------------------------------------------------------
// Display discovery
// ---------------------------------------------------------------------------

/// Addresses an SSD1306 can be strapped to, in order of preference.
pub const DISPLAY_ADDRESSES: [u8; 2] = [0x3C, 0x3D];

/// Address assumed when no SSD1306 answers the boot scan.
pub const DEFAULT_DISPLAY_ADDRESS: u8 = 0x3C;

/// Pick the display address from a scan result.
///
/// Returns the first entry of [`DISPLAY_ADDRESSES`] present in `devices`,
/// or `None` when the display did not acknowledge.
pub fn display_address(devices: &[u8]) -> Option<u8> {
    DISPLAY_ADDRESSES
        .iter()
        .copied()
        .find(|candidate| devices.contains(candidate))
}
