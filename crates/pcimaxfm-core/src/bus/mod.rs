//! Two-wire serial bus
//!
//! The card has no serial controller. Its PLL and RDS chips sit on a
//! write-only, I2C-like bus whose clock and data lines are two bits of the
//! data register. [`bitbang`] generates the framing and bit timing,
//! [`SerialLines`] maps the two lines onto the cached data register byte.

pub mod bitbang;
mod lines;

pub use bitbang::{BitbangI2cMaster, SERIAL_DELAY_US, WRITE_FLAG};
pub use lines::SerialLines;

/// 7-bit address of the PLL synthesizer
pub const PLL_ADDRESS: u8 = 0x40;

/// 7-bit address of the RDS encoder
pub const RDS_ADDRESS: u8 = 0x2c;
