//! Frequency and power programming of the PLL synthesizer
//!
//! Frequency is counted in 50 kHz steps (1720 = 86.00 MHz, 2160 = 108.00 MHz),
//! power in levels 0-15. Both always go out together in one transaction:
//!
//! ```text
//! [PLL | W] [freq MSB] [freq LSB] [192] [power]
//! ```
//!
//! Out-of-range input is clamped, never rejected.

use core::fmt;

use crate::bus::{bitbang, BitbangI2cMaster, PLL_ADDRESS};
use crate::error::Result;

/// Lowest frequency, 86.00 MHz
pub const FREQ_MIN: u16 = 1720;
/// Highest frequency, 108.00 MHz
pub const FREQ_MAX: u16 = 2160;
/// Frequency used when none has been set, 100.00 MHz
pub const FREQ_DEFAULT: u16 = 2000;
/// Raw value reported for a frequency that was never set
pub const FREQ_NA: i32 = 0;

/// Lowest power level
pub const POWER_MIN: u8 = 0x00;
/// Highest power level
pub const POWER_MAX: u8 = 0x0F;
/// Raw value reported for a power level that was never set
pub const POWER_NA: i32 = 0x10;

/// Reference divider configuration byte sent between frequency and power
pub const PLL_REFERENCE_BYTE: u8 = 192;

/// Clamp a requested frequency; `None` selects the default
pub fn clamp_frequency(raw: Option<i32>) -> u16 {
    match raw {
        None => FREQ_DEFAULT,
        Some(f) if f < i32::from(FREQ_MIN) => FREQ_MIN,
        Some(f) if f > i32::from(FREQ_MAX) => FREQ_MAX,
        Some(f) => f as u16,
    }
}

/// Clamp a requested power level; `None` selects the minimum
pub fn clamp_power(raw: Option<i32>) -> u8 {
    match raw {
        None => POWER_MIN,
        Some(p) if p < i32::from(POWER_MIN) => POWER_MIN,
        Some(p) if p > i32::from(POWER_MAX) => POWER_MAX,
        Some(p) => p as u8,
    }
}

/// Payload bytes for an already clamped frequency/power pair
pub fn payload(frequency: u16, power: u8) -> [u8; 4] {
    let [msb, lsb] = frequency.to_be_bytes();
    [msb, lsb, PLL_REFERENCE_BYTE, power]
}

/// Send a frequency/power pair to the PLL in one transaction
pub fn program<M: BitbangI2cMaster + ?Sized>(master: &mut M, frequency: u16, power: u8) -> Result<()> {
    bitbang::write_transaction(master, PLL_ADDRESS, payload(frequency, power))
}

/// Display helper for a frequency in 50 kHz steps, e.g. `100.00 MHz`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mhz(pub u16);

impl fmt::Display for Mhz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps = self.0;
        write!(
            f,
            "{}.{}{} MHz",
            steps / 20,
            (steps % 20) / 2,
            if steps % 2 == 0 { 0 } else { 5 }
        )
    }
}

/// Convert a frequency in MHz to the nearest 50 kHz step
///
/// Returns `None` for values outside 86.00-108.00 MHz or non-finite input.
pub fn steps_from_mhz(mhz: f64) -> Option<u16> {
    if !mhz.is_finite() {
        return None;
    }
    let steps = mhz * 20.0;
    // Manual rounding, f64::round needs std
    let rounded = (steps + 0.5) as i64;
    if rounded < i64::from(FREQ_MIN) || rounded > i64::from(FREQ_MAX) || steps < 0.0 {
        return None;
    }
    Some(rounded as u16)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::format;

    #[test]
    fn test_clamp_frequency() {
        assert_eq!(clamp_frequency(None), 2000);
        assert_eq!(clamp_frequency(Some(0)), 1720);
        assert_eq!(clamp_frequency(Some(1719)), 1720);
        assert_eq!(clamp_frequency(Some(1720)), 1720);
        assert_eq!(clamp_frequency(Some(1900)), 1900);
        assert_eq!(clamp_frequency(Some(2160)), 2160);
        assert_eq!(clamp_frequency(Some(2161)), 2160);
        assert_eq!(clamp_frequency(Some(i32::MIN)), 1720);
        assert_eq!(clamp_frequency(Some(i32::MAX)), 2160);
    }

    #[test]
    fn test_clamp_frequency_always_in_range() {
        for f in (-5000..5000).step_by(7) {
            let clamped = clamp_frequency(Some(f));
            assert!((FREQ_MIN..=FREQ_MAX).contains(&clamped), "{} -> {}", f, clamped);
        }
    }

    #[test]
    fn test_clamp_power() {
        assert_eq!(clamp_power(None), 0);
        assert_eq!(clamp_power(Some(-1)), 0);
        assert_eq!(clamp_power(Some(0)), 0);
        assert_eq!(clamp_power(Some(7)), 7);
        assert_eq!(clamp_power(Some(15)), 15);
        assert_eq!(clamp_power(Some(16)), 15);
        assert_eq!(clamp_power(Some(20)), 15);
        for p in -100..100 {
            assert!(clamp_power(Some(p)) <= POWER_MAX);
        }
    }

    #[test]
    fn test_payload() {
        assert_eq!(payload(2000, 15), [0x07, 0xD0, 192, 15]);
        assert_eq!(payload(1720, 0), [0x06, 0xB8, 192, 0]);
    }

    #[test]
    fn test_mhz_display() {
        assert_eq!(format!("{}", Mhz(2000)), "100.00 MHz");
        assert_eq!(format!("{}", Mhz(1720)), "86.00 MHz");
        assert_eq!(format!("{}", Mhz(1721)), "86.05 MHz");
        assert_eq!(format!("{}", Mhz(2159)), "107.95 MHz");
        assert_eq!(format!("{}", Mhz(1762)), "88.10 MHz");
    }

    #[test]
    fn test_steps_from_mhz() {
        assert_eq!(steps_from_mhz(100.0), Some(2000));
        assert_eq!(steps_from_mhz(88.1), Some(1762));
        assert_eq!(steps_from_mhz(107.95), Some(2159));
        assert_eq!(steps_from_mhz(86.0), Some(1720));
        assert_eq!(steps_from_mhz(85.9), None);
        assert_eq!(steps_from_mhz(108.1), None);
        assert_eq!(steps_from_mhz(f64::NAN), None);
    }
}
