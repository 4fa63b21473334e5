//! Status text
//!
//! The status read returns a fixed-layout text block that the command line
//! tool and scripts parse. Field order and the `NA` placeholders are part of
//! that contract:
//!
//! ```text
//! TX      : On
//! Freq    : 100.00 MHz (2000 50 KHz steps)
//! Power   : 15/15
//! Stereo  : On
//! RDS     : NA
//!
//! Address : 0xe000
//! Control : 0xf
//! Data    : 0xc
//! ```
//!
//! The `TX` and `RDS` lines only appear when the matching capability is
//! enabled.

use alloc::string::String;
use core::fmt::{self, Write};

use crate::pll::{Mhz, POWER_MAX};

/// Snapshot of everything the status text shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Transmitter state, `None` without the TX capability
    pub transmitter: Option<bool>,
    /// Frequency in 50 kHz steps, `None` if never set
    pub frequency: Option<u16>,
    /// Power level, `None` if never set
    pub power: Option<u8>,
    /// Stereo encoder state
    pub stereo: bool,
    /// RDS signal line: outer `None` without the capability, inner `None` if never set
    pub rds_signal: Option<Option<bool>>,
    /// I/O base address
    pub base_address: u16,
    /// Cached control register
    pub control: u8,
    /// Cached data register
    pub data: u8,
}

/// `On`/`Off`/`NA`
struct OnOff(Option<bool>);

impl fmt::Display for OnOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.0 {
            Some(true) => "On",
            Some(false) => "Off",
            None => "NA",
        })
    }
}

/// Hex with `0x` prefix, except plain `0` for zero
struct AltHex(u32);

impl fmt::Display for AltHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("0")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tx) = self.transmitter {
            writeln!(f, "TX      : {}", OnOff(Some(tx)))?;
        }

        match self.frequency {
            Some(steps) => writeln!(f, "Freq    : {} ({} 50 KHz steps)", Mhz(steps), steps)?,
            None => writeln!(f, "Freq    : NA")?,
        }

        match self.power {
            Some(level) => writeln!(f, "Power   : {}/{}", level, POWER_MAX)?,
            None => writeln!(f, "Power   : NA/{}", POWER_MAX)?,
        }

        writeln!(f, "Stereo  : {}", OnOff(Some(self.stereo)))?;

        if let Some(signal) = self.rds_signal {
            writeln!(f, "RDS     : {}", OnOff(signal))?;
        }

        writeln!(f)?;
        writeln!(f, "Address : {}", AltHex(u32::from(self.base_address)))?;
        writeln!(f, "Control : {}", AltHex(u32::from(self.control)))?;
        writeln!(f, "Data    : {}", AltHex(u32::from(self.data)))
    }
}

impl Status {
    /// Render the status text
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail
        let _ = write!(text, "{}", self);
        text
    }
}
