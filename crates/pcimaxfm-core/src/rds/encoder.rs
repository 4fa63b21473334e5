//! RDS encoder byte sequence
//!
//! One parameter write is one transaction on the serial bus:
//!
//! ```text
//! [RDS | W] 0x00 <name bytes> 0x01 <value bytes> 0x02
//! ```
//!
//! Values must already be validated. The encoder cannot report rejection,
//! so a write is complete once the sequence has been emitted.

use core::iter;

use crate::bus::{bitbang, BitbangI2cMaster, RDS_ADDRESS};
use crate::error::Result;

/// Marker preceding the parameter name
pub const NAME_MARK: u8 = 0;
/// Marker between name and value
pub const VALUE_MARK: u8 = 1;
/// Marker closing the value
pub const END_MARK: u8 = 2;

/// Parameter switching the RDS signal on (`"1"`) or off (`"0"`)
///
/// Not part of the user-visible catalog.
pub const SIGNAL_PARAM: &str = "PWR";

/// Payload bytes for one parameter write
pub fn payload<'a>(name: &'a str, value: &'a str) -> impl Iterator<Item = u8> + 'a {
    iter::once(NAME_MARK)
        .chain(name.bytes())
        .chain(iter::once(VALUE_MARK))
        .chain(value.bytes())
        .chain(iter::once(END_MARK))
}

/// Send one parameter to the encoder
pub fn program<M: BitbangI2cMaster + ?Sized>(master: &mut M, name: &str, value: &str) -> Result<()> {
    bitbang::write_transaction(master, RDS_ADDRESS, payload(name, value))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_payload_framing() {
        let bytes: Vec<u8> = payload("PS00", "PCIMAXFM").collect();
        assert_eq!(bytes, b"\x00PS00\x01PCIMAXFM\x02");
    }

    #[test]
    fn test_signal_payload() {
        let bytes: Vec<u8> = payload(SIGNAL_PARAM, "1").collect();
        assert_eq!(bytes, [0, b'P', b'W', b'R', 1, b'1', 2]);
    }
}
