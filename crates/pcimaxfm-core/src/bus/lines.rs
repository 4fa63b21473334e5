//! Serial lines multiplexed into the card's data register

use super::bitbang::{BitbangI2cMaster, SERIAL_DELAY_US};
use crate::error::Result;
use crate::io::PortIo;
use crate::regs::Lines;

/// The two serial lines of one card, driven through its data register
///
/// Only the SDA and SCL bits of the cached byte are changed; the other bits
/// (mono, transmitter) are written back unchanged with every transition.
pub struct SerialLines<'a, P: PortIo + ?Sized> {
    io: &'a mut P,
    data: &'a mut Lines,
    port: u16,
}

impl<'a, P: PortIo + ?Sized> SerialLines<'a, P> {
    /// Borrow a card's port access and cached data byte for one transaction
    pub fn new(io: &'a mut P, data: &'a mut Lines, port: u16) -> Self {
        Self { io, data, port }
    }

    fn set_line(&mut self, line: Lines, high: bool) -> Result<()> {
        self.data.set(line, high);
        self.io.outb(self.port, self.data.bits())
    }
}

impl<P: PortIo + ?Sized> BitbangI2cMaster for SerialLines<'_, P> {
    fn set_sda(&mut self, high: bool) -> Result<()> {
        self.set_line(Lines::SDA, high)
    }

    fn set_scl(&mut self, high: bool) -> Result<()> {
        self.set_line(Lines::SCL, high)
    }

    fn delay(&mut self) {
        self.io.delay_us(SERIAL_DELAY_US);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::bus::bitbang;
    use std::vec::Vec;

    #[derive(Default)]
    struct Ports {
        writes: Vec<(u16, u8)>,
        delay_total: u64,
    }

    impl PortIo for Ports {
        fn inb(&mut self, _port: u16) -> Result<u8> {
            Ok(0)
        }

        fn outb(&mut self, port: u16, value: u8) -> Result<()> {
            self.writes.push((port, value));
            Ok(())
        }

        fn delay_us(&mut self, us: u32) {
            self.delay_total += u64::from(us);
        }
    }

    #[test]
    fn test_other_bits_preserved() {
        let mut ports = Ports::default();
        let mut data = Lines::MONO | Lines::TX;
        {
            let mut lines = SerialLines::new(&mut ports, &mut data, 0xe003);
            bitbang::write_byte(&mut lines, 0x00).unwrap();
        }
        assert!(ports.writes.iter().all(|&(port, _)| port == 0xe003));
        assert!(ports
            .writes
            .iter()
            .all(|&(_, v)| v & (Lines::MONO | Lines::TX).bits() == 0x03));
        assert_eq!(data, Lines::MONO | Lines::TX | Lines::SDA);
        assert_eq!(ports.delay_total, 27 * u64::from(SERIAL_DELAY_US));
    }
}
