//! pcimaxfm-dummy - Emulated PCI MAX FM card for testing
//!
//! [`DummyCard`] models the card's control and data registers in memory and
//! listens to the serial lines the way the PLL and RDS chips would. Every
//! complete transaction is decoded into an [`I2cFrame`], so tests can check
//! what reached the chips instead of counting port writes.
//!
//! The card is a shared handle: keep one clone for inspection and hand
//! [`DummyCard::port`] to the driver.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pcimaxfm_core::bus::{PLL_ADDRESS, RDS_ADDRESS, WRITE_FLAG};
use pcimaxfm_core::error::{Error, Result};
use pcimaxfm_core::io::PortIo;
use pcimaxfm_core::regs::{Lines, OFFSET_CONTROL, OFFSET_DATA};
use pcimaxfm_core::rds::encoder::{END_MARK, NAME_MARK, VALUE_MARK};

/// Default base address of the emulated card
pub const DEFAULT_BASE: u16 = 0xe000;

/// Initial register contents
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// I/O base address
    pub base_address: u16,
    /// Control register at power-up (or as left by a previous driver)
    pub control: u8,
    /// Data register at power-up (or as left by a previous driver)
    pub data: u8,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE,
            control: 0,
            data: 0,
        }
    }
}

/// One decoded serial write transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cFrame {
    /// First byte on the wire, device address with the write flag
    pub address_byte: u8,
    /// Payload bytes after the address
    pub bytes: Vec<u8>,
}

impl I2cFrame {
    /// Device address without the write flag
    pub fn device(&self) -> u8 {
        self.address_byte & !WRITE_FLAG
    }

    /// Decode a PLL frame as `(frequency, power)`
    pub fn as_pll(&self) -> Option<(u16, u8)> {
        match (self.device(), self.bytes.as_slice()) {
            (PLL_ADDRESS, [hi, lo, _reference, power]) => {
                Some((u16::from_be_bytes([*hi, *lo]), *power))
            }
            _ => None,
        }
    }

    /// Decode an RDS frame as `(name, value)`
    pub fn as_rds(&self) -> Option<(String, String)> {
        if self.device() != RDS_ADDRESS {
            return None;
        }
        let rest = self.bytes.strip_prefix(&[NAME_MARK])?;
        let rest = rest.strip_suffix(&[END_MARK])?;
        let split = rest.iter().position(|&b| b == VALUE_MARK)?;
        let name = String::from_utf8(rest[..split].to_vec()).ok()?;
        let value = String::from_utf8(rest[split + 1..].to_vec()).ok()?;
        Some((name, value))
    }
}

/// Chip-side view of the serial lines
#[derive(Debug, Default)]
struct LineDecoder {
    sda: bool,
    scl: bool,
    bits: Option<Vec<bool>>,
    malformed: usize,
}

impl LineDecoder {
    /// Feed one data register write; returns a frame on stop condition
    fn update(&mut self, data: Lines) -> Option<I2cFrame> {
        let sda = data.contains(Lines::SDA);
        let scl = data.contains(Lines::SCL);
        let mut frame = None;

        if scl && self.scl && sda != self.sda {
            if sda {
                // Stop condition
                frame = self.bits.take().and_then(|bits| self.finish(&bits));
            } else {
                // Start (or repeated start)
                if self.bits.is_some() {
                    self.malformed += 1;
                }
                self.bits = Some(Vec::new());
            }
        } else if scl && !self.scl {
            if let Some(bits) = self.bits.as_mut() {
                bits.push(sda);
            }
        }

        self.sda = sda;
        self.scl = scl;
        frame
    }

    /// Group bits into bytes of 8 data bits and one acknowledge slot
    fn finish(&mut self, bits: &[bool]) -> Option<I2cFrame> {
        let mut bytes: Vec<u8> = bits
            .chunks_exact(9)
            .map(|chunk| chunk[..8].iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)))
            .collect();
        // The clock pulse before stop leaves at most one stray bit
        if bits.len() % 9 > 1 || bytes.is_empty() {
            self.malformed += 1;
            return None;
        }
        let address_byte = bytes.remove(0);
        Some(I2cFrame {
            address_byte,
            bytes,
        })
    }
}

#[derive(Debug)]
struct State {
    config: DummyConfig,
    control: u8,
    data: u8,
    reserved: bool,
    failing: bool,
    writes: Vec<(u16, u8)>,
    delay_us: u64,
    decoder: LineDecoder,
    frames: Vec<I2cFrame>,
}

/// Emulated card shared between the driver and the test
#[derive(Debug, Clone)]
pub struct DummyCard {
    state: Arc<Mutex<State>>,
}

impl DummyCard {
    /// Create a card with the given initial registers
    pub fn new(config: DummyConfig) -> Self {
        let state = State {
            control: config.control,
            data: config.data,
            config,
            reserved: false,
            failing: false,
            writes: Vec::new(),
            delay_us: 0,
            decoder: LineDecoder::default(),
            frames: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Create a card at [`DEFAULT_BASE`] with cleared registers
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Port access for the driver
    pub fn port(&self) -> DummyPort {
        DummyPort { card: self.clone() }
    }

    /// Boxed port access, ready for `Registry::attach`
    pub fn boxed_port(&self) -> Box<dyn PortIo + Send> {
        Box::new(self.port())
    }

    /// I/O base address
    pub fn base_address(&self) -> u16 {
        self.lock().config.base_address
    }

    /// Current `(control, data)` register contents
    pub fn registers(&self) -> (u8, u8) {
        let state = self.lock();
        (state.control, state.data)
    }

    /// Every port write so far, in order
    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.lock().writes.clone()
    }

    /// Sum of all requested delays in microseconds
    pub fn delay_us(&self) -> u64 {
        self.lock().delay_us
    }

    /// Decoded serial transactions so far
    pub fn frames(&self) -> Vec<I2cFrame> {
        self.lock().frames.clone()
    }

    /// Decoded serial transactions, clearing the list
    pub fn take_frames(&self) -> Vec<I2cFrame> {
        std::mem::take(&mut self.lock().frames)
    }

    /// Forget recorded writes, delays and frames
    pub fn clear_log(&self) {
        let mut state = self.lock();
        state.writes.clear();
        state.delay_us = 0;
        state.frames.clear();
    }

    /// Number of broken transactions seen (interleaved or truncated)
    pub fn malformed_frames(&self) -> usize {
        self.lock().decoder.malformed
    }

    /// Whether the I/O window is currently reserved
    pub fn is_reserved(&self) -> bool {
        self.lock().reserved
    }

    /// Make every following port access fail
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }
}

/// [`PortIo`] implementation backed by a [`DummyCard`]
#[derive(Debug, Clone)]
pub struct DummyPort {
    card: DummyCard,
}

impl PortIo for DummyPort {
    fn inb(&mut self, port: u16) -> Result<u8> {
        let state = self.card.lock();
        if state.failing {
            return Err(Error::PortIo);
        }
        let base = state.config.base_address;
        match port.checked_sub(base) {
            Some(OFFSET_CONTROL) => Ok(state.control),
            Some(OFFSET_DATA) => Ok(state.data),
            _ => {
                log::warn!("dummy: read from unmapped port {:#x}", port);
                Err(Error::PortIo)
            }
        }
    }

    fn outb(&mut self, port: u16, value: u8) -> Result<()> {
        let mut state = self.card.lock();
        if state.failing {
            return Err(Error::PortIo);
        }
        let base = state.config.base_address;
        match port.checked_sub(base) {
            Some(OFFSET_CONTROL) => state.control = value,
            Some(OFFSET_DATA) => {
                state.data = value;
                if let Some(frame) = state.decoder.update(Lines::from_bits_truncate(value)) {
                    log::trace!("dummy: frame {:02x?}", frame);
                    state.frames.push(frame);
                }
            }
            _ => {
                log::warn!("dummy: write to unmapped port {:#x}", port);
                return Err(Error::PortIo);
            }
        }
        state.writes.push((port, value));
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.card.lock().delay_us += u64::from(us);
    }

    fn reserve(&mut self, base: u16, _len: u16) -> Result<()> {
        let mut state = self.card.lock();
        if state.reserved {
            return Err(Error::ResourceBusy { base });
        }
        state.reserved = true;
        Ok(())
    }

    fn release(&mut self, _base: u16, _len: u16) {
        self.card.lock().reserved = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcimaxfm_core::bus::{bitbang, SerialLines};
    use pcimaxfm_core::{pll, rds};

    fn data_port() -> u16 {
        DEFAULT_BASE + OFFSET_DATA
    }

    #[test]
    fn test_decode_pll_frame() {
        let card = DummyCard::new_default();
        let mut port = card.port();
        let mut data = Lines::MONO;
        {
            let mut lines = SerialLines::new(&mut port, &mut data, data_port());
            pll::program(&mut lines, 2000, 15).unwrap();
        }
        let frames = card.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].address_byte, 0xc0);
        assert_eq!(frames[0].bytes, vec![0x07, 0xd0, 0xc0, 0x0f]);
        assert_eq!(frames[0].as_pll(), Some((2000, 15)));
        assert_eq!(card.malformed_frames(), 0);
    }

    #[test]
    fn test_decode_rds_frame() {
        let card = DummyCard::new_default();
        let mut port = card.port();
        let mut data = Lines::empty();
        {
            let mut lines = SerialLines::new(&mut port, &mut data, data_port());
            rds::encoder::program(&mut lines, "PS00", "HELLO").unwrap();
        }
        let frames = card.frames();
        assert_eq!(frames[0].address_byte, 0xac);
        assert_eq!(
            frames[0].as_rds(),
            Some(("PS00".to_string(), "HELLO".to_string()))
        );
    }

    #[test]
    fn test_back_to_back_frames() {
        let card = DummyCard::new_default();
        let mut port = card.port();
        let mut data = Lines::empty();
        {
            let mut lines = SerialLines::new(&mut port, &mut data, data_port());
            pll::program(&mut lines, 1720, 0).unwrap();
            pll::program(&mut lines, 2160, 7).unwrap();
        }
        let decoded: Vec<_> = card.frames().iter().filter_map(I2cFrame::as_pll).collect();
        assert_eq!(decoded, vec![(1720, 0), (2160, 7)]);
    }

    #[test]
    fn test_truncated_frame_is_malformed() {
        let card = DummyCard::new_default();
        let mut port = card.port();
        let mut data = Lines::empty();
        {
            let mut lines = SerialLines::new(&mut port, &mut data, data_port());
            bitbang::start(&mut lines, 0xc0).unwrap();
            bitbang::start(&mut lines, 0xc0).unwrap();
            bitbang::stop(&mut lines).unwrap();
        }
        assert_eq!(card.malformed_frames(), 1);
        assert_eq!(card.frames().len(), 1);
    }

    #[test]
    fn test_reserve_is_exclusive() {
        let card = DummyCard::new_default();
        let mut a = card.port();
        let mut b = card.port();
        a.reserve(DEFAULT_BASE, 4).unwrap();
        assert_eq!(
            b.reserve(DEFAULT_BASE, 4),
            Err(Error::ResourceBusy { base: DEFAULT_BASE })
        );
        a.release(DEFAULT_BASE, 4);
        assert!(b.reserve(DEFAULT_BASE, 4).is_ok());
    }

    #[test]
    fn test_unmapped_port() {
        let card = DummyCard::new_default();
        let mut port = card.port();
        assert_eq!(port.inb(DEFAULT_BASE), Err(Error::PortIo));
        assert_eq!(port.outb(DEFAULT_BASE + 4, 0), Err(Error::PortIo));
        assert!(card.writes().is_empty());
    }
}
