//! Bit-bang serial engine
//!
//! Generates start/stop conditions and MSB-first bytes on two software
//! controlled lines. Every line change is followed by [`SERIAL_DELAY_US`];
//! the chips on the card need that setup/hold time, so no delay may be
//! skipped or merged.
//!
//! The bus is write-only. The ninth clock of every byte is issued so the
//! receiver can acknowledge, but the line is never sampled: a transaction
//! counts as done once its sequence has been emitted.
//!
//! A transaction read-modify-writes the cached data register on every
//! transition, so callers must hold the card's transaction lock from
//! [`start`] to [`stop`].

use crate::error::Result;

/// Delay after every line transition, in microseconds
pub const SERIAL_DELAY_US: u32 = 100;

/// Flag OR-ed onto the device address for a write transfer
pub const WRITE_FLAG: u8 = 1 << 7;

/// Trait for low-level bit-bang serial operations
///
/// Implementations change one line per call and write it to hardware
/// immediately.
pub trait BitbangI2cMaster {
    /// Set data line level
    fn set_sda(&mut self, high: bool) -> Result<()>;

    /// Set clock line level
    fn set_scl(&mut self, high: bool) -> Result<()>;

    /// Wait the inter-transition delay
    fn delay(&mut self);
}

/// Emit a start condition, then the address byte
///
/// `address` is the full address byte, i.e. the device address with
/// [`WRITE_FLAG`] already applied.
pub fn start<M: BitbangI2cMaster + ?Sized>(master: &mut M, address: u8) -> Result<()> {
    master.set_sda(true)?;
    master.set_scl(true)?;
    master.delay();
    // Data falls while clock is high
    master.set_sda(false)?;
    master.delay();
    master.set_scl(false)?;
    master.delay();

    write_byte(master, address)
}

/// Write a byte MSB first, followed by the acknowledge clock
pub fn write_byte<M: BitbangI2cMaster + ?Sized>(master: &mut M, value: u8) -> Result<()> {
    for i in (0..8).rev() {
        master.set_sda((value >> i) & 1 != 0)?;
        master.delay();
        master.set_scl(true)?;
        master.delay();
        master.set_scl(false)?;
        master.delay();
    }

    // Acknowledge slot, data released high and never read back
    master.set_sda(true)?;
    master.delay();
    master.set_scl(true)?;
    master.delay();
    master.set_scl(false)?;
    master.delay();

    Ok(())
}

/// Emit a stop condition
pub fn stop<M: BitbangI2cMaster + ?Sized>(master: &mut M) -> Result<()> {
    master.set_sda(false)?;
    master.delay();
    master.set_scl(true)?;
    master.delay();
    // Data rises while clock is high
    master.set_sda(true)?;
    master.delay();

    Ok(())
}

/// Run one complete write transaction: start, address, payload, stop
///
/// `device` is the 7-bit device address. If a line write fails halfway,
/// a stop condition is still attempted so the next transaction starts from
/// an idle bus, and the first error is returned.
pub fn write_transaction<M, I>(master: &mut M, device: u8, payload: I) -> Result<()>
where
    M: BitbangI2cMaster + ?Sized,
    I: IntoIterator<Item = u8>,
{
    let sent = start(master, device | WRITE_FLAG)
        .and_then(|()| payload.into_iter().try_for_each(|byte| write_byte(master, byte)));

    match sent {
        Ok(()) => stop(master),
        Err(e) => {
            let _ = stop(master);
            Err(e)
        }
    }
}
