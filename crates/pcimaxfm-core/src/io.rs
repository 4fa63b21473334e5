//! Host port I/O abstraction
//!
//! The card is driven entirely through byte-wide port reads and writes.
//! Backends implement [`PortIo`] for real hardware (`/dev/port`) or for an
//! emulator. Ports are absolute: the card adds its base address.

use crate::error::Result;

/// Byte-wide port access plus the microsecond delay the serial bus needs
pub trait PortIo {
    /// Read one byte from an absolute port
    fn inb(&mut self, port: u16) -> Result<u8>;

    /// Write one byte to an absolute port
    fn outb(&mut self, port: u16, value: u8) -> Result<()>;

    /// Busy-wait or sleep for at least `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Optional: Reserve the I/O window `[base, base + len)` for exclusive use
    ///
    /// Fails with `Error::ResourceBusy` if someone else holds it.
    fn reserve(&mut self, _base: u16, _len: u16) -> Result<()> {
        Ok(())
    }

    /// Optional: Release a window taken with [`reserve`](Self::reserve)
    fn release(&mut self, _base: u16, _len: u16) {}
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    fn inb(&mut self, port: u16) -> Result<u8> {
        (**self).inb(port)
    }

    fn outb(&mut self, port: u16, value: u8) -> Result<()> {
        (**self).outb(port, value)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn reserve(&mut self, base: u16, len: u16) -> Result<()> {
        (**self).reserve(base, len)
    }

    fn release(&mut self, base: u16, len: u16) {
        (**self).release(base, len)
    }
}
