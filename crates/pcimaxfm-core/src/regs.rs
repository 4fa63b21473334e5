//! Card identity and I/O register layout
//!
//! The card decodes a 4-port I/O window. Only two registers are used:
//! the control register enables individual lines as outputs, the data
//! register drives their levels. Both share the same bit layout.

use bitflags::bitflags;

/// PCI vendor ID
pub const PCI_VENDOR_ID: u16 = 0xe159;
/// PCI device ID
pub const PCI_DEVICE_ID: u16 = 0x0001;
/// PCI subsystem vendor ID
pub const PCI_SUBVENDOR_ID: u16 = 0x4001;
/// PCI subsystem device ID
pub const PCI_SUBDEVICE_ID: u16 = 0x0001;

/// Offset of the control (line enable) register
pub const OFFSET_CONTROL: u16 = 2;
/// Offset of the data (line level) register
pub const OFFSET_DATA: u16 = 3;
/// Length of the I/O window reserved per card
pub const REGION_LENGTH: u16 = OFFSET_DATA + 1;

bitflags! {
    /// Line bits of the control and data registers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Lines: u8 {
        /// Transmitter enable
        const TX  = 1 << 0;
        /// Stereo encoder bypass (set = mono)
        const MONO = 1 << 1;
        /// Serial data line
        const SDA = 1 << 2;
        /// Serial clock line
        const SCL = 1 << 3;
    }
}

impl Default for Lines {
    fn default() -> Self {
        Lines::empty()
    }
}

impl Lines {
    /// The two serial bus lines
    pub const SERIAL: Lines = Lines::SDA.union(Lines::SCL);
}
