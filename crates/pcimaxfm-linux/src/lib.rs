//! pcimaxfm-linux - Linux host access for PCI MAX FM cards
//!
//! This crate finds cards through sysfs and drives their I/O ports through
//! `/dev/port`.
//!
//! # Example
//!
//! ```no_run
//! use pcimaxfm_core::config::DriverConfig;
//! use pcimaxfm_core::registry::Registry;
//! use pcimaxfm_linux::{scan_cards, DevPort};
//!
//! let mut registry = Registry::new(DriverConfig::default());
//! for found in scan_cards()? {
//!     registry.attach(found.base_address, Box::new(DevPort::open()?))?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Read/write access to `/dev/port` (`CAP_SYS_RAWIO`, usually root)
//! - A writable `/run/lock` for the I/O window reservation

mod error;
mod pci;
mod port;

pub use error::{LinuxPortError, Result};
pub use pci::{scan_cards, scan_cards_in, PciCard, SYSFS_PCI_DEVICES};
pub use port::{DevPort, DEV_PORT, LOCK_DIR};
