//! Error types for Linux port access

use thiserror::Error;

use pcimaxfm_core::Error as CoreError;

/// Linux backend errors
#[derive(Debug, Error)]
pub enum LinuxPortError {
    /// Failed to open the port device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or lock the reservation file
    #[error("Failed to lock {path}: {source}")]
    LockFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the I/O window
    #[error("I/O ports at {base:#x} are in use by another process")]
    Busy { base: u16 },

    /// Port read or write failed
    #[error("Port access at {port:#x} failed: {source}")]
    Access {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// PCI sysfs tree could not be read
    #[error("Failed to scan PCI devices in {path}: {source}")]
    PciScan {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<LinuxPortError> for CoreError {
    fn from(e: LinuxPortError) -> Self {
        match e {
            LinuxPortError::Busy { base } => CoreError::ResourceBusy { base },
            _ => CoreError::PortIo,
        }
    }
}

/// Result type for Linux port operations
pub type Result<T> = std::result::Result<T, LinuxPortError>;
