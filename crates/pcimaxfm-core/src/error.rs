//! Error types for pcimaxfm-core
//!
//! A no_std compatible error type shared by the serial engine, the card state
//! machine and the backends. RDS validation failures are kept in their own
//! [`RdsError`] so callers can report them without touching hardware.

use core::fmt;

use crate::rds::RdsError;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Arbitration errors
    /// Card is already open and the caller has no override privilege
    Busy,

    // Attach-time resource errors
    /// All registry slots are taken
    RegistryFull {
        /// Number of slots in the registry
        max: usize,
    },
    /// The card's I/O window is already reserved
    ResourceBusy {
        /// Base port of the window
        base: u16,
    },
    /// The card's I/O window does not fit in the port space
    InvalidAddress {
        /// Base port of the window
        base: u16,
    },

    // Host errors
    /// A port read or write failed on the host side
    PortIo,

    // Request errors
    /// The operation needs a capability this driver was configured without
    Unsupported(&'static str),
    /// No card is attached under this number
    NoSuchCard(usize),
    /// The card has been detached
    Detached,
    /// RDS parameter or value rejected
    Rds(RdsError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "device busy"),
            Self::RegistryFull { max } => {
                write!(f, "no free card slot, increase max number of cards ({})", max)
            }
            Self::ResourceBusy { base } => {
                write!(f, "I/O ports at {:#x} already in use", base)
            }
            Self::InvalidAddress { base } => {
                write!(f, "I/O window at {:#x} exceeds the port space", base)
            }
            Self::PortIo => write!(f, "port I/O failed"),
            Self::Unsupported(what) => write!(f, "{} not supported by this configuration", what),
            Self::NoSuchCard(number) => write!(f, "no card attached as number {}", number),
            Self::Detached => write!(f, "card has been detached"),
            Self::Rds(e) => write!(f, "{}", e),
        }
    }
}

impl From<RdsError> for Error {
    fn from(e: RdsError) -> Self {
        Self::Rds(e)
    }
}

// `Rds` displays the inner message itself, so it is not repeated as a source
#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
