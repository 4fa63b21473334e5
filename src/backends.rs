//! Backend registration and dispatch
//!
//! A backend finds cards and provides port access for them. Backends are
//! feature-gated; the help text lists only the ones compiled in.

use std::sync::Arc;

use pcimaxfm_core::card::Card;
use pcimaxfm_core::config::DriverConfig;
use pcimaxfm_core::registry::Registry;
use thiserror::Error;

/// Backend used when none is given
#[cfg(feature = "linux-port")]
pub const DEFAULT_BACKEND: &str = "port";
/// Backend used when none is given
#[cfg(not(feature = "linux-port"))]
pub const DEFAULT_BACKEND: &str = "dummy";

/// Information about a backend
pub struct BackendInfo {
    /// Name used on the command line
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "linux-port")]
    backends.push(BackendInfo {
        name: "port",
        description: "PCI cards via sysfs and /dev/port - requires root",
    });

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        description: "Emulated card for testing",
    });

    backends
}

/// Short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Errors while locating or attaching a card
#[derive(Debug, Error)]
pub enum BackendError {
    /// Name does not match a compiled-in backend
    #[error("Unknown backend '{0}' [available: {1}]")]
    Unknown(String, String),

    /// Requested card number was not found
    #[error("Card {number} not found ({found} card(s) detected)")]
    NoSuchCard { number: usize, found: usize },

    /// Host-side failure
    #[cfg(feature = "linux-port")]
    #[error(transparent)]
    Linux(#[from] pcimaxfm_linux::LinuxPortError),

    /// Driver refused the card
    #[error("Failed to attach card: {0}")]
    Attach(#[from] pcimaxfm_core::Error),
}

/// A detected card, before attach
#[derive(Debug, Clone)]
pub struct FoundCard {
    /// Where the card sits (PCI slot, or a fixed name for the emulator)
    pub location: String,
    /// I/O base address
    pub base_address: u16,
}

/// List the cards a backend can see
pub fn discover(backend: &str) -> Result<Vec<FoundCard>, BackendError> {
    match backend {
        #[cfg(feature = "linux-port")]
        "port" => Ok(pcimaxfm_linux::scan_cards()?
            .into_iter()
            .map(|card| FoundCard {
                location: card.slot,
                base_address: card.base_address,
            })
            .collect()),

        #[cfg(feature = "dummy")]
        "dummy" => Ok(vec![FoundCard {
            location: "dummy".to_string(),
            base_address: pcimaxfm_dummy::DEFAULT_BASE,
        }]),

        _ => Err(BackendError::Unknown(
            backend.to_string(),
            backend_names_short(),
        )),
    }
}

/// Port access for one discovered card
fn open_port(
    backend: &str,
    #[allow(unused_variables)] found: &FoundCard,
) -> Result<Box<dyn pcimaxfm_core::io::PortIo + Send>, BackendError> {
    match backend {
        #[cfg(feature = "linux-port")]
        "port" => Ok(Box::new(pcimaxfm_linux::DevPort::open()?)),

        #[cfg(feature = "dummy")]
        "dummy" => Ok(pcimaxfm_dummy::DummyCard::new(pcimaxfm_dummy::DummyConfig {
            base_address: found.base_address,
            ..Default::default()
        })
        .boxed_port()),

        _ => Err(BackendError::Unknown(
            backend.to_string(),
            backend_names_short(),
        )),
    }
}

/// An attached card for the duration of one command
///
/// Dropping the session detaches the card.
pub struct Session {
    // Owns the card; dropping it detaches
    _registry: Registry,
    card: Arc<Card>,
}

impl Session {
    /// Attach card `number` of `backend`
    pub fn attach(
        backend: &str,
        config: DriverConfig,
        number: usize,
    ) -> Result<Self, BackendError> {
        let cards = discover(backend)?;
        let found = cards.get(number).ok_or(BackendError::NoSuchCard {
            number,
            found: cards.len(),
        })?;

        log::debug!(
            "Using card {} at {} (I/O {:#x})",
            number,
            found.location,
            found.base_address
        );

        let port = open_port(backend, found)?;
        let mut registry = Registry::new(config);
        let card = registry.attach(found.base_address, port)?;
        Ok(Self {
            _registry: registry,
            card,
        })
    }

    /// The attached card
    pub fn card(&self) -> &Arc<Card> {
        &self.card
    }
}
