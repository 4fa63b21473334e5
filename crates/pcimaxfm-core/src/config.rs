//! Driver configuration
//!
//! Optional card features are capability flags checked at run time, so one
//! build can drive every hardware variant. With the `std` feature the
//! configuration can be loaded from a TOML file:
//!
//! ```toml
//! max_cards = 4
//!
//! [capabilities]
//! tx_toggle = true
//! rds = true
//! rds_signal = true
//! invert_stereo = false
//! ```

use bitflags::bitflags;

/// Default number of registry slots
pub const DEFAULT_MAX_CARDS: usize = 4;

bitflags! {
    /// Optional driver features
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Transmitter on/off line is wired and controllable
        const TX_TOGGLE     = 1 << 0;
        /// RDS encoder is present
        const RDS           = 1 << 1;
        /// RDS signal can be switched on and off (needs `RDS`)
        const RDS_SIGNAL    = 1 << 2;
        /// The mono line reads inverted on this card revision
        const INVERT_STEREO = 1 << 3;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::TX_TOGGLE | Capabilities::RDS | Capabilities::RDS_SIGNAL
    }
}

/// Driver-wide configuration, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Enabled optional features
    pub capabilities: Capabilities,
    /// Maximum number of simultaneously attached cards
    pub max_cards: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            max_cards: DEFAULT_MAX_CARDS,
        }
    }
}

impl DriverConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capability flags
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self.normalized()
    }

    /// Set the number of registry slots
    pub fn with_max_cards(mut self, max_cards: usize) -> Self {
        self.max_cards = max_cards;
        self
    }

    /// Check whether a capability is enabled
    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    /// Drop capabilities whose prerequisites are missing
    pub fn normalized(mut self) -> Self {
        if self.capabilities.contains(Capabilities::RDS_SIGNAL)
            && !self.capabilities.contains(Capabilities::RDS)
        {
            log::warn!("RDS signal toggle needs the RDS encoder, disabling it");
            self.capabilities.remove(Capabilities::RDS_SIGNAL);
        }
        self
    }
}

#[cfg(feature = "std")]
pub use file::ConfigError;

#[cfg(feature = "std")]
mod file {
    use std::fs;
    use std::path::Path;
    use std::string::String;

    use super::{Capabilities, DriverConfig};

    /// Errors from loading a configuration file
    #[derive(Debug, thiserror::Error)]
    pub enum ConfigError {
        /// The file could not be read
        #[error("failed to read config file '{path}': {source}")]
        Read {
            /// Path that was read
            path: String,
            /// Underlying I/O error
            #[source]
            source: std::io::Error,
        },
        /// The file is not valid TOML or has unknown keys
        #[error("invalid config: {0}")]
        Parse(#[from] toml::de::Error),
        /// `max_cards` was zero
        #[error("max_cards must be at least 1")]
        NoCardSlots,
    }

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct TomlConfig {
        max_cards: Option<usize>,
        capabilities: Option<TomlCapabilities>,
    }

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct TomlCapabilities {
        tx_toggle: Option<bool>,
        rds: Option<bool>,
        rds_signal: Option<bool>,
        invert_stereo: Option<bool>,
    }

    impl DriverConfig {
        /// Parse a configuration from TOML text; absent keys keep their defaults
        pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
            let parsed: TomlConfig = toml::from_str(text)?;
            let mut config = DriverConfig::default();

            if let Some(max_cards) = parsed.max_cards {
                if max_cards == 0 {
                    return Err(ConfigError::NoCardSlots);
                }
                config.max_cards = max_cards;
            }

            if let Some(caps) = parsed.capabilities {
                let flags = [
                    (caps.tx_toggle, Capabilities::TX_TOGGLE),
                    (caps.rds, Capabilities::RDS),
                    (caps.rds_signal, Capabilities::RDS_SIGNAL),
                    (caps.invert_stereo, Capabilities::INVERT_STEREO),
                ];
                for (value, flag) in flags {
                    if let Some(enabled) = value {
                        config.capabilities.set(flag, enabled);
                    }
                }
            }

            Ok(config.normalized())
        }

        /// Load a configuration file
        pub fn load(path: &Path) -> Result<Self, ConfigError> {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml_str(&text)
        }
    }
}
