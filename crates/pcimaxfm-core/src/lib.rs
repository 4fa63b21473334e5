//! pcimaxfm-core - Control protocol core for PCI MAX FM transmitter cards
//!
//! The card carries two chips behind a pair of 8-bit I/O registers: a PLL
//! synthesizer (carrier frequency and output power) and an RDS encoder. Both
//! are programmed over a two-wire serial bus that is bit-banged through two
//! bits of the data register.
//!
//! This crate contains everything between a configuration request and the
//! port writes it causes:
//!
//! - [`bus`] - the bit-bang serial engine
//! - [`pll`] - frequency/power clamping and the PLL byte sequence
//! - [`rds`] - the RDS parameter catalog, validator and encoder sequence
//! - [`card`] - per-card cached state, attach/detach and open/close arbitration
//! - [`registry`] - the bounded set of attached cards
//! - [`command`] - the ioctl-style command table
//!
//! Hardware access goes through the [`io::PortIo`] trait so the same code runs
//! against `/dev/port` or an in-memory emulator.
//!
//! # Features
//!
//! - `std` - Enable the card state machine, registry and TOML configuration
//! - `alloc` - Enable status text formatting
//!
//! # Example
//!
//! ```ignore
//! use pcimaxfm_core::{config::DriverConfig, registry::Registry, card::Privilege};
//!
//! let mut registry = Registry::new(DriverConfig::default());
//! let card = registry.attach(0xe000, Box::new(port))?;
//! let file = card.open(Privilege::User)?;
//! file.card().set_frequency(2000)?;
//! print!("{}", file.read_status()?);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod bus;
#[cfg(feature = "std")]
pub mod card;
#[cfg(feature = "std")]
pub mod command;
pub mod config;
pub mod error;
pub mod io;
pub mod pll;
pub mod rds;
pub mod regs;
#[cfg(feature = "std")]
pub mod registry;
#[cfg(feature = "alloc")]
pub mod status;

pub use error::{Error, Result};
