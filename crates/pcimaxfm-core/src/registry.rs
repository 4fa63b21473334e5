//! Bounded set of attached cards
//!
//! Cards are numbered by registry slot. A new card takes the lowest free
//! slot, so numbers are reused after a detach. The number of slots is
//! [`DriverConfig::max_cards`].

use std::sync::Arc;

use crate::card::{BoxedPortIo, Card, CardFile, Privilege};
use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::regs::REGION_LENGTH;

/// Attached cards, indexed by card number
pub struct Registry {
    config: DriverConfig,
    slots: Vec<Option<Arc<Card>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new(config: DriverConfig) -> Self {
        let config = config.normalized();
        let mut slots = Vec::new();
        slots.resize_with(config.max_cards, || None);
        Self { config, slots }
    }

    /// Driver configuration new cards are attached with
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Attach the card at `base_address`
    ///
    /// Fails with [`Error::RegistryFull`] if every slot is taken, with
    /// [`Error::ResourceBusy`] if the I/O window overlaps an attached card
    /// or cannot be reserved, and with [`Error::InvalidAddress`] if the
    /// window runs past port `0xffff`.
    pub fn attach(&mut self, base_address: u16, io: BoxedPortIo) -> Result<Arc<Card>> {
        let Some(number) = self.slots.iter().position(Option::is_none) else {
            log::error!(
                "pcimaxfm: no free card slot for base address {:#x}, increase max number of cards ({})",
                base_address,
                self.slots.len()
            );
            return Err(Error::RegistryFull {
                max: self.slots.len(),
            });
        };

        if self.cards().any(|card| overlaps(card.base_address(), base_address)) {
            log::error!(
                "pcimaxfm{}: I/O ports at {:#x} already belong to an attached card",
                number,
                base_address
            );
            return Err(Error::ResourceBusy { base: base_address });
        }

        let card = Arc::new(Card::attach(number, base_address, io, self.config)?);
        self.slots[number] = Some(Arc::clone(&card));
        Ok(card)
    }

    /// Detach card `number` and free its slot
    pub fn detach(&mut self, number: usize) -> Result<()> {
        let card = self
            .slots
            .get_mut(number)
            .and_then(Option::take)
            .ok_or(Error::NoSuchCard(number))?;
        card.detach()
    }

    /// Look up an attached card
    pub fn card(&self, number: usize) -> Result<Arc<Card>> {
        self.slots
            .get(number)
            .and_then(Option::as_ref)
            .cloned()
            .ok_or(Error::NoSuchCard(number))
    }

    /// Open an attached card
    pub fn open(&self, number: usize, privilege: Privilege) -> Result<CardFile> {
        self.card(number)?.open(privilege)
    }

    /// Iterate over attached cards in number order
    pub fn cards(&self) -> impl Iterator<Item = &Arc<Card>> + '_ {
        self.slots.iter().flatten()
    }

    /// Number of attached cards
    pub fn len(&self) -> usize {
        self.cards().count()
    }

    /// Whether no card is attached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

fn overlaps(a: u16, b: u16) -> bool {
    let (a, b) = (u32::from(a), u32::from(b));
    let len = u32::from(REGION_LENGTH);
    a < b + len && b < a + len
}

impl Drop for Registry {
    fn drop(&mut self) {
        for card in self.slots.iter_mut().filter_map(Option::take) {
            if let Err(e) = card.detach() {
                log::warn!("pcimaxfm{}: detach failed: {}", card.number(), e);
            }
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("cards", &self.cards().collect::<Vec<_>>())
            .finish()
    }
}
