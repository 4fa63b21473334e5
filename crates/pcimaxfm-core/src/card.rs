//! Per-card state machine
//!
//! A [`Card`] exists from attach to detach. It owns the card's port access,
//! the cached control and data registers, and the last programmed frequency,
//! power and RDS signal state. Getters read the cache; the hardware is only
//! read once, at attach, to pick up transmitter and stereo state left by a
//! previous driver instance.
//!
//! Two locks guard a card:
//!
//! - the state lock covers every hardware write sequence from start to
//!   finish, so two serial transactions (or a transaction and a register
//!   toggle) never interleave on the cached data byte
//! - the use lock only guards the open counter
//!
//! Open is exclusive: a second open fails with [`Error::Busy`] unless the
//! caller holds [`Privilege::Override`]. [`CardFile`] is the open handle and
//! closes on drop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bus::SerialLines;
use crate::config::{Capabilities, DriverConfig};
use crate::error::{Error, Result};
use crate::io::PortIo;
use crate::pll;
use crate::rds::{self, encoder, RdsParam, RdsValue};
use crate::regs::{Lines, OFFSET_CONTROL, OFFSET_DATA, REGION_LENGTH};
use crate::status::Status;

/// Port access owned by an attached card
pub type BoxedPortIo = Box<dyn PortIo + Send>;

/// Caller privilege for [`Card::open`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privilege {
    /// Ordinary caller, subject to the single-opener rule
    #[default]
    User,
    /// May open a card that is already open
    Override,
}

/// Cached hardware state, guarded by the transaction lock
struct CardState {
    io: BoxedPortIo,
    control: Lines,
    data: Lines,
    frequency: Option<u16>,
    power: Option<u8>,
    rds_signal: Option<bool>,
    attached: bool,
}

/// One attached FM transmitter card
pub struct Card {
    number: usize,
    base_address: u16,
    config: DriverConfig,
    state: Mutex<CardState>,
    use_count: Mutex<u32>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CardState {
    fn control_port(base: u16) -> u16 {
        base + OFFSET_CONTROL
    }

    fn data_port(base: u16) -> u16 {
        base + OFFSET_DATA
    }

    fn write_control(&mut self, base: u16) -> Result<()> {
        self.io.outb(Self::control_port(base), self.control.bits())
    }

    fn write_data(&mut self, base: u16) -> Result<()> {
        self.io.outb(Self::data_port(base), self.data.bits())
    }

    fn serial(&mut self, base: u16) -> SerialLines<'_, dyn PortIo + Send> {
        SerialLines::new(&mut *self.io, &mut self.data, Self::data_port(base))
    }
}

impl Card {
    /// Take over the card at `base_address`
    ///
    /// Reserves the I/O window, reads back the transmitter and mono lines if
    /// their outputs are already enabled, loads the data latch with the
    /// read-back levels, then enables the serial lines, the mono line and
    /// (with `TX_TOGGLE`) the transmitter line in one control register
    /// write. Frequency and power start as not set.
    ///
    /// The whole window must fit below the end of the port space.
    pub fn attach(
        number: usize,
        base_address: u16,
        mut io: BoxedPortIo,
        config: DriverConfig,
    ) -> Result<Self> {
        let config = config.normalized();

        if base_address.checked_add(REGION_LENGTH - 1).is_none() {
            log::error!(
                "pcimaxfm{}: I/O window at {:#x} runs past the end of the port space",
                number,
                base_address
            );
            return Err(Error::InvalidAddress { base: base_address });
        }

        if let Err(e) = io.reserve(base_address, REGION_LENGTH) {
            log::error!(
                "pcimaxfm{}: couldn't request I/O ports at {:#x}: {}",
                number,
                base_address,
                e
            );
            return Err(e);
        }

        let mut persistent = Lines::MONO;
        if config.has(Capabilities::TX_TOGGLE) {
            persistent |= Lines::TX;
        }

        let result = Self::read_back(&mut *io, base_address, persistent).and_then(|(control, data)| {
            // Latch the cached levels before any line becomes an output
            io.outb(CardState::data_port(base_address), data.bits())?;
            let control = control | persistent | Lines::SERIAL;
            io.outb(CardState::control_port(base_address), control.bits())?;
            Ok((control, data))
        });

        let (control, data) = match result {
            Ok(regs) => regs,
            Err(e) => {
                io.release(base_address, REGION_LENGTH);
                return Err(e);
            }
        };

        log::info!(
            "pcimaxfm{}: attached card at base address {:#x}",
            number,
            base_address
        );

        Ok(Self {
            number,
            base_address,
            config,
            state: Mutex::new(CardState {
                io,
                control,
                data,
                frequency: None,
                power: None,
                rds_signal: None,
                attached: true,
            }),
            use_count: Mutex::new(0),
        })
    }

    /// Read the enabled persistent lines and their levels
    fn read_back(
        io: &mut (dyn PortIo + Send),
        base: u16,
        persistent: Lines,
    ) -> Result<(Lines, Lines)> {
        let control = Lines::from_bits_truncate(io.inb(CardState::control_port(base))?) & persistent;

        let mut data = Lines::empty();
        if !control.is_empty() {
            let levels = Lines::from_bits_truncate(io.inb(CardState::data_port(base))?);
            // Only lines that are driven have a meaningful level
            data = levels & control;
        }

        Ok((control, data))
    }

    /// Hand the card back to the host
    ///
    /// Everything but the transmitter and mono lines is disabled and the
    /// reduced state is written, so RF output survives the driver going
    /// away. The I/O window is released. Further operations fail with
    /// [`Error::Detached`].
    pub fn detach(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.attached {
            return Err(Error::Detached);
        }

        let open = *lock(&self.use_count);
        if open > 0 {
            log::warn!("pcimaxfm{}: detaching card still open {} time(s)", self.number, open);
        }

        let mut keep = Lines::MONO;
        if self.config.has(Capabilities::TX_TOGGLE) {
            keep |= Lines::TX;
        }
        state.control &= keep;
        state.data &= keep;

        let written = state
            .write_control(self.base_address)
            .and_then(|()| state.write_data(self.base_address));

        state.io.release(self.base_address, REGION_LENGTH);
        state.attached = false;

        log::info!("pcimaxfm{}: detached", self.number);
        written
    }

    /// Card number (registry slot)
    pub fn number(&self) -> usize {
        self.number
    }

    /// I/O base address
    pub fn base_address(&self) -> u16 {
        self.base_address
    }

    /// Driver configuration the card was attached with
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Whether the card is still attached
    pub fn is_attached(&self) -> bool {
        lock(&self.state).attached
    }

    /// Cached `(control, data)` register bytes
    pub fn registers(&self) -> (u8, u8) {
        let state = lock(&self.state);
        (state.control.bits(), state.data.bits())
    }

    /// Number of open handles
    pub fn use_count(&self) -> u32 {
        *lock(&self.use_count)
    }

    /// Open the card
    ///
    /// Fails with [`Error::Busy`] if it is already open and `privilege` is
    /// [`Privilege::User`]. The returned handle closes on drop.
    pub fn open(self: &Arc<Self>, privilege: Privilege) -> Result<CardFile> {
        if !self.is_attached() {
            return Err(Error::Detached);
        }

        let mut count = lock(&self.use_count);
        if *count > 0 && privilege != Privilege::Override {
            return Err(Error::Busy);
        }
        *count += 1;

        Ok(CardFile {
            card: Arc::clone(self),
        })
    }

    fn close(&self) {
        let mut count = lock(&self.use_count);
        *count = count.saturating_sub(1);
    }

    fn attached_state(&self) -> Result<MutexGuard<'_, CardState>> {
        let state = lock(&self.state);
        if state.attached {
            Ok(state)
        } else {
            Err(Error::Detached)
        }
    }

    fn require(&self, capability: Capabilities, what: &'static str) -> Result<()> {
        if self.config.has(capability) {
            Ok(())
        } else {
            Err(Error::Unsupported(what))
        }
    }

    /// Clamp, cache and send a frequency/power pair
    ///
    /// The cache is updated before the transaction; there is no
    /// acknowledgement to wait for.
    fn program_pll(&self, state: &mut CardState, frequency: Option<i32>, power: Option<i32>) -> Result<()> {
        let frequency = pll::clamp_frequency(frequency);
        let power = pll::clamp_power(power);
        state.frequency = Some(frequency);
        state.power = Some(power);

        pll::program(&mut state.serial(self.base_address), frequency, power)?;

        log::debug!(
            "pcimaxfm{}: Frequency: {} Power: {}",
            self.number,
            frequency,
            power
        );
        Ok(())
    }

    /// Set the frequency in 50 kHz steps, resending the cached power
    ///
    /// Returns the clamped value that was programmed.
    pub fn set_frequency(&self, steps: i32) -> Result<u16> {
        let mut state = self.attached_state()?;
        let power = state.power.map(i32::from);
        self.program_pll(&mut state, Some(steps), power)?;
        Ok(state.frequency.unwrap_or(pll::FREQ_DEFAULT))
    }

    /// Last programmed frequency, `None` if never set
    pub fn frequency(&self) -> Option<u16> {
        lock(&self.state).frequency
    }

    /// Set the power level, resending the cached frequency
    ///
    /// Returns the clamped value that was programmed.
    pub fn set_power(&self, level: i32) -> Result<u8> {
        let mut state = self.attached_state()?;
        let frequency = state.frequency.map(i32::from);
        self.program_pll(&mut state, frequency, Some(level))?;
        Ok(state.power.unwrap_or(pll::POWER_MIN))
    }

    /// Last programmed power level, `None` if never set
    pub fn power(&self) -> Option<u8> {
        lock(&self.state).power
    }

    /// Switch the stereo encoder
    pub fn set_stereo(&self, stereo: bool) -> Result<()> {
        let mut state = self.attached_state()?;
        let mono = stereo == self.config.has(Capabilities::INVERT_STEREO);
        state.data.set(Lines::MONO, mono);
        state.write_data(self.base_address)
    }

    /// Cached stereo encoder state
    pub fn stereo(&self) -> bool {
        let mono = lock(&self.state).data.contains(Lines::MONO);
        mono == self.config.has(Capabilities::INVERT_STEREO)
    }

    /// Switch the transmitter (needs `TX_TOGGLE`)
    pub fn set_transmitter(&self, on: bool) -> Result<()> {
        self.require(Capabilities::TX_TOGGLE, "transmitter toggle")?;
        let mut state = self.attached_state()?;
        state.data.set(Lines::TX, on);
        state.write_data(self.base_address)
    }

    /// Cached transmitter state (needs `TX_TOGGLE`)
    pub fn transmitter(&self) -> Result<bool> {
        self.require(Capabilities::TX_TOGGLE, "transmitter toggle")?;
        Ok(lock(&self.state).data.contains(Lines::TX))
    }

    /// Switch the RDS signal (needs `RDS_SIGNAL`)
    pub fn set_rds_signal(&self, on: bool) -> Result<()> {
        self.require(Capabilities::RDS_SIGNAL, "RDS signal toggle")?;
        let mut state = self.attached_state()?;
        state.rds_signal = Some(on);
        let value = if on { "1" } else { "0" };
        self.program_rds(&mut state, encoder::SIGNAL_PARAM, value)
    }

    /// Cached RDS signal state, `None` if never set (needs `RDS_SIGNAL`)
    pub fn rds_signal(&self) -> Result<Option<bool>> {
        self.require(Capabilities::RDS_SIGNAL, "RDS signal toggle")?;
        Ok(lock(&self.state).rds_signal)
    }

    /// Validate and send one RDS parameter by catalog index (needs `RDS`)
    ///
    /// Nothing is written if validation fails. Returns the normalized value.
    pub fn set_rds(&self, index: usize, value: Option<&str>) -> Result<(RdsParam, RdsValue)> {
        self.require(Capabilities::RDS, "RDS")?;
        let (param, value) = rds::validate(index, value)?;
        let mut state = self.attached_state()?;
        self.program_rds(&mut state, &param.wire_name(), &value)?;
        Ok((param, value))
    }

    /// Validate and send one RDS parameter (needs `RDS`)
    pub fn set_rds_param(&self, param: RdsParam, value: &str) -> Result<RdsValue> {
        self.require(Capabilities::RDS, "RDS")?;
        let value = rds::validate_param(param, Some(value))?;
        let mut state = self.attached_state()?;
        self.program_rds(&mut state, &param.wire_name(), &value)?;
        Ok(value)
    }

    fn program_rds(&self, state: &mut CardState, name: &str, value: &str) -> Result<()> {
        encoder::program(&mut state.serial(self.base_address), name, value)?;
        log::debug!("pcimaxfm{}: RDS: {} = \"{}\"", self.number, name, value);
        Ok(())
    }

    /// Snapshot of the cached state
    pub fn status(&self) -> Status {
        let state = lock(&self.state);
        let invert = self.config.has(Capabilities::INVERT_STEREO);
        Status {
            transmitter: self
                .config
                .has(Capabilities::TX_TOGGLE)
                .then(|| state.data.contains(Lines::TX)),
            frequency: state.frequency,
            power: state.power,
            stereo: state.data.contains(Lines::MONO) == invert,
            rds_signal: self
                .config
                .has(Capabilities::RDS_SIGNAL)
                .then_some(state.rds_signal),
            base_address: self.base_address,
            control: state.control.bits(),
            data: state.data.bits(),
        }
    }
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("number", &self.number)
            .field("base_address", &format_args!("{:#x}", self.base_address))
            .field("use_count", &self.use_count())
            .finish_non_exhaustive()
    }
}

/// An open handle on a card
///
/// Closing (dropping) the handle decrements the card's use count.
#[derive(Debug)]
pub struct CardFile {
    card: Arc<Card>,
}

impl CardFile {
    /// The card this handle refers to
    pub fn card(&self) -> &Card {
        &self.card
    }

    /// Status text of the card
    pub fn read_status(&self) -> Result<String> {
        if !self.card.is_attached() {
            return Err(Error::Detached);
        }
        Ok(self.card.status().to_text())
    }

    /// Close the handle explicitly
    pub fn close(self) {}
}

impl Drop for CardFile {
    fn drop(&mut self) {
        self.card.close();
    }
}

