//! ioctl-style command table
//!
//! Every control request an open handle accepts is one [`Command`]; the
//! answer is a [`Reply`]. Raw integer arguments are passed through unclamped
//! so that out-of-range requests get the same clamping as everywhere else.

use crate::card::CardFile;
use crate::error::Result;
use crate::pll::{FREQ_NA, POWER_NA};

/// A control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Program a frequency in 50 kHz steps
    SetFrequency(i32),
    /// Read the cached frequency
    GetFrequency,
    /// Program a power level
    SetPower(i32),
    /// Read the cached power level
    GetPower,
    /// Switch the stereo encoder
    SetStereo(bool),
    /// Read the stereo encoder state
    GetStereo,
    /// Switch the transmitter
    SetTransmitter(bool),
    /// Read the transmitter state
    GetTransmitter,
    /// Switch the RDS signal
    SetRdsSignal(bool),
    /// Read the RDS signal state
    GetRdsSignal,
    /// Send one RDS parameter by catalog index
    SetRdsParameter {
        /// Catalog index
        index: usize,
        /// Value text, `None` if the caller passed none
        value: Option<&'a str>,
    },
}

/// Answer to a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Set request completed
    Done,
    /// Frequency in 50 kHz steps, `None` if never set
    Frequency(Option<u16>),
    /// Power level, `None` if never set
    Power(Option<u8>),
    /// Stereo or transmitter state
    Flag(bool),
    /// RDS signal state, `None` if never set
    RdsSignal(Option<bool>),
}

impl Reply {
    /// Integer form of the reply, with the not-set sentinels filled in
    ///
    /// `Frequency(None)` reads as 0 and `Power(None)` as 16.
    pub fn raw_value(&self) -> i32 {
        match *self {
            Self::Done => 0,
            Self::Frequency(f) => f.map_or(FREQ_NA, i32::from),
            Self::Power(p) => p.map_or(POWER_NA, i32::from),
            Self::Flag(b) => i32::from(b),
            Self::RdsSignal(s) => s.map_or(0, i32::from),
        }
    }
}

impl CardFile {
    /// Execute one control request against the card
    pub fn ioctl(&self, command: Command<'_>) -> Result<Reply> {
        let card = self.card();
        let reply = match command {
            Command::SetFrequency(steps) => {
                card.set_frequency(steps)?;
                Reply::Done
            }
            Command::GetFrequency => Reply::Frequency(card.frequency()),
            Command::SetPower(level) => {
                card.set_power(level)?;
                Reply::Done
            }
            Command::GetPower => Reply::Power(card.power()),
            Command::SetStereo(on) => {
                card.set_stereo(on)?;
                Reply::Done
            }
            Command::GetStereo => Reply::Flag(card.stereo()),
            Command::SetTransmitter(on) => {
                card.set_transmitter(on)?;
                Reply::Done
            }
            Command::GetTransmitter => Reply::Flag(card.transmitter()?),
            Command::SetRdsSignal(on) => {
                card.set_rds_signal(on)?;
                Reply::Done
            }
            Command::GetRdsSignal => Reply::RdsSignal(card.rds_signal()?),
            Command::SetRdsParameter { index, value } => {
                card.set_rds(index, value)?;
                Reply::Done
            }
        };
        Ok(reply)
    }
}
