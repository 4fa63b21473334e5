//! Frequency, power and on/off switch commands

use std::io::Write;

use pcimaxfm_core::card::CardFile;
use pcimaxfm_core::command::{Command, Reply};
use pcimaxfm_core::pll::{self, Mhz};

use super::Notices;

/// Line printed for a frequency reply
fn frequency_line(frequency: Option<u16>) -> String {
    match frequency {
        Some(steps) => format!("Frequency: {} ({} 50 KHz steps)", Mhz(steps), steps),
        None => "Frequency not set yet.".to_string(),
    }
}

/// Line printed for a power reply
fn power_line(power: Option<u8>) -> String {
    match power {
        Some(level) => format!("Power level: {}/{}", level, pll::POWER_MAX),
        None => "Power level not set yet.".to_string(),
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "On"
    } else {
        "Off"
    }
}

/// Show or set the frequency, given in MHz
pub fn cmd_freq(
    file: &CardFile,
    mhz: Option<f64>,
    out: &mut Notices<impl Write>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(mhz) = mhz {
        let steps = pll::steps_from_mhz(mhz).ok_or_else(|| {
            format!(
                "Frequency {} MHz out of range ({} - {})",
                mhz,
                Mhz(pll::FREQ_MIN),
                Mhz(pll::FREQ_MAX)
            )
        })?;
        file.ioctl(Command::SetFrequency(i32::from(steps)))?;
    }

    if let Reply::Frequency(frequency) = file.ioctl(Command::GetFrequency)? {
        out.line(frequency_line(frequency))?;
    }
    Ok(())
}

/// Show or set the power level
pub fn cmd_power(
    file: &CardFile,
    level: Option<u8>,
    out: &mut Notices<impl Write>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = level {
        file.ioctl(Command::SetPower(i32::from(level)))?;
    }

    if let Reply::Power(power) = file.ioctl(Command::GetPower)? {
        out.line(power_line(power))?;
    }
    Ok(())
}

/// A boolean card setting with its command pair
#[derive(Debug, Clone, Copy)]
pub enum Switch {
    /// Stereo encoder
    Stereo,
    /// Transmitter
    Transmitter,
    /// RDS signal
    RdsSignal,
}

impl Switch {
    fn label(self) -> &'static str {
        match self {
            Self::Stereo => "Stereo encoder",
            Self::Transmitter => "Transmitter",
            Self::RdsSignal => "RDS signal",
        }
    }

    fn set(self, on: bool) -> Command<'static> {
        match self {
            Self::Stereo => Command::SetStereo(on),
            Self::Transmitter => Command::SetTransmitter(on),
            Self::RdsSignal => Command::SetRdsSignal(on),
        }
    }

    fn get(self) -> Command<'static> {
        match self {
            Self::Stereo => Command::GetStereo,
            Self::Transmitter => Command::GetTransmitter,
            Self::RdsSignal => Command::GetRdsSignal,
        }
    }
}

/// Show or change an on/off setting
pub fn cmd_switch(
    file: &CardFile,
    switch: Switch,
    state: Option<bool>,
    out: &mut Notices<impl Write>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(on) = state {
        file.ioctl(switch.set(on))?;
    }

    let value = match file.ioctl(switch.get())? {
        Reply::Flag(on) | Reply::RdsSignal(Some(on)) => on_off(on),
        _ => "NA",
    };
    out.line(format_args!("{}: {}", switch.label(), value))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_line() {
        assert_eq!(
            frequency_line(Some(2000)),
            "Frequency: 100.00 MHz (2000 50 KHz steps)"
        );
        assert_eq!(frequency_line(None), "Frequency not set yet.");
    }

    #[test]
    fn test_power_line() {
        assert_eq!(power_line(Some(7)), "Power level: 7/15");
        assert_eq!(power_line(None), "Power level not set yet.");
    }
}
