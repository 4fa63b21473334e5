//! CLI command implementations
//!
//! Everything except `list` and `rds-params` runs against an open
//! [`CardFile`] and goes through the same ioctl-style command table a
//! kernel driver would expose. Notice lines go through [`Notices`] so `-q`
//! silences them.

mod list;
pub mod rds;
pub mod status;
pub mod tune;

use std::fmt::Display;
use std::io::{self, Write};

use pcimaxfm_core::card::CardFile;

use crate::cli::Actions;
use rds::Assignment;
use tune::Switch;

pub use list::list_cards;

/// Command output that `-q` can switch off
pub struct Notices<W> {
    out: W,
    quiet: bool,
}

impl<W: Write> Notices<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet }
    }

    /// Print one line
    pub fn line(&mut self, line: impl Display) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.out, "{}", line)
    }

    /// Print text that brings its own line breaks
    pub fn text(&mut self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.out.write_all(text.as_bytes())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Apply the requested settings in order: frequency, power, stereo,
/// transmitter, RDS signal, RDS parameters
pub fn apply(
    file: &CardFile,
    actions: &Actions,
    assignments: &[Assignment],
    out: &mut Notices<impl Write>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(mhz) = actions.freq {
        tune::cmd_freq(file, mhz, out)?;
    }
    if let Some(level) = actions.power {
        tune::cmd_power(file, level, out)?;
    }

    let switches = [
        (Switch::Stereo, actions.stereo),
        (Switch::Transmitter, actions.tx),
        (Switch::RdsSignal, actions.rds_signal),
    ];
    for (switch, state) in switches {
        if let Some(state) = state {
            tune::cmd_switch(file, switch, state, out)?;
        }
    }

    rds::cmd_rds(file, assignments, out)
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backends::Session;
    use pcimaxfm_core::card::Privilege;
    use pcimaxfm_core::config::DriverConfig;

    fn session() -> Session {
        Session::attach("dummy", DriverConfig::default(), 0).unwrap()
    }

    fn tune_actions() -> Actions {
        Actions {
            freq: Some(Some(88.1)),
            power: Some(Some(9)),
            stereo: Some(Some(false)),
            ..Actions::default()
        }
    }

    #[test]
    fn test_apply_prints_notices() {
        let session = session();
        let file = session.card().open(Privilege::User).unwrap();
        let assignments = rds::parse_assignments(&["PS00=RADIO".to_string()]).unwrap();
        let mut out = Notices::new(Vec::new(), false);

        apply(&file, &tune_actions(), &assignments, &mut out).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(
            text,
            "Frequency: 88.10 MHz (1762 50 KHz steps)\n\
             Power level: 9/15\n\
             Stereo encoder: Off\n\
             RDS: PS00 = \"RADIO\"\n"
        );
        assert_eq!(session.card().frequency(), Some(1762));
        assert_eq!(session.card().power(), Some(9));
    }

    #[test]
    fn test_quiet_prints_nothing() {
        let session = session();
        let file = session.card().open(Privilege::User).unwrap();
        let mut out = Notices::new(Vec::new(), true);

        apply(&file, &tune_actions(), &[], &mut out).unwrap();
        status::cmd_status(&file, &mut out).unwrap();

        assert!(out.into_inner().is_empty());
        assert_eq!(session.card().frequency(), Some(1762));
        assert!(!session.card().stereo());
    }

    #[test]
    fn test_query_without_value() {
        let session = session();
        let file = session.card().open(Privilege::User).unwrap();
        let actions = Actions {
            freq: Some(None),
            tx: Some(None),
            ..Actions::default()
        };
        let mut out = Notices::new(Vec::new(), false);

        apply(&file, &actions, &[], &mut out).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "Frequency not set yet.\nTransmitter: Off\n");
    }
}
