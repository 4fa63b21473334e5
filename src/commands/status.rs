//! Status command implementation

use std::io::Write;

use pcimaxfm_core::card::CardFile;

use super::Notices;

/// Print the card's status text
pub fn cmd_status(
    file: &CardFile,
    out: &mut Notices<impl Write>,
) -> Result<(), Box<dyn std::error::Error>> {
    out.text(&file.read_status()?)?;
    Ok(())
}
