//! List command implementation

use crate::backends;

/// List the cards the backend can see
pub fn list_cards(backend: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cards = backends::discover(backend)?;

    if cards.is_empty() {
        println!("No PCI MAX FM cards found.");
        return Ok(());
    }

    println!("{:<6} {:<16} {:>8}", "Card", "Location", "I/O");
    println!("{}", "-".repeat(32));
    for (number, card) in cards.iter().enumerate() {
        println!(
            "{:<6} {:<16} {:>#8x}",
            number, card.location, card.base_address
        );
    }

    Ok(())
}
