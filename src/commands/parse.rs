use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use staysync_core::ics::parse_feed;

use crate::render::{ClassifiedEvent, Render};

pub fn run(file: &Path, keywords: &[String]) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let events = parse_feed(&content);
    if events.is_empty() {
        println!("No events found in {}", file.display());
        return Ok(());
    }

    let mut bookings = 0;
    for event in &events {
        let is_reservation = event.is_reservation(keywords);
        if is_reservation {
            bookings += 1;
        }
        println!(
            "{}",
            ClassifiedEvent {
                event,
                is_reservation
            }
            .render()
        );
    }

    println!(
        "\n{} events, {} would be imported as reservations",
        events.len(),
        bookings.to_string().bold()
    );

    Ok(())
}
