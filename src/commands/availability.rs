use anyhow::Result;
use owo_colors::OwoColorize;
use staysync_core::DateRange;
use staysync_core::api::ApiClient;
use staysync_core::date_range::disabled_dates;
use staysync_core::sync::AvailabilityOracle;

use crate::render::Render;

pub async fn run(
    client: &ApiClient,
    property_id: &str,
    start: &str,
    end: &str,
    exclude: Option<&str>,
    show_dates: bool,
) -> Result<()> {
    let range = DateRange::from_tokens(start, end)?;

    let report = client.check_availability(property_id, &range, exclude).await?;
    println!("{} {}", range.bold(), report.render());

    if show_dates {
        let reservations = client.reservations_for(Some(property_id)).await?;
        let days = disabled_dates(&reservations);

        println!();
        if days.is_empty() {
            println!("{}", "No booked days.".dimmed());
        }
        for day in days {
            println!("   {}", day.format("%Y-%m-%d"));
        }
    }

    Ok(())
}
