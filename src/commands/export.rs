use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use staysync_core::api::ApiClient;
use staysync_core::ics::{export_filename, export_reservations};

pub async fn run(client: &ApiClient, property_id: &str, output: Option<PathBuf>) -> Result<()> {
    let property = client.get_property(property_id).await?;
    let reservations = client.reservations_for(Some(&property.id)).await?;

    let ics = export_reservations(&property, &reservations);
    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(&property)));

    std::fs::write(&path, ics).with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Exported {} to {}",
        "✓".green(),
        property.display_name(),
        path.display().bold()
    );

    Ok(())
}
