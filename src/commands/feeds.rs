use anyhow::Result;
use owo_colors::OwoColorize;
use staysync_core::api::ApiClient;

use super::resolve_properties;
use crate::render::Render;

pub async fn run(client: &ApiClient, property_id: Option<&str>) -> Result<()> {
    let properties = resolve_properties(client, property_id).await?;

    if properties.is_empty() {
        println!("No properties found.");
        return Ok(());
    }

    for (i, property) in properties.iter().enumerate() {
        println!("{}", property.render());

        let feeds = property.feeds();
        if feeds.is_empty() {
            println!("   {}", "no calendar feeds".dimmed());
        }
        for feed in feeds {
            println!("   {}", feed.render());
        }

        if i < properties.len() - 1 {
            println!();
        }
    }

    Ok(())
}
