use anyhow::Result;
use staysync_core::api::ApiClient;

use crate::render::Render;
use crate::utils::tui;

pub async fn run(client: &ApiClient, property_id: &str) -> Result<()> {
    let property = client.get_property(property_id).await?;

    let spinner = tui::create_spinner(property.render());
    let result = client.server_sync(&property.id).await;
    spinner.finish_and_clear();

    println!("{}", property.render());
    println!("   {}", result?.render());

    Ok(())
}
