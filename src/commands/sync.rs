use anyhow::Result;
use owo_colors::OwoColorize;
use staysync_core::api::ApiClient;
use staysync_core::config::StayConfig;
use staysync_core::sync::{ReconciliationEngine, SyncOptions};
use staysync_core::AsyncOperation;

use super::{require_user, resolve_properties};
use crate::render::Render;
use crate::utils::tui;

pub async fn run(
    client: &ApiClient,
    config: &StayConfig,
    property_id: Option<&str>,
    concurrency: Option<usize>,
    json: bool,
) -> Result<()> {
    let user = require_user(client)?;

    let mut options = SyncOptions::from(config);
    if let Some(n) = concurrency {
        options.concurrency = n.max(1);
    }

    let mut operation = AsyncOperation::default();
    operation.start();

    let spinner = (!json).then(|| tui::create_spinner("Syncing calendar feeds".to_string()));
    let outcome = async {
        let properties = resolve_properties(client, property_id).await?;
        let engine = ReconciliationEngine::new(client, options);
        Ok::<_, anyhow::Error>(engine.synchronize(&properties, &user.id).await?)
    }
    .await;
    operation.resolve(outcome);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let Some(result) = operation.value() {
        if json {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }

        println!("{}", result.render());
        if result.has_failures() {
            println!(
                "{}",
                "Some feeds or events failed, run with -v for details.".dimmed()
            );
        }
    }

    match operation.take() {
        Some(Err(e)) => Err(e.context("Calendar sync failed")),
        _ => Ok(()),
    }
}
