use anyhow::Result;
use owo_colors::OwoColorize;
use staysync_core::api::ApiClient;

use super::require_user;

pub fn run(client: &ApiClient) -> Result<()> {
    let user = require_user(client)?;

    println!("{}", user.name.as_deref().unwrap_or(user.id.as_str()).bold());
    if let Some(email) = &user.email {
        println!("{}", email.dimmed());
    }
    println!("{}", format!("id: {}", user.id).dimmed());

    Ok(())
}
