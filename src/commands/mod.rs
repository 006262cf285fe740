pub mod availability;
pub mod export;
pub mod feeds;
pub mod login;
pub mod logout;
pub mod parse;
pub mod server_sync;
pub mod sync;
pub mod whoami;

use anyhow::Result;
use staysync_core::Property;
use staysync_core::api::ApiClient;
use staysync_core::session::SessionUser;

/// The logged-in user, or a hint to log in first.
fn require_user(client: &ApiClient) -> Result<SessionUser> {
    match client.session().user() {
        Some(user) if client.session().token().is_some() => Ok(user),
        _ => anyhow::bail!(
            "Not logged in.\n\n\
            Log in first with:\n  \
            staysync login <email>"
        ),
    }
}

/// One property by id, or every property.
async fn resolve_properties(client: &ApiClient, property_id: Option<&str>) -> Result<Vec<Property>> {
    match property_id {
        Some(id) => Ok(vec![client.get_property(id).await?]),
        None => Ok(client.list_properties().await?),
    }
}
