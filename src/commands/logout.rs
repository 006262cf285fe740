use anyhow::Result;
use staysync_core::api::ApiClient;

pub fn run(client: &ApiClient) -> Result<()> {
    client.session().logout()?;
    println!("Logged out.");
    Ok(())
}
