use anyhow::Result;
use owo_colors::OwoColorize;
use staysync_core::api::ApiClient;

pub async fn run(client: &ApiClient, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };

    let user = client.login(email, &password).await?;

    let name = user.name.as_deref().or(user.email.as_deref()).unwrap_or(user.id.as_str());
    println!("{} Logged in as {}", "✓".green(), name.bold());

    Ok(())
}
