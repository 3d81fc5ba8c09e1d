use super::utils::{build_client, identity};
use anyhow::{Context, Result};
use courier_core::config::RootConfig;
use courier_core::identity::IdentityContext;

pub async fn run(config: &RootConfig) -> Result<()> {
    let client = build_client(config)?;
    let username = identity(config, &client)
        .viewer_username()
        .await
        .context("Failed to determine the logged-in user")?;

    println!("{}", username);
    Ok(())
}
