use super::utils::build_client;
use anyhow::{Context, Result};
use courier_core::config::RootConfig;
use courier_core::message::MessageApi;

pub async fn run(config: &RootConfig, id: &str) -> Result<()> {
    let client = build_client(config)?;
    client
        .delete_message(id)
        .await
        .with_context(|| format!("Failed to delete message {}", id))?;

    tracing::info!("[Delete] Deleted message {}", id);
    println!("Deleted message {}", id);
    Ok(())
}
