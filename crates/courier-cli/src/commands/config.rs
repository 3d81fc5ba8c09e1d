use anyhow::{Context, Result};
use courier_core::config::RootConfig;
use courier_infrastructure::ConfigService;

const REDACTED: &str = "********";

/// Prints the effective configuration (file + environment), token redacted.
pub fn show(service: &ConfigService, config: &RootConfig) -> Result<()> {
    let mut config = config.clone();
    if config.server.auth_token.is_some() {
        config.server.auth_token = Some(REDACTED.to_string());
    }

    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    println!("# {}", service.path().display());
    print!("{}", rendered);
    Ok(())
}

pub fn init(service: &ConfigService) -> Result<()> {
    let created = service
        .ensure_config_file()
        .context("Failed to write default config")?;

    if created {
        tracing::info!("[Config] Wrote default config to {:?}", service.path());
        println!("Created {}", service.path().display());
    } else {
        println!("Config already exists at {}", service.path().display());
    }
    Ok(())
}
