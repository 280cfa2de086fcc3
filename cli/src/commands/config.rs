//! Config command - inspect or initialize the configuration file.

use anyhow::{bail, Context, Result};
use wsl_expose_core::{Config, ConfigStore};

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let source = if store.exists() { "file" } else { "defaults" };
    println!("Configuration ({}): {}", source, store.path().display());
    println!("  {:<20} {}", "port", config.port);
    println!(
        "  {:<20} {}",
        "connectPort",
        config
            .connect_port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "(same as port)".to_string())
    );
    println!("  {:<20} {}", "ruleNameTemplate", config.rule_name_template);
    println!(
        "  {:<20} {}",
        "distro",
        config.distro.as_deref().unwrap_or("(default)")
    );
    println!("  {:<20} {}s", "queryTimeoutSecs", config.query_timeout_secs);
    println!("  {:<20} {}", "accessPath", config.access_path);
    Ok(())
}

pub async fn init(store: &ConfigStore, force: bool) -> Result<()> {
    if store.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        );
    }

    store
        .save(&Config::default())
        .await
        .context("Failed to write configuration")?;
    println!("Wrote {}", store.path().display());
    Ok(())
}

pub fn path(store: &ConfigStore) -> Result<()> {
    println!("{}", store.path().display());
    Ok(())
}
