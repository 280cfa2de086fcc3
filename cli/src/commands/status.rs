//! Status command - show current port proxy and firewall rules.

use anyhow::{Context, Result};
use wsl_expose_core::system_orchestrator;

use crate::Settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let request = settings.request();
    let orchestrator = system_orchestrator(settings.distro(), settings.query_timeout());

    let status = orchestrator
        .status(request.listen_port, &request.rule_name)
        .await
        .context("Failed to read rule tables")?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    if status.forward_rules.is_empty() {
        println!("No port proxy rules configured.");
    } else {
        println!(
            "{:<16} {:<8} {:<16} {:<8}",
            "LISTEN", "PORT", "CONNECT", "PORT"
        );
        println!("{}", "-".repeat(50));
        for rule in &status.forward_rules {
            let marker = if rule.binds(status.listen_port) { " *" } else { "" };
            println!(
                "{:<16} {:<8} {:<16} {:<8}{}",
                rule.listen_address.to_string(),
                rule.listen_port,
                rule.connect_address.to_string(),
                rule.connect_port,
                marker
            );
        }
        println!();
    }

    match &status.active_rule {
        Some(rule) => println!("Port {}: forwarded ({})", status.listen_port, rule),
        None => println!("Port {}: not forwarded", status.listen_port),
    }
    match &status.firewall_rule {
        Some(rule) => println!(
            "Firewall rule '{}': present ({} {} {}, port {})",
            status.firewall_rule_name,
            rule.direction.as_str(),
            rule.action.as_str(),
            rule.protocol,
            rule.local_port
                .map(|p| p.to_string())
                .unwrap_or_else(|| "any".to_string())
        ),
        None => println!("Firewall rule '{}': missing", status.firewall_rule_name),
    }
    Ok(())
}
