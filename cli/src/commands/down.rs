//! Down command - remove the port proxy rule and, optionally, the firewall rule.

use anyhow::{Context, Result};
use wsl_expose_core::system_orchestrator;

use crate::Settings;

pub async fn run(settings: &Settings, keep_firewall: bool) -> Result<()> {
    let request = settings.request();
    let orchestrator = system_orchestrator(settings.distro(), settings.query_timeout());

    let report = orchestrator
        .teardown(request.listen_port, &request.rule_name, keep_firewall)
        .await
        .with_context(|| format!("Failed to remove rules for port {}", request.listen_port))?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if settings.quiet {
        return Ok(());
    }

    if report.forward_removed {
        println!("Removed port proxy for 0.0.0.0:{}", report.listen_port);
    } else {
        println!("No port proxy for 0.0.0.0:{}", report.listen_port);
    }
    match report.firewall_removed {
        Some(true) => println!("Removed firewall rule '{}'", report.firewall_rule_name),
        Some(false) => println!("No firewall rule '{}'", report.firewall_rule_name),
        None => println!("Kept firewall rule '{}'", report.firewall_rule_name),
    }
    Ok(())
}
