//! Up command - forward the port to WSL and open the firewall.

use anyhow::{Context, Result};
use tracing::debug;
use wsl_expose_core::system_orchestrator;

use crate::Settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let request = settings.request();
    debug!(?request, "Starting exposure run");
    let orchestrator = system_orchestrator(settings.distro(), settings.query_timeout());

    let report = orchestrator
        .run(&request)
        .await
        .with_context(|| format!("Failed to expose port {}", request.listen_port))?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if settings.quiet {
        return Ok(());
    }

    println!("{:<18} {}", "Host address:", report.host_address);
    println!("{:<18} {}", "WSL address:", report.subsystem_address);
    println!(
        "{:<18} {} ({})",
        "Port proxy:",
        report.forward_rule,
        report.forward.label()
    );
    println!(
        "{:<18} {} ({})",
        "Firewall rule:",
        report.firewall_rule_name,
        report.firewall.label()
    );
    println!();
    println!("Ready: {}", report.access_url);
    Ok(())
}
