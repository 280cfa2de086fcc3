//! Forward rule store backed by `netsh interface portproxy`.
//!
//! Uses the following system commands:
//! - `netsh interface portproxy show v4tov4` to list rules
//! - `netsh interface portproxy delete v4tov4 listenport=P [listenaddress=A]`
//! - `netsh interface portproxy add v4tov4 listenport=P listenaddress=A connectport=C connectaddress=B`

use tracing::{debug, warn};

use crate::domain::{ForwardRule, RuleHost};
use crate::error::{Error, Result};
use crate::ports::ForwardRuleStore;

use super::command::{run, CommandOutput};

const NETSH: &str = "netsh.exe";

/// Messages netsh prints when the rule to delete does not exist.
const NOT_FOUND_MARKERS: &[&str] = &[
    "cannot find the file specified",
    "element not found",
    "cannot find",
];

/// Port proxy (v4tov4) rule store using netsh.
#[derive(Debug, Default)]
pub struct NetshPortProxy;

impl NetshPortProxy {
    pub fn new() -> Self {
        Self
    }

    /// Parse the output of `netsh interface portproxy show v4tov4`.
    ///
    /// Example output:
    /// ```text
    /// Listen on ipv4:             Connect to ipv4:
    ///
    /// Address         Port        Address         Port
    /// --------------- ----------  --------------- ----------
    /// 0.0.0.0         8000        172.20.3.4      8000
    /// ```
    ///
    /// A listen address of `*` (rule added without `listenaddress`) and
    /// host-name connect addresses are kept as [`RuleHost`] variants.
    fn parse_show_output(output: &str) -> Vec<ForwardRule> {
        let mut rules = Vec::new();

        for line in output.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 4 {
                continue;
            }

            // Header and separator rows have no numeric port columns
            let (Ok(listen_port), Ok(connect_port)) =
                (parts[1].parse::<u16>(), parts[3].parse::<u16>())
            else {
                continue;
            };

            rules.push(ForwardRule {
                listen_address: RuleHost::parse(parts[0]),
                listen_port,
                connect_address: RuleHost::parse(parts[2]),
                connect_port,
            });
        }

        rules
    }

    /// Arguments for deleting the rule on `listen_address:listen_port`.
    ///
    /// A `*` rule is addressed by leaving `listenaddress` out, the same way
    /// it was created.
    fn delete_args(listen_address: &RuleHost, listen_port: u16) -> Vec<String> {
        let mut args: Vec<String> = ["interface", "portproxy", "delete", "v4tov4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(format!("listenport={}", listen_port));
        if *listen_address != RuleHost::Any {
            args.push(format!("listenaddress={}", listen_address));
        }
        args
    }

    fn is_not_found(output: &CommandOutput) -> bool {
        let combined = output.combined().to_lowercase();
        NOT_FOUND_MARKERS.iter().any(|m| combined.contains(m))
    }

    /// netsh sometimes exits 0 while printing an error; any non-blank output
    /// from a mutating call is treated as failure.
    fn mutation_failed(output: &CommandOutput) -> bool {
        !output.success || !output.combined().trim().is_empty()
    }
}

impl ForwardRuleStore for NetshPortProxy {
    async fn list(&self) -> Result<Vec<ForwardRule>> {
        let output = run(NETSH, &["interface", "portproxy", "show", "v4tov4"]).await?;
        if !output.success {
            return Err(Error::CommandFailed(format!(
                "netsh portproxy show failed: {}",
                output.combined().trim()
            )));
        }

        let rules = Self::parse_show_output(&output.stdout);
        debug!(count = rules.len(), "Listed port proxy rules");
        Ok(rules)
    }

    async fn delete(&self, listen_address: &RuleHost, listen_port: u16) -> Result<bool> {
        let args = Self::delete_args(listen_address, listen_port);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = run(NETSH, &args).await?;

        if !Self::mutation_failed(&output) {
            debug!(%listen_address, listen_port, "Deleted port proxy rule");
            return Ok(true);
        }

        if Self::is_not_found(&output) {
            debug!(%listen_address, listen_port, "No port proxy rule to delete");
            return Ok(false);
        }

        warn!(%listen_address, listen_port, code = ?output.code, "netsh delete failed");
        Err(Error::RuleMutation(format!(
            "could not delete port proxy {}:{}: {}",
            listen_address,
            listen_port,
            output.combined().trim()
        )))
    }

    async fn add(&self, rule: &ForwardRule) -> Result<()> {
        let listen_port = format!("listenport={}", rule.listen_port);
        let listen_address = format!("listenaddress={}", rule.listen_address);
        let connect_port = format!("connectport={}", rule.connect_port);
        let connect_address = format!("connectaddress={}", rule.connect_address);
        let output = run(
            NETSH,
            &[
                "interface",
                "portproxy",
                "add",
                "v4tov4",
                &listen_port,
                &listen_address,
                &connect_port,
                &connect_address,
            ],
        )
        .await?;

        if Self::mutation_failed(&output) {
            warn!(%rule, code = ?output.code, "netsh add failed");
            return Err(Error::RuleMutation(format!(
                "could not add port proxy {}: {}",
                rule,
                output.combined().trim()
            )));
        }

        debug!(%rule, "Added port proxy rule");
        Ok(())
    }
}
