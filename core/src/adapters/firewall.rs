//! Firewall rule store backed by the NetSecurity PowerShell cmdlets.
//!
//! Uses:
//! - `Get-NetFirewallRule -DisplayName` (+ `Get-NetFirewallPortFilter`) to look a rule up
//! - `New-NetFirewallRule` to create one
//! - `Remove-NetFirewallRule` to delete one
//!
//! Lookups and deletes only consider inbound rules; an outbound rule that
//! happens to share the display name is left alone.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{Direction, FirewallRule, RuleAction};
use crate::error::{Error, Result};
use crate::ports::FirewallRuleStore;

use super::command::{parse_json_records, powershell, ps_quote};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FirewallRecord {
    display_name: String,
    direction: String,
    action: String,
    #[serde(default)]
    protocol: String,
    #[serde(default)]
    local_port: String,
    #[serde(default)]
    edge_traversal_policy: String,
    #[serde(default)]
    profile: String,
}

impl FirewallRecord {
    fn into_rule(self) -> FirewallRule {
        let direction = if self.direction.eq_ignore_ascii_case("outbound") {
            Direction::Outbound
        } else {
            Direction::Inbound
        };
        let action = if self.action.eq_ignore_ascii_case("allow") {
            RuleAction::Allow
        } else {
            RuleAction::Block
        };

        FirewallRule {
            display_name: self.display_name,
            direction,
            action,
            protocol: self.protocol,
            local_port: self.local_port.trim().parse().ok(),
            edge_traversal: !self.edge_traversal_policy.eq_ignore_ascii_case("block")
                && !self.edge_traversal_policy.is_empty(),
            profile: self.profile,
        }
    }
}

/// Pipeline stage keeping inbound rules only.
const INBOUND_ONLY: &str = "Where-Object { $_.Direction -eq 'Inbound' }";

/// Windows Defender Firewall rule store using PowerShell.
#[derive(Debug, Default)]
pub struct PowerShellFirewall;

impl PowerShellFirewall {
    pub fn new() -> Self {
        Self
    }

    fn find_script(display_name: &str) -> String {
        format!(
            "Get-NetFirewallRule -DisplayName {} -ErrorAction SilentlyContinue | {} | ForEach-Object {{ \
             $p = $_ | Get-NetFirewallPortFilter; [pscustomobject]@{{ \
             DisplayName = $_.DisplayName; Direction = $_.Direction.ToString(); \
             Action = $_.Action.ToString(); Protocol = \"$($p.Protocol)\"; \
             LocalPort = \"$($p.LocalPort)\"; EdgeTraversalPolicy = $_.EdgeTraversalPolicy.ToString(); \
             Profile = $_.Profile.ToString() }} }} | ConvertTo-Json -Compress",
            ps_quote(display_name),
            INBOUND_ONLY
        )
    }

    fn create_script(rule: &FirewallRule) -> Result<String> {
        let port = rule.local_port.ok_or_else(|| {
            Error::InvalidInput(format!(
                "firewall rule '{}' needs a local port",
                rule.display_name
            ))
        })?;
        let edge = if rule.edge_traversal { "Allow" } else { "Block" };

        Ok(format!(
            "New-NetFirewallRule -DisplayName {} -Direction {} -Action {} -Protocol {} \
             -LocalPort {} -EdgeTraversalPolicy {} -Profile {} -ErrorAction Stop | Out-Null",
            ps_quote(&rule.display_name),
            rule.direction.as_str(),
            rule.action.as_str(),
            ps_quote(&rule.protocol),
            port,
            edge,
            ps_quote(&rule.profile)
        ))
    }

    fn delete_script(display_name: &str) -> String {
        format!(
            "$r = Get-NetFirewallRule -DisplayName {} -ErrorAction SilentlyContinue | {}; \
             if ($r) {{ $r | Remove-NetFirewallRule -ErrorAction Stop; 'removed' }} else {{ 'absent' }}",
            ps_quote(display_name),
            INBOUND_ONLY
        )
    }

    fn parse_rules(json: &str) -> Result<Vec<FirewallRule>> {
        let records: Vec<FirewallRecord> = parse_json_records(json)?;
        Ok(records.into_iter().map(FirewallRecord::into_rule).collect())
    }
}

impl FirewallRuleStore for PowerShellFirewall {
    async fn find_by_name(&self, display_name: &str) -> Result<Option<FirewallRule>> {
        let output = powershell(&Self::find_script(display_name)).await?;
        if !output.success {
            return Err(Error::CommandFailed(format!(
                "Get-NetFirewallRule failed: {}",
                output.stderr.trim()
            )));
        }

        let mut rules: Vec<FirewallRule> = Self::parse_rules(&output.stdout)?
            .into_iter()
            .filter(|r| r.direction == Direction::Inbound)
            .collect();
        if rules.len() > 1 {
            warn!(display_name, count = rules.len(), "Multiple firewall rules share a display name");
        }
        Ok(if rules.is_empty() {
            None
        } else {
            Some(rules.swap_remove(0))
        })
    }

    async fn create(&self, rule: &FirewallRule) -> Result<()> {
        let output = powershell(&Self::create_script(rule)?).await?;
        if !output.success {
            warn!(display_name = %rule.display_name, code = ?output.code, "New-NetFirewallRule failed");
            return Err(Error::RuleMutation(format!(
                "could not create firewall rule '{}': {}",
                rule.display_name,
                output.combined().trim()
            )));
        }

        debug!(display_name = %rule.display_name, "Created firewall rule");
        Ok(())
    }

    async fn delete_by_name(&self, display_name: &str) -> Result<bool> {
        let output = powershell(&Self::delete_script(display_name)).await?;
        if !output.success {
            return Err(Error::RuleMutation(format!(
                "could not remove firewall rule '{}': {}",
                display_name,
                output.combined().trim()
            )));
        }

        let removed = output.stdout.trim() == "removed";
        debug!(display_name, removed, "Firewall rule delete finished");
        Ok(removed)
    }
}
