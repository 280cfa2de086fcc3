//! Firewall exception management.

use tracing::{debug, info, warn};

use crate::domain::{Direction, FirewallOutcome, FirewallRule};
use crate::error::Result;
use crate::ports::FirewallRuleStore;

/// Creates the inbound-allow rule once and reuses it on later runs.
///
/// Check-then-create is not atomic; two concurrent runs may both create.
pub struct FirewallRuleManager<W: FirewallRuleStore> {
    store: W,
}

impl<W: FirewallRuleStore> FirewallRuleManager<W> {
    pub fn new(store: W) -> Self {
        Self { store }
    }

    /// Make sure an inbound rule named `display_name` exists, creating an
    /// inbound TCP allow rule for `local_port` if it does not.
    ///
    /// An outbound rule with the same name does not count.
    pub async fn ensure_rule(&self, display_name: &str, local_port: u16) -> Result<FirewallOutcome> {
        let existing = self
            .store
            .find_by_name(display_name)
            .await?
            .filter(|r| r.direction == Direction::Inbound);
        if let Some(existing) = existing {
            if !existing.admits(local_port) {
                warn!(
                    display_name,
                    local_port,
                    existing_port = ?existing.local_port,
                    "Existing firewall rule does not cover this port; leaving it unchanged"
                );
            }
            info!(display_name, "Reusing existing firewall rule");
            return Ok(FirewallOutcome::Reused);
        }

        let rule = FirewallRule::inbound_tcp(display_name, local_port);
        self.store.create(&rule).await?;
        info!(display_name, local_port, "Created firewall rule");
        Ok(FirewallOutcome::Created)
    }

    pub async fn find(&self, display_name: &str) -> Result<Option<FirewallRule>> {
        self.store.find_by_name(display_name).await
    }

    /// Delete the rule named `display_name`. Absent is not an error.
    pub async fn remove(&self, display_name: &str) -> Result<bool> {
        let removed = self.store.delete_by_name(display_name).await?;
        debug!(display_name, removed, "Firewall rule removal finished");
        Ok(removed)
    }
}
