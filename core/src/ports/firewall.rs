//! Firewall rule store port (interface).

use crate::domain::FirewallRule;
use crate::error::Result;

/// Port for the OS packet-filtering rule store.
///
/// Rules are keyed by display name. Only inbound rules are visible through
/// this port; outbound rules with the same name are never returned or removed.
pub trait FirewallRuleStore: Send + Sync {
    /// Look up an inbound rule by display name.
    fn find_by_name(
        &self,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<Option<FirewallRule>>> + Send;

    /// Create a rule. Fails with `Error::RuleMutation` if the store rejects it.
    fn create(&self, rule: &FirewallRule) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete every inbound rule with this display name.
    ///
    /// Returns `Ok(false)` when no such rule existed.
    fn delete_by_name(
        &self,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}
