//! Forward rule store port (interface).

use crate::domain::{ForwardRule, RuleHost};
use crate::error::Result;

/// Port for the OS address-translation (port proxy) rule table.
pub trait ForwardRuleStore: Send + Sync {
    /// List every forward rule currently installed.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<ForwardRule>>> + Send;

    /// Delete the rule bound to `listen_address:listen_port`.
    ///
    /// Returns `Ok(false)` when no such rule existed; that is not an error.
    fn delete(
        &self,
        listen_address: &RuleHost,
        listen_port: u16,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Add a rule. Fails with `Error::RuleMutation` if the store rejects it.
    fn add(&self, rule: &ForwardRule) -> impl std::future::Future<Output = Result<()>> + Send;
}
