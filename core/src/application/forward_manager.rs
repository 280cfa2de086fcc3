//! Forward (port proxy) rule reconciliation.

use tracing::{debug, info, warn};

use crate::domain::{ForwardOutcome, ForwardRule, NetworkAddress};
use crate::error::{Error, Result};
use crate::ports::ForwardRuleStore;

/// Keeps exactly one forward rule per listen port, pointing at the latest address.
pub struct ForwardRuleManager<F: ForwardRuleStore> {
    store: F,
}

impl<F: ForwardRuleStore> ForwardRuleManager<F> {
    pub fn new(store: F) -> Self {
        Self { store }
    }

    /// Replace whatever is bound to `0.0.0.0:listen_port` (or netsh's
    /// `*:listen_port`) with a rule to `connect_address:connect_port`.
    ///
    /// Existing rules are listed first and only deleted when present, so a
    /// failing delete is always a real failure. There is no rollback: if the
    /// add fails after a delete, the port is left without a rule and the
    /// error says so.
    pub async fn reconcile(
        &self,
        listen_port: u16,
        connect_address: NetworkAddress,
        connect_port: u16,
    ) -> Result<(ForwardRule, ForwardOutcome)> {
        let desired = ForwardRule::new(listen_port, connect_address, connect_port);
        let bound = self.bound(listen_port).await?;

        for stale in &bound {
            if stale == &desired {
                debug!(rule = %stale, "Existing rule already matches; replacing anyway");
            } else {
                info!(stale = %stale, "Replacing stale forward rule");
            }
            if !self.store.delete(&stale.listen_address, listen_port).await? {
                debug!(rule = %stale, "Rule vanished before delete");
            }
        }
        let previous = bound.into_iter().next();

        if let Err(e) = self.store.add(&desired).await {
            let detail = match e {
                Error::RuleMutation(msg) => msg,
                other => other.to_string(),
            };
            return Err(Error::RuleMutation(match &previous {
                Some(stale) => format!(
                    "{}; previous rule {} was already removed, port {} now has no forwarding rule",
                    detail, stale, listen_port
                ),
                None => detail,
            }));
        }

        info!(rule = %desired, "Forward rule installed");
        let outcome = match previous {
            Some(previous) => ForwardOutcome::Replaced { previous },
            None => ForwardOutcome::Created,
        };
        Ok((desired, outcome))
    }

    /// The rule listening on every interface at `listen_port`, if any.
    pub async fn find(&self, listen_port: u16) -> Result<Option<ForwardRule>> {
        Ok(self.bound(listen_port).await?.into_iter().next())
    }

    /// Every rule in the store.
    pub async fn list(&self) -> Result<Vec<ForwardRule>> {
        self.store.list().await
    }

    /// Delete the rules bound to `listen_port`. Absent is not an error.
    ///
    /// Like `reconcile`, only rules the listing shows are deleted, so the
    /// store is never asked to delete something that is not there.
    pub async fn remove(&self, listen_port: u16) -> Result<bool> {
        let bound = self.bound(listen_port).await?;
        if bound.is_empty() {
            debug!(listen_port, "No forward rule to remove");
            return Ok(false);
        }

        for rule in &bound {
            self.store.delete(&rule.listen_address, listen_port).await?;
            info!(rule = %rule, "Forward rule removed");
        }
        Ok(true)
    }

    async fn bound(&self, listen_port: u16) -> Result<Vec<ForwardRule>> {
        let bound: Vec<ForwardRule> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|r| r.binds(listen_port))
            .collect();
        if bound.len() > 1 {
            warn!(listen_port, count = bound.len(), "More than one forward rule bound to port");
        }
        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::FakeForwardStore;
    use crate::domain::RuleHost;

    fn addr(s: &str) -> NetworkAddress {
        NetworkAddress::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_reconcile_creates_rule() {
        let store = FakeForwardStore::default();
        let manager = ForwardRuleManager::new(store.clone());

        let (rule, outcome) = manager.reconcile(8000, addr("172.20.3.4"), 8000).await.unwrap();
        assert_eq!(rule.to_string(), "0.0.0.0:8000 -> 172.20.3.4:8000");
        assert_eq!(outcome, ForwardOutcome::Created);
        assert_eq!(store.rules_for(8000), vec![rule]);
        // nothing to delete, so only the add
        assert_eq!(store.mutation_count(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_twice_keeps_single_latest_rule() {
        let store = FakeForwardStore::default();
        let manager = ForwardRuleManager::new(store.clone());

        manager.reconcile(8000, addr("172.20.3.4"), 8000).await.unwrap();
        let (_, outcome) = manager.reconcile(8000, addr("172.29.9.1"), 8000).await.unwrap();

        let bound = store.rules_for(8000);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].connect_address, RuleHost::from(addr("172.29.9.1")));
        match outcome {
            ForwardOutcome::Replaced { previous } => {
                assert_eq!(previous.connect_address, RuleHost::from(addr("172.20.3.4")))
            }
            other => panic!("expected replace, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reconcile_leaves_other_ports_alone() {
        let other = ForwardRule::new(9000, addr("172.20.0.2"), 9000);
        let store = FakeForwardStore::with_rules(vec![other.clone()]);
        let manager = ForwardRuleManager::new(store.clone());

        manager.reconcile(8000, addr("172.20.3.4"), 8080).await.unwrap();
        assert_eq!(store.rules_for(9000), vec![other]);
        assert_eq!(store.rules_for(8000)[0].connect_port, 8080);
    }

    #[tokio::test]
    async fn test_add_failure_after_delete_is_fatal() {
        let stale = ForwardRule::new(8000, addr("172.20.0.9"), 8000);
        let store = FakeForwardStore::with_rules(vec![stale]);
        *store.fail_add.write() = true;
        let manager = ForwardRuleManager::new(store.clone());

        let err = manager
            .reconcile(8000, addr("172.20.3.4"), 8000)
            .await
            .unwrap_err();
        match err {
            Error::RuleMutation(msg) => assert!(msg.contains("no forwarding rule"), "{msg}"),
            other => panic!("expected RuleMutation, got {other:?}"),
        }
        assert!(store.rules_for(8000).is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_swallowed() {
        let stale = ForwardRule::new(8000, addr("172.20.0.9"), 8000);
        let store = FakeForwardStore::with_rules(vec![stale.clone()]);
        *store.fail_delete.write() = true;
        let manager = ForwardRuleManager::new(store.clone());

        assert!(matches!(
            manager.reconcile(8000, addr("172.20.3.4"), 8000).await,
            Err(Error::RuleMutation(_))
        ));
        assert_eq!(store.rules_for(8000), vec![stale]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = FakeForwardStore::with_rules(vec![ForwardRule::new(
            8000,
            addr("172.20.3.4"),
            8000,
        )]);
        let manager = ForwardRuleManager::new(store.clone());

        assert!(manager.remove(8000).await.unwrap());
        assert!(!manager.remove(8000).await.unwrap());
        assert!(manager.find(8000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reconcile_replaces_wildcard_rule() {
        let mut star = ForwardRule::new(8000, addr("172.20.0.9"), 8000);
        star.listen_address = RuleHost::Any;
        let store = FakeForwardStore::with_rules(vec![star.clone()]);
        let manager = ForwardRuleManager::new(store.clone());

        let (rule, outcome) = manager.reconcile(8000, addr("172.20.3.4"), 8000).await.unwrap();
        assert_eq!(outcome, ForwardOutcome::Replaced { previous: star });
        assert_eq!(store.rules_for(8000), vec![rule]);
    }

    #[tokio::test]
    async fn test_reconcile_collapses_duplicate_bindings() {
        let mut star = ForwardRule::new(8000, addr("172.20.0.9"), 8000);
        star.listen_address = RuleHost::Any;
        let unspecified = ForwardRule::new(8000, addr("172.20.0.8"), 8000);
        let store = FakeForwardStore::with_rules(vec![star, unspecified]);
        let manager = ForwardRuleManager::new(store.clone());

        manager.reconcile(8000, addr("172.20.3.4"), 8000).await.unwrap();
        let bound = store.rules_for(8000);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].connect_address, RuleHost::from(addr("172.20.3.4")));
    }

    #[tokio::test]
    async fn test_remove_absent_rule_never_calls_delete() {
        let store = FakeForwardStore::default();
        *store.fail_delete.write() = true;
        let manager = ForwardRuleManager::new(store.clone());

        assert!(!manager.remove(8000).await.unwrap());
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_delete_failure_is_reported() {
        let store = FakeForwardStore::with_rules(vec![ForwardRule::new(
            8000,
            addr("172.20.3.4"),
            8000,
        )]);
        *store.fail_delete.write() = true;
        let manager = ForwardRuleManager::new(store);

        assert!(matches!(
            manager.remove(8000).await,
            Err(Error::RuleMutation(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_wildcard_rule() {
        let mut star = ForwardRule::new(8000, addr("172.20.0.9"), 8000);
        star.listen_address = RuleHost::Any;
        let store = FakeForwardStore::with_rules(vec![star]);
        let manager = ForwardRuleManager::new(store.clone());

        assert!(manager.remove(8000).await.unwrap());
        assert!(store.rules_for(8000).is_empty());
    }
}
