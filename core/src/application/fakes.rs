//! In-memory port implementations shared by the application tests.

use std::net::Ipv4Addr;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{Direction, FirewallRule, ForwardRule, RouteEntry, RuleHost};
use crate::error::{Error, Result};
use crate::ports::{
    FirewallRuleStore, ForwardRuleStore, PrivilegePort, RouteTablePort, SubsystemPort,
};

/// Privilege check with a fixed answer.
pub struct FakePrivilege(pub bool);

impl PrivilegePort for FakePrivilege {
    async fn is_elevated(&self) -> Result<bool> {
        Ok(self.0)
    }
}

/// Route table with canned routes and per-interface addresses.
#[derive(Default)]
pub struct FakeRoutes {
    pub routes: Vec<RouteEntry>,
    pub addresses: Vec<(u32, Vec<Ipv4Addr>)>,
}

impl FakeRoutes {
    /// One default route on interface 12 carrying `addrs`.
    pub fn default_via(addrs: &[[u8; 4]]) -> Self {
        Self {
            routes: vec![RouteEntry::new("0.0.0.0/0", 25, 12)],
            addresses: vec![(12, addrs.iter().map(|a| Ipv4Addr::from(*a)).collect())],
        }
    }
}

impl RouteTablePort for FakeRoutes {
    async fn routes(&self) -> Result<Vec<RouteEntry>> {
        Ok(self.routes.clone())
    }

    async fn interface_addresses(&self, interface_index: u32) -> Result<Vec<Ipv4Addr>> {
        Ok(self
            .addresses
            .iter()
            .find(|(index, _)| *index == interface_index)
            .map(|(_, addrs)| addrs.clone())
            .unwrap_or_default())
    }
}

/// Subsystem whose answer can be swapped between calls.
#[derive(Clone)]
pub struct FakeSubsystem {
    pub answer: Arc<RwLock<Result<String>>>,
    pub calls: Arc<RwLock<usize>>,
}

impl FakeSubsystem {
    pub fn answering(text: &str) -> Self {
        Self {
            answer: Arc::new(RwLock::new(Ok(text.to_string()))),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            answer: Arc::new(RwLock::new(Err(Error::SubsystemUnreachable(
                "wsl.exe exited with Some(1) and no output".to_string(),
            )))),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    pub fn set_answer(&self, text: &str) {
        *self.answer.write() = Ok(text.to_string());
    }
}

impl SubsystemPort for FakeSubsystem {
    async fn query_addresses(&self) -> Result<String> {
        *self.calls.write() += 1;
        match &*self.answer.read() {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(Error::SubsystemUnreachable(e.to_string())),
        }
    }
}

/// Port proxy table that counts mutations and can be told to reject adds.
#[derive(Clone, Default)]
pub struct FakeForwardStore {
    pub rules: Arc<RwLock<Vec<ForwardRule>>>,
    pub mutations: Arc<RwLock<usize>>,
    pub fail_add: Arc<RwLock<bool>>,
    pub fail_delete: Arc<RwLock<bool>>,
}

impl FakeForwardStore {
    pub fn with_rules(rules: Vec<ForwardRule>) -> Self {
        let store = Self::default();
        *store.rules.write() = rules;
        store
    }

    pub fn rules_for(&self, port: u16) -> Vec<ForwardRule> {
        self.rules
            .read()
            .iter()
            .filter(|r| r.binds(port))
            .cloned()
            .collect()
    }

    pub fn mutation_count(&self) -> usize {
        *self.mutations.read()
    }
}

impl ForwardRuleStore for FakeForwardStore {
    async fn list(&self) -> Result<Vec<ForwardRule>> {
        Ok(self.rules.read().clone())
    }

    async fn delete(&self, listen_address: &RuleHost, listen_port: u16) -> Result<bool> {
        if *self.fail_delete.read() {
            return Err(Error::RuleMutation("delete rejected".to_string()));
        }
        *self.mutations.write() += 1;
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| !(&r.listen_address == listen_address && r.listen_port == listen_port));
        Ok(rules.len() != before)
    }

    async fn add(&self, rule: &ForwardRule) -> Result<()> {
        if *self.fail_add.read() {
            return Err(Error::RuleMutation("add rejected".to_string()));
        }
        *self.mutations.write() += 1;
        // Mirrors netsh: adding onto an existing listen pair overwrites it.
        let mut rules = self.rules.write();
        rules.retain(|r| {
            !(r.listen_address == rule.listen_address && r.listen_port == rule.listen_port)
        });
        rules.push(rule.clone());
        Ok(())
    }
}

/// Firewall store that, like the real one, accepts duplicate display names
/// and only looks at inbound rules.
#[derive(Clone, Default)]
pub struct FakeFirewallStore {
    pub rules: Arc<RwLock<Vec<FirewallRule>>>,
    pub mutations: Arc<RwLock<usize>>,
}

impl FakeFirewallStore {
    pub fn count_named(&self, name: &str) -> usize {
        self.rules
            .read()
            .iter()
            .filter(|r| r.display_name == name)
            .count()
    }

    pub fn mutation_count(&self) -> usize {
        *self.mutations.read()
    }
}

impl FirewallRuleStore for FakeFirewallStore {
    async fn find_by_name(&self, display_name: &str) -> Result<Option<FirewallRule>> {
        Ok(self
            .rules
            .read()
            .iter()
            .find(|r| r.display_name == display_name && r.direction == Direction::Inbound)
            .cloned())
    }

    async fn create(&self, rule: &FirewallRule) -> Result<()> {
        *self.mutations.write() += 1;
        self.rules.write().push(rule.clone());
        Ok(())
    }

    async fn delete_by_name(&self, display_name: &str) -> Result<bool> {
        *self.mutations.write() += 1;
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| !(r.display_name == display_name && r.direction == Direction::Inbound));
        Ok(rules.len() != before)
    }
}
