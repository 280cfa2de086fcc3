//! End-to-end exposure pipeline.

use tracing::info;

use crate::domain::{ExposeRequest, RunReport, StatusReport, TeardownReport};
use crate::error::Result;
use crate::ports::{
    FirewallRuleStore, ForwardRuleStore, PrivilegePort, RouteTablePort, SubsystemPort,
};

use super::{AddressResolver, FirewallRuleManager, ForwardRuleManager, PrivilegeGuard};

/// Runs guard → resolve → forward → firewall as one linear pipeline.
///
/// The first failing stage aborts the run; nothing done by earlier stages is
/// rolled back. Runs are not serialized against each other.
pub struct Orchestrator<P, R, S, F, W>
where
    P: PrivilegePort,
    R: RouteTablePort,
    S: SubsystemPort,
    F: ForwardRuleStore,
    W: FirewallRuleStore,
{
    guard: PrivilegeGuard<P>,
    resolver: AddressResolver<R, S>,
    forward: ForwardRuleManager<F>,
    firewall: FirewallRuleManager<W>,
}

impl<P, R, S, F, W> Orchestrator<P, R, S, F, W>
where
    P: PrivilegePort,
    R: RouteTablePort,
    S: SubsystemPort,
    F: ForwardRuleStore,
    W: FirewallRuleStore,
{
    pub fn new(privilege: P, routes: R, subsystem: S, forward: F, firewall: W) -> Self {
        Self {
            guard: PrivilegeGuard::new(privilege),
            resolver: AddressResolver::new(routes, subsystem),
            forward: ForwardRuleManager::new(forward),
            firewall: FirewallRuleManager::new(firewall),
        }
    }

    /// Expose the subsystem service on the host network.
    pub async fn run(&self, request: &ExposeRequest) -> Result<RunReport> {
        request.validate()?;
        self.guard.assert_elevated().await?;

        let host_address = self.resolver.resolve_host_address().await?;
        let subsystem_address = self.resolver.resolve_subsystem_address().await?;

        let (forward_rule, forward) = self
            .forward
            .reconcile(request.listen_port, subsystem_address, request.connect_port)
            .await?;

        let firewall = self
            .firewall
            .ensure_rule(&request.rule_name, request.listen_port)
            .await?;

        let report = RunReport {
            host_address,
            subsystem_address,
            forward_rule,
            forward,
            firewall_rule_name: request.rule_name.clone(),
            firewall,
            access_url: request.access_url(host_address),
        };
        info!(url = %report.access_url, "Service exposed");
        Ok(report)
    }

    /// Read-only view of the rule tables; needs no elevation.
    pub async fn status(&self, listen_port: u16, rule_name: &str) -> Result<StatusReport> {
        let forward_rules = self.forward.list().await?;
        let active_rule = forward_rules.iter().find(|r| r.binds(listen_port)).cloned();
        let firewall_rule = self.firewall.find(rule_name).await?;

        Ok(StatusReport {
            listen_port,
            forward_rules,
            active_rule,
            firewall_rule_name: rule_name.to_string(),
            firewall_rule,
        })
    }

    /// Remove the forward rule and, unless `keep_firewall`, the firewall rule.
    pub async fn teardown(
        &self,
        listen_port: u16,
        rule_name: &str,
        keep_firewall: bool,
    ) -> Result<TeardownReport> {
        self.guard.assert_elevated().await?;

        let forward_removed = self.forward.remove(listen_port).await?;
        let firewall_removed = if keep_firewall {
            None
        } else {
            Some(self.firewall.remove(rule_name).await?)
        };

        Ok(TeardownReport {
            listen_port,
            forward_removed,
            firewall_rule_name: rule_name.to_string(),
            firewall_removed,
        })
    }
}
