//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod address_resolver;
mod firewall_manager;
mod forward_manager;
mod orchestrator;
mod privilege_guard;

#[cfg(test)]
pub(crate) mod fakes;

pub use address_resolver::AddressResolver;
pub use firewall_manager::FirewallRuleManager;
pub use forward_manager::ForwardRuleManager;
pub use orchestrator::Orchestrator;
pub use privilege_guard::PrivilegeGuard;
