//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the operating system. Implementations live in `adapters`;
//! tests substitute in-memory fakes.

mod firewall;
mod forward;
mod privilege;
mod routes;
mod subsystem;

pub use firewall::FirewallRuleStore;
pub use forward::ForwardRuleStore;
pub use privilege::PrivilegePort;
pub use routes::RouteTablePort;
pub use subsystem::SubsystemPort;
