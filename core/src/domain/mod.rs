//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod address;
mod request;
mod route;
mod rules;

// Re-export all domain types
pub use address::{parse_subsystem_addresses, select_host_address, NetworkAddress};
pub use request::{
    render_rule_name, ExposeRequest, RunReport, StatusReport, TeardownReport, DEFAULT_ACCESS_PATH,
    DEFAULT_PORT, DEFAULT_RULE_NAME_TEMPLATE,
};
pub use route::{select_default_route, RouteEntry, DEFAULT_DESTINATION};
pub use rules::{
    Direction, FirewallOutcome, FirewallRule, ForwardOutcome, ForwardRule, RuleAction, RuleHost,
};
