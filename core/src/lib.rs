//! wsl-expose Core Library
//!
//! Exposes a service running inside a WSL distribution on the host's
//! physical network. Each run:
//! - Checks for administrative privilege
//! - Resolves the host's outward IPv4 address and the distribution's current one
//! - Replaces the port proxy rule for the listen port with one pointing at
//!   the fresh address
//! - Creates the inbound firewall rule once, reusing it afterwards
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! The adapters drive `netsh.exe`, `powershell.exe` and `wsl.exe`, so they
//! work on Windows and from inside WSL through interop. Nothing is persisted;
//! the OS rule tables are queried fresh on every run.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

use std::time::Duration;

use adapters::{
    NetshPortProxy, PowerShellFirewall, PowerShellRouteTable, SystemPrivilege, WslSubsystem,
};

// Re-export domain types (primary API)
pub use domain::{
    ExposeRequest, FirewallOutcome, FirewallRule, ForwardOutcome, ForwardRule, NetworkAddress,
    RouteEntry, RuleHost, RunReport, StatusReport, TeardownReport,
};

// Re-export other commonly used types
pub use application::Orchestrator;
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};

/// Orchestrator wired to the real OS adapters.
pub type SystemOrchestrator = Orchestrator<
    SystemPrivilege,
    PowerShellRouteTable,
    WslSubsystem,
    NetshPortProxy,
    PowerShellFirewall,
>;

/// Build an orchestrator against the live system.
pub fn system_orchestrator(distro: Option<String>, query_timeout: Duration) -> SystemOrchestrator {
    Orchestrator::new(
        SystemPrivilege::new(),
        PowerShellRouteTable::new(),
        WslSubsystem::new()
            .with_distro(distro)
            .with_timeout(query_timeout),
        NetshPortProxy::new(),
        PowerShellFirewall::new(),
    )
}
