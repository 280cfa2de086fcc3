//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter drives an OS tool (`netsh.exe`, `powershell.exe`, `wsl.exe`)
//! and parses its output.

pub mod command;
pub mod firewall;
pub mod portproxy;
pub mod privilege;
pub mod routes;
pub mod subsystem;

// Re-export main types for convenience
pub use firewall::PowerShellFirewall;
pub use portproxy::NetshPortProxy;
pub use privilege::SystemPrivilege;
pub use routes::PowerShellRouteTable;
pub use subsystem::{WslSubsystem, DEFAULT_QUERY_TIMEOUT};
