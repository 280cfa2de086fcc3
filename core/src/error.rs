//! Error types for the wsl-expose-core library.

use thiserror::Error;

/// Result type alias for wsl-expose operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling forwarding and firewall state.
#[derive(Error, Debug)]
pub enum Error {
    /// The current process does not hold administrative privilege.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No default (0.0.0.0/0) route exists in the routing table.
    #[error("No default route found in the routing table")]
    NoRoute,

    /// The default route's interface has no usable IPv4 address.
    #[error("No usable IPv4 address bound to interface {interface_index}")]
    NoAddress { interface_index: u32 },

    /// The subsystem did not answer the address query.
    #[error("Subsystem unreachable: {0}")]
    SubsystemUnreachable(String),

    /// The subsystem answered, but nothing in the answer was an IPv4 address.
    #[error("Failed to parse subsystem address: {0}")]
    AddressParse(String),

    /// A rule-table delete, add or create call failed.
    #[error("Rule mutation failed: {0}")]
    RuleMutation(String),

    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// A caller-supplied value was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Process exit code for this failure category.
    ///
    /// - `3`: host network misconfigured (no route / no address)
    /// - `4`: subsystem query failed or returned garbage
    /// - `5`: rule-table mutation failed
    /// - `6`: not elevated
    /// - `1`: anything else
    ///
    /// `2` is left to clap for command-line usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::PermissionDenied(_) => 6,
            Error::NoRoute | Error::NoAddress { .. } => 3,
            Error::SubsystemUnreachable(_) | Error::AddressParse(_) => 4,
            Error::RuleMutation(_) => 5,
            _ => 1,
        }
    }

    /// Hint shown to the operator under the error line, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::PermissionDenied(_) => Some("re-run from an elevated (Administrator) shell"),
            Error::NoRoute | Error::NoAddress { .. } => {
                Some("check that the host is connected to a network")
            }
            Error::SubsystemUnreachable(_) | Error::AddressParse(_) => {
                Some("make sure the WSL distribution is running (try `wsl hostname -I`)")
            }
            _ => None,
        }
    }
}
