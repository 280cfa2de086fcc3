//! Inputs and reports for a single exposure run.

use serde::{Deserialize, Serialize};

use super::{FirewallOutcome, FirewallRule, ForwardOutcome, ForwardRule, NetworkAddress};
use crate::error::{Error, Result};

/// Default listen/connect port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default firewall display name template; `{port}` is substituted.
pub const DEFAULT_RULE_NAME_TEMPLATE: &str = "WSL FastAPI {port}";

/// Default path appended to the access URL.
pub const DEFAULT_ACCESS_PATH: &str = "/docs";

/// Render a firewall display name from a template.
pub fn render_rule_name(template: &str, port: u16) -> String {
    template.replace("{port}", &port.to_string())
}

// ============================================================================
// ExposeRequest
// ============================================================================

/// What the operator asked to expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposeRequest {
    /// Host-visible port.
    pub listen_port: u16,
    /// Port the service listens on inside the subsystem.
    pub connect_port: u16,
    /// Firewall rule display name.
    pub rule_name: String,
    /// Path appended to the access URL in the report.
    pub access_path: String,
}

impl ExposeRequest {
    /// Same port on both sides, default rule name.
    pub fn new(port: u16) -> Self {
        Self {
            listen_port: port,
            connect_port: port,
            rule_name: render_rule_name(DEFAULT_RULE_NAME_TEMPLATE, port),
            access_path: DEFAULT_ACCESS_PATH.to_string(),
        }
    }

    pub fn with_connect_port(mut self, port: u16) -> Self {
        self.connect_port = port;
        self
    }

    pub fn with_rule_name(mut self, name: impl Into<String>) -> Self {
        self.rule_name = name.into();
        self
    }

    pub fn with_access_path(mut self, path: impl Into<String>) -> Self {
        self.access_path = path.into();
        self
    }

    /// Reject values no OS rule store would accept.
    pub fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            return Err(Error::InvalidInput("listen port must be non-zero".to_string()));
        }
        if self.connect_port == 0 {
            return Err(Error::InvalidInput("connect port must be non-zero".to_string()));
        }
        if self.rule_name.trim().is_empty() {
            return Err(Error::InvalidInput("firewall rule name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Browser URL for the exposed service on `host`.
    pub fn access_url(&self, host: NetworkAddress) -> String {
        let path = if self.access_path.is_empty() || self.access_path.starts_with('/') {
            self.access_path.clone()
        } else {
            format!("/{}", self.access_path)
        };
        format!("http://{}:{}{}", host, self.listen_port, path)
    }
}

impl Default for ExposeRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Final state after a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub host_address: NetworkAddress,
    pub subsystem_address: NetworkAddress,
    pub forward_rule: ForwardRule,
    pub forward: ForwardOutcome,
    pub firewall_rule_name: String,
    pub firewall: FirewallOutcome,
    pub access_url: String,
}

/// Read-only snapshot of the rule tables for one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub listen_port: u16,
    /// Every forward rule the store knows about.
    pub forward_rules: Vec<ForwardRule>,
    /// The rule bound to `0.0.0.0:listen_port`, if any.
    pub active_rule: Option<ForwardRule>,
    pub firewall_rule_name: String,
    pub firewall_rule: Option<FirewallRule>,
}

/// What a teardown removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownReport {
    pub listen_port: u16,
    pub forward_removed: bool,
    pub firewall_rule_name: String,
    /// `None` when the firewall rule was deliberately kept.
    pub firewall_removed: Option<bool>,
}
