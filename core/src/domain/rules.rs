//! Forwarding and firewall rule domain models.

use serde::{Deserialize, Serialize};

use super::NetworkAddress;

// ============================================================================
// RuleHost
// ============================================================================

/// One address column of a forward rule, as the rule table reports it.
///
/// Serialized as the plain text netsh shows: `*`, a dotted quad or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RuleHost {
    /// `*`: the rule was added without an address and listens on every interface.
    Any,
    /// An IPv4 literal.
    Address(NetworkAddress),
    /// A host name such as `localhost`.
    Name(String),
}

impl RuleHost {
    /// Classify a column from `netsh interface portproxy show`.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token == "*" {
            return RuleHost::Any;
        }
        match NetworkAddress::parse(token) {
            Some(address) => RuleHost::Address(address),
            None => RuleHost::Name(token.to_string()),
        }
    }

    /// True for `*` and `0.0.0.0`, both of which bind every host interface.
    pub fn is_wildcard(&self) -> bool {
        match self {
            RuleHost::Any => true,
            RuleHost::Address(address) => *address == NetworkAddress::UNSPECIFIED,
            RuleHost::Name(_) => false,
        }
    }
}

impl From<NetworkAddress> for RuleHost {
    fn from(address: NetworkAddress) -> Self {
        RuleHost::Address(address)
    }
}

impl From<String> for RuleHost {
    fn from(text: String) -> Self {
        RuleHost::parse(&text)
    }
}

impl From<RuleHost> for String {
    fn from(host: RuleHost) -> Self {
        host.to_string()
    }
}

impl std::fmt::Display for RuleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleHost::Any => write!(f, "*"),
            RuleHost::Address(address) => write!(f, "{}", address),
            RuleHost::Name(name) => write!(f, "{}", name),
        }
    }
}

// ============================================================================
// ForwardRule
// ============================================================================

/// An address-translation entry: traffic on `listen_address:listen_port`
/// is redirected to `connect_address:connect_port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRule {
    pub listen_address: RuleHost,
    pub listen_port: u16,
    pub connect_address: RuleHost,
    pub connect_port: u16,
}

impl ForwardRule {
    /// A rule listening on every host interface (`0.0.0.0`).
    pub fn new(listen_port: u16, connect_address: NetworkAddress, connect_port: u16) -> Self {
        Self {
            listen_address: RuleHost::Address(NetworkAddress::UNSPECIFIED),
            listen_port,
            connect_address: RuleHost::Address(connect_address),
            connect_port,
        }
    }

    /// Whether this rule listens on every interface at `listen_port`,
    /// either as `0.0.0.0` or as netsh's `*`.
    pub fn binds(&self, listen_port: u16) -> bool {
        self.listen_port == listen_port && self.listen_address.is_wildcard()
    }
}

impl std::fmt::Display for ForwardRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.listen_address, self.listen_port, self.connect_address, self.connect_port
        )
    }
}

/// What `reconcile` did to the forward rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum ForwardOutcome {
    /// No rule existed for the port; a fresh one was added.
    Created,
    /// A prior rule for the port was deleted and replaced.
    Replaced { previous: ForwardRule },
}

impl ForwardOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ForwardOutcome::Created => "created",
            ForwardOutcome::Replaced { .. } => "replaced",
        }
    }
}

// ============================================================================
// FirewallRule
// ============================================================================

/// Traffic direction a firewall rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "Inbound",
            Direction::Outbound => "Outbound",
        }
    }
}

/// What a firewall rule does with matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleAction {
    Allow,
    Block,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Allow => "Allow",
            RuleAction::Block => "Block",
        }
    }
}

/// A packet-filtering rule, keyed by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    /// Unique key in the firewall rule store.
    pub display_name: String,
    pub direction: Direction,
    pub action: RuleAction,
    /// Protocol name as the firewall reports it (e.g. "TCP").
    pub protocol: String,
    /// Local port, when the rule is scoped to a single port.
    pub local_port: Option<u16>,
    /// Whether the rule also applies to edge-traversal (NAT-traversal) traffic.
    pub edge_traversal: bool,
    /// Network profile scope (e.g. "Any").
    pub profile: String,
}

impl FirewallRule {
    /// Inbound-allow TCP rule for one local port, all profiles, no edge traversal.
    pub fn inbound_tcp(display_name: impl Into<String>, local_port: u16) -> Self {
        Self {
            display_name: display_name.into(),
            direction: Direction::Inbound,
            action: RuleAction::Allow,
            protocol: "TCP".to_string(),
            local_port: Some(local_port),
            edge_traversal: false,
            profile: "Any".to_string(),
        }
    }

    /// Whether this rule admits inbound TCP on `port`.
    pub fn admits(&self, port: u16) -> bool {
        self.direction == Direction::Inbound
            && self.action == RuleAction::Allow
            && self.protocol.eq_ignore_ascii_case("TCP")
            && self.local_port.map_or(true, |p| p == port)
    }
}

/// What `ensure_rule` did to the firewall rule store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirewallOutcome {
    /// No rule with the display name existed; one was created.
    Created,
    /// A rule with the display name already existed and was left alone.
    Reused,
}

impl FirewallOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FirewallOutcome::Created => "created",
            FirewallOutcome::Reused => "reused",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> NetworkAddress {
        NetworkAddress::parse(s).unwrap()
    }

    #[test]
    fn test_forward_rule_display() {
        let rule = ForwardRule::new(8000, addr("172.20.3.4"), 8000);
        assert_eq!(rule.to_string(), "0.0.0.0:8000 -> 172.20.3.4:8000");
        assert!(rule.binds(8000));
        assert!(!rule.binds(8080));
    }

    #[test]
    fn test_forward_rule_on_specific_listen_address_does_not_bind() {
        let mut rule = ForwardRule::new(8000, addr("172.20.3.4"), 8000);
        rule.listen_address = addr("127.0.0.1").into();
        assert!(!rule.binds(8000));
    }

    #[test]
    fn test_wildcard_listen_address_binds() {
        let mut rule = ForwardRule::new(8000, addr("172.20.0.9"), 8000);
        rule.listen_address = RuleHost::Any;
        assert!(rule.binds(8000));
        assert_eq!(rule.to_string(), "*:8000 -> 172.20.0.9:8000");
    }

    #[test]
    fn test_rule_host_parse() {
        assert_eq!(RuleHost::parse("*"), RuleHost::Any);
        assert_eq!(RuleHost::parse("10.0.0.1"), RuleHost::Address(addr("10.0.0.1")));
        assert_eq!(RuleHost::parse("localhost"), RuleHost::Name("localhost".to_string()));
        assert!(RuleHost::parse("0.0.0.0").is_wildcard());
        assert!(!RuleHost::parse("localhost").is_wildcard());
    }

    #[test]
    fn test_rule_host_serializes_as_text() {
        assert_eq!(serde_json::to_value(RuleHost::Any).unwrap(), "*");
        let host: RuleHost = serde_json::from_str("\"localhost\"").unwrap();
        assert_eq!(host, RuleHost::Name("localhost".to_string()));
    }

    #[test]
    fn test_inbound_tcp_rule() {
        let rule = FirewallRule::inbound_tcp("WSL FastAPI 8000", 8000);
        assert_eq!(rule.direction, Direction::Inbound);
        assert_eq!(rule.action, RuleAction::Allow);
        assert!(!rule.edge_traversal);
        assert_eq!(rule.profile, "Any");
        assert!(rule.admits(8000));
        assert!(!rule.admits(9000));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ForwardOutcome::Replaced {
            previous: ForwardRule::new(8000, addr("172.20.0.9"), 8000),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["action"], "replaced");
        assert_eq!(json["previous"]["connectAddress"], "172.20.0.9");
        assert_eq!(
            serde_json::to_value(FirewallOutcome::Reused).unwrap(),
            "reused"
        );
    }
}
