//! IPv4 address domain model and host/subsystem address selection.

use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Four 1-3 digit decimal groups separated by dots, nothing else.
fn dotted_quad() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$").expect("valid dotted-quad regex")
    })
}

// ============================================================================
// NetworkAddress
// ============================================================================

/// An IPv4 address in strict dotted-quad form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkAddress(Ipv4Addr);

impl NetworkAddress {
    /// The wildcard listen address, `0.0.0.0`.
    pub const UNSPECIFIED: NetworkAddress = NetworkAddress(Ipv4Addr::UNSPECIFIED);

    /// Parse a token, accepting only a strict dotted quad with every octet <= 255.
    pub fn parse(token: &str) -> Option<Self> {
        let caps = dotted_quad().captures(token)?;
        let mut octets = [0u8; 4];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = caps[i + 1].parse().ok()?;
        }
        Some(Self(Ipv4Addr::from(octets)))
    }

    /// The underlying address.
    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }

    /// True for 169.254.0.0/16.
    pub fn is_link_local(&self) -> bool {
        self.0.is_link_local()
    }

    /// Whether this address may be advertised as the host's outward address.
    pub fn is_host_candidate(&self) -> bool {
        !self.0.is_link_local() && !self.0.is_loopback() && !self.0.is_unspecified()
    }
}

impl From<Ipv4Addr> for NetworkAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl FromStr for NetworkAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s.trim())
            .ok_or_else(|| Error::AddressParse(format!("'{}' is not a dotted-quad IPv4 address", s)))
    }
}

impl std::fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Pick the first address in OS order that is usable as the host address.
///
/// Link-local (169.254.x.x), loopback and unspecified addresses are skipped.
pub fn select_host_address(candidates: &[Ipv4Addr]) -> Option<NetworkAddress> {
    candidates
        .iter()
        .map(|ip| NetworkAddress::from(*ip))
        .find(NetworkAddress::is_host_candidate)
}

/// Extract the subsystem address from the text reported by the subsystem.
///
/// The text is treated as a whitespace-separated token list; the first
/// dotted-quad token wins. IPv6 tokens and anything else are skipped.
pub fn parse_subsystem_addresses(output: &str) -> Result<NetworkAddress> {
    output
        .split_whitespace()
        .find_map(NetworkAddress::parse)
        .ok_or_else(|| {
            let shown = output.trim();
            if shown.is_empty() {
                Error::AddressParse("subsystem reported no addresses".to_string())
            } else {
                Error::AddressParse(format!("no IPv4 address in '{}'", shown))
            }
        })
}
