//! Routing table entries and default-route selection.

use serde::{Deserialize, Serialize};

/// Destination prefix of the IPv4 default route.
pub const DEFAULT_DESTINATION: &str = "0.0.0.0/0";

/// One row of the IPv4 routing table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    /// Destination prefix in CIDR form (e.g. "0.0.0.0/0").
    pub destination_prefix: String,
    /// Route metric; lower wins.
    pub metric: u32,
    /// Index of the interface the route leaves through.
    pub interface_index: u32,
}

impl RouteEntry {
    pub fn new(destination_prefix: impl Into<String>, metric: u32, interface_index: u32) -> Self {
        Self {
            destination_prefix: destination_prefix.into(),
            metric,
            interface_index,
        }
    }

    /// Whether this route matches every destination.
    pub fn is_default(&self) -> bool {
        self.destination_prefix.trim() == DEFAULT_DESTINATION
    }
}

/// Pick the default route with the lowest metric.
///
/// Ties go to the lower interface index so the choice is stable across runs.
pub fn select_default_route(routes: &[RouteEntry]) -> Option<&RouteEntry> {
    routes
        .iter()
        .filter(|r| r.is_default())
        .min_by_key(|r| (r.metric, r.interface_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_lowest_metric_default_route() {
        let routes = vec![
            RouteEntry::new("10.0.0.0/8", 0, 3),
            RouteEntry::new("0.0.0.0/0", 35, 12),
            RouteEntry::new("0.0.0.0/0", 25, 7),
            RouteEntry::new("172.20.0.0/20", 5, 40),
        ];
        let best = select_default_route(&routes).unwrap();
        assert_eq!(best.interface_index, 7);
    }

    #[test]
    fn test_select_default_route_tie_breaks_on_index() {
        let routes = vec![
            RouteEntry::new("0.0.0.0/0", 10, 9),
            RouteEntry::new("0.0.0.0/0", 10, 4),
        ];
        assert_eq!(select_default_route(&routes).unwrap().interface_index, 4);
    }

    #[test]
    fn test_no_default_route() {
        let routes = vec![RouteEntry::new("192.168.1.0/24", 1, 2)];
        assert!(select_default_route(&routes).is_none());
        assert!(select_default_route(&[]).is_none());
    }
}
