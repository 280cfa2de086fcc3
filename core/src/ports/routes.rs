//! Routing table port (interface).

use std::net::Ipv4Addr;

use crate::domain::RouteEntry;
use crate::error::Result;

/// Port for reading the host's IPv4 routing table.
pub trait RouteTablePort: Send + Sync {
    /// All IPv4 routes as (destination prefix, metric, interface index).
    fn routes(&self) -> impl std::future::Future<Output = Result<Vec<RouteEntry>>> + Send;

    /// IPv4 addresses bound to an interface, in the order the OS reports them.
    fn interface_addresses(
        &self,
        interface_index: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Ipv4Addr>>> + Send;
}
