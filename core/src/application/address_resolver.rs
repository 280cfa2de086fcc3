//! Host and subsystem address resolution.

use tracing::{debug, info};

use crate::domain::{
    parse_subsystem_addresses, select_default_route, select_host_address, NetworkAddress,
};
use crate::error::{Error, Result};
use crate::ports::{RouteTablePort, SubsystemPort};

/// Resolves the two addresses a run needs.
///
/// Both lookups hit the OS every time; the subsystem address in particular
/// changes whenever the subsystem restarts.
pub struct AddressResolver<R: RouteTablePort, S: SubsystemPort> {
    routes: R,
    subsystem: S,
}

impl<R: RouteTablePort, S: SubsystemPort> AddressResolver<R, S> {
    pub fn new(routes: R, subsystem: S) -> Self {
        Self { routes, subsystem }
    }

    /// The host's outward-facing IPv4 address.
    ///
    /// Takes the lowest-metric default route, then the first non-link-local
    /// IPv4 address bound to that route's interface.
    pub async fn resolve_host_address(&self) -> Result<NetworkAddress> {
        let routes = self.routes.routes().await?;
        let route = select_default_route(&routes).ok_or(Error::NoRoute)?;
        debug!(
            interface_index = route.interface_index,
            metric = route.metric,
            "Selected default route"
        );

        let candidates = self.routes.interface_addresses(route.interface_index).await?;
        let address = select_host_address(&candidates).ok_or(Error::NoAddress {
            interface_index: route.interface_index,
        })?;

        info!(%address, "Resolved host address");
        Ok(address)
    }

    /// The subsystem's current IPv4 address.
    pub async fn resolve_subsystem_address(&self) -> Result<NetworkAddress> {
        let output = self.subsystem.query_addresses().await?;
        let address = parse_subsystem_addresses(&output)?;
        info!(%address, "Resolved subsystem address");
        Ok(address)
    }
}
