//! Routing table adapter backed by the NetTCPIP PowerShell cmdlets.
//!
//! Uses:
//! - `Get-NetRoute -AddressFamily IPv4` for the route table
//! - `Get-NetIPAddress -AddressFamily IPv4 -InterfaceIndex N` for bound addresses

use std::net::Ipv4Addr;

use serde::Deserialize;
use tracing::debug;

use crate::domain::RouteEntry;
use crate::error::{Error, Result};
use crate::ports::RouteTablePort;

use super::command::{parse_json_records, powershell};

const ROUTES_SCRIPT: &str = "Get-NetRoute -AddressFamily IPv4 -ErrorAction SilentlyContinue | \
     ForEach-Object { [pscustomobject]@{ DestinationPrefix = $_.DestinationPrefix; \
     RouteMetric = [int]$_.RouteMetric; InterfaceIndex = [int]$_.ifIndex } } | \
     ConvertTo-Json -Compress";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RouteRecord {
    destination_prefix: String,
    route_metric: u32,
    interface_index: u32,
}

#[derive(Debug, Deserialize)]
struct AddressRecord {
    #[serde(rename = "IPAddress")]
    ip_address: String,
}

/// Route table reader using PowerShell.
#[derive(Debug, Default)]
pub struct PowerShellRouteTable;

impl PowerShellRouteTable {
    pub fn new() -> Self {
        Self
    }

    fn parse_routes(json: &str) -> Result<Vec<RouteEntry>> {
        let records: Vec<RouteRecord> = parse_json_records(json)?;
        Ok(records
            .into_iter()
            .map(|r| RouteEntry::new(r.destination_prefix, r.route_metric, r.interface_index))
            .collect())
    }

    /// Addresses that are not valid IPv4 are dropped rather than failing the query.
    fn parse_addresses(json: &str) -> Result<Vec<Ipv4Addr>> {
        let records: Vec<AddressRecord> = parse_json_records(json)?;
        Ok(records
            .iter()
            .filter_map(|r| r.ip_address.trim().parse().ok())
            .collect())
    }
}

impl RouteTablePort for PowerShellRouteTable {
    async fn routes(&self) -> Result<Vec<RouteEntry>> {
        let output = powershell(ROUTES_SCRIPT).await?;
        if !output.success {
            return Err(Error::CommandFailed(format!(
                "Get-NetRoute failed: {}",
                output.stderr.trim()
            )));
        }

        let routes = Self::parse_routes(&output.stdout)?;
        debug!(count = routes.len(), "Read IPv4 routes");
        Ok(routes)
    }

    async fn interface_addresses(&self, interface_index: u32) -> Result<Vec<Ipv4Addr>> {
        let script = format!(
            "Get-NetIPAddress -AddressFamily IPv4 -InterfaceIndex {} -ErrorAction SilentlyContinue | \
             ForEach-Object {{ [pscustomobject]@{{ IPAddress = $_.IPAddress }} }} | \
             ConvertTo-Json -Compress",
            interface_index
        );
        let output = powershell(&script).await?;
        if !output.success {
            return Err(Error::CommandFailed(format!(
                "Get-NetIPAddress failed for interface {}: {}",
                interface_index,
                output.stderr.trim()
            )));
        }

        let addresses = Self::parse_addresses(&output.stdout)?;
        debug!(interface_index, ?addresses, "Read interface addresses");
        Ok(addresses)
    }
}
