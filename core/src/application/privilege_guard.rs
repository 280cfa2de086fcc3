//! Administrative privilege gate.

use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::PrivilegePort;

/// Refuses to proceed unless the process is elevated.
pub struct PrivilegeGuard<P: PrivilegePort> {
    privilege: P,
}

impl<P: PrivilegePort> PrivilegeGuard<P> {
    pub fn new(privilege: P) -> Self {
        Self { privilege }
    }

    /// Fail with `Error::PermissionDenied` when not elevated. No side effects.
    pub async fn assert_elevated(&self) -> Result<()> {
        if self.privilege.is_elevated().await? {
            debug!("Process is elevated");
            Ok(())
        } else {
            Err(Error::PermissionDenied(
                "administrator privileges are required to change port proxy and firewall rules"
                    .to_string(),
            ))
        }
    }
}
