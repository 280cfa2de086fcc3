//! Privilege check port (interface).

use crate::error::Result;

/// Port for checking whether the process may mutate network configuration.
///
/// On Windows this is membership in the built-in Administrators role;
/// on Unix it is an effective UID of 0.
pub trait PrivilegePort: Send + Sync {
    /// Whether the current process holds administrative privilege.
    fn is_elevated(&self) -> impl std::future::Future<Output = Result<bool>> + Send;
}
