//! Subsystem address query port (interface).

use crate::error::Result;

/// Port for asking the subsystem which addresses it currently holds.
///
/// The answer crosses into a different execution environment and may change
/// between calls; implementations must not cache it.
pub trait SubsystemPort: Send + Sync {
    /// Raw address report, as text (whitespace-separated tokens).
    ///
    /// Fails with `Error::SubsystemUnreachable` when the subsystem could not
    /// be asked at all.
    fn query_addresses(&self) -> impl std::future::Future<Output = Result<String>> + Send;
}
