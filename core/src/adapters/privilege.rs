//! Platform privilege check.
//!
//! - Windows: membership in the built-in Administrators role (via PowerShell)
//! - Unix: effective UID 0

use crate::error::Result;
use crate::ports::PrivilegePort;

/// Privilege check for the current platform.
#[derive(Debug, Default)]
pub struct SystemPrivilege;

impl SystemPrivilege {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl PrivilegePort for SystemPrivilege {
    async fn is_elevated(&self) -> Result<bool> {
        use crate::error::Error;

        const SCRIPT: &str = "([Security.Principal.WindowsPrincipal] \
             [Security.Principal.WindowsIdentity]::GetCurrent()).IsInRole(\
             [Security.Principal.WindowsBuiltInRole]::Administrator)";

        let output = super::command::powershell(SCRIPT).await?;
        if !output.success {
            return Err(Error::CommandFailed(format!(
                "administrator role check failed: {}",
                output.stderr.trim()
            )));
        }

        let elevated = output.stdout.trim().eq_ignore_ascii_case("true");
        tracing::debug!(elevated, "Checked Administrators role");
        Ok(elevated)
    }
}

#[cfg(unix)]
impl PrivilegePort for SystemPrivilege {
    async fn is_elevated(&self) -> Result<bool> {
        let elevated = nix::unistd::geteuid().is_root();
        tracing::debug!(elevated, "Checked effective UID");
        Ok(elevated)
    }
}

#[cfg(not(any(windows, unix)))]
impl PrivilegePort for SystemPrivilege {
    async fn is_elevated(&self) -> Result<bool> {
        Ok(false)
    }
}
