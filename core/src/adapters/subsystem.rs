//! WSL subsystem address query via `wsl.exe -- hostname -I`.

use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::parse_subsystem_addresses;
use crate::error::{Error, Result};
use crate::ports::SubsystemPort;

use super::command::{run_with_timeout, CommandOutput};

/// WSL launcher executable.
const WSL: &str = "wsl.exe";

/// Default limit on how long the subsystem may take to answer.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Asks a WSL distribution for its current addresses.
///
/// Every call starts a new `wsl.exe` process; nothing is cached.
#[derive(Debug, Clone)]
pub struct WslSubsystem {
    /// Target distribution; `None` means the default distribution.
    distro: Option<String>,
    timeout: Duration,
}

impl WslSubsystem {
    pub fn new() -> Self {
        Self {
            distro: None,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_distro(mut self, distro: Option<String>) -> Self {
        self.distro = distro.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn args(&self) -> Vec<&str> {
        let mut args = Vec::new();
        if let Some(distro) = &self.distro {
            args.extend(["-d", distro.as_str()]);
        }
        args.extend(["--", "hostname", "-I"]);
        args
    }
}

impl Default for WslSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SubsystemPort for WslSubsystem {
    async fn query_addresses(&self) -> Result<String> {
        let args = self.args();
        let output = run_with_timeout(WSL, &args, self.timeout)
            .await
            .map_err(|e| Error::SubsystemUnreachable(e.to_string()))?
            .ok_or_else(|| {
                Error::SubsystemUnreachable(format!(
                    "no answer from {} within {}s",
                    WSL,
                    self.timeout.as_secs()
                ))
            })?;

        Self::interpret(output)
    }
}

impl WslSubsystem {
    /// Turn a finished `wsl.exe` run into the address text.
    ///
    /// `wsl.exe` prints its own failures (unknown distribution, service not
    /// running) on stdout with a non-zero exit, so a failed run only counts
    /// as an answer when its stdout holds a dotted quad.
    fn interpret(output: CommandOutput) -> Result<String> {
        if !output.success && parse_subsystem_addresses(&output.stdout).is_err() {
            let reason = output.combined();
            let reason = reason.trim();
            warn!(code = ?output.code, reason, "Subsystem address query failed");
            return Err(Error::SubsystemUnreachable(if reason.is_empty() {
                format!("{} exited with {:?} and no output", WSL, output.code)
            } else {
                reason.to_string()
            }));
        }

        debug!(stdout = output.stdout.trim(), "Subsystem reported addresses");
        Ok(output.stdout)
    }
}
