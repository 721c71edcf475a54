//! Command gateway interface.
//!
//! The engine never talks to a host directly: every read goes through a
//! [`CommandGateway`], which the embedding application backs with its own
//! transport (an SSH channel, a multiplexed shell session). The gateway
//! provides no structure guarantees; raw text out, or a transport error.
//!
//! [`ShellGateway`] is the one implementation shipped here: it runs
//! commands through the local shell so the smoke binary and end-to-end
//! tests can exercise the whole pipeline without a remote host.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::TransportError;

/// Remote command execution, keyed by session.
///
/// Non-zero exit behavior is reported through stdout content; the engine
/// never depends on exit codes. Cancellation and timeouts inside the
/// transport must surface as errors here; the engine treats them exactly
/// like a failed command.
#[async_trait]
pub trait CommandGateway: Send + Sync {
    async fn execute(&self, session_id: &str, command: &str) -> Result<String, TransportError>;
}

/// Gateway backed by the local shell.
pub struct ShellGateway {
    shell: String,
}

impl ShellGateway {
    pub fn new() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }
}

impl Default for ShellGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandGateway for ShellGateway {
    async fn execute(&self, session_id: &str, command: &str) -> Result<String, TransportError> {
        debug!(session_id, command, "executing via local shell");
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|err| TransportError::CommandFailed(err.to_string()))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
