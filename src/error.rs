//! Error taxonomy for the metrics engine.
//!
//! Only transport-level session loss ever crosses the engine boundary as
//! an error. Parse failures are recovered inside the parsers (empty rows),
//! missing tools become an explicit flag on the snapshot, and identity
//! resolution failures keep the row with an `Unknown` classification.

use thiserror::Error;

/// Failure reported by the command gateway.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The session is gone. Fatal for all collections on this session.
    #[error("session disconnected")]
    Disconnected,

    /// The gateway could not run this one command. Treated as a failed
    /// collection for the affected section only; not retried here.
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// Cancellation and timeouts are indistinguishable from failure at
    /// this layer.
    #[error("command timed out after {0} ms")]
    Timeout(u64),
}

impl TransportError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Disconnected)
    }
}

/// Raw text did not match the expected shape. Never propagated to the
/// engine caller; the owning collector substitutes empty/default rows.
#[derive(Debug, Clone, Error)]
#[error("{domain}: {reason}")]
pub struct ParseError {
    pub domain: &'static str,
    pub reason: String,
}

impl ParseError {
    pub fn new(domain: &'static str, reason: impl Into<String>) -> Self {
        Self {
            domain,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the public engine API.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_disconnect_is_fatal() {
        assert!(TransportError::Disconnected.is_fatal());
        assert!(!TransportError::CommandFailed("exit 127".into()).is_fatal());
        assert!(!TransportError::Timeout(5000).is_fatal());
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("disk", "usage table header not found");
        assert_eq!(err.to_string(), "disk: usage table header not found");
    }
}
