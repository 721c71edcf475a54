//! Domain collectors.
//!
//! Each collector issues the commands its domain needs (concurrently when
//! independent, sequentially when one output is required to interpret
//! another), hands the raw text to the matching parser, routes counter
//! rows through the session's rate table, and assembles the typed
//! snapshot. Transport failures propagate out of the collector and are
//! converted to cached/default values at the aggregator boundary.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod process;

use crate::config::EngineConfig;
use crate::error::TransportError;
use crate::gateway::CommandGateway;
use crate::session::SessionState;

/// Everything a collector needs for one collection cycle.
pub(crate) struct Ctx<'a> {
    pub gateway: &'a dyn CommandGateway,
    pub session_id: &'a str,
    pub state: &'a SessionState,
    pub config: &'a EngineConfig,
}

impl Ctx<'_> {
    pub async fn run(&self, command: &str) -> Result<String, TransportError> {
        self.gateway.execute(self.session_id, command).await
    }
}

/// Wall-clock sample timestamp in milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
