//! Memory domain collector. One command, no counter state.

use tracing::debug;

use crate::commands;
use crate::error::TransportError;
use crate::parsers::memory as parser;
use crate::snapshot::MemoryInfo;

use super::Ctx;

pub(crate) async fn collect_basic(ctx: &Ctx<'_>) -> Result<MemoryInfo, TransportError> {
    let raw = ctx.run(commands::MEMORY_INFO).await?;
    // unparseable output degrades to empty counters, never an error
    Ok(parser::parse_meminfo(&raw).unwrap_or_else(|err| {
        debug!(session_id = ctx.session_id, error = %err, "memory output unparseable");
        MemoryInfo::default()
    }))
}
