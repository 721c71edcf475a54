//! Process domain collector.

use ahash::AHashMap as HashMap;
use futures_util::future::join_all;
use tracing::debug;

use crate::commands;
use crate::error::TransportError;
use crate::parsers::process as parser;
use crate::snapshot::ProcessDetail;

use super::Ctx;

/// Fetches the CPU-sorted process table, then fans out one thread-listing
/// command per top process. A listing that fails or comes back empty just
/// leaves that row without a thread count.
pub(crate) async fn collect_detail(ctx: &Ctx<'_>) -> Result<ProcessDetail, TransportError> {
    let raw = ctx.run(commands::PROCESS_TABLE).await?;
    let mut processes = parser::parse_process_table(&raw);
    processes.truncate(ctx.config.max_processes);

    let top_pids: Vec<u32> = processes
        .iter()
        .take(ctx.config.thread_count_top_n)
        .map(|process| process.pid)
        .collect();

    let listings = join_all(top_pids.into_iter().map(|pid| async move {
        let result = ctx.run(&commands::thread_listing(pid)).await;
        (pid, result)
    }))
    .await;

    let mut thread_counts: HashMap<u32, u32> = HashMap::new();
    for (pid, result) in listings {
        match result {
            Ok(raw) => {
                if let Some(count) = parser::parse_thread_count(&raw) {
                    thread_counts.insert(pid, count);
                }
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                debug!(pid, error = %err, "thread listing failed");
            }
        }
    }

    for process in &mut processes {
        process.threads = thread_counts.get(&process.pid).copied();
    }

    Ok(ProcessDetail {
        processes,
        updated_at_ms: None,
    })
}
