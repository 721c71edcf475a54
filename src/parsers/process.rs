//! Process domain parser for the CPU-sorted `ps` table and the
//! per-process thread listing.

use crate::snapshot::{ProcessInfo, ProcessStatus};

use super::clean_lines;
use super::schema::PS_SCHEMA;

/// Maps the first letter of a `ps` STAT code onto the closed status set.
/// Unknown codes read as `Sleeping`; the most common state and the safe
/// default for a tool that emits vendor-specific letters.
pub fn classify_status(stat: &str) -> ProcessStatus {
    match stat.chars().next() {
        Some('R') => ProcessStatus::Running,
        Some('S') => ProcessStatus::Sleeping,
        Some('D') => ProcessStatus::Uninterruptible,
        Some('Z') => ProcessStatus::Zombie,
        Some('T') | Some('t') => ProcessStatus::Stopped,
        Some('I') => ProcessStatus::Idle,
        _ => ProcessStatus::Sleeping,
    }
}

/// Parses the `ps aux --sort=-pcpu` table. Rows that do not tokenize
/// against the schema (truncated lines, the header) are skipped; order is
/// preserved as reported, CPU descending.
pub fn parse_process_table(raw: &str) -> Vec<ProcessInfo> {
    let mut processes = Vec::new();

    for line in clean_lines(raw) {
        let Some(row) = PS_SCHEMA.parse_line(line) else {
            continue;
        };
        if row.get("user") == Some("USER") {
            continue;
        }
        let Some(pid) = row.get("pid").and_then(|token| token.parse().ok()) else {
            continue;
        };

        processes.push(ProcessInfo {
            user: row.get("user").unwrap_or_default().to_string(),
            pid,
            cpu_percent: row.f64_field("cpu"),
            mem_percent: row.f64_field("mem"),
            vsz_kb: row.u64_field("vsz"),
            rss_kb: row.u64_field("rss"),
            tty: row.get("tty").unwrap_or_default().to_string(),
            status: classify_status(row.get("stat").unwrap_or_default()),
            started: row.get("start").unwrap_or_default().to_string(),
            cpu_time: row.get("time").unwrap_or_default().to_string(),
            command: row.rest_from("command"),
            threads: None,
        });
    }

    processes
}

/// Counts the thread ids in a `/proc/<pid>/task` listing. An empty
/// listing (process already gone, permission denied) yields `None`; the
/// caller keeps the row without a thread count.
pub fn parse_thread_count(raw: &str) -> Option<u32> {
    let count = clean_lines(raw)
        .flat_map(str::split_whitespace)
        .filter(|token| token.chars().all(|c| c.is_ascii_digit()))
        .count();
    if count == 0 {
        None
    } else {
        Some(count as u32)
    }
}
