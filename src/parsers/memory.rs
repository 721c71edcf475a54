//! Memory domain parser for the named `/proc/meminfo` counters.

use crate::error::ParseError;
use crate::snapshot::MemoryInfo;

use super::clean_lines;

/// Parses the fixed set of named counters. Values are reported in kB by
/// the kernel and converted to bytes here. The swap block is optional;
/// hosts without swap report zeros.
///
/// `used` is derived from `MemAvailable` when present (the kernel's own
/// estimate), else from `total - free - cached - buffers`, and is clamped
/// so `used <= total` always holds. The remaining counters overlap in
/// kernel accounting and are never reconciled against each other.
///
/// Output with no recognizable `MemTotal` counter is a parse error; the
/// collector decides the fallback.
pub fn parse_meminfo(raw: &str) -> Result<MemoryInfo, ParseError> {
    let mut info = MemoryInfo::default();
    let mut available: Option<u64> = None;

    for line in clean_lines(raw) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let kb: u64 = value
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
            .unwrap_or(0);
        let bytes = kb * 1024;

        match name.trim() {
            "MemTotal" => info.total_bytes = bytes,
            "MemFree" => info.free_bytes = bytes,
            "MemAvailable" => available = Some(bytes),
            "Cached" => info.cached_bytes = bytes,
            "Buffers" => info.buffers_bytes = bytes,
            "SwapTotal" => info.swap_total_bytes = bytes,
            "SwapFree" => {
                info.swap_used_bytes = info.swap_total_bytes.saturating_sub(bytes);
            }
            _ => {}
        }
    }

    if info.total_bytes == 0 {
        return Err(ParseError::new("memory", "no MemTotal counter in output"));
    }

    info.available_bytes = available.unwrap_or(
        info.free_bytes + info.cached_bytes + info.buffers_bytes,
    );
    info.used_bytes = info
        .total_bytes
        .saturating_sub(info.available_bytes)
        .min(info.total_bytes);

    Ok(info)
}
