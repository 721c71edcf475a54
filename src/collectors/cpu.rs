//! CPU domain collector.

use tracing::debug;

use crate::commands;
use crate::error::TransportError;
use crate::parsers::cpu as parser;
use crate::snapshot::{CpuBasic, CpuDetail};

use super::Ctx;

/// One combined round trip for the always-on tier. Usage is derived from
/// the delta against the session's previous counter sample; the first
/// sample of a session reports 0.
pub(crate) async fn collect_basic(ctx: &Ctx<'_>) -> Result<CpuBasic, TransportError> {
    let raw = ctx.run(commands::CPU_BASIC).await?;
    let rows = parser::parse_basic(&raw);

    let usage_percent = match rows.counters {
        Some(current) => {
            let mut previous = ctx
                .state
                .previous_cpu
                .lock()
                .expect("previous_cpu lock poisoned");
            let usage = previous
                .map(|sample| current.usage_since(&sample))
                .unwrap_or(0.0);
            *previous = Some(current);
            usage
        }
        // malformed counters: keep the old baseline, report no usage
        None => {
            debug!(session_id = ctx.session_id, "cpu counters missing from output");
            0.0
        }
    };

    Ok(CpuBasic {
        usage_percent,
        load_one: rows.load_one,
        load_five: rows.load_five,
        load_fifteen: rows.load_fifteen,
        cores: rows.cores,
        uptime_seconds: rows.uptime_seconds,
        hostname: rows.hostname,
    })
}

/// Frequencies and temperatures for the detail tier. Both reads are
/// independent and run concurrently.
pub(crate) async fn collect_detail(ctx: &Ctx<'_>) -> Result<CpuDetail, TransportError> {
    let (frequencies_raw, temperatures_raw) = tokio::try_join!(
        ctx.run(commands::CPU_FREQUENCIES),
        ctx.run(commands::CPU_TEMPERATURES),
    )?;

    let frequencies_mhz = parser::parse_frequencies(&frequencies_raw);
    let temperatures = parser::parse_temperatures(&temperatures_raw);
    // hottest zone, or None when the host has no sensors
    let temperature_celsius = temperatures
        .into_iter()
        .fold(None, |hottest: Option<f64>, reading| {
            Some(hottest.map_or(reading, |current| current.max(reading)))
        });

    Ok(CpuDetail {
        frequencies_mhz,
        temperature_celsius,
        updated_at_ms: None,
    })
}
