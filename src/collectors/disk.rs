//! Disk domain collector: basic totals, space analysis, I/O rates, and
//! SMART health.

use std::collections::HashSet;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::commands;
use crate::error::TransportError;
use crate::parsers::disk as parser;
use crate::snapshot::{DeviceHealth, DeviceIo, DiskBasic, DiskHealthDetail, DiskIoDetail, DiskSpaceDetail};

use super::{now_ms, Ctx};

/// Cheap tier: usage totals over physical partitions plus host-wide
/// read/write throughput. Classification here comes from the filesystem
/// type alone; the full device join runs in the space detail.
pub(crate) async fn collect_basic(ctx: &Ctx<'_>) -> Result<DiskBasic, TransportError> {
    let (usage_raw, counters_raw) = tokio::try_join!(
        ctx.run(commands::DISK_USAGE),
        ctx.run(commands::DISK_COUNTERS),
    )?;

    let usage = parser::parse_usage_table(&usage_raw, None);
    let partitions = parser::build_partitions(usage, &[], &ctx.config.container_storage_prefixes);
    let (total_bytes, used_bytes, free_bytes) = parser::physical_totals(&partitions);

    let counters = parser::parse_disk_counters(&counters_raw);
    let known: HashSet<&str> = counters.iter().map(|row| row.device.as_str()).collect();
    let now = now_ms();

    let mut read_bytes_per_sec = 0.0;
    let mut write_bytes_per_sec = 0.0;
    {
        let mut rates = ctx.state.rates.lock().expect("rate table lock poisoned");
        for row in &counters {
            // partitions would double-count their parent disk
            if !parser::is_base_device(&row.device, &known) {
                continue;
            }
            read_bytes_per_sec += rates.update(
                &format!("disk:basic:{}:read", row.device),
                row.read_bytes,
                now,
            );
            write_bytes_per_sec += rates.update(
                &format!("disk:basic:{}:write", row.device),
                row.written_bytes,
                now,
            );
        }
    }

    Ok(DiskBasic {
        total_bytes,
        used_bytes,
        free_bytes,
        read_bytes_per_sec,
        write_bytes_per_sec,
    })
}

/// Space detail: the root device must be resolved before the usage table
/// can be interpreted, so that read is sequential; the two tables then
/// fetch concurrently.
pub(crate) async fn collect_space(ctx: &Ctx<'_>) -> Result<DiskSpaceDetail, TransportError> {
    let root_raw = ctx.run(commands::ROOT_DEVICE).await?;
    let root_device = parser::parse_root_device(&root_raw);
    if root_device.is_none() {
        debug!(session_id = ctx.session_id, "root device resolution returned nothing");
    }

    let (usage_raw, blocks_raw) = tokio::try_join!(
        ctx.run(commands::DISK_USAGE),
        ctx.run(commands::BLOCK_DEVICES),
    )?;

    let usage = parser::parse_usage_table(&usage_raw, root_device.as_deref());
    let blocks = parser::parse_block_devices(&blocks_raw);

    Ok(DiskSpaceDetail {
        partitions: parser::build_partitions(usage, &blocks, &ctx.config.container_storage_prefixes),
        updated_at_ms: None,
    })
}

/// I/O detail: per-device rates, with domain totals summed over base
/// devices only. Per-partition rates are matched by the partition's full
/// device name against the counter table.
pub(crate) async fn collect_io(ctx: &Ctx<'_>) -> Result<DiskIoDetail, TransportError> {
    let raw = ctx.run(commands::DISK_COUNTERS).await?;
    let counters = parser::parse_disk_counters(&raw);
    let known: HashSet<&str> = counters.iter().map(|row| row.device.as_str()).collect();
    let now = now_ms();

    let mut detail = DiskIoDetail::default();
    {
        let mut rates = ctx.state.rates.lock().expect("rate table lock poisoned");
        for row in &counters {
            let read = rates.update(&format!("disk:{}:read", row.device), row.read_bytes, now);
            let write = rates.update(&format!("disk:{}:write", row.device), row.written_bytes, now);
            let base_device = parser::is_base_device(&row.device, &known);
            if base_device {
                detail.total_read_bytes_per_sec += read;
                detail.total_write_bytes_per_sec += write;
            }
            detail.devices.push(DeviceIo {
                device: row.device.clone(),
                base_device,
                read_bytes_per_sec: read,
                write_bytes_per_sec: write,
            });
        }
    }
    detail.devices.sort_by(|a, b| a.device.cmp(&b.device));

    Ok(detail)
}

/// SMART health. The capability probe runs first; when the tool is
/// missing the expensive per-device reads are never attempted.
pub(crate) async fn collect_health(ctx: &Ctx<'_>) -> Result<DiskHealthDetail, TransportError> {
    let probe = ctx
        .run(&commands::which_tool(&ctx.config.disk_health_tool))
        .await?;
    if probe.trim().is_empty() {
        debug!(
            session_id = ctx.session_id,
            tool = %ctx.config.disk_health_tool,
            "health tool not installed"
        );
        return Ok(DiskHealthDetail {
            tool_installed: false,
            devices: Vec::new(),
            updated_at_ms: None,
        });
    }

    let blocks_raw = ctx.run(commands::BLOCK_DEVICES).await?;
    let disks: Vec<String> = parser::parse_block_devices(&blocks_raw)
        .into_iter()
        .filter(|row| row.kind == "disk")
        .map(|row| format!("/dev/{}", row.name))
        .collect();

    let readings = join_all(disks.into_iter().map(|device| async move {
        let result = ctx.run(&commands::smart_health(&device)).await;
        (device, result)
    }))
    .await;

    let mut devices = Vec::new();
    for (device, result) in readings {
        match result {
            Ok(raw) => devices.push(DeviceHealth {
                device,
                status: parser::parse_smart_health(&raw),
            }),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(device, error = %err, "health read failed; keeping row as unknown");
                devices.push(DeviceHealth {
                    device,
                    status: Default::default(),
                });
            }
        }
    }

    Ok(DiskHealthDetail {
        tool_installed: true,
        devices,
        updated_at_ms: None,
    })
}
