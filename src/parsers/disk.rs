//! Disk domain parsers: the usage table, the block-device listing, the
//! join between them, and the raw kernel I/O counters.
//!
//! The usage table and the device listing name the same resource
//! differently (partition vs whole disk, `/dev/` prefix, the generic root
//! alias), so identity resolution lives here: callers receive rows whose
//! device names are already reconciled and stay stable for the lifetime
//! of a session.

use std::collections::{HashMap, HashSet};

use crate::snapshot::{HealthStatus, PartitionInfo, StorageClass};

use super::clean_lines;
use super::schema::{DF_SCHEMA, DISKSTATS_SCHEMA};

/// Fixed sector size used by the kernel counter table, independent of the
/// device's physical sector size.
pub const SECTOR_SIZE_BYTES: u64 = 512;

/// Generic alias some hosts report for the device backing the root mount.
pub const ROOT_ALIAS: &str = "/dev/root";

/// Filesystem types backed by kernel memory rather than block storage.
const PSEUDO_FSTYPES: &[&str] = &[
    "tmpfs",
    "devtmpfs",
    "proc",
    "sysfs",
    "devpts",
    "cgroup",
    "cgroup2",
    "pstore",
    "bpf",
    "debugfs",
    "tracefs",
    "fusectl",
    "configfs",
    "securityfs",
    "hugetlbfs",
    "mqueue",
    "autofs",
    "binfmt_misc",
    "ramfs",
    "squashfs",
    "efivarfs",
];

/// Union/overlay filesystem types used by container runtimes.
const OVERLAY_FSTYPES: &[&str] = &["overlay", "overlayfs", "aufs", "fuse-overlayfs"];

/// Device-name prefixes of paravirtual block devices. Heuristic only,
/// consulted after the authoritative device listing had no answer.
const CLOUD_DEVICE_PREFIXES: &[&str] = &["vd", "xvd"];

/// One row of the usage table, device name already resolved.
#[derive(Debug, Clone)]
pub struct UsageRow {
    pub device: String,
    pub fstype: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
    pub mountpoint: String,
}

/// One row of the block-device listing.
#[derive(Debug, Clone)]
pub struct BlockDeviceRow {
    pub name: String,
    pub kind: String,
    pub rotational: Option<bool>,
    pub transport: Option<String>,
    pub mountpoint: Option<String>,
}

/// Cumulative I/O counters for one device, converted to bytes.
#[derive(Debug, Clone)]
pub struct DiskCounterRow {
    pub device: String,
    pub read_bytes: u64,
    pub written_bytes: u64,
}

/// Parses the single-line authoritative root-device output. Tolerates a
/// btrfs subvolume suffix (`/dev/sda2[/@root]`).
pub fn parse_root_device(raw: &str) -> Option<String> {
    let line = clean_lines(raw).next()?;
    let device = line.split_whitespace().next()?;
    let device = device.split('[').next().unwrap_or(device);
    if device.starts_with('/') {
        Some(device.to_string())
    } else {
        None
    }
}

/// Parses the `df -TB1` usage table. Rows naming the generic root alias
/// are re-resolved to `root_device` when one is known; without a
/// resolution the alias is kept as-is (best effort, never dropped).
pub fn parse_usage_table(raw: &str, root_device: Option<&str>) -> Vec<UsageRow> {
    let mut rows = Vec::new();

    for line in clean_lines(raw) {
        let Some(row) = DF_SCHEMA.parse_line(line) else {
            continue;
        };
        let device = row.get("device").unwrap_or_default();
        // header row
        if device == "Filesystem" {
            continue;
        }

        let device = if device == ROOT_ALIAS {
            root_device.unwrap_or(device)
        } else {
            device
        };

        let percent = row
            .get("percent")
            .and_then(|token| token.trim_end_matches('%').parse().ok())
            .unwrap_or(0.0);

        rows.push(UsageRow {
            device: device.to_string(),
            fstype: row.get("fstype").unwrap_or("unknown").to_string(),
            total_bytes: row.u64_field("size"),
            used_bytes: row.u64_field("used"),
            free_bytes: row.u64_field("free"),
            used_percent: percent,
            mountpoint: row.get("mountpoint").unwrap_or_default().to_string(),
        });
    }

    rows
}

/// Parses the raw block-device listing (`NAME TYPE ROTA TRAN MOUNTPOINT`).
///
/// The raw format drops empty columns instead of padding them, so a
/// four-token row is ambiguous: the last token is a mountpoint if it is
/// an absolute path, otherwise a transport.
pub fn parse_block_devices(raw: &str) -> Vec<BlockDeviceRow> {
    let mut rows = Vec::new();

    for line in clean_lines(raw) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 || tokens[0] == "NAME" {
            continue;
        }

        let rotational = match tokens[2] {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        };

        let (transport, mountpoint) = match tokens.len() {
            3 => (None, None),
            4 if tokens[3].starts_with('/') => (None, Some(tokens[3].to_string())),
            4 => (Some(tokens[3].to_string()), None),
            _ => (
                Some(tokens[3].to_string()),
                Some(tokens[4].to_string()),
            ),
        };

        rows.push(BlockDeviceRow {
            name: tokens[0].to_string(),
            kind: tokens[1].to_string(),
            rotational,
            transport,
            mountpoint,
        });
    }

    rows
}

/// Parses `/proc/diskstats`, excluding loopback and ramdisk
/// pseudo-devices. Sector counters become bytes here.
pub fn parse_disk_counters(raw: &str) -> Vec<DiskCounterRow> {
    let mut rows = Vec::new();

    for line in clean_lines(raw) {
        let Some(row) = DISKSTATS_SCHEMA.parse_line(line) else {
            continue;
        };
        let device = row.get("device").unwrap_or_default();
        if device.starts_with("loop") || device.starts_with("ram") {
            continue;
        }

        rows.push(DiskCounterRow {
            device: device.to_string(),
            read_bytes: row.u64_field("sectors_read") * SECTOR_SIZE_BYTES,
            written_bytes: row.u64_field("sectors_written") * SECTOR_SIZE_BYTES,
        });
    }

    rows
}

/// Strips a partition suffix from a device name: trailing digits, plus
/// the nvme-style `p` separator when one precedes them (`sda1` -> `sda`,
/// `nvme0n1p2` -> `nvme0n1`). Heuristic; callers must check the result
/// against the known device set before treating it as a real disk (a
/// whole nvme namespace also ends in a digit).
pub fn strip_partition_suffix(name: &str) -> &str {
    let stripped = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if stripped.len() < name.len() {
        if let Some(prefix) = stripped.strip_suffix('p') {
            if prefix.chars().last().is_some_and(|c| c.is_ascii_digit()) {
                return prefix;
            }
        }
    }
    stripped
}

/// True when `device` is a whole disk rather than a partition, judged
/// against the set of device names the counter table actually reported.
pub fn is_base_device(device: &str, known: &HashSet<&str>) -> bool {
    let stripped = strip_partition_suffix(device);
    stripped == device || !known.contains(stripped)
}

fn short_name(device: &str) -> &str {
    device.strip_prefix("/dev/").unwrap_or(device)
}

/// Classification policy, in priority order. Returns `Unknown` rather
/// than guessing when every step comes up empty.
pub fn classify(
    fstype: &str,
    mountpoint: &str,
    device: &str,
    block: Option<&BlockDeviceRow>,
    container_prefixes: &[String],
) -> StorageClass {
    if PSEUDO_FSTYPES.contains(&fstype) {
        return StorageClass::Virtual;
    }

    if OVERLAY_FSTYPES.contains(&fstype)
        || container_prefixes
            .iter()
            .any(|prefix| mountpoint.starts_with(prefix.as_str()))
    {
        return StorageClass::ContainerStorage;
    }

    if let Some(block) = block {
        match block.rotational {
            Some(true) => return StorageClass::Hdd,
            Some(false) => return StorageClass::Ssd,
            None => {}
        }
    }

    let name = short_name(device);
    if CLOUD_DEVICE_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
    {
        return StorageClass::CloudBlockStorage;
    }

    StorageClass::Unknown
}

/// Joins usage rows with the block-device listing and classifies each
/// partition. Join key is the base device name; a partition row in the
/// listing wins over the whole-disk row for the mountpoint check, but
/// rotational/transport always come from the disk. Unmatched rows are
/// kept with best-effort fields.
///
/// Sort order: physical partitions with the root mount first, then
/// lexicographic by mountpoint; virtual/container rows sorted separately
/// and appended.
pub fn build_partitions(
    usage: Vec<UsageRow>,
    blocks: &[BlockDeviceRow],
    container_prefixes: &[String],
) -> Vec<PartitionInfo> {
    let by_name: HashMap<&str, &BlockDeviceRow> =
        blocks.iter().map(|row| (row.name.as_str(), row)).collect();

    let mut physical = Vec::new();
    let mut virtual_rows = Vec::new();

    for row in usage {
        let name = short_name(&row.device);
        // rotational/transport live on the whole-disk row
        let base = by_name
            .get(strip_partition_suffix(name))
            .or_else(|| by_name.get(name))
            .copied();

        let class = classify(
            &row.fstype,
            &row.mountpoint,
            &row.device,
            base,
            container_prefixes,
        );

        let info = PartitionInfo {
            device: row.device,
            mountpoint: row.mountpoint,
            fstype: row.fstype,
            class,
            rotational: base.and_then(|b| b.rotational),
            transport: base.and_then(|b| b.transport.clone()),
            total_bytes: row.total_bytes,
            used_bytes: row.used_bytes,
            free_bytes: row.free_bytes,
            used_percent: row.used_percent,
        };

        if class.is_physical() {
            physical.push(info);
        } else {
            virtual_rows.push(info);
        }
    }

    physical.sort_by(|a, b| {
        let a_root = a.mountpoint == "/";
        let b_root = b.mountpoint == "/";
        b_root.cmp(&a_root).then_with(|| a.mountpoint.cmp(&b.mountpoint))
    });
    virtual_rows.sort_by(|a, b| a.mountpoint.cmp(&b.mountpoint));

    physical.extend(virtual_rows);
    physical
}

/// Aggregate totals over physical partitions only, deduplicated by device
/// name so a device bind-mounted in several places counts once.
pub fn physical_totals(partitions: &[PartitionInfo]) -> (u64, u64, u64) {
    let mut seen = HashSet::new();
    let mut total = 0u64;
    let mut used = 0u64;
    let mut free = 0u64;

    for partition in partitions {
        if !partition.class.is_physical() {
            continue;
        }
        if !seen.insert(partition.device.as_str()) {
            continue;
        }
        total += partition.total_bytes;
        used += partition.used_bytes;
        free += partition.free_bytes;
    }

    (total, used, free)
}

/// Extracts the overall SMART verdict from a health read.
pub fn parse_smart_health(raw: &str) -> HealthStatus {
    for line in clean_lines(raw) {
        let lower = line.to_ascii_lowercase();
        if lower.contains("self-assessment") || lower.contains("smart health status") {
            if lower.contains("passed") || lower.contains(": ok") {
                return HealthStatus::Passed;
            }
            if lower.contains("failed") {
                return HealthStatus::Failed;
            }
        }
    }
    HealthStatus::Unknown
}
