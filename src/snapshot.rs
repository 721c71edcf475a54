//! Typed snapshot model returned by the metrics engine.
//!
//! Basic fields are always present and refreshed on every poll tick.
//! Detail sub-sections are filled lazily: each carries its own
//! `updated_at_ms` marker (`None` means the section has never been
//! computed for this session and holds its zero-value default).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One lazily-refreshed detail sub-section of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailSection {
    Cpu,
    /// SMART health per block device (requires `smartctl` on the host).
    #[serde(rename = "health")]
    DiskHealth,
    /// Full per-partition usage table with device classification.
    #[serde(rename = "space")]
    DiskSpace,
    /// Per-device read/write throughput from kernel counters.
    #[serde(rename = "io")]
    DiskIo,
    Network,
    Process,
}

impl DetailSection {
    /// All sections, in refresh order.
    pub const ALL: [DetailSection; 6] = [
        DetailSection::Cpu,
        DetailSection::DiskHealth,
        DetailSection::DiskSpace,
        DetailSection::DiskIo,
        DetailSection::Network,
        DetailSection::Process,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailSection::Cpu => "cpu",
            DetailSection::DiskHealth => "health",
            DetailSection::DiskSpace => "space",
            DetailSection::DiskIo => "io",
            DetailSection::Network => "network",
            DetailSection::Process => "process",
        }
    }
}

impl fmt::Display for DetailSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(DetailSection::Cpu),
            "health" => Ok(DetailSection::DiskHealth),
            "space" => Ok(DetailSection::DiskSpace),
            "io" => Ok(DetailSection::DiskIo),
            "network" => Ok(DetailSection::Network),
            "process" => Ok(DetailSection::Process),
            other => Err(format!("unknown detail section: {}", other)),
        }
    }
}

/// Cheap always-on metrics, recomputed on every poll tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicSnapshot {
    pub collected_at_ms: i64,
    pub cpu: CpuBasic,
    pub memory: MemoryInfo,
    pub disk: DiskBasic,
    pub network: NetworkBasic,
}

/// Aggregate CPU state derived from kernel counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuBasic {
    /// Busy share of total CPU time since the previous sample, 0.0 on the
    /// first sample of a session.
    pub usage_percent: f64,
    pub load_one: f64,
    pub load_five: f64,
    pub load_fifteen: f64,
    pub cores: u32,
    pub uptime_seconds: u64,
    pub hostname: String,
}

/// Named memory counters. `used + free + cached + buffers` need not equal
/// `total` (kernel accounting overlaps); only `used <= total` holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
    pub cached_bytes: u64,
    pub buffers_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
}

/// Aggregate disk totals over physical partitions only; rows classified
/// as virtual or container storage are excluded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskBasic {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub read_bytes_per_sec: f64,
    pub write_bytes_per_sec: f64,
}

/// Host-wide network throughput summed over non-loopback interfaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkBasic {
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
    pub interfaces_up: u32,
}

/// Union of all detail sub-sections for one session. Every field is always
/// populated: freshly computed, carried from cache, or the zero-value
/// default when the section has never been collected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailSnapshot {
    pub cpu: CpuDetail,
    pub disk_health: DiskHealthDetail,
    pub disk_space: DiskSpaceDetail,
    pub disk_io: DiskIoDetail,
    pub network: NetworkDetail,
    pub process: ProcessDetail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuDetail {
    /// Per-core clock readings in MHz, empty when the host exposes none.
    pub frequencies_mhz: Vec<f64>,
    /// Hottest sensor reading. `None` means no sensor reported; 0.0 is a
    /// valid reading and must not stand in for absence.
    pub temperature_celsius: Option<f64>,
    pub updated_at_ms: Option<i64>,
}

/// SMART health summary. `tool_installed = false` means the capability
/// probe failed and no health command was attempted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskHealthDetail {
    pub tool_installed: bool,
    pub devices: Vec<DeviceHealth>,
    pub updated_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceHealth {
    pub device: String,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Passed,
    Failed,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskSpaceDetail {
    /// Physical partitions first (root mount leading, then by mountpoint),
    /// virtual/container rows appended after.
    pub partitions: Vec<PartitionInfo>,
    pub updated_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionInfo {
    /// Resolved device name (root alias already replaced by the real
    /// block device).
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub class: StorageClass,
    pub rotational: Option<bool>,
    pub transport: Option<String>,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
}

/// Storage classification, in decreasing order of confidence. The
/// `CloudBlockStorage` variant comes from a device-name prefix heuristic
/// (`vd*`/`xvd*`) and is best-effort, never authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageClass {
    Virtual,
    ContainerStorage,
    Hdd,
    Ssd,
    CloudBlockStorage,
    #[default]
    Unknown,
}

impl StorageClass {
    /// Physical rows participate in aggregate totals; virtual and
    /// container-storage rows never do.
    pub fn is_physical(&self) -> bool {
        !matches!(self, StorageClass::Virtual | StorageClass::ContainerStorage)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskIoDetail {
    /// Host-wide totals over base devices only; partitions never
    /// double-count into these.
    pub total_read_bytes_per_sec: f64,
    pub total_write_bytes_per_sec: f64,
    pub devices: Vec<DeviceIo>,
    pub updated_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIo {
    pub device: String,
    /// True when this row is a whole disk rather than a partition.
    pub base_device: bool,
    pub read_bytes_per_sec: f64,
    pub write_bytes_per_sec: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDetail {
    pub interfaces: Vec<InterfaceInfo>,
    pub sockets: SocketSummary,
    pub updated_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub status: LinkStatus,
    pub mac: Option<String>,
    pub mtu: Option<u32>,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Up,
    #[default]
    Down,
}

/// Socket counts from the socket-statistics summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocketSummary {
    pub total: u64,
    pub tcp: u64,
    pub udp: u64,
    pub tcp_established: u64,
    pub tcp_time_wait: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessDetail {
    /// Sorted by CPU descending, as reported by the remote process table.
    pub processes: Vec<ProcessInfo>,
    pub updated_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub user: String,
    pub pid: u32,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub vsz_kb: u64,
    pub rss_kb: u64,
    pub tty: String,
    pub status: ProcessStatus,
    pub started: String,
    pub cpu_time: String,
    pub command: String,
    /// Thread count, filled only for the top slice of the table.
    pub threads: Option<u32>,
}

/// Process state classification. Unknown status codes map to `Sleeping`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    #[default]
    Sleeping,
    Uninterruptible,
    Zombie,
    Stopped,
    Idle,
}
