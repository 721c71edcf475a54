//! Remote command strings issued through the gateway.
//!
//! These are stable contracts: the parsers are written against the exact
//! output shapes these invocations produce. Changing a flag here means
//! revisiting the matching parser's field schema.

/// Separator token emitted between sections when two commands run as one
/// combined invocation. Chosen to never collide with real tool output.
pub const SECTION_SEPARATOR: &str = "---HOSTWATCH-SEP---";

/// Cheap basic-tier CPU read: aggregate counters, load averages, core
/// count, uptime, hostname; one line each, in this order.
pub const CPU_BASIC: &str =
    "head -1 /proc/stat; cat /proc/loadavg; nproc; cat /proc/uptime; hostname";

/// Per-core clock readings.
pub const CPU_FREQUENCIES: &str = "grep -i '^cpu mhz' /proc/cpuinfo";

/// Thermal zone readings in millidegrees, one per line. Hosts without
/// sensors produce no output, which parses to "not available".
pub const CPU_TEMPERATURES: &str = "cat /sys/class/thermal/thermal_zone*/temp 2>/dev/null";

/// Named memory counters.
pub const MEMORY_INFO: &str = "cat /proc/meminfo";

/// Usage table with byte granularity and filesystem type column.
pub const DISK_USAGE: &str = "df -TB1";

/// Block-device listing: name, type, rotational flag, transport,
/// mountpoint. Raw format, no header.
pub const BLOCK_DEVICES: &str = "lsblk -rno NAME,TYPE,ROTA,TRAN,MOUNTPOINT";

/// Authoritative single-line resolution of the device backing the root
/// mount. Used to replace the generic `/dev/root` alias before joining.
pub const ROOT_DEVICE: &str = "findmnt -no SOURCE /";

/// Raw kernel per-device I/O counters.
pub const DISK_COUNTERS: &str = "cat /proc/diskstats";

/// Per-interface link statistics with counter sub-blocks.
pub const LINK_STATS: &str = "ip -s link";

/// One-line-per-address listing, merged into link records by name.
pub const ADDR_LIST: &str = "ip -o addr";

/// Socket statistics summary.
pub const SOCKET_SUMMARY: &str = "ss -s";

/// Process table sorted by CPU descending.
pub const PROCESS_TABLE: &str = "ps aux --sort=-pcpu";

/// Link statistics and address listing combined into one round trip.
pub fn combined_network() -> String {
    format!(
        "{}; echo '{}'; {}",
        LINK_STATS, SECTION_SEPARATOR, ADDR_LIST
    )
}

/// Thread listing for one process; line count = thread count.
pub fn thread_listing(pid: u32) -> String {
    format!("ls /proc/{}/task 2>/dev/null", pid)
}

/// Capability probe for an optional analysis tool. Empty output means the
/// tool is not installed and the expensive command must not be attempted.
pub fn which_tool(tool: &str) -> String {
    format!("which {} 2>/dev/null", tool)
}

/// SMART health read for one device. Only issued after the capability
/// probe succeeded.
pub fn smart_health(device: &str) -> String {
    format!("smartctl -H {} 2>/dev/null", device)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_network_contains_separator() {
        let cmd = combined_network();
        assert!(cmd.contains(SECTION_SEPARATOR));
        assert!(cmd.starts_with(LINK_STATS));
        assert!(cmd.ends_with(ADDR_LIST));
    }

    #[test]
    fn test_per_pid_commands() {
        assert_eq!(thread_listing(1234), "ls /proc/1234/task 2>/dev/null");
        assert_eq!(which_tool("smartctl"), "which smartctl 2>/dev/null");
        assert_eq!(smart_health("/dev/sda"), "smartctl -H /dev/sda 2>/dev/null");
    }
}
