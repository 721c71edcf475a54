//! CPU domain parser: aggregate kernel counters, load averages, core
//! count, uptime, per-core frequencies, and thermal readings.
//!
//! The basic-tier command emits one line per reading in a fixed order,
//! but each line is recognized by shape rather than position so a missing
//! tool on the remote host degrades that one reading instead of shifting
//! every later field.

use super::clean_lines;

/// Aggregate CPU time counters from the first line of `/proc/stat`.
/// Monotonic; usage is derived from the delta between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuCounters {
    /// Sum of all time fields.
    pub total: u64,
    /// Idle plus iowait; time the CPU did no useful work.
    pub idle: u64,
}

impl CpuCounters {
    /// Busy share between two samples, percent. Returns 0.0 when the
    /// counters did not advance (or wrapped), never a negative value.
    pub fn usage_since(&self, previous: &CpuCounters) -> f64 {
        let total_delta = self.total.saturating_sub(previous.total);
        if total_delta == 0 {
            return 0.0;
        }
        let idle_delta = self.idle.saturating_sub(previous.idle);
        let busy = total_delta.saturating_sub(idle_delta);
        (busy as f64 / total_delta as f64) * 100.0
    }
}

/// Rows produced from the basic-tier CPU command output.
#[derive(Debug, Clone, Default)]
pub struct CpuBasicRows {
    pub counters: Option<CpuCounters>,
    pub load_one: f64,
    pub load_five: f64,
    pub load_fifteen: f64,
    pub cores: u32,
    pub uptime_seconds: u64,
    pub hostname: String,
}

/// Parses the combined basic-tier output: `/proc/stat` first line,
/// `/proc/loadavg`, `nproc`, `/proc/uptime`, `hostname`.
pub fn parse_basic(raw: &str) -> CpuBasicRows {
    let mut rows = CpuBasicRows::default();

    for line in clean_lines(raw) {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if rows.counters.is_none() && parts.first() == Some(&"cpu") {
            rows.counters = parse_stat_counters(&parts);
            continue;
        }

        // loadavg: "0.52 0.58 0.59 1/234 5678"; running/total marker
        if parts.len() >= 4 && parts[3].contains('/') {
            rows.load_one = parts[0].parse().unwrap_or(0.0);
            rows.load_five = parts[1].parse().unwrap_or(0.0);
            rows.load_fifteen = parts[2].parse().unwrap_or(0.0);
            continue;
        }

        // nproc: a single bare integer
        if parts.len() == 1 {
            if let Ok(cores) = parts[0].parse::<u32>() {
                rows.cores = cores;
                continue;
            }
        }

        // uptime: "12345.67 98765.43"
        if parts.len() == 2 && parts[0].contains('.') {
            if let Ok(seconds) = parts[0].parse::<f64>() {
                rows.uptime_seconds = seconds as u64;
                continue;
            }
        }

        if rows.hostname.is_empty() {
            rows.hostname = line.to_string();
        }
    }

    rows
}

fn parse_stat_counters(parts: &[&str]) -> Option<CpuCounters> {
    // cpu user nice system idle iowait irq softirq steal ...
    if parts.len() < 5 {
        return None;
    }
    let values: Vec<u64> = parts[1..]
        .iter()
        .map(|token| token.parse().unwrap_or(0))
        .collect();

    let total: u64 = values.iter().take(8).sum();
    if total == 0 {
        return None;
    }
    let idle = values.get(3).copied().unwrap_or(0) + values.get(4).copied().unwrap_or(0);

    Some(CpuCounters { total, idle })
}

/// Parses `cpu MHz : 2400.000` lines into per-core readings.
pub fn parse_frequencies(raw: &str) -> Vec<f64> {
    clean_lines(raw)
        .filter_map(|line| {
            let (_, value) = line.split_once(':')?;
            value.trim().parse::<f64>().ok()
        })
        .collect()
}

/// Parses thermal-zone readings (millidegrees Celsius, one per line).
/// An empty result means no sensor is present; callers must surface that
/// as "not available", never as 0.
pub fn parse_temperatures(raw: &str) -> Vec<f64> {
    clean_lines(raw)
        .filter_map(|line| line.parse::<i64>().ok())
        .map(|millidegrees| millidegrees as f64 / 1000.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_FIXTURE: &str = "\
cpu  10000 500 3000 86000 200 100 200 0 0 0
0.52 0.58 0.59 2/1067 12345
8
84321.57 650661.60
build-host-01
";

    #[test]
    fn test_parse_basic_all_rows() {
        let rows = parse_basic(BASIC_FIXTURE);
        let counters = rows.counters.unwrap();
        assert_eq!(counters.total, 10000 + 500 + 3000 + 86000 + 200 + 100 + 200);
        assert_eq!(counters.idle, 86000 + 200);
        assert!((rows.load_one - 0.52).abs() < 1e-9);
        assert!((rows.load_fifteen - 0.59).abs() < 1e-9);
        assert_eq!(rows.cores, 8);
        assert_eq!(rows.uptime_seconds, 84321);
        assert_eq!(rows.hostname, "build-host-01");
    }

    #[test]
    fn test_parse_basic_tolerates_missing_lines() {
        let rows = parse_basic("cpu 100 0 100 800 0 0 0 0\r\n\r\nsome-host\r\n");
        assert!(rows.counters.is_some());
        assert_eq!(rows.cores, 0);
        assert_eq!(rows.hostname, "some-host");
    }

    #[test]
    fn test_parse_basic_empty_output() {
        let rows = parse_basic("");
        assert!(rows.counters.is_none());
        assert_eq!(rows.hostname, "");
    }

    #[test]
    fn test_usage_since_between_samples() {
        let first = CpuCounters { total: 1000, idle: 800 };
        let second = CpuCounters { total: 2000, idle: 1400 };
        // 1000 total elapsed, 600 idle -> 40% busy
        assert!((second.usage_since(&first) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_usage_since_counter_reset_is_zero() {
        let first = CpuCounters { total: 5000, idle: 4000 };
        let second = CpuCounters { total: 100, idle: 50 };
        assert_eq!(second.usage_since(&first), 0.0);
    }

    #[test]
    fn test_parse_frequencies() {
        let raw = "cpu MHz\t\t: 2400.000\r\ncpu MHz\t\t: 1800.123\n";
        let freqs = parse_frequencies(raw);
        assert_eq!(freqs.len(), 2);
        assert!((freqs[1] - 1800.123).abs() < 1e-9);
    }

    #[test]
    fn test_parse_temperatures_millidegrees() {
        let temps = parse_temperatures("45000\n0\n");
        assert_eq!(temps, vec![45.0, 0.0]);
    }

    #[test]
    fn test_parse_temperatures_absent_sensor() {
        assert!(parse_temperatures("").is_empty());
        assert!(parse_temperatures("cat: no such file\n").is_empty());
    }
}
