//! Rate computer: turns monotonic counter samples taken at irregular
//! intervals into non-negative per-second rates.

use ahash::AHashMap as HashMap;

#[derive(Debug, Clone, Copy)]
struct Sample {
    value: u64,
    timestamp_ms: i64,
}

/// Per-entity prior-sample table for one session.
///
/// The stored sample is overwritten on every update, including when the
/// delta was clamped, so a counter reset produces a single zero reading
/// and self-heals on the next cycle.
#[derive(Debug, Default)]
pub struct RateComputer {
    samples: HashMap<String, Sample>,
}

impl RateComputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a counter observation and returns the rate against the
    /// previous observation for the same key, in units per second.
    ///
    /// First observation for a key returns 0.0. A negative value delta
    /// (counter reset or wrap) clamps to 0.0, and a zero or negative time
    /// delta returns 0.0; never a divide-by-zero, never a negative rate.
    pub fn update(&mut self, entity_key: &str, value: u64, timestamp_ms: i64) -> f64 {
        let next = Sample {
            value,
            timestamp_ms,
        };
        let previous = match self.samples.get_mut(entity_key) {
            Some(slot) => std::mem::replace(slot, next),
            None => {
                self.samples.insert(entity_key.to_string(), next);
                return 0.0;
            }
        };

        let elapsed_ms = timestamp_ms - previous.timestamp_ms;
        if elapsed_ms <= 0 {
            return 0.0;
        }

        let delta = value.saturating_sub(previous.value);
        delta as f64 / (elapsed_ms as f64 / 1000.0)
    }

    /// Number of tracked entities, for teardown diagnostics.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_is_zero() {
        let mut rates = RateComputer::new();
        assert_eq!(rates.update("net:eth0:rx", 1_000_000, 1000), 0.0);
    }

    #[test]
    fn test_rate_over_five_seconds() {
        let mut rates = RateComputer::new();
        rates.update("net:eth0:rx", 1_000_000, 0);
        let speed = rates.update("net:eth0:rx", 2_000_000, 5000);
        assert!((speed - 200_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_decreasing_counter_clamps_to_zero() {
        let mut rates = RateComputer::new();
        rates.update("disk:sda:read", 9_000_000, 0);
        assert_eq!(rates.update("disk:sda:read", 10, 1000), 0.0);
    }

    #[test]
    fn test_reset_self_heals_within_one_cycle() {
        let mut rates = RateComputer::new();
        rates.update("disk:sda:read", 9_000_000, 0);
        rates.update("disk:sda:read", 0, 1000);
        // baseline was overwritten by the clamped sample
        let speed = rates.update("disk:sda:read", 512_000, 2000);
        assert!((speed - 512_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_time_is_guarded() {
        let mut rates = RateComputer::new();
        rates.update("k", 100, 5000);
        assert_eq!(rates.update("k", 100, 5000), 0.0);
        assert_eq!(rates.update("k", 200, 4000), 0.0);
    }

    #[test]
    fn test_entities_are_independent() {
        let mut rates = RateComputer::new();
        rates.update("net:eth0:rx", 0, 0);
        rates.update("net:eth1:rx", 0, 0);
        let eth0 = rates.update("net:eth0:rx", 1000, 1000);
        let eth1 = rates.update("net:eth1:rx", 500, 1000);
        assert!((eth0 - 1000.0).abs() < 1e-9);
        assert!((eth1 - 500.0).abs() < 1e-9);
        assert_eq!(rates.len(), 2);
    }
}
