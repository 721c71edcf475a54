//! End-to-end tests of the aggregator against a scripted gateway.
//!
//! The mock gateway maps exact command strings to queued responses (the
//! last response for a command is sticky, so multi-tick tests only script
//! the transitions they care about). Unscripted commands return empty
//! output, which every parser must tolerate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use hostwatch_metrics::commands;
use hostwatch_metrics::snapshot::{DetailSection, HealthStatus, LinkStatus, StorageClass};
use hostwatch_metrics::{CommandGateway, EngineConfig, EngineError, MetricsEngine, TransportError};

struct MockGateway {
    responses: Mutex<HashMap<String, VecDeque<Result<String, TransportError>>>>,
    issued: Mutex<Vec<String>>,
}

impl MockGateway {
    fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            issued: Mutex::new(Vec::new()),
        }
    }

    fn script(&self, command: &str, output: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(Ok(output.to_string()));
    }

    fn script_err(&self, command: &str, err: TransportError) {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(Err(err));
    }

    fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandGateway for MockGateway {
    async fn execute(&self, _session_id: &str, command: &str) -> Result<String, TransportError> {
        self.issued.lock().unwrap().push(command.to_string());

        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(command) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue.front().unwrap().clone(),
            _ => Ok(String::new()),
        }
    }
}

fn engine_with(gateway: Arc<MockGateway>) -> MetricsEngine {
    MetricsEngine::new(gateway, EngineConfig::default())
}

const CPU_TICK_1: &str = "\
cpu  10000 500 3000 86000 200 100 200 0 0 0
0.52 0.58 0.59 2/1067 12345
8
84321.57 650661.60
test-host
";

const CPU_TICK_2: &str = "\
cpu  11000 500 3400 86500 300 100 200 0 0 0
0.60 0.58 0.59 2/1067 12399
8
84326.57 650700.00
test-host
";

const MEMINFO: &str = "\
MemTotal:       16384000 kB
MemFree:         4096000 kB
MemAvailable:    9216000 kB
Buffers:          512000 kB
Cached:          3072000 kB
SwapTotal:       2048000 kB
SwapFree:        1536000 kB
";

const DF_TABLE: &str = "\
Filesystem     Type     1B-blocks        Used   Available Use% Mounted on
/dev/root      ext4   41678536704 12345678848 29332857856  30% /
tmpfs          tmpfs   4150595584           0  4150595584   0% /dev/shm
/dev/sdb1      xfs    107374182400 53687091200 48318382080  53% /data
";

const LSBLK: &str = "\
sda disk 0 sata
sda1 part 0 /
sdb disk 1 sata
sdb1 part 1 /data
";

const LINK_TICK_1: &str = "\
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP mode DEFAULT group default qlen 1000
    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
    RX: bytes  packets  errors  dropped missed  mcast
    1000000    9876     0       0       0       0
    TX: bytes  packets  errors  dropped carrier collsns
    500000     5432     0       0       0       0
";

const LINK_TICK_2: &str = "\
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP mode DEFAULT group default qlen 1000
    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
    RX: bytes  packets  errors  dropped missed  mcast
    2000000    9976     0       0       0       0
    TX: bytes  packets  errors  dropped carrier collsns
    900000     5532     0       0       0       0
";

const PS_TABLE: &str = "\
USER         PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
mysql       1012 12.5  8.2 2458844 676544 ?     Ssl  Jan12 412:33 /usr/sbin/mysqld
root           1  0.1  0.3 168540 11756 ?       Ss   Jan12   0:43 /sbin/init
";

const SS_SUMMARY: &str = "\
Total: 182
TCP:   12 (estab 5, closed 2, orphaned 0, timewait 1)
";

#[tokio::test]
async fn basic_snapshot_is_always_complete() {
    // nothing scripted at all: every parser sees empty output
    let gateway = Arc::new(MockGateway::new());
    let engine = engine_with(gateway);

    let snapshot = engine.collect_basic_metrics("s1").await.unwrap();
    assert_eq!(snapshot.cpu.usage_percent, 0.0);
    assert_eq!(snapshot.memory.total_bytes, 0);
    assert_eq!(snapshot.disk.total_bytes, 0);
    assert_eq!(snapshot.network.rx_bytes_per_sec, 0.0);
    assert!(snapshot.collected_at_ms > 0);
}

#[tokio::test]
async fn basic_snapshot_parses_all_domains() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(commands::CPU_BASIC, CPU_TICK_1);
    gateway.script(commands::MEMORY_INFO, MEMINFO);
    gateway.script(commands::DISK_USAGE, DF_TABLE);
    gateway.script(commands::LINK_STATS, LINK_TICK_1);
    let engine = engine_with(gateway);

    let snapshot = engine.collect_basic_metrics("s1").await.unwrap();

    assert_eq!(snapshot.cpu.cores, 8);
    assert_eq!(snapshot.cpu.hostname, "test-host");
    assert!((snapshot.cpu.load_one - 0.52).abs() < 1e-9);
    // first sample of the session: no usage baseline yet
    assert_eq!(snapshot.cpu.usage_percent, 0.0);

    assert_eq!(snapshot.memory.total_bytes, 16_384_000 * 1024);
    assert!(snapshot.memory.used_bytes <= snapshot.memory.total_bytes);

    // tmpfs row excluded from the physical totals
    assert_eq!(snapshot.disk.total_bytes, 41_678_536_704 + 107_374_182_400);

    assert_eq!(snapshot.network.interfaces_up, 1);
}

#[tokio::test]
async fn second_tick_produces_positive_rates_and_usage() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(commands::CPU_BASIC, CPU_TICK_1);
    gateway.script(commands::CPU_BASIC, CPU_TICK_2);
    gateway.script(commands::LINK_STATS, LINK_TICK_1);
    gateway.script(commands::LINK_STATS, LINK_TICK_2);
    let engine = engine_with(gateway);

    let first = engine.collect_basic_metrics("s1").await.unwrap();
    assert_eq!(first.network.rx_bytes_per_sec, 0.0);

    tokio::time::sleep(Duration::from_millis(25)).await;

    let second = engine.collect_basic_metrics("s1").await.unwrap();
    assert!(second.network.rx_bytes_per_sec > 0.0);
    assert!(second.network.tx_bytes_per_sec > 0.0);
    assert!(second.cpu.usage_percent > 0.0);
}

#[tokio::test]
async fn identical_counters_yield_zero_rates() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(commands::LINK_STATS, LINK_TICK_1);
    let engine = engine_with(gateway);

    engine.collect_basic_metrics("s1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(15)).await;
    let second = engine.collect_basic_metrics("s1").await.unwrap();
    assert_eq!(second.network.rx_bytes_per_sec, 0.0);
    assert_eq!(second.network.tx_bytes_per_sec, 0.0);
}

#[tokio::test]
async fn destroy_releases_counter_baselines() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(commands::LINK_STATS, LINK_TICK_1);
    gateway.script(commands::LINK_STATS, LINK_TICK_2);
    let engine = engine_with(gateway);

    engine.collect_basic_metrics("s1").await.unwrap();
    engine.destroy("s1");

    tokio::time::sleep(Duration::from_millis(15)).await;
    // fresh session state: the next observation is a first observation
    let snapshot = engine.collect_basic_metrics("s1").await.unwrap();
    assert_eq!(snapshot.network.rx_bytes_per_sec, 0.0);
}

#[tokio::test]
async fn missing_health_tool_short_circuits() {
    let gateway = Arc::new(MockGateway::new());
    // probe returns empty output: tool not installed
    gateway.script(&commands::which_tool("smartctl"), "");
    let engine = engine_with(gateway.clone());

    let detail = engine
        .collect_detail_metrics("s1", Some(DetailSection::DiskHealth))
        .await
        .unwrap();

    assert!(!detail.disk_health.tool_installed);
    assert!(detail.disk_health.devices.is_empty());
    assert!(detail.disk_health.updated_at_ms.is_some());
    // the health-reading command was never attempted
    assert!(gateway
        .issued()
        .iter()
        .all(|command| !command.starts_with("smartctl -H")));
}

#[tokio::test]
async fn installed_health_tool_reads_every_disk() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(&commands::which_tool("smartctl"), "/usr/sbin/smartctl\n");
    gateway.script(commands::BLOCK_DEVICES, LSBLK);
    gateway.script(
        &commands::smart_health("/dev/sda"),
        "SMART overall-health self-assessment test result: PASSED\n",
    );
    gateway.script(
        &commands::smart_health("/dev/sdb"),
        "SMART overall-health self-assessment test result: FAILED!\n",
    );
    let engine = engine_with(gateway);

    let detail = engine
        .collect_detail_metrics("s1", Some(DetailSection::DiskHealth))
        .await
        .unwrap();

    assert!(detail.disk_health.tool_installed);
    assert_eq!(detail.disk_health.devices.len(), 2);
    assert_eq!(detail.disk_health.devices[0].status, HealthStatus::Passed);
    assert_eq!(detail.disk_health.devices[1].status, HealthStatus::Failed);
}

#[tokio::test]
async fn section_scoped_refresh_carries_other_sections_from_cache() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(&commands::which_tool("smartctl"), "/usr/sbin/smartctl\n");
    gateway.script(commands::BLOCK_DEVICES, LSBLK);
    gateway.script(
        &commands::smart_health("/dev/sda"),
        "SMART overall-health self-assessment test result: PASSED\n",
    );
    gateway.script(commands::ROOT_DEVICE, "/dev/sda1\n");
    gateway.script(commands::DISK_USAGE, DF_TABLE);
    let engine = engine_with(gateway.clone());

    let first = engine
        .collect_detail_metrics("s1", Some(DetailSection::DiskHealth))
        .await
        .unwrap();
    let health_before = serde_json::to_string(&first.disk_health).unwrap();
    assert!(first.disk_space.updated_at_ms.is_none());

    let commands_before_space = gateway.issued().len();
    let second = engine
        .collect_detail_metrics("s1", Some(DetailSection::DiskSpace))
        .await
        .unwrap();

    // health is byte-identical to the first call's value
    let health_after = serde_json::to_string(&second.disk_health).unwrap();
    assert_eq!(health_before, health_after);
    // and was not re-collected
    assert!(gateway.issued()[commands_before_space..]
        .iter()
        .all(|command| !command.contains("smartctl")));

    // space was freshly computed, with the root alias resolved
    assert!(second.disk_space.updated_at_ms.is_some());
    let root = &second.disk_space.partitions[0];
    assert_eq!(root.device, "/dev/sda1");
    assert_eq!(root.class, StorageClass::Ssd);
}

#[tokio::test]
async fn omitted_section_refreshes_every_detail() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(commands::PROCESS_TABLE, PS_TABLE);
    gateway.script(commands::SOCKET_SUMMARY, SS_SUMMARY);
    let engine = engine_with(gateway);

    let detail = engine.collect_detail_metrics("s1", None).await.unwrap();

    assert!(detail.cpu.updated_at_ms.is_some());
    assert!(detail.disk_health.updated_at_ms.is_some());
    assert!(detail.disk_space.updated_at_ms.is_some());
    assert!(detail.disk_io.updated_at_ms.is_some());
    assert!(detail.network.updated_at_ms.is_some());
    assert!(detail.process.updated_at_ms.is_some());

    assert_eq!(detail.process.processes.len(), 2);
    assert_eq!(detail.process.processes[0].pid, 1012);
    assert_eq!(detail.network.sockets.total, 182);
    assert_eq!(detail.network.sockets.tcp_established, 5);
}

#[tokio::test]
async fn transient_failure_serves_cached_section() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(&commands::combined_network(), LINK_TICK_1);
    gateway.script(commands::SOCKET_SUMMARY, SS_SUMMARY);
    let engine = engine_with(gateway.clone());

    let first = engine
        .collect_detail_metrics("s1", Some(DetailSection::Network))
        .await
        .unwrap();
    assert_eq!(first.network.interfaces.len(), 1);
    assert_eq!(first.network.interfaces[0].status, LinkStatus::Up);

    // now the link-statistics command starts failing
    gateway.script_err(
        &commands::combined_network(),
        TransportError::CommandFailed("channel closed".into()),
    );
    gateway.script_err(
        &commands::combined_network(),
        TransportError::CommandFailed("channel closed".into()),
    );

    let second = engine
        .collect_detail_metrics("s1", Some(DetailSection::Network))
        .await
        .unwrap();

    // stale cached value preferred over a blank section
    assert_eq!(second.network.interfaces.len(), 1);
    assert_eq!(second.network.interfaces[0].name, "eth0");
    assert_eq!(second.network.updated_at_ms, first.network.updated_at_ms);
}

#[tokio::test]
async fn failure_without_cache_yields_default_section() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script_err(
        commands::PROCESS_TABLE,
        TransportError::CommandFailed("boom".into()),
    );
    gateway.script_err(
        commands::PROCESS_TABLE,
        TransportError::CommandFailed("boom".into()),
    );
    let engine = engine_with(gateway);

    // the call still succeeds and returns a complete snapshot
    let detail = engine
        .collect_detail_metrics("s1", Some(DetailSection::Process))
        .await
        .unwrap();
    assert!(detail.process.processes.is_empty());
    assert!(detail.process.updated_at_ms.is_none());
}

#[tokio::test]
async fn disconnect_is_fatal() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script_err(commands::MEMORY_INFO, TransportError::Disconnected);
    gateway.script_err(commands::MEMORY_INFO, TransportError::Disconnected);
    let engine = engine_with(gateway);

    let result = engine.collect_basic_metrics("s1").await;
    assert!(matches!(
        result,
        Err(EngineError::Transport(TransportError::Disconnected))
    ));
}

#[tokio::test]
async fn sessions_do_not_share_counter_state() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(commands::LINK_STATS, LINK_TICK_1);
    gateway.script(commands::LINK_STATS, LINK_TICK_2);
    let engine = engine_with(gateway);

    // s1 consumes tick 1; s2's first observation must still be rate 0
    engine.collect_basic_metrics("s1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(15)).await;
    let other = engine.collect_basic_metrics("s2").await.unwrap();
    assert_eq!(other.network.rx_bytes_per_sec, 0.0);
}

#[tokio::test]
async fn process_detail_fans_out_thread_listings() {
    let gateway = Arc::new(MockGateway::new());
    gateway.script(commands::PROCESS_TABLE, PS_TABLE);
    gateway.script(&commands::thread_listing(1012), "1012\n1100\n1101\n");
    gateway.script(&commands::thread_listing(1), "1\n");
    let engine = engine_with(gateway.clone());

    let detail = engine
        .collect_detail_metrics("s1", Some(DetailSection::Process))
        .await
        .unwrap();

    assert_eq!(detail.process.processes[0].threads, Some(3));
    assert_eq!(detail.process.processes[1].threads, Some(1));
    // one listing per top process was issued
    let listings = gateway
        .issued()
        .iter()
        .filter(|command| command.starts_with("ls /proc/"))
        .count();
    assert_eq!(listings, 2);
}
