//! hostwatch-metrics: remote-host metrics collection and parsing engine.
//!
//! Turns shell command output from a remote execution channel into typed
//! CPU, memory, disk, network, and process metrics. The engine owns the
//! hard parts of a remote monitoring dashboard:
//!
//! - **Parsing**: heterogeneous, loosely-formatted text from standard
//!   tools (`df`, `lsblk`, `ip`, `ss`, `ps`, raw kernel counter tables)
//!   becomes typed rows via pure, fixture-testable parsers.
//! - **Rates**: monotonic counters sampled at irregular intervals become
//!   non-negative per-second rates, with counter resets self-healing
//!   within one cycle.
//! - **Identity**: devices and partitions named differently by different
//!   tools (the `/dev/root` alias, partition suffixes) are reconciled
//!   once and stay stable for a session's lifetime.
//! - **Resilience**: a missing tool, a failed command, or malformed
//!   output degrades one section to its cached or default value; a
//!   monitoring panel shows "no data", never a crash.
//!
//! The remote transport is supplied by the embedding application as a
//! [`CommandGateway`]; [`ShellGateway`] runs commands through the local
//! shell for smoke testing.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hostwatch_metrics::{DetailSection, EngineConfig, MetricsEngine, ShellGateway};
//!
//! # async fn demo() -> Result<(), hostwatch_metrics::EngineError> {
//! let engine = MetricsEngine::new(Arc::new(ShellGateway::new()), EngineConfig::default());
//!
//! // cheap tier, polled every few seconds
//! let basic = engine.collect_basic_metrics("host-a").await?;
//! println!("cpu {:.1}%", basic.cpu.usage_percent);
//!
//! // expensive tier, requested when a dashboard section opens
//! let detail = engine
//!     .collect_detail_metrics("host-a", Some(DetailSection::DiskSpace))
//!     .await?;
//! println!("{} partitions", detail.disk_space.partitions.len());
//!
//! engine.destroy("host-a");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod parsers;
pub mod rate;
pub mod session;
pub mod snapshot;

mod collectors;

// Re-export the public surface for convenience
pub use config::EngineConfig;
pub use engine::MetricsEngine;
pub use error::{EngineError, ParseError, TransportError};
pub use gateway::{CommandGateway, ShellGateway};
pub use snapshot::{BasicSnapshot, DetailSection, DetailSnapshot};
