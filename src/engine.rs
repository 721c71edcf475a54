//! Metrics aggregator façade.
//!
//! Dispatches to the domain collectors in parallel, merges fresh results
//! into the session's cached snapshot (sections not requested keep their
//! last cached value), and always returns a complete snapshot. A failure
//! in one domain never fails the whole call; only a gateway-reported
//! disconnect surfaces as an error.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::cache::{SectionState, SnapshotCache};
use crate::collectors::{self, now_ms, Ctx};
use crate::config::EngineConfig;
use crate::error::{EngineError, TransportError};
use crate::gateway::CommandGateway;
use crate::session::{SessionRegistry, SessionState};
use crate::snapshot::{
    BasicSnapshot, CpuDetail, DetailSection, DetailSnapshot, DiskHealthDetail, DiskIoDetail,
    DiskSpaceDetail, NetworkDetail, ProcessDetail,
};

/// The engine. One instance serves any number of sessions; all mutable
/// state is keyed by session id and released by [`MetricsEngine::destroy`].
pub struct MetricsEngine {
    gateway: Arc<dyn CommandGateway>,
    config: EngineConfig,
    sessions: SessionRegistry,
}

/// Detail values that carry their own freshness marker.
trait SectionValue {
    fn stamp(&mut self, now_ms: i64);
}

macro_rules! impl_section_value {
    ($($ty:ty),+) => {
        $(impl SectionValue for $ty {
            fn stamp(&mut self, now_ms: i64) {
                self.updated_at_ms = Some(now_ms);
            }
        })+
    };
}

impl_section_value!(
    CpuDetail,
    DiskHealthDetail,
    DiskSpaceDetail,
    DiskIoDetail,
    NetworkDetail,
    ProcessDetail
);

async fn run_if<T, F>(enabled: bool, collect: F) -> Option<Result<T, TransportError>>
where
    F: std::future::Future<Output = Result<T, TransportError>>,
{
    if enabled {
        Some(collect.await)
    } else {
        None
    }
}

/// Converts one basic-domain outcome into a snapshot part: fresh value,
/// cached value on recoverable failure, zero-value default when nothing
/// was ever cached. Disconnects bubble.
fn fallback<T: Default>(
    domain: &'static str,
    outcome: Result<T, TransportError>,
    cached: Option<T>,
) -> Result<T, EngineError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(err) if err.is_fatal() => Err(err.into()),
        Err(err) => {
            warn!(domain, error = %err, "basic collection failed; serving cached value");
            Ok(cached.unwrap_or_default())
        }
    }
}

fn merge_section<T: SectionValue>(
    cache: &mut SnapshotCache,
    section: DetailSection,
    outcome: Option<Result<T, TransportError>>,
    now: i64,
    select: impl FnOnce(&mut DetailSnapshot) -> &mut T,
) -> Result<(), EngineError> {
    match outcome {
        Some(Ok(mut value)) => {
            value.stamp(now);
            *select(&mut cache.detail) = value;
            cache.set_state(section, SectionState::Fresh);
            Ok(())
        }
        Some(Err(err)) if err.is_fatal() => Err(err.into()),
        Some(Err(err)) => {
            warn!(section = %section, error = %err, "detail collection failed; serving cached value");
            cache.set_state(section, SectionState::Stale);
            Ok(())
        }
        None => Ok(()),
    }
}

impl MetricsEngine {
    pub fn new(gateway: Arc<dyn CommandGateway>, config: EngineConfig) -> Self {
        Self {
            gateway,
            config,
            sessions: SessionRegistry::new(),
        }
    }

    fn ctx<'a>(&'a self, session_id: &'a str, state: &'a SessionState) -> Ctx<'a> {
        Ctx {
            gateway: self.gateway.as_ref(),
            session_id,
            state,
            config: &self.config,
        }
    }

    /// Collects the always-on tier. All four domains run concurrently;
    /// a domain that fails transiently is served from the last cached
    /// snapshot (or its zero-value default).
    ///
    /// Overlapping calls for the same session are not serialized: the
    /// per-entity rate baselines follow last-write-wins, so a caller that
    /// triggers concurrent refreshes accepts one transiently low rate
    /// reading on the affected entities.
    #[instrument(skip(self))]
    pub async fn collect_basic_metrics(
        &self,
        session_id: &str,
    ) -> Result<BasicSnapshot, EngineError> {
        let state = self.sessions.get_or_create(session_id);
        let ctx = self.ctx(session_id, state.as_ref());

        let (cpu, memory, disk, network) = tokio::join!(
            collectors::cpu::collect_basic(&ctx),
            collectors::memory::collect_basic(&ctx),
            collectors::disk::collect_basic(&ctx),
            collectors::network::collect_basic(&ctx),
        );

        let cached = state
            .cache
            .lock()
            .expect("snapshot cache lock poisoned")
            .basic
            .clone();

        let snapshot = BasicSnapshot {
            collected_at_ms: now_ms(),
            cpu: fallback("cpu", cpu, cached.as_ref().map(|c| c.cpu.clone()))?,
            memory: fallback("memory", memory, cached.as_ref().map(|c| c.memory.clone()))?,
            disk: fallback("disk", disk, cached.as_ref().map(|c| c.disk.clone()))?,
            network: fallback("network", network, cached.as_ref().map(|c| c.network.clone()))?,
        };

        state
            .cache
            .lock()
            .expect("snapshot cache lock poisoned")
            .basic = Some(snapshot.clone());

        Ok(snapshot)
    }

    /// Collects detail sub-sections. With `Some(section)` only that
    /// sub-section is recomputed; with `None` all of them are. Every
    /// sub-section not recomputed by this call is copied unchanged from
    /// the session cache into the returned snapshot.
    #[instrument(skip(self))]
    pub async fn collect_detail_metrics(
        &self,
        session_id: &str,
        section: Option<DetailSection>,
    ) -> Result<DetailSnapshot, EngineError> {
        let state = self.sessions.get_or_create(session_id);
        let ctx = self.ctx(session_id, state.as_ref());

        let targets: Vec<DetailSection> = match section {
            Some(section) => vec![section],
            None => DetailSection::ALL.to_vec(),
        };
        {
            let mut cache = state.cache.lock().expect("snapshot cache lock poisoned");
            for &target in &targets {
                cache.mark_activated(target);
                cache.set_state(target, SectionState::Refreshing);
            }
        }
        let wants = |section: DetailSection| targets.contains(&section);

        let (cpu, disk_health, disk_space, disk_io, network, process) = tokio::join!(
            run_if(wants(DetailSection::Cpu), collectors::cpu::collect_detail(&ctx)),
            run_if(
                wants(DetailSection::DiskHealth),
                collectors::disk::collect_health(&ctx)
            ),
            run_if(
                wants(DetailSection::DiskSpace),
                collectors::disk::collect_space(&ctx)
            ),
            run_if(
                wants(DetailSection::DiskIo),
                collectors::disk::collect_io(&ctx)
            ),
            run_if(
                wants(DetailSection::Network),
                collectors::network::collect_detail(&ctx)
            ),
            run_if(
                wants(DetailSection::Process),
                collectors::process::collect_detail(&ctx)
            ),
        );

        let now = now_ms();
        let mut cache = state.cache.lock().expect("snapshot cache lock poisoned");
        merge_section(&mut cache, DetailSection::Cpu, cpu, now, |d| &mut d.cpu)?;
        merge_section(&mut cache, DetailSection::DiskHealth, disk_health, now, |d| {
            &mut d.disk_health
        })?;
        merge_section(&mut cache, DetailSection::DiskSpace, disk_space, now, |d| {
            &mut d.disk_space
        })?;
        merge_section(&mut cache, DetailSection::DiskIo, disk_io, now, |d| {
            &mut d.disk_io
        })?;
        merge_section(&mut cache, DetailSection::Network, network, now, |d| {
            &mut d.network
        })?;
        merge_section(&mut cache, DetailSection::Process, process, now, |d| {
            &mut d.process
        })?;

        Ok(cache.detail.clone())
    }

    /// Releases all per-session counter state and cache. Idempotent.
    #[instrument(skip(self))]
    pub fn destroy(&self, session_id: &str) {
        if self.sessions.remove(session_id) {
            info!(session_id, "session state released");
        }
    }
}
