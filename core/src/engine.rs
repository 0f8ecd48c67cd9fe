//! The dashboard engine: single owner of every piece of run state.
//!
//! BUILD ORDER (fixed, documented, never reordered):
//!   1. Sector registry and product catalog
//!   2. Historical series    (History slot)
//!   3. Current snapshot     (Snapshot slot)
//!
//! TICK ORDER:
//!   1. Live subsystem       (Live slot, reseeded per tick)
//!   2. Economic indicators  (Indicators slot, reseeded per tick)
//!   3. Checkpoint every `snapshot_interval` ticks, then prune the
//!      journal to its retention bounds
//!
//! RULES:
//!   - The snapshot is only ever mutated inside tick(), through the
//!     live subsystem, which holds it by exclusive reference.
//!   - Every other caller gets shared, read-only views.
//!   - All randomness flows through the RngBank.
//!   - Everything the engine emits is recorded in the journal.

use crate::{
    aggregation::monthly_totals,
    calculator::{self, TaxQuote, TaxRequest},
    clock::{Poll, SimClock},
    config::DashboardConfig,
    error::DashResult,
    event::{EventLogEntry, SimEvent},
    history::{HistoricalRecord, HistoricalSeries, HistoryGenerator, MonthRange},
    indicators::{sample_indicators, EconomicIndicator},
    live_subsystem::LiveSubsystem,
    product::ProductCatalog,
    projection::{self, ProjectionPoint, PROJECTION_HORIZON},
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    sector::SectorRegistry,
    snapshot::{Snapshot, SnapshotCheckpoint},
    store::SimStore,
    types::{RunId, Tick},
};
use chrono::{DateTime, NaiveDate, Utc};

const ENGINE_SOURCE: &str = "engine";

pub struct DashboardEngine {
    pub run_id:     RunId,
    pub clock:      SimClock,
    pub rng_bank:   RngBank,
    config:         DashboardConfig,
    registry:       SectorRegistry,
    catalog:        ProductCatalog,
    history:        HistoricalSeries,
    snapshot:       Snapshot,
    live:           LiveSubsystem,
    indicators:     Vec<EconomicIndicator>,
    projection_rng: SubsystemRng,
    store:          SimStore,
}

impl DashboardEngine {
    /// Build a fully initialized engine over the standard reference data.
    /// History spans `config.history_start` through the month of `as_of`.
    pub fn build(
        run_id: RunId,
        seed: u64,
        config: DashboardConfig,
        as_of: NaiveDate,
        store: SimStore,
    ) -> DashResult<Self> {
        let registry = SectorRegistry::standard();
        let catalog = ProductCatalog::standard(&registry)?;
        Self::build_with(run_id, seed, config, as_of, registry, catalog, store)
    }

    pub fn build_with(
        run_id: RunId,
        seed: u64,
        config: DashboardConfig,
        as_of: NaiveDate,
        registry: SectorRegistry,
        catalog: ProductCatalog,
        store: SimStore,
    ) -> DashResult<Self> {
        config.validate()?;
        let range = MonthRange::new(config.history_start, as_of)?;

        store.migrate()?;
        store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"), &as_of.to_string())?;

        let rng_bank = RngBank::new(seed);
        let mut history_rng = rng_bank.for_subsystem(SubsystemSlot::History);
        let history = HistoryGenerator::new(config.shock_year)
            .generate(&registry, range, &mut history_rng);

        let mut snapshot_rng = rng_bank.for_subsystem(SubsystemSlot::Snapshot);
        let snapshot = Snapshot::build(&registry, &history, &mut snapshot_rng)?;

        let mut indicator_rng = rng_bank.for_subsystem_at_tick(SubsystemSlot::Indicators, 0);
        let indicators = sample_indicators(&mut indicator_rng);

        let engine = Self {
            clock: SimClock::new(run_id.clone(), config.refresh_interval_secs),
            projection_rng: rng_bank.for_subsystem(SubsystemSlot::Projection),
            live: LiveSubsystem::new(config.live_change_probability),
            rng_bank,
            config,
            registry,
            catalog,
            history,
            snapshot,
            indicators,
            store,
            run_id,
        };

        engine.record(0, ENGINE_SOURCE, &SimEvent::RunInitialized {
            run_id: engine.run_id.clone(),
            seed,
        })?;
        engine.record(0, SubsystemSlot::History.name(), &SimEvent::HistoryGenerated {
            first_month: range.start(),
            last_month: range.end(),
            records: engine.history.len(),
        })?;
        engine.record(0, SubsystemSlot::Snapshot.name(), &SimEvent::SnapshotBuilt {
            sectors: engine.snapshot.len(),
            total_revenue: engine.snapshot.total_revenue(),
        })?;
        engine.take_checkpoint(0)?;

        log::info!(
            "Engine {} ready: seed {seed}, history {}..{}, {} sectors",
            engine.run_id,
            range.start(),
            range.end(),
            engine.registry.len()
        );
        Ok(engine)
    }

    /// Engine over an in-memory store, default config and a fixed
    /// reference date. Used by tests and tooling.
    pub fn build_test(run_id: RunId, seed: u64) -> DashResult<Self> {
        let as_of = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap_or(NaiveDate::MIN);
        Self::build(run_id, seed, DashboardConfig::default(), as_of, SimStore::in_memory()?)
    }

    pub fn new_run_id() -> RunId {
        format!("run-{}", uuid::Uuid::new_v4())
    }

    // ── Ticking ────────────────────────────────────────────────

    /// Advance one tick. Always permitted, whether or not the
    /// scheduled refresh is paused.
    pub fn tick(&mut self) -> DashResult<Vec<SimEvent>> {
        let tick = self.clock.advance();
        let mut events = vec![SimEvent::TickStarted { tick }];
        self.record(tick, ENGINE_SOURCE, &events[0])?;

        let mut rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Live, tick);
        let live_events = self.live.update(tick, &mut self.snapshot, &mut rng);
        for event in &live_events {
            self.record(tick, self.live.name(), event)?;
        }
        events.extend(live_events);

        let mut rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Indicators, tick);
        self.indicators = sample_indicators(&mut rng);
        let refreshed = SimEvent::IndicatorsRefreshed { tick, count: self.indicators.len() };
        self.record(tick, SubsystemSlot::Indicators.name(), &refreshed)?;
        events.push(refreshed);

        let completed = SimEvent::TickCompleted { tick };
        self.record(tick, ENGINE_SOURCE, &completed)?;
        events.push(completed);

        if tick % self.config.snapshot_interval == 0 {
            self.take_checkpoint(tick)?;
            let keep_from = tick.saturating_sub(self.config.journal_retention_ticks);
            self.store.prune(&self.run_id, keep_from, self.config.checkpoint_retention)?;
        }
        Ok(events)
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> DashResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    /// Scheduled refresh. Runs at most one tick; overdue periods are
    /// dropped and journaled.
    pub fn poll(&mut self, now: DateTime<Utc>) -> DashResult<Option<Vec<SimEvent>>> {
        match self.clock.poll(now) {
            Poll::Idle => Ok(None),
            Poll::Due { skipped } => {
                if skipped > 0 {
                    log::warn!("Refresh overran: dropped {skipped} scheduled tick(s)");
                    let tick = self.clock.current_tick;
                    self.record(tick, ENGINE_SOURCE, &SimEvent::RefreshSkipped { tick, skipped })?;
                }
                self.tick().map(Some)
            }
        }
    }

    // ── Read-only views ────────────────────────────────────────

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn registry(&self) -> &SectorRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &HistoricalSeries {
        &self.history
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn indicators(&self) -> &[EconomicIndicator] {
        &self.indicators
    }

    /// History clamped to a presentation date window.
    pub fn history_window(&self, from: NaiveDate, to: NaiveDate) -> DashResult<&[HistoricalRecord]> {
        self.history.window(from, to)
    }

    // ── Requests ───────────────────────────────────────────────

    pub fn calculate_tax(&self, request: &TaxRequest) -> DashResult<TaxQuote> {
        let quote = calculator::calculate(&self.registry, &self.catalog, request)?;
        let tick = self.clock.current_tick;
        self.record(tick, "calculator", &SimEvent::TaxCalculated {
            tick,
            product: quote.product.clone(),
            tier: quote.tier,
            amount: quote.amount,
        })?;
        Ok(quote)
    }

    /// Compound the current snapshot total forward over the fixed horizon.
    pub fn projection(&mut self) -> DashResult<Vec<ProjectionPoint>> {
        let base = self.snapshot.total_revenue();
        let last_month = self.history.last_month().unwrap_or(self.history.range().end());
        let points = projection::project(base, last_month, PROJECTION_HORIZON, &mut self.projection_rng)?;

        let tick = self.clock.current_tick;
        self.record(tick, SubsystemSlot::Projection.name(), &SimEvent::ProjectionGenerated {
            tick,
            base_revenue: base,
            final_revenue: points.last().map_or(base, |p| p.revenue),
            horizon: points.len(),
        })?;
        Ok(points)
    }

    /// Trailing twelve historical months followed by a fresh projection.
    pub fn projection_comparison(&mut self) -> DashResult<Vec<ProjectionPoint>> {
        let projection = self.projection()?;
        let totals = monthly_totals(self.history.records());
        Ok(projection::comparison_series(&totals, &projection))
    }

    // ── Journal ────────────────────────────────────────────────

    /// Query events for a specific tick from the store.
    pub fn store_events_for_tick(&self, tick: Tick) -> DashResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(&self.run_id, tick)
    }

    pub fn store_event_count(&self, event_type: &str) -> DashResult<i64> {
        self.store.event_count(&self.run_id, event_type)
    }

    /// (event rows, checkpoint rows) currently held in the journal.
    pub fn journal_size(&self) -> DashResult<(i64, i64)> {
        self.store.journal_size(&self.run_id)
    }

    /// Most recent snapshot checkpoint at or before `tick`.
    pub fn checkpoint_at(&self, tick: Tick) -> DashResult<Option<SnapshotCheckpoint>> {
        match self.store.latest_snapshot_before(&self.run_id, tick)? {
            Some((_, json)) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn record(&self, tick: Tick, source: &str, event: &SimEvent) -> DashResult<()> {
        let entry = EventLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            tick,
            source:     source.to_string(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        };
        self.store.append_event(&entry)
    }

    fn take_checkpoint(&self, tick: Tick) -> DashResult<()> {
        let checkpoint = SnapshotCheckpoint {
            run_id: self.run_id.clone(),
            tick,
            rows:   self.snapshot.rows().to_vec(),
        };
        let json = serde_json::to_string(&checkpoint)?;
        self.store.save_snapshot(&self.run_id, tick, &json)?;
        log::debug!("Snapshot checkpoint saved at tick {tick}");
        Ok(())
    }
}
