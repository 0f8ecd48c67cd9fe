//! Commands from the presentation layer and the tables sent back.
//!
//! The presentation layer never touches engine state directly: it
//! sends a `DashboardCommand` and renders the `CommandOutput`.

use crate::{
    aggregation::{
        self, CategoryFilter, CategoryMonth, CategorySummary, CumulativePoint, KeyMetrics,
        MonthlyTotal, PerformanceFilter, PivotCell, RevenueShare, SeasonalPoint, SortKey,
    },
    calculator::{TaxQuote, TaxRequest},
    engine::DashboardEngine,
    error::DashResult,
    history::HistoricalRecord,
    indicators::EconomicIndicator,
    product::Product,
    projection::ProjectionPoint,
    sector::Sector,
    snapshot::SnapshotRow,
    types::Tick,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DashboardCommand {
    // ── Refresh control ───────────────────────────
    Pause,
    Resume,
    Refresh,

    // ── Reference data ────────────────────────────
    Sectors,
    Products,
    Categories,
    Indicators,

    // ── Snapshot views ────────────────────────────
    KeyMetrics,
    SectorTable {
        #[serde(default)]
        category: CategoryFilter,
        #[serde(default)]
        performance: PerformanceFilter,
        #[serde(default = "default_sort")]
        sort: SortKey,
    },
    CategoryDetail {
        category: String,
    },
    CategorySummary,
    TopN {
        key: SortKey,
        n: usize,
    },
    RevenueShare,

    // ── Historical views ──────────────────────────
    History {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    MonthlyTotals {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    Cumulative,
    Pivot,
    Seasonality,
    CategoryEvolution,

    // ── Calculator and projections ────────────────
    CalculateTax(TaxRequest),
    Projection,
    ProjectionComparison,
}

fn default_sort() -> SortKey {
    SortKey::Revenue
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandOutput {
    Clock { tick: Tick, paused: bool },
    Sectors(Vec<Sector>),
    Products(Vec<Product>),
    Categories(Vec<String>),
    Indicators(Vec<EconomicIndicator>),
    KeyMetrics(KeyMetrics),
    Rows(Vec<SnapshotRow>),
    CategorySummary(Vec<CategorySummary>),
    RevenueShare(Vec<RevenueShare>),
    History(Vec<HistoricalRecord>),
    MonthlyTotals(Vec<MonthlyTotal>),
    Cumulative(Vec<CumulativePoint>),
    Pivot(Vec<PivotCell>),
    Seasonality(Vec<SeasonalPoint>),
    CategoryEvolution(Vec<CategoryMonth>),
    TaxQuote(TaxQuote),
    Projection(Vec<ProjectionPoint>),
}

impl DashboardCommand {
    pub fn execute(self, engine: &mut DashboardEngine) -> DashResult<CommandOutput> {
        let output = match self {
            Self::Pause => {
                engine.clock.pause();
                clock_state(engine)
            }
            Self::Resume => {
                engine.clock.resume();
                clock_state(engine)
            }
            Self::Refresh => {
                engine.tick()?;
                clock_state(engine)
            }

            Self::Sectors => CommandOutput::Sectors(engine.registry().iter().cloned().collect()),
            Self::Products => CommandOutput::Products(engine.catalog().products().to_vec()),
            Self::Categories => CommandOutput::Categories(engine.registry().categories()),
            Self::Indicators => CommandOutput::Indicators(engine.indicators().to_vec()),

            Self::KeyMetrics => {
                CommandOutput::KeyMetrics(aggregation::key_metrics(engine.snapshot().rows()))
            }
            Self::SectorTable { category, performance, sort } => {
                let rows = engine.snapshot().rows();
                owned(aggregation::sector_table(rows, &category, performance, sort))
            }
            Self::CategoryDetail { category } => {
                let rows = engine.snapshot().rows();
                let filter = CategoryFilter::Only(category);
                owned(aggregation::sector_table(rows, &filter, PerformanceFilter::All, SortKey::Revenue))
            }
            Self::CategorySummary => {
                CommandOutput::CategorySummary(aggregation::by_category(engine.snapshot().rows()))
            }
            Self::TopN { key, n } => owned(aggregation::top_n(engine.snapshot().rows(), key, n)),
            Self::RevenueShare => {
                CommandOutput::RevenueShare(aggregation::revenue_share(engine.snapshot().rows()))
            }

            Self::History { from, to } => {
                CommandOutput::History(windowed(engine, from, to)?.to_vec())
            }
            Self::MonthlyTotals { from, to } => {
                CommandOutput::MonthlyTotals(aggregation::monthly_totals(windowed(engine, from, to)?))
            }
            Self::Cumulative => {
                CommandOutput::Cumulative(aggregation::cumulative(engine.history().records()))
            }
            Self::Pivot => CommandOutput::Pivot(aggregation::month_year_pivot(engine.history().records())),
            Self::Seasonality => {
                CommandOutput::Seasonality(aggregation::seasonality_profile(engine.history().records()))
            }
            Self::CategoryEvolution => CommandOutput::CategoryEvolution(
                aggregation::category_evolution(engine.history().records()),
            ),

            Self::CalculateTax(request) => CommandOutput::TaxQuote(engine.calculate_tax(&request)?),
            Self::Projection => CommandOutput::Projection(engine.projection()?),
            Self::ProjectionComparison => CommandOutput::Projection(engine.projection_comparison()?),
        };
        Ok(output)
    }
}

fn clock_state(engine: &DashboardEngine) -> CommandOutput {
    CommandOutput::Clock {
        tick: engine.clock.current_tick,
        paused: engine.clock.paused,
    }
}

fn owned(rows: Vec<&SnapshotRow>) -> CommandOutput {
    CommandOutput::Rows(rows.into_iter().cloned().collect())
}

/// Missing bounds default to the ends of the generated span.
fn windowed(
    engine: &DashboardEngine,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> DashResult<&[HistoricalRecord]> {
    let range = engine.history().range();
    engine.history_window(from.unwrap_or(range.start()), to.unwrap_or(range.end()))
}
