//! Current-period snapshot: one row per registry sector.
//!
//! Built once from the tail of the historical series, then mutated in
//! place only by the live subsystem. Rows are never added or removed.

use crate::{
    error::{DashError, DashResult},
    history::HistoricalSeries,
    rng::RandomSource,
    sector::SectorRegistry,
    types::{RunId, SectorCode, Tick},
};
use serde::{Deserialize, Serialize};

/// Maximum absolute month-over-month change applied at build time.
pub const BUILD_CHANGE_BOUND: f64 = 0.08;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRow {
    pub sector_code:             SectorCode,
    pub name:                    String,
    pub category:                String,
    pub monthly_revenue:         f64,
    pub variation_pct:           f64,
    /// monthly_revenue − prior_year_revenue.
    pub variation_abs:           f64,
    pub import_volume:           f64,
    pub normal_rate:             f64,
    pub reduced_rate:            f64,
    pub specific_rate:           f64,
    pub weight:                  f64,
    pub prior_year_revenue:      f64,
    pub projection_current_year: f64,
}

impl SnapshotRow {
    /// Apply a fractional change to the monthly revenue and refresh
    /// the derived variation fields.
    pub fn apply_change(&mut self, change: f64) {
        self.monthly_revenue *= 1.0 + change;
        self.variation_pct = change * 100.0;
        self.variation_abs = self.monthly_revenue - self.prior_year_revenue;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    rows: Vec<SnapshotRow>,
}

impl Snapshot {
    /// Derive the current period from each sector's most recent
    /// historical record. A sector without history is an error.
    pub fn build<R: RandomSource>(
        registry: &SectorRegistry,
        history: &HistoricalSeries,
        rng: &mut R,
    ) -> DashResult<Self> {
        let mut rows = Vec::with_capacity(registry.len());
        for sector in registry.iter() {
            let last = history
                .latest_for(&sector.code)
                .ok_or_else(|| DashError::MissingHistory { code: sector.code.clone() })?;
            let last_revenue = last.revenue;

            let change = rng.uniform(-BUILD_CHANGE_BOUND, BUILD_CHANGE_BOUND);
            let import_volume = sector.import_volume * rng.uniform(0.8, 1.2);
            let prior_year_revenue = last_revenue * rng.uniform(0.9, 1.1);
            let projection_current_year = last_revenue * rng.uniform(1.05, 1.15);

            let monthly_revenue = last_revenue + last_revenue * change;
            rows.push(SnapshotRow {
                sector_code: sector.code.clone(),
                name: sector.name.clone(),
                category: sector.category.clone(),
                monthly_revenue,
                variation_pct: change * 100.0,
                variation_abs: monthly_revenue - prior_year_revenue,
                import_volume,
                normal_rate: sector.normal_rate,
                reduced_rate: sector.reduced_rate,
                specific_rate: sector.specific_rate,
                weight: sector.weight,
                prior_year_revenue,
                projection_current_year,
            });
        }
        let snapshot = Self { rows };
        log::info!(
            "Snapshot built: {} sectors, total monthly revenue {:.0}",
            snapshot.len(),
            snapshot.total_revenue()
        );
        Ok(snapshot)
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    /// Mutable rows for the live subsystem. The slice cannot grow or shrink.
    pub(crate) fn rows_mut(&mut self) -> &mut [SnapshotRow] {
        &mut self.rows
    }

    pub fn get(&self, code: &str) -> Option<&SnapshotRow> {
        self.rows.iter().find(|r| r.sector_code == code)
    }

    pub fn total_revenue(&self) -> f64 {
        self.rows.iter().map(|r| r.monthly_revenue).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A journaled copy of the snapshot, taken every `snapshot_interval` ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCheckpoint {
    pub run_id: RunId,
    pub tick:   Tick,
    pub rows:   Vec<SnapshotRow>,
}
