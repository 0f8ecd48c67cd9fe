//! Journal events: everything the engine does is recorded as one of these.
//!
//! RULE: Components never write to the journal themselves.
//! They return events; the engine appends them to the store.

use crate::{
    sector::RateTier,
    types::{RunId, SectorCode, Tick},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RefreshSkipped {
        tick: Tick,
        skipped: u64,
    },

    // ── Build events ───────────────────────────────
    HistoryGenerated {
        first_month: NaiveDate,
        last_month: NaiveDate,
        records: usize,
    },
    SnapshotBuilt {
        sectors: usize,
        total_revenue: f64,
    },

    // ── Live events ────────────────────────────────
    SectorRevenueUpdated {
        tick: Tick,
        sector_code: SectorCode,
        monthly_revenue: f64,
        variation_pct: f64,
        import_volume: f64,
    },
    IndicatorsRefreshed {
        tick: Tick,
        count: usize,
    },

    // ── Request events ─────────────────────────────
    ProjectionGenerated {
        tick: Tick,
        base_revenue: f64,
        final_revenue: f64,
        horizon: usize,
    },
    TaxCalculated {
        tick: Tick,
        product: String,
        tier: RateTier,
        amount: f64,
    },
}

impl SimEvent {
    /// Stable string name, used for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }       => "run_initialized",
            Self::TickStarted { .. }          => "tick_started",
            Self::TickCompleted { .. }        => "tick_completed",
            Self::RefreshSkipped { .. }       => "refresh_skipped",
            Self::HistoryGenerated { .. }     => "history_generated",
            Self::SnapshotBuilt { .. }        => "snapshot_built",
            Self::SectorRevenueUpdated { .. } => "sector_revenue_updated",
            Self::IndicatorsRefreshed { .. }  => "indicators_refreshed",
            Self::ProjectionGenerated { .. }  => "projection_generated",
            Self::TaxCalculated { .. }        => "tax_calculated",
        }
    }
}

/// One persisted row of the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub tick:       Tick,
    pub source:     String,
    pub event_type: String,
    pub payload:    String,
}
