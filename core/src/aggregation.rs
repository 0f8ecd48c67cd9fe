//! Aggregation engine: read-only tables over the historical series
//! and the snapshot.
//!
//! Every function is pure and deterministic given its inputs.
//! An empty input yields an empty table, never an error.

use crate::{
    history::HistoricalRecord,
    snapshot::SnapshotRow,
    types::SectorCode,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap};

// ── Historical aggregations ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTotal {
    pub month:   NaiveDate,
    pub revenue: f64,
}

/// Total revenue per month across all sectors, chronological.
pub fn monthly_totals(records: &[HistoricalRecord]) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.month).or_insert(0.0) += r.revenue;
    }
    totals
        .into_iter()
        .map(|(month, revenue)| MonthlyTotal { month, revenue })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CumulativePoint {
    pub month:      NaiveDate,
    pub revenue:    f64,
    pub cumulative: f64,
}

/// Running sum of monthly totals in chronological order.
pub fn cumulative(records: &[HistoricalRecord]) -> Vec<CumulativePoint> {
    let mut running = 0.0;
    monthly_totals(records)
        .into_iter()
        .map(|t| {
            running += t.revenue;
            CumulativePoint { month: t.month, revenue: t.revenue, cumulative: running }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PivotCell {
    pub year:    i32,
    pub month:   u32,
    pub revenue: f64,
}

/// Revenue totals keyed by (year, month). Only months present in the
/// input produce a cell.
pub fn month_year_pivot(records: &[HistoricalRecord]) -> Vec<PivotCell> {
    let mut cells: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for r in records {
        *cells.entry((r.month.year(), r.month.month())).or_insert(0.0) += r.revenue;
    }
    cells
        .into_iter()
        .map(|((year, month), revenue)| PivotCell { year, month, revenue })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonalPoint {
    /// Calendar month, 1–12.
    pub month:        u32,
    /// Mean revenue of all records falling in this calendar month;
    /// None when the series never covers it.
    pub mean_revenue: Option<f64>,
    pub observations: usize,
}

/// Mean record revenue per calendar month across all years.
/// Always 12 entries for a non-empty series.
pub fn seasonality_profile(records: &[HistoricalRecord]) -> Vec<SeasonalPoint> {
    if records.is_empty() {
        return Vec::new();
    }
    let mut sums = [(0.0_f64, 0_usize); 12];
    for r in records {
        let slot = &mut sums[r.month.month0() as usize];
        slot.0 += r.revenue;
        slot.1 += 1;
    }
    sums.iter()
        .enumerate()
        .map(|(i, &(sum, n))| SeasonalPoint {
            month: i as u32 + 1,
            mean_revenue: (n > 0).then(|| sum / n as f64),
            observations: n,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryMonth {
    pub month:    NaiveDate,
    pub category: String,
    pub revenue:  f64,
}

/// Historical revenue per (month, category).
pub fn category_evolution(records: &[HistoricalRecord]) -> Vec<CategoryMonth> {
    let mut totals: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    for r in records {
        *totals.entry((r.month, r.category.as_str())).or_insert(0.0) += r.revenue;
    }
    totals
        .into_iter()
        .map(|((month, category), revenue)| CategoryMonth {
            month,
            category: category.to_string(),
            revenue,
        })
        .collect()
}

// ── Snapshot aggregations ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub category:           String,
    pub mean_variation_pct: f64,
    pub total_revenue:      f64,
    pub total_volume:       f64,
    pub sector_count:       usize,
}

/// Mean variation and summed revenue/volume per category, by name.
pub fn by_category(rows: &[SnapshotRow]) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, Vec<&SnapshotRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.category.as_str()).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|(category, members)| {
            let n = members.len() as f64;
            CategorySummary {
                category: category.to_string(),
                mean_variation_pct: members.iter().map(|r| r.variation_pct).sum::<f64>() / n,
                total_revenue: members.iter().map(|r| r.monthly_revenue).sum(),
                total_volume: members.iter().map(|r| r.import_volume).sum(),
                sector_count: members.len(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Revenue,
    Variation,
    Volume,
    Rate,
}

impl SortKey {
    fn value(&self, row: &SnapshotRow) -> f64 {
        match self {
            Self::Revenue   => row.monthly_revenue,
            Self::Variation => row.variation_pct,
            Self::Volume    => row.import_volume,
            Self::Rate      => row.normal_rate,
        }
    }
}

/// Descending by key; ties broken by sector code ascending.
fn ranking(key: SortKey) -> impl Fn(&&SnapshotRow, &&SnapshotRow) -> Ordering {
    move |a: &&SnapshotRow, b: &&SnapshotRow| {
        key.value(b)
            .total_cmp(&key.value(a))
            .then_with(|| a.sector_code.cmp(&b.sector_code))
    }
}

/// The `n` highest rows by `key`.
pub fn top_n(rows: &[SnapshotRow], key: SortKey, n: usize) -> Vec<&SnapshotRow> {
    let mut ranked: Vec<&SnapshotRow> = rows.iter().collect();
    ranked.sort_by(ranking(key));
    ranked.truncate(n);
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// "all" (any case) or empty selects everything.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }

    fn matches(&self, row: &SnapshotRow) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => &row.category == category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceFilter {
    #[default]
    All,
    Growth,
    Decline,
    Stable,
}

impl PerformanceFilter {
    fn matches(&self, row: &SnapshotRow) -> bool {
        match self {
            Self::All     => true,
            Self::Growth  => row.variation_pct > 0.0,
            Self::Decline => row.variation_pct < 0.0,
            Self::Stable  => row.variation_pct == 0.0,
        }
    }
}

/// Filtered and ranked sector table.
pub fn sector_table<'a>(
    rows: &'a [SnapshotRow],
    category: &CategoryFilter,
    performance: PerformanceFilter,
    sort: SortKey,
) -> Vec<&'a SnapshotRow> {
    let mut table: Vec<&SnapshotRow> = rows
        .iter()
        .filter(|r| category.matches(r) && performance.matches(r))
        .collect();
    table.sort_by(ranking(sort));
    table
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueShare {
    pub sector_code: SectorCode,
    pub revenue:     f64,
    pub share_pct:   f64,
}

/// Each row's share of total snapshot revenue.
pub fn revenue_share(rows: &[SnapshotRow]) -> Vec<RevenueShare> {
    let total: f64 = rows.iter().map(|r| r.monthly_revenue).sum();
    rows.iter()
        .map(|r| RevenueShare {
            sector_code: r.sector_code.clone(),
            revenue: r.monthly_revenue,
            share_pct: if total > 0.0 { r.monthly_revenue / total * 100.0 } else { 0.0 },
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct KeyMetrics {
    pub total_revenue:            f64,
    pub mean_variation_pct:       f64,
    pub total_volume:             f64,
    pub growing_sectors:          usize,
    pub sector_count:             usize,
    pub projected_annual_revenue: f64,
}

/// Headline figures over the snapshot. All zero for an empty snapshot.
pub fn key_metrics(rows: &[SnapshotRow]) -> KeyMetrics {
    if rows.is_empty() {
        return KeyMetrics::default();
    }
    let total_revenue: f64 = rows.iter().map(|r| r.monthly_revenue).sum();
    KeyMetrics {
        total_revenue,
        mean_variation_pct: rows.iter().map(|r| r.variation_pct).sum::<f64>() / rows.len() as f64,
        total_volume: rows.iter().map(|r| r.import_volume).sum(),
        growing_sectors: rows.iter().filter(|r| r.variation_pct > 0.0).count(),
        sector_count: rows.len(),
        projected_annual_revenue: total_revenue * 12.0,
    }
}
