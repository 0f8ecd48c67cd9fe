//! Projection engine: compounds the current aggregate revenue forward.
//!
//! revenue_k = base × Π_{i=1..k} (1 + g_i),  g_i ~ U(0.01, 0.03)
//!
//! A fresh growth rate is drawn for every period.

use crate::{
    aggregation::MonthlyTotal,
    error::{DashError, DashResult},
    rng::RandomSource,
    types::add_months,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const PROJECTION_HORIZON: usize = 12;
pub const GROWTH_LOW: f64 = 0.01;
pub const GROWTH_HIGH: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesLabel {
    Historical,
    Projection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub month:   NaiveDate,
    pub revenue: f64,
    pub label:   SeriesLabel,
}

/// Project `horizon` months following `last_month`, starting from `base`.
pub fn project<R: RandomSource>(
    base: f64,
    last_month: NaiveDate,
    horizon: usize,
    rng: &mut R,
) -> DashResult<Vec<ProjectionPoint>> {
    if !base.is_finite() || base < 0.0 {
        return Err(DashError::invalid_input(
            "base_revenue",
            format!("must be a finite value >= 0, got {base}"),
        ));
    }
    let mut revenue = base;
    let points = (1..=horizon)
        .map(|k| {
            let growth = rng.uniform(GROWTH_LOW, GROWTH_HIGH);
            revenue *= 1.0 + growth;
            ProjectionPoint {
                month: add_months(last_month, k as u32),
                revenue,
                label: SeriesLabel::Projection,
            }
        })
        .collect();
    Ok(points)
}

/// The trailing `PROJECTION_HORIZON` historical monthly totals followed
/// by the projection, each tagged with its series label.
pub fn comparison_series(
    totals: &[MonthlyTotal],
    projection: &[ProjectionPoint],
) -> Vec<ProjectionPoint> {
    let tail = &totals[totals.len().saturating_sub(PROJECTION_HORIZON)..];
    tail.iter()
        .map(|t| ProjectionPoint {
            month: t.month,
            revenue: t.revenue,
            label: SeriesLabel::Historical,
        })
        .chain(projection.iter().cloned())
        .collect()
}
