//! Historical generator: a monthly revenue series per sector.
//!
//! revenue = weight × U(0.8,1.2) × 1e6 × shock × seasonal × noise
//!
//! The series is generated eagerly, once, and is read-only afterwards.
//! Records are ordered month-major, then by sector code, so every
//! sector's sub-series is strictly chronological with no gaps.

use crate::{
    error::{DashError, DashResult},
    rng::RandomSource,
    sector::{Sector, SectorRegistry},
    types::{add_months, month_start, SectorCode},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const REVENUE_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalRecord {
    /// First day of the month.
    pub month:         NaiveDate,
    pub sector_code:   SectorCode,
    pub revenue:       f64,
    pub import_volume: f64,
    pub category:      String,
    pub average_rate:  f64,
}

/// Inclusive range of months, both ends normalized to first-of-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    start: NaiveDate,
    end:   NaiveDate,
}

impl MonthRange {
    /// A range whose start and end fall in the same month is a single
    /// anchor month. An end before the start is rejected.
    pub fn new(start: NaiveDate, end: NaiveDate) -> DashResult<Self> {
        let (start, end) = (month_start(start), month_start(end));
        if end < start {
            return Err(DashError::invalid_input(
                "date_range",
                format!("end {end} precedes start {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate { self.start }
    pub fn end(&self)   -> NaiveDate { self.end }

    pub fn months(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            months.push(current);
            let next = add_months(current, 1);
            if next == current {
                break;
            }
            current = next;
        }
        months
    }

    pub fn len(&self) -> usize {
        let years = self.end.year() - self.start.year();
        let months = self.end.month() as i32 - self.start.month() as i32;
        (years * 12 + months + 1) as usize
    }

    /// Always false: `new` guarantees at least the anchor month.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Position of a month on the shock-and-recovery curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockPhase {
    /// January–June of the shock year.
    Onset,
    /// July–December of the shock year.
    Easing,
    /// The year after the shock.
    Recovery,
    /// Every other period.
    Baseline,
}

impl ShockPhase {
    pub fn for_month(shock_year: i32, month: NaiveDate) -> Self {
        match month.year() {
            y if y == shock_year && month.month() <= 6 => Self::Onset,
            y if y == shock_year => Self::Easing,
            y if y == shock_year + 1 => Self::Recovery,
            _ => Self::Baseline,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Onset    => (0.3, 0.7),
            Self::Easing   => (0.7, 0.9),
            Self::Recovery => (0.9, 1.1),
            Self::Baseline => (1.0, 1.3),
        }
    }
}

/// Austral calendar season of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// December, January, February.
    Summer,
    /// June, July, August.
    Winter,
    Shoulder,
}

impl Season {
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Summer,
            6..=8 => Self::Winter,
            _ => Self::Shoulder,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Summer   => (1.1, 1.3),
            Self::Winter   => (0.9, 1.1),
            Self::Shoulder => (0.95, 1.05),
        }
    }
}

pub struct HistoryGenerator {
    shock_year: i32,
}

impl HistoryGenerator {
    pub fn new(shock_year: i32) -> Self {
        Self { shock_year }
    }

    pub fn generate<R: RandomSource>(
        &self,
        registry: &SectorRegistry,
        range: MonthRange,
        rng: &mut R,
    ) -> HistoricalSeries {
        let months = range.months();
        let mut records = Vec::with_capacity(months.len() * registry.len());
        for month in months {
            for sector in registry.iter() {
                records.push(self.record(sector, month, rng));
            }
        }
        log::info!(
            "Generated {} historical records ({} months x {} sectors)",
            records.len(),
            range.len(),
            registry.len()
        );
        HistoricalSeries { range, records }
    }

    fn record<R: RandomSource>(&self, sector: &Sector, month: NaiveDate, rng: &mut R) -> HistoricalRecord {
        let base = sector.weight * rng.uniform(0.8, 1.2) * REVENUE_SCALE;

        let (lo, hi) = ShockPhase::for_month(self.shock_year, month).range();
        let shock = rng.uniform(lo, hi);

        let (lo, hi) = Season::for_month(month.month()).range();
        let seasonal = rng.uniform(lo, hi);

        let noise = rng.uniform(0.95, 1.05);

        HistoricalRecord {
            month,
            sector_code: sector.code.clone(),
            revenue: base * shock * seasonal * noise,
            import_volume: sector.import_volume * rng.uniform(0.8, 1.2),
            category: sector.category.clone(),
            average_rate: sector.normal_rate * rng.uniform(0.9, 1.1),
        }
    }
}

/// The full generated series. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalSeries {
    range:   MonthRange,
    records: Vec<HistoricalRecord>,
}

impl HistoricalSeries {
    pub fn range(&self) -> MonthRange {
        self.range
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_sector<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a HistoricalRecord> {
        self.records.iter().filter(move |r| r.sector_code == code)
    }

    pub fn latest_for(&self, code: &str) -> Option<&HistoricalRecord> {
        self.records.iter().rev().find(|r| r.sector_code == code)
    }

    pub fn last_month(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.month)
    }

    /// The contiguous slice of records whose month lies in `[from, to]`.
    /// Bounds are clamped to the generated span; `from > to` is rejected.
    pub fn window(&self, from: NaiveDate, to: NaiveDate) -> DashResult<&[HistoricalRecord]> {
        let window = MonthRange::new(from, to)?;
        let lo = self.records.partition_point(|r| r.month < window.start());
        let hi = self.records.partition_point(|r| r.month <= window.end());
        Ok(&self.records[lo..hi])
    }
}
