//! Aggregation engine tests.

use chrono::NaiveDate;
use octroi_core::{
    aggregation::{
        by_category, category_evolution, cumulative, key_metrics, month_year_pivot,
        monthly_totals, revenue_share, seasonality_profile, sector_table, top_n, CategoryFilter,
        PerformanceFilter, SortKey,
    },
    engine::DashboardEngine,
    snapshot::SnapshotRow,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(code: &str, category: &str, revenue: f64, variation_pct: f64) -> SnapshotRow {
    SnapshotRow {
        sector_code: code.into(),
        name: code.into(),
        category: category.into(),
        monthly_revenue: revenue,
        variation_pct,
        variation_abs: 0.0,
        import_volume: revenue / 10.0,
        normal_rate: 2.0,
        reduced_rate: 1.0,
        specific_rate: 0.0,
        weight: 1.0,
        prior_year_revenue: revenue,
        projection_current_year: revenue,
    }
}

/// Per-category revenue sums back to the snapshot's grand total.
#[test]
fn category_totals_sum_to_grand_total() {
    let engine = DashboardEngine::build_test("agg-category".into(), 42).unwrap();
    let rows = engine.snapshot().rows();

    let summaries = by_category(rows);
    let by_category_total: f64 = summaries.iter().map(|c| c.total_revenue).sum();
    let grand_total = key_metrics(rows).total_revenue;

    assert!((by_category_total - grand_total).abs() < 1e-6 * grand_total);
    assert_eq!(summaries.iter().map(|c| c.sector_count).sum::<usize>(), rows.len());
}

#[test]
fn category_mean_variation() {
    let rows = vec![
        row("A", "Food", 100.0, 2.0),
        row("B", "Food", 300.0, -4.0),
        row("C", "Energy", 50.0, 1.0),
    ];
    let summaries = by_category(&rows);

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].category, "Energy");
    assert_eq!(summaries[1].category, "Food");
    assert_eq!(summaries[1].mean_variation_pct, -1.0);
    assert_eq!(summaries[1].total_revenue, 400.0);
}

/// Ties on the metric fall back to ascending sector code.
#[test]
fn top_n_breaks_ties_by_code() {
    let rows = vec![
        row("ZETA", "X", 500.0, 0.0),
        row("ALPHA", "X", 500.0, 0.0),
        row("MID", "X", 900.0, 0.0),
        row("LOW", "X", 10.0, 0.0),
    ];
    let top: Vec<&str> = top_n(&rows, SortKey::Revenue, 3)
        .iter()
        .map(|r| r.sector_code.as_str())
        .collect();
    assert_eq!(top, vec!["MID", "ALPHA", "ZETA"]);
}

#[test]
fn top_n_is_repeatable() {
    let engine = DashboardEngine::build_test("agg-top".into(), 3).unwrap();
    let rows = engine.snapshot().rows();
    for key in [SortKey::Revenue, SortKey::Variation, SortKey::Volume, SortKey::Rate] {
        let first: Vec<&str> = top_n(rows, key, 3).iter().map(|r| r.sector_code.as_str()).collect();
        let second: Vec<&str> = top_n(rows, key, 3).iter().map(|r| r.sector_code.as_str()).collect();
        assert_eq!(first, second, "{key:?} ordering changed between calls");
        assert_eq!(first.len(), 3);
    }
}

#[test]
fn top_n_larger_than_table_returns_everything() {
    let rows = vec![row("A", "X", 1.0, 0.0), row("B", "X", 2.0, 0.0)];
    assert_eq!(top_n(&rows, SortKey::Revenue, 10).len(), 2);
}

#[test]
fn monthly_totals_cover_every_month_in_order() {
    let engine = DashboardEngine::build_test("agg-monthly".into(), 9).unwrap();
    let totals = monthly_totals(engine.history().records());

    assert_eq!(totals.len(), 60);
    assert_eq!(totals[0].month, ymd(2020, 1, 1));
    assert_eq!(totals[59].month, ymd(2024, 12, 1));
    assert!(totals.windows(2).all(|w| w[0].month < w[1].month));

    let first_month: f64 = engine
        .history()
        .records()
        .iter()
        .filter(|r| r.month == ymd(2020, 1, 1))
        .map(|r| r.revenue)
        .sum();
    assert!((totals[0].revenue - first_month).abs() < 1e-6);
}

#[test]
fn cumulative_is_running_sum() {
    let engine = DashboardEngine::build_test("agg-cumulative".into(), 4).unwrap();
    let records = engine.history().records();
    let points = cumulative(records);
    let total: f64 = records.iter().map(|r| r.revenue).sum();

    assert!(points.windows(2).all(|w| w[1].cumulative > w[0].cumulative));
    let last = points.last().unwrap();
    assert!((last.cumulative - total).abs() < 1e-6 * total);
}

/// Only months present in the input become cells.
#[test]
fn pivot_has_no_zero_filled_cells() {
    let engine = DashboardEngine::build_test("agg-pivot".into(), 12).unwrap();
    let full = month_year_pivot(engine.history().records());
    assert_eq!(full.len(), 60);

    let window = engine.history_window(ymd(2022, 11, 1), ymd(2023, 1, 1)).unwrap();
    let cells = month_year_pivot(window);
    let keys: Vec<(i32, u32)> = cells.iter().map(|c| (c.year, c.month)).collect();
    assert_eq!(keys, vec![(2022, 11), (2022, 12), (2023, 1)]);
    assert!(cells.iter().all(|c| c.revenue > 0.0));
}

#[test]
fn seasonality_always_twelve_months() {
    let engine = DashboardEngine::build_test("agg-season".into(), 21).unwrap();
    let profile = seasonality_profile(engine.history().records());

    assert_eq!(profile.len(), 12);
    assert_eq!(profile.iter().map(|p| p.month).collect::<Vec<_>>(), (1..=12).collect::<Vec<_>>());
    // Five years × ten sectors per calendar month.
    assert!(profile.iter().all(|p| p.observations == 50 && p.mean_revenue.is_some()));

    let window = engine.history_window(ymd(2023, 3, 1), ymd(2023, 5, 1)).unwrap();
    let partial = seasonality_profile(window);
    assert_eq!(partial.len(), 12);
    assert_eq!(partial.iter().filter(|p| p.mean_revenue.is_some()).count(), 3);
}

/// Outside the shock years, summer months out-earn winter months.
#[test]
fn seasonality_reflects_austral_summer() {
    let engine = DashboardEngine::build_test("agg-summer".into(), 8).unwrap();
    let window = engine.history_window(ymd(2022, 1, 1), ymd(2024, 12, 1)).unwrap();
    let profile = seasonality_profile(window);
    let mean = |months: &[usize]| {
        months.iter().map(|&m| profile[m - 1].mean_revenue.unwrap()).sum::<f64>() / months.len() as f64
    };
    let summer = mean(&[12, 1, 2]);
    let winter = mean(&[6, 7, 8]);
    assert!(summer > winter, "summer {summer:.0} should exceed winter {winter:.0}");
}

#[test]
fn category_evolution_sums_to_monthly_totals() {
    let engine = DashboardEngine::build_test("agg-evolution".into(), 2).unwrap();
    let records = engine.history().records();
    let evolution = category_evolution(records);
    let totals = monthly_totals(records);

    let categories = engine.registry().categories().len();
    assert_eq!(evolution.len(), totals.len() * categories);
    for total in &totals {
        let sum: f64 = evolution.iter().filter(|c| c.month == total.month).map(|c| c.revenue).sum();
        assert!((sum - total.revenue).abs() < 1e-6 * total.revenue);
    }
}

#[test]
fn sector_table_filters_and_sorts() {
    let rows = vec![
        row("A", "Food", 100.0, 2.0),
        row("B", "Food", 300.0, -4.0),
        row("C", "Energy", 50.0, 1.0),
        row("D", "Food", 200.0, 0.0),
    ];

    let growth = sector_table(&rows, &CategoryFilter::All, PerformanceFilter::Growth, SortKey::Variation);
    assert_eq!(growth.iter().map(|r| r.sector_code.as_str()).collect::<Vec<_>>(), vec!["A", "C"]);

    let food = sector_table(&rows, &CategoryFilter::parse("Food"), PerformanceFilter::All, SortKey::Revenue);
    assert_eq!(food.iter().map(|r| r.sector_code.as_str()).collect::<Vec<_>>(), vec!["B", "D", "A"]);

    let stable = sector_table(&rows, &CategoryFilter::parse("all"), PerformanceFilter::Stable, SortKey::Revenue);
    assert_eq!(stable.len(), 1);
    assert_eq!(stable[0].sector_code, "D");

    let decline = sector_table(&rows, &CategoryFilter::All, PerformanceFilter::Decline, SortKey::Revenue);
    assert_eq!(decline.len(), 1);

    let unknown = sector_table(&rows, &CategoryFilter::parse("Mining"), PerformanceFilter::All, SortKey::Revenue);
    assert!(unknown.is_empty());
}

#[test]
fn key_metrics_headline_figures() {
    let rows = vec![row("A", "Food", 100.0, 2.0), row("B", "Food", 300.0, -4.0)];
    let metrics = key_metrics(&rows);
    assert_eq!(metrics.total_revenue, 400.0);
    assert_eq!(metrics.mean_variation_pct, -1.0);
    assert_eq!(metrics.total_volume, 40.0);
    assert_eq!(metrics.growing_sectors, 1);
    assert_eq!(metrics.sector_count, 2);
    assert_eq!(metrics.projected_annual_revenue, 4800.0);
}

#[test]
fn revenue_shares_sum_to_hundred() {
    let engine = DashboardEngine::build_test("agg-share".into(), 30).unwrap();
    let shares = revenue_share(engine.snapshot().rows());
    let total: f64 = shares.iter().map(|s| s.share_pct).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

/// Empty input is an empty result, never an error.
#[test]
fn empty_inputs_give_empty_tables() {
    assert!(monthly_totals(&[]).is_empty());
    assert!(cumulative(&[]).is_empty());
    assert!(month_year_pivot(&[]).is_empty());
    assert!(seasonality_profile(&[]).is_empty());
    assert!(category_evolution(&[]).is_empty());
    assert!(by_category(&[]).is_empty());
    assert!(top_n(&[], SortKey::Revenue, 3).is_empty());
    assert!(revenue_share(&[]).is_empty());
    assert!(sector_table(&[], &CategoryFilter::All, PerformanceFilter::All, SortKey::Rate).is_empty());
    assert_eq!(key_metrics(&[]).sector_count, 0);
}
