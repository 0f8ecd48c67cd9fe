//! JSON command surface used by the presentation layer.

use octroi_core::{
    command::{CommandOutput, DashboardCommand},
    engine::DashboardEngine,
    error::ErrorKind,
};

fn run(engine: &mut DashboardEngine, json: &str) -> CommandOutput {
    let command: DashboardCommand = serde_json::from_str(json).expect("parse command");
    command.execute(engine).expect("execute command")
}

#[test]
fn pause_resume_and_refresh() {
    let mut engine = DashboardEngine::build_test("cmd-clock".into(), 1).unwrap();

    let out = run(&mut engine, r#"{"cmd":"pause"}"#);
    assert!(matches!(out, CommandOutput::Clock { tick: 0, paused: true }));

    let out = run(&mut engine, r#"{"cmd":"refresh"}"#);
    assert!(matches!(out, CommandOutput::Clock { tick: 1, paused: true }));

    let out = run(&mut engine, r#"{"cmd":"resume"}"#);
    assert!(matches!(out, CommandOutput::Clock { tick: 1, paused: false }));
}

#[test]
fn sector_table_with_defaults_and_filters() {
    let mut engine = DashboardEngine::build_test("cmd-table".into(), 2).unwrap();

    let CommandOutput::Rows(all) = run(&mut engine, r#"{"cmd":"sector_table"}"#) else {
        panic!("expected rows");
    };
    assert_eq!(all.len(), 10);
    assert!(all.windows(2).all(|w| w[0].monthly_revenue >= w[1].monthly_revenue));

    let CommandOutput::Rows(food) = run(
        &mut engine,
        r#"{"cmd":"sector_table","category":{"kind":"only","name":"Food"},"sort":"rate"}"#,
    ) else {
        panic!("expected rows");
    };
    assert_eq!(food.len(), 3);
    assert_eq!(food[0].sector_code, "BEVERAGES");
}

#[test]
fn category_detail_and_summary() {
    let mut engine = DashboardEngine::build_test("cmd-category".into(), 3).unwrap();

    let CommandOutput::Rows(industry) =
        run(&mut engine, r#"{"cmd":"category_detail","category":"Industry"}"#)
    else {
        panic!("expected rows");
    };
    let mut codes: Vec<&str> = industry.iter().map(|r| r.sector_code.as_str()).collect();
    codes.sort();
    assert_eq!(codes, vec!["CAPITAL_GOODS", "CONSTRUCTION"]);

    let CommandOutput::CategorySummary(summary) = run(&mut engine, r#"{"cmd":"category_summary"}"#)
    else {
        panic!("expected summary");
    };
    assert_eq!(summary.len(), 7);
}

#[test]
fn calculate_tax_command() {
    let mut engine = DashboardEngine::build_test("cmd-tax".into(), 4).unwrap();
    let out = run(
        &mut engine,
        r#"{"cmd":"calculate_tax","product":"Fruit and vegetables","declared_value":1000.0,"tier":"normal"}"#,
    );
    let CommandOutput::TaxQuote(quote) = out else {
        panic!("expected quote");
    };
    assert_eq!(quote.amount, 25.0);

    let bad: DashboardCommand = serde_json::from_str(
        r#"{"cmd":"calculate_tax","product":"Fuels","declared_value":-3.0,"tier":"normal"}"#,
    )
    .unwrap();
    assert_eq!(bad.execute(&mut engine).unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[test]
fn history_window_commands() {
    let mut engine = DashboardEngine::build_test("cmd-history".into(), 5).unwrap();

    let CommandOutput::History(records) = run(
        &mut engine,
        r#"{"cmd":"history","from":"2024-01-01","to":"2024-03-31"}"#,
    ) else {
        panic!("expected history");
    };
    assert_eq!(records.len(), 30);

    let CommandOutput::MonthlyTotals(totals) =
        run(&mut engine, r#"{"cmd":"monthly_totals","from":null,"to":null}"#)
    else {
        panic!("expected totals");
    };
    assert_eq!(totals.len(), 60);

    let reversed: DashboardCommand =
        serde_json::from_str(r#"{"cmd":"history","from":"2024-05-01","to":"2024-01-01"}"#).unwrap();
    assert_eq!(reversed.execute(&mut engine).unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[test]
fn outputs_serialize_as_tagged_json() {
    let mut engine = DashboardEngine::build_test("cmd-json".into(), 6).unwrap();
    let out = run(&mut engine, r#"{"cmd":"top_n","key":"volume","n":2}"#);
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["kind"], "rows");
    assert_eq!(json["data"].as_array().map(Vec::len), Some(2));

    let out = run(&mut engine, r#"{"cmd":"projection_comparison"}"#);
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["kind"], "projection");
    assert_eq!(json["data"][0]["label"], "historical");
    assert_eq!(json["data"][23]["label"], "projection");
}

#[test]
fn unknown_command_rejected() {
    assert!(serde_json::from_str::<DashboardCommand>(r#"{"cmd":"launch_rockets"}"#).is_err());
}
