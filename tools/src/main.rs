//! dash-runner: headless runner for the import-tax revenue dashboard.
//!
//! Usage:
//!   dash-runner --seed 12345 --ticks 120
//!   dash-runner --seed 12345 --watch
//!   dash-runner --seed 12345 --ipc-mode

use anyhow::Result;
use octroi_core::{
    aggregation::{self, SortKey},
    command::DashboardCommand,
    config::DashboardConfig,
    engine::DashboardEngine,
    error::DashError,
    store::SimStore,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcMessage {
    /// Run `count` manual refreshes.
    Tick { count: u64 },
    /// Let the refresh schedule decide against the wall clock.
    Poll,
    Command { command: DashboardCommand },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 10u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let watch = args.iter().any(|a| a == "--watch");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = match DashboardConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using built-in defaults");
            DashboardConfig::default()
        }
    };

    let as_of = chrono::Utc::now().date_naive();
    let run_id = DashboardEngine::new_run_id();
    let mut engine = DashboardEngine::build(run_id, seed, config, as_of, SimStore::in_memory()?)?;

    if ipc_mode {
        return run_ipc_loop(&mut engine);
    }

    println!("Import-tax revenue dashboard: dash-runner");
    println!("  seed:      {seed}");
    println!("  as of:     {as_of}");
    println!("  data_dir:  {data_dir}");
    println!();

    if watch {
        run_watch_loop(&mut engine)
    } else {
        engine.run_ticks(ticks)?;
        print_summary(&mut engine)
    }
}

fn run_ipc_loop(engine: &mut DashboardEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let message: IpcMessage = match serde_json::from_str(&buffer) {
            Ok(m) => m,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match message {
            IpcMessage::Quit => break,
            IpcMessage::Tick { count } => engine
                .run_ticks(count)
                .map(|()| clock_json(engine)),
            IpcMessage::Poll => engine
                .poll(chrono::Utc::now())
                .map(|ran| serde_json::json!({ "ticked": ran.is_some(), "tick": engine.clock.current_tick })),
            IpcMessage::Command { command } => command
                .execute(engine)
                .and_then(|out| serde_json::to_value(out).map_err(DashError::from)),
        };

        let line = match reply {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Command failed: {e}");
                serde_json::json!({ "error": e.to_string(), "kind": format!("{:?}", e.kind()) })
            }
        };
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Drives the refresh schedule from the wall clock until interrupted.
fn run_watch_loop(engine: &mut DashboardEngine) -> Result<()> {
    loop {
        if engine.poll(chrono::Utc::now())?.is_some() {
            let metrics = aggregation::key_metrics(engine.snapshot().rows());
            println!(
                "  tick {:>4} | revenue {:>14.0} | mean variation {:+.2}% | growing {}/{}",
                engine.clock.current_tick,
                metrics.total_revenue,
                metrics.mean_variation_pct,
                metrics.growing_sectors,
                metrics.sector_count,
            );
        }
        std::thread::sleep(Duration::from_secs(1));
    }
}

fn print_summary(engine: &mut DashboardEngine) -> Result<()> {
    let metrics = aggregation::key_metrics(engine.snapshot().rows());
    let range = engine.history().range();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:            {}", engine.run_id);
    println!("  final tick:        {}", engine.clock.current_tick);
    println!("  history:           {} .. {} ({} records)", range.start(), range.end(), engine.history().len());
    println!("  monthly revenue:   {:.0}", metrics.total_revenue);
    println!("  mean variation:    {:+.2}%", metrics.mean_variation_pct);
    println!("  import volume:     {:.0} t", metrics.total_volume);
    println!("  annualized:        {:.0}", metrics.projected_annual_revenue);

    println!();
    println!("=== TOP SECTORS ===");
    for row in aggregation::top_n(engine.snapshot().rows(), SortKey::Revenue, 5) {
        println!(
            "  {:<16} {:>14.0} {:+6.2}%",
            row.sector_code, row.monthly_revenue, row.variation_pct
        );
    }

    println!();
    println!("=== INDICATORS ===");
    for indicator in engine.indicators() {
        println!("  {:<20} {:>6.2}% ({:+.2})", indicator.name, indicator.value, indicator.change);
    }

    println!();
    println!("=== PROJECTION ===");
    for point in engine.projection()? {
        println!("  {} {:>14.0}", point.month.format("%Y-%m"), point.revenue);
    }
    Ok(())
}

fn clock_json(engine: &DashboardEngine) -> serde_json::Value {
    serde_json::json!({ "tick": engine.clock.current_tick, "paused": engine.clock.paused })
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
