//! dispatch-runner: headless courier dispatch simulation.
//!
//! Usage:
//!   dispatch-runner --seed 12345 --couriers 5 --orders 20 --interval 60
//!   dispatch-runner --config run.json --data-dir ./data --json

use anyhow::Result;
use dispatch_core::{
    config::DispatchConfig,
    engine::{DispatchEngine, RunOutcome},
    lookup::LookupTables,
    metrics::assignments_by_courier,
    predictor::{KinematicModel, ModelEtaPredictor},
    scenario::Scenario,
};
use std::env;
use std::path::Path;

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    run_id:  &'a str,
    seed:    u64,
    outcome: JsonOutcome<'a>,
}

#[derive(serde::Serialize)]
struct JsonOutcome<'a> {
    assignments: &'a [dispatch_core::Assignment],
    queued:      Vec<u64>,
    metrics:     &'a Option<dispatch_core::RunMetrics>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let json_mode = args.iter().any(|a| a == "--json");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");

    let mut config = match str_arg(&args, "--config") {
        Some(path) => DispatchConfig::load(path)?,
        None => DispatchConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.num_couriers = parse_arg(&args, "--couriers", config.num_couriers);
    config.num_orders = parse_arg(&args, "--orders", config.num_orders);
    config.order_interval_secs = parse_arg(&args, "--interval", config.order_interval_secs);
    config.validate()?;

    if !json_mode {
        println!("Courier Dispatch Simulator: dispatch-runner");
        println!("  seed:      {}", config.seed);
        println!("  couriers:  {}", config.num_couriers);
        println!("  orders:    {}", config.num_orders);
        println!("  interval:  {}s", config.order_interval_secs);
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let tables = if Path::new(data_dir).is_dir() {
        LookupTables::load(data_dir)?
    } else {
        log::warn!("data dir {data_dir} not found, every lookup will use defaults");
        LookupTables::default()
    };

    let model = KinematicModel { overhead_secs: config.pickup_overhead_secs };
    let predictor = ModelEtaPredictor::new(&tables, model)
        .with_epoch(config.epoch)
        .with_defaults(config.lookup_defaults());

    let scenario = Scenario::from_config(&config)?;
    let run_id = format!("run-{}", config.seed);
    let mut engine = DispatchEngine::new(run_id.clone(), scenario.couriers, Box::new(predictor));
    engine.run(&scenario.orders)?;
    let outcome = engine.into_outcome();

    if json_mode {
        let report = JsonReport {
            run_id: &run_id,
            seed: config.seed,
            outcome: JsonOutcome {
                assignments: &outcome.assignments,
                queued: outcome.queued.iter().map(|o| o.order_id).collect(),
                metrics: &outcome.metrics,
            },
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&run_id, &outcome);
    }
    Ok(())
}

fn print_summary(run_id: &str, outcome: &RunOutcome) {
    let total = outcome.assignments.len() + outcome.queued.len();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {run_id}");
    println!("  total orders:   {total}");
    println!("  assigned:       {}", outcome.assignments.len());
    println!("  queued:         {}", outcome.queued.len());

    println!();
    println!("=== ASSIGNMENTS BY COURIER ===");
    for (courier_id, orders) in assignments_by_courier(&outcome.assignments) {
        println!("  Courier {courier_id}");
        for (order_id, eta) in orders {
            println!("    - Order {order_id} | ETA: {eta:.1} sec");
        }
    }

    println!();
    println!("=== METRICS ===");
    let Some(m) = &outcome.metrics else {
        println!("  (No metrics available: nothing was assigned)");
        return;
    };
    println!("  avg eta:        {:.1} sec", m.avg_eta);
    println!("  p50 eta:        {:.1} sec", m.p50);
    println!("  p90 eta:        {:.1} sec", m.p90);
    println!("  sim time:       {:.1} sec", m.total_sim_time);
    println!(
        "  queued orders:  {} ({:.1}%)",
        m.queued_orders,
        m.queued_ratio * 100.0
    );
    for (courier_id, u) in &m.utilization {
        println!("  courier {courier_id:<4} utilization: {:.1}%", u * 100.0);
    }
    if let Some(load) = m.insights.most_assigned_courier {
        println!(
            "  most assigned:  courier {} with {} orders",
            load.courier_id, load.orders
        );
    }
    if let Some(a) = m.insights.longest_eta {
        println!(
            "  longest eta:    order {} on courier {} ({:.1} sec)",
            a.order_id, a.courier_id, a.eta_seconds
        );
    }
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
