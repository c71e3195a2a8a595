// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiring_core::config::{consts::DEFAULT_CONFIG_PATH, load_and_validate_config, WiringConfig};
use wiring_core::model::{ModelGroup, WiringModel};
use wiring_core::observability::init_tracing;
use wiring_core::schedulers::metrics::MetricsSink;
use wiring_core::schedulers::TaskSchedulerType;

/// Gauges go to the log; a real deployment would hand them to its metrics exporter.
#[derive(Debug)]
struct LoggedMetrics;

impl MetricsSink for LoggedMetrics {
    fn record_gauge(&self, name: &str, value: i64) {
        tracing::info!(gauge = name, value, "metric sample");
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!("Usage: wiring-demo [config.yaml|config.toml] [--diagram]");
        eprintln!("Example: wiring-demo {} --diagram", DEFAULT_CONFIG_PATH);
        return Ok(());
    }
    let print_diagram = args.iter().any(|arg| arg == "--diagram");
    let config_path = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);

    let config = load_and_validate_config(config_path)
        .with_context(|| format!("failed to load wiring configuration from {}", config_path))?;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    if let Some(worker_threads) = config.worker_threads {
        runtime.worker_threads(worker_threads);
    }
    let runtime = runtime.enable_all().build().context("failed to build the worker pool")?;

    println!("🔌 Wiring Demo");
    println!("═══════════════");
    println!("Config: {}", config_path);
    println!();

    runtime.block_on(run_pipeline(config, runtime.handle().clone(), print_diagram))
}

async fn run_pipeline(
    config: WiringConfig,
    pool: tokio::runtime::Handle,
    print_diagram: bool,
) -> anyhow::Result<()> {
    let model = WiringModel::new(config, pool).with_metrics(Arc::new(LoggedMetrics));

    // Types and capacities in the configuration file take precedence over these.
    let doubler = model.create_scheduler::<u64>("doubler", TaskSchedulerType::Sequential, Some(2))?;
    let collector = model.create_scheduler::<()>("collector", TaskSchedulerType::Concurrent, Some(10))?;
    let audit_log = model.create_scheduler::<()>("audit_log", TaskSchedulerType::Direct, None)?;

    let numbers = doubler.build_input_wire::<u64>("numbers")?;
    numbers.bind(|value| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(value * 2)
    })?;

    let results = Arc::new(Mutex::new(Vec::new()));
    let doubled = collector.build_input_wire::<u64>("doubled")?;
    let sink = results.clone();
    doubled.bind_consumer(move |value| {
        let sink = sink.clone();
        async move {
            sink.lock()
                .map_err(|_| anyhow::anyhow!("result list poisoned"))?
                .push(value);
            Ok(())
        }
    })?;

    let audited = audit_log.build_input_wire::<u64>("audited")?;
    audited.bind_consumer(|value| async move {
        tracing::debug!(value, "audited");
        Ok(())
    })?;

    doubler.output_wire().solder_to(&doubled)?;
    doubler.output_wire().solder_to(&audited)?;

    if print_diagram {
        let groups = [ModelGroup::new("sinks", ["collector", "audit_log"], false)];
        println!("{}", model.generate_wiring_diagram(&groups, &[], &[]));
    }

    model.start()?;
    let start_time = Instant::now();

    for value in 1..=3 {
        let admitted = numbers.offer(value).await?;
        println!("offer({}) -> {}", value, if admitted { "admitted" } else { "refused (at capacity)" });
    }
    model.report_metrics();

    doubler.wait_until_empty().await;
    println!("offer(3) after drain -> {}", numbers.offer(3).await?);

    for value in 4..=8 {
        numbers.put(value).await?;
    }
    model.stop().await;

    let mut results = results
        .lock()
        .map_err(|_| anyhow::anyhow!("result list poisoned"))?
        .clone();
    results.sort_unstable();

    println!();
    println!("📊 Results: {:?}", results);
    println!("⏱️  Elapsed: {:?}", start_time.elapsed());
    Ok(())
}
