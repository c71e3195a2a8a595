// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::WiringConfig;
use crate::errors::WiringError;
use crate::model::{ModelGroup, WiringModel};
use crate::observability::test_support::capture_logs;
use crate::schedulers::metrics::MetricsSink;
use crate::schedulers::{TaskScheduler, TaskSchedulerType};
use crate::wires::{InputWire, SolderType};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;

fn model() -> WiringModel {
    WiringModel::new(WiringConfig::default(), Handle::current())
}

/// A scheduler whose `label` input appends every value to the returned list.
fn collector(
    model: &WiringModel,
    name: &str,
    scheduler_type: TaskSchedulerType,
    capacity: Option<i64>,
) -> (InputWire<u64>, Arc<Mutex<Vec<u64>>>) {
    let scheduler: TaskScheduler<()> = model.create_scheduler(name, scheduler_type, capacity).unwrap();
    let input = scheduler.build_input_wire::<u64>("values").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    input
        .bind_consumer(move |value| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(value);
                Ok(())
            }
        })
        .unwrap();
    (input.input_wire(), seen)
}

/// A bounded sequential scheduler with one bound passthrough input, for topology tests.
fn stage(model: &WiringModel, name: &str, scheduler_type: TaskSchedulerType) -> (TaskScheduler<u64>, InputWire<u64>) {
    let capacity = (!scheduler_type.is_direct()).then_some(4);
    let scheduler = model.create_scheduler::<u64>(name, scheduler_type, capacity).unwrap();
    let input = scheduler.build_input_wire::<u64>("in").unwrap();
    input.bind(|value| async move { Ok(value) }).unwrap();
    (scheduler, input.input_wire())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn offer_is_refused_while_capacity_is_in_flight() {
    let model = model();

    let doubler = model
        .create_scheduler::<u64>("doubler", TaskSchedulerType::Sequential, Some(2))
        .unwrap();
    let (collected, seen) = collector(&model, "collector", TaskSchedulerType::Concurrent, Some(10));

    let numbers = doubler.build_input_wire::<u64>("numbers").unwrap();
    numbers
        .bind(|value| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(value * 2)
        })
        .unwrap();
    doubler.output_wire().solder_to(&collected).unwrap();

    model.start().unwrap();

    assert!(numbers.offer(1).await.unwrap());
    assert!(numbers.offer(2).await.unwrap());
    assert!(!numbers.offer(3).await.unwrap());

    doubler.wait_until_empty().await;
    assert!(numbers.offer(3).await.unwrap());

    model.stop().await;
    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![2, 4, 6]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sequential_scheduler_preserves_admission_order() {
    let model = model();
    let (input, seen) = collector(&model, "ordered", TaskSchedulerType::Sequential, Some(3));

    model.start().unwrap();
    for value in 0..50 {
        input.put(value).await.unwrap();
    }
    model.stop().await;

    assert_eq!(*seen.lock().unwrap(), (0..50).collect::<Vec<u64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queued_handler_failure_drops_only_that_task() {
    let model = model();
    let scheduler = model
        .create_scheduler::<()>("picky", TaskSchedulerType::Sequential, Some(4))
        .unwrap();
    let input = scheduler.build_input_wire::<u64>("values").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    input
        .bind_consumer(move |value| {
            let sink = sink.clone();
            async move {
                anyhow::ensure!(value != 1, "refusing {value}");
                sink.lock().unwrap().push(value);
                Ok(())
            }
        })
        .unwrap();

    model.start().unwrap();
    input.put(1).await.unwrap();
    input.put(2).await.unwrap();
    model.stop().await;

    assert_eq!(*seen.lock().unwrap(), vec![2]);
    assert_eq!(scheduler.unprocessed_task_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_run_in_parallel_and_survive_a_panic() {
    const PARALLEL: usize = 4;

    let model = model();
    let scheduler = model
        .create_scheduler::<()>("fanned", TaskSchedulerType::Concurrent, Some(8))
        .unwrap();
    let input = scheduler.build_input_wire::<u64>("values").unwrap();
    let rendezvous = Arc::new(tokio::sync::Barrier::new(PARALLEL));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    input
        .bind_consumer(move |value| {
            let rendezvous = rendezvous.clone();
            let sink = sink.clone();
            async move {
                if value == 99 {
                    panic!("value {value} is cursed");
                }
                // Completes only once every non-panicking task is in flight at the same time.
                rendezvous.wait().await;
                sink.lock().unwrap().push(value);
                Ok(())
            }
        })
        .unwrap();

    model.start().unwrap();
    input.put(99).await.unwrap();
    for value in 0..PARALLEL as u64 {
        input.put(value).await.unwrap();
    }
    tokio::time::timeout(Duration::from_secs(5), model.stop())
        .await
        .expect("concurrent tasks should all be in flight together");

    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, (0..PARALLEL as u64).collect::<Vec<u64>>());
    assert_eq!(scheduler.unprocessed_task_count(), 0);
}

#[tokio::test]
async fn concurrent_handler_failure_is_logged_and_dropped() {
    let (logs, _guard) = capture_logs();
    let model = model();
    let scheduler = model
        .create_scheduler::<()>("lenient", TaskSchedulerType::Concurrent, Some(4))
        .unwrap();
    let input = scheduler.build_input_wire::<u64>("values").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    input
        .bind_consumer(move |value| {
            let sink = sink.clone();
            async move {
                anyhow::ensure!(value != 7, "refusing {value}");
                sink.lock().unwrap().push(value);
                Ok(())
            }
        })
        .unwrap();

    model.start().unwrap();
    for value in [6, 7, 8] {
        assert!(input.put(value).await.is_ok());
    }
    model.stop().await;

    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![6, 8]);
    assert_eq!(scheduler.unprocessed_task_count(), 0);

    let logs = logs.contents();
    assert!(logs.contains("Task on 'lenient' from input 'values' failed and was dropped"));
    assert!(logs.contains("refusing 7"));
}

#[test]
fn with_pool_runs_work_on_the_dedicated_runtime() {
    let dedicated = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("dedicated_pool")
        .enable_all()
        .build()
        .unwrap();
    let main = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let threads = main.block_on(async {
        let model = model();
        let scheduler = model
            .scheduler_builder::<()>("isolated")
            .with_type(TaskSchedulerType::Concurrent)
            .with_unhandled_task_capacity(4)
            .with_pool(dedicated.handle().clone())
            .build()
            .unwrap();
        let input = scheduler.build_input_wire::<u64>("values").unwrap();
        let threads = Arc::new(Mutex::new(Vec::new()));
        let sink = threads.clone();
        input
            .bind_consumer(move |_value| {
                let sink = sink.clone();
                async move {
                    let name = std::thread::current().name().map(str::to_string);
                    sink.lock().unwrap().push(name);
                    Ok(())
                }
            })
            .unwrap();

        model.start().unwrap();
        for value in 0..3 {
            input.put(value).await.unwrap();
        }
        model.stop().await;

        let threads = threads.lock().unwrap().clone();
        threads
    });

    assert_eq!(threads, vec![Some("dedicated_pool".to_string()); 3]);
}

#[tokio::test]
async fn direct_handler_failure_reaches_the_caller() {
    let model = model();
    let scheduler = model
        .create_scheduler::<u64>("inline", TaskSchedulerType::Direct, None)
        .unwrap();
    let input = scheduler.build_input_wire::<u64>("values").unwrap();
    input
        .bind(|value| async move {
            anyhow::ensure!(value % 2 == 0, "odd value {value}");
            Ok(value)
        })
        .unwrap();

    model.start().unwrap();
    input.put(2).await.unwrap();
    let error = input.put(3).await.unwrap_err();
    model.stop().await;

    assert!(error.is_handler_failure());
    assert_eq!(
        error.to_string(),
        "Handler for input wire 'inline.values' failed: odd value 3"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn inject_ignores_capacity() {
    let model = model();
    let (input, seen) = collector(&model, "forced", TaskSchedulerType::Sequential, Some(1));

    for value in 0..3 {
        input.inject(value).await.unwrap();
    }
    assert!(!input.offer(3).await.unwrap());

    model.start().unwrap();
    model.stop().await;

    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test]
async fn binding_rules_are_enforced() {
    let model = model();
    let scheduler = model
        .create_scheduler::<u64>("binder", TaskSchedulerType::Sequential, None)
        .unwrap();

    let input = scheduler.build_input_wire::<u64>("values").unwrap();
    assert!(matches!(
        input.put(1).await,
        Err(WiringError::UnboundInputWire { ref scheduler, ref label }) if scheduler == "binder" && label == "values"
    ));

    input.bind(|value| async move { Ok(value) }).unwrap();
    assert!(matches!(
        input.bind(|value| async move { Ok(value) }),
        Err(WiringError::AlreadyBound { .. })
    ));
    assert!(matches!(
        scheduler.build_input_wire::<u64>("values"),
        Err(WiringError::DuplicateInputWire { .. })
    ));
}

#[tokio::test]
async fn scheduler_names_are_validated() {
    let model = model();
    model
        .create_scheduler::<u64>("taken", TaskSchedulerType::Sequential, None)
        .unwrap();

    assert!(matches!(
        model.create_scheduler::<u64>("taken", TaskSchedulerType::Concurrent, None),
        Err(WiringError::DuplicateScheduler(name)) if name == "taken"
    ));
    assert!(matches!(
        model.create_scheduler::<u64>("not-legal", TaskSchedulerType::Sequential, None),
        Err(WiringError::InvalidSchedulerName(_))
    ));
}

#[tokio::test]
async fn detects_cyclical_backpressure() {
    let model = model();
    let (a, a_in) = stage(&model, "a", TaskSchedulerType::Sequential);
    let (b, b_in) = stage(&model, "b", TaskSchedulerType::Sequential);
    let (c, c_in) = stage(&model, "c", TaskSchedulerType::Sequential);
    a.output_wire().solder_to(&b_in).unwrap();
    b.output_wire().solder_to(&c_in).unwrap();
    c.output_wire().solder_to(&a_in).unwrap();
    assert!(model.check_for_cyclical_backpressure());

    let model = self::model();
    let (a, _) = stage(&model, "a", TaskSchedulerType::Sequential);
    let (b, b_in) = stage(&model, "b", TaskSchedulerType::Sequential);
    let (_, c_in) = stage(&model, "c", TaskSchedulerType::Sequential);
    a.output_wire().solder_to(&b_in).unwrap();
    b.output_wire().solder_to(&c_in).unwrap();
    assert!(!model.check_for_cyclical_backpressure());
}

#[tokio::test]
async fn offer_solder_breaks_a_cycle() {
    let model = model();
    let (a, a_in) = stage(&model, "a", TaskSchedulerType::Sequential);
    let (b, b_in) = stage(&model, "b", TaskSchedulerType::Sequential);
    a.output_wire().solder_to(&b_in).unwrap();
    b.output_wire().solder_to_with(&a_in, SolderType::Offer).unwrap();

    assert!(!model.check_for_cyclical_backpressure());
    let edges = model.edges();
    assert!(edges[0].applies_backpressure);
    assert!(!edges[1].applies_backpressure);
}

#[tokio::test]
async fn detects_illegal_direct_scheduler_usage() {
    let model = model();
    let (left, _) = stage(&model, "left", TaskSchedulerType::Concurrent);
    let (right, _) = stage(&model, "right", TaskSchedulerType::Concurrent);
    let (_, direct_in) = stage(&model, "direct", TaskSchedulerType::Direct);
    left.output_wire().solder_to(&direct_in).unwrap();
    assert!(!model.check_for_illegal_direct_scheduler_usage());

    right.output_wire().solder_to(&direct_in).unwrap();
    assert!(model.check_for_illegal_direct_scheduler_usage());
}

#[tokio::test]
async fn detects_unbound_input_wires() {
    let model = model();
    let scheduler = model
        .create_scheduler::<u64>("lonely", TaskSchedulerType::Sequential, None)
        .unwrap();
    let input = scheduler.build_input_wire::<u64>("values").unwrap();

    assert!(model.check_for_unbound_input_wires());
    assert_eq!(model.unbound_input_wires(), vec!["lonely.values"]);

    input.bind(|value| async move { Ok(value) }).unwrap();
    assert!(!model.check_for_unbound_input_wires());
}

#[tokio::test]
async fn topology_is_frozen_after_start() {
    let model = model();
    let (a, _) = stage(&model, "a", TaskSchedulerType::Sequential);
    let (_, b_in) = stage(&model, "b", TaskSchedulerType::Sequential);

    model.start().unwrap();

    assert!(matches!(model.start(), Err(WiringError::ModelAlreadyStarted)));
    assert!(matches!(
        model.create_scheduler::<u64>("late", TaskSchedulerType::Sequential, None),
        Err(WiringError::ModelAlreadyStarted)
    ));
    assert!(matches!(
        a.build_input_wire::<u64>("late"),
        Err(WiringError::ModelAlreadyStarted)
    ));
    assert!(matches!(
        a.output_wire().solder_to(&b_in),
        Err(WiringError::ModelAlreadyStarted)
    ));
    model.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_drains_work_forwarded_downstream() {
    let model = model();
    let upstream = model
        .create_scheduler::<u64>("upstream", TaskSchedulerType::Concurrent, Some(8))
        .unwrap();
    let (downstream, seen) = collector(&model, "downstream", TaskSchedulerType::Sequential, Some(2));

    let input = upstream.build_input_wire::<u64>("values").unwrap();
    input
        .bind(|value| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(value)
        })
        .unwrap();
    upstream.output_wire().solder_to(&downstream).unwrap();

    model.start().unwrap();
    for value in 0..20 {
        input.put(value).await.unwrap();
    }
    model.stop().await;

    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, (0..20).collect::<Vec<u64>>());

    assert!(matches!(
        input.put(99).await,
        Err(WiringError::SchedulerStopped(name)) if name == "upstream"
    ));
}

#[tokio::test]
async fn fan_out_delivers_to_every_destination() {
    let model = model();
    let source = model
        .create_scheduler::<u64>("source", TaskSchedulerType::Direct, None)
        .unwrap();
    let (first, first_seen) = collector(&model, "first", TaskSchedulerType::DirectStateless, None);
    let (second, second_seen) = collector(&model, "second", TaskSchedulerType::Direct, None);

    let input = source.build_input_wire::<u64>("values").unwrap();
    input.bind(|value| async move { Ok(value + 1) }).unwrap();
    source.output_wire().solder_to(&first).unwrap();
    source.output_wire().solder_to(&second).unwrap();
    assert_eq!(source.output_wire().destination_count(), 2);

    model.start().unwrap();
    input.put(41).await.unwrap();
    model.stop().await;

    assert_eq!(*first_seen.lock().unwrap(), vec![42]);
    assert_eq!(*second_seen.lock().unwrap(), vec![42]);
}

#[derive(Debug, Default)]
struct RecordingMetrics {
    gauges: Mutex<Vec<(String, i64)>>,
}

impl MetricsSink for RecordingMetrics {
    fn record_gauge(&self, name: &str, value: i64) {
        self.gauges.lock().unwrap().push((name.to_string(), value));
    }
}

#[tokio::test]
async fn reports_unhandled_task_count_gauges() {
    let metrics = Arc::new(RecordingMetrics::default());
    let model = model().with_metrics(metrics.clone());

    let measured = model
        .scheduler_builder::<()>("measured")
        .with_unhandled_task_capacity(10)
        .with_unhandled_task_metric(true)
        .build()
        .unwrap();
    model
        .create_scheduler::<()>("quiet", TaskSchedulerType::Sequential, Some(10))
        .unwrap();

    let input = measured.build_input_wire::<u64>("values").unwrap();
    input.bind_consumer(|_| async { Ok(()) }).unwrap();
    input.put(1).await.unwrap();
    input.put(2).await.unwrap();

    model.report_metrics();
    model.stop().await;

    assert_eq!(
        *metrics.gauges.lock().unwrap(),
        vec![("measured_unhandled_task_count".to_string(), 2)]
    );
    assert_eq!(measured.unprocessed_task_count(), 0);
}

#[tokio::test]
async fn diagram_reflects_registered_topology() {
    let model = model();
    let (a, _) = stage(&model, "a", TaskSchedulerType::Sequential);
    let (_, b_in) = stage(&model, "b", TaskSchedulerType::DirectStateless);
    a.output_wire().solder_to(&b_in).unwrap();

    let groups = [ModelGroup::new("sinks", ["b"], false)];
    let diagram = model.generate_wiring_diagram(&groups, &[], &[]);

    assert_eq!(
        diagram,
        "flowchart TD\n    a[a]\n    subgraph group_sinks[\"sinks\"]\n        b{{b}}\n    end\n    a -->|\"in\"| b\n"
    );
}
