mod common;
use crate::common::{init_tracing, launcher, ContainerBuilder, TestResult};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use tugbot::client::{MockCall, MockClient};
use tugbot::container::CandidateSelection;
use tugbot::schedule::RecurringScheduler;
use tugbot::types::SchedulerState;

const TICK: Duration = Duration::from_secs(18);

fn scheduler(mock: &MockClient) -> RecurringScheduler {
    RecurringScheduler::new(
        launcher(mock),
        CandidateSelection::all(),
        TICK,
        CancellationToken::new(),
    )
}

fn creates(mock: &MockClient) -> usize {
    mock.count(|c| matches!(c, MockCall::Create(_)))
}

#[tokio::test(start_paused = true)]
async fn reconcile_schedules_only_candidates_with_interval() -> TestResult {
    init_tracing();
    let mock = MockClient::with_containers([
        ContainerBuilder::test("every10").every("10s").build(),
        ContainerBuilder::test("no-interval").build(),
        ContainerBuilder::test("busy").running().every("10s").build(),
        ContainerBuilder::new("not-a-test").every("10s").build(),
    ]);
    let sched = scheduler(&mock);

    let report = sched.reconcile().await?;

    assert_eq!(report.started, vec!["id-every10".to_string()]);
    assert!(report.stopped.is_empty());
    assert_eq!(report.running, 1);
    assert_eq!(
        sched.running_tasks().await,
        vec![("id-every10".to_string(), Duration::from_secs(10))]
    );

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn timer_fires_after_each_full_interval() -> TestResult {
    init_tracing();
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    sleep(Duration::from_secs(9)).await;
    assert_eq!(creates(&mock), 0, "no fire before the first interval");

    sleep(Duration::from_secs(2)).await;
    assert_eq!(creates(&mock), 1);

    // Each fire re-inspects the source before launching from it.
    let calls = mock.calls();
    let inspected = calls
        .iter()
        .position(|c| *c == MockCall::Inspect("id-suite".to_string()));
    let created = calls.iter().position(|c| matches!(c, MockCall::Create(_)));
    match (inspected, created) {
        (Some(i), Some(c)) => assert!(i < c, "inspect must precede create: {calls:?}"),
        other => panic!("Expected inspect and create calls, got: {other:?}"),
    }

    sleep(Duration::from_secs(20)).await;
    assert_eq!(creates(&mock), 3);
    assert_eq!(mock.started().len(), 3);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reconcile_is_idempotent_for_unchanged_tasks() -> TestResult {
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    let sched = scheduler(&mock);

    sched.reconcile().await?;
    sleep(Duration::from_secs(6)).await;
    let second = sched.reconcile().await?;
    assert!(!second.changed());

    // The original timer keeps its phase: first fire at t=10s, not t=16s.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(creates(&mock), 1);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_inspection_skips_one_fire_only() -> TestResult {
    init_tracing();
    let source = ContainerBuilder::test("suite").every("10s").build();
    let mock = MockClient::with_containers([source.clone()]);
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    mock.remove("id-suite");
    sleep(Duration::from_secs(11)).await;
    assert_eq!(creates(&mock), 0);

    mock.add_container(source);
    sleep(Duration::from_secs(10)).await;
    assert_eq!(creates(&mock), 1);
    assert_eq!(mock.count(|c| *c == MockCall::Inspect("id-suite".to_string())), 2);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn launch_failure_does_not_stop_the_timer() -> TestResult {
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    mock.fail_create("suite");
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    sleep(Duration::from_secs(31)).await;

    assert_eq!(creates(&mock), 3);
    assert!(mock.started().is_empty());
    assert_eq!(sched.running_tasks().await.len(), 1);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn vanished_candidate_timer_is_retired() -> TestResult {
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    mock.remove("id-suite");
    let report = sched.reconcile().await?;
    assert_eq!(report.stopped, vec!["id-suite".to_string()]);
    assert_eq!(report.running, 0);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(creates(&mock), 0);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn interval_change_restarts_timer() -> TestResult {
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    mock.add_container(ContainerBuilder::test("suite").every("30s").build());
    let report = sched.reconcile().await?;

    assert_eq!(report.stopped, vec!["id-suite".to_string()]);
    assert_eq!(report.started, vec!["id-suite".to_string()]);
    assert_eq!(
        sched.running_tasks().await,
        vec![("id-suite".to_string(), Duration::from_secs(30))]
    );

    sleep(Duration::from_secs(25)).await;
    assert_eq!(creates(&mock), 0);
    sleep(Duration::from_secs(6)).await;
    assert_eq!(creates(&mock), 1);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn replacement_timer_waits_for_retired_fire() -> TestResult {
    init_tracing();
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    mock.set_start_delay(Duration::from_secs(30));
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    // First fire starts at t=10s and is still starting its clone at t=11s.
    sleep(Duration::from_secs(11)).await;
    assert_eq!(creates(&mock), 1);

    mock.add_container(ContainerBuilder::test("suite").every("5s").build());
    let report = sched.reconcile().await?;
    assert_eq!(report.started, vec!["id-suite".to_string()]);

    // The new timer is due at t=16s but must not overlap the old fire.
    sleep(Duration::from_secs(6)).await;
    assert_eq!(creates(&mock), 1);
    assert!(mock.started().is_empty());

    // The old fire completes at t=40s; only then does the new one launch.
    sleep(Duration::from_secs(24)).await;
    assert_eq!(creates(&mock), 2);
    assert_eq!(mock.started().len(), 1);

    sched.shutdown().await;
    assert_eq!(creates(&mock), 2);
    assert_eq!(mock.started().len(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn list_failure_keeps_existing_timers() -> TestResult {
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    mock.fail_list("engine unreachable");
    assert!(sched.reconcile().await.is_err());
    assert_eq!(sched.running_tasks().await.len(), 1);

    sleep(Duration::from_secs(11)).await;
    assert_eq!(creates(&mock), 1);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn selection_limits_timers_to_named_containers() -> TestResult {
    let mock = MockClient::with_containers([
        ContainerBuilder::test("api").every("10s").build(),
        ContainerBuilder::test("ui").every("10s").build(),
    ]);
    let sched = RecurringScheduler::new(
        launcher(&mock),
        CandidateSelection::new(["ui"]),
        TICK,
        CancellationToken::new(),
    );

    let report = sched.reconcile().await?;
    assert_eq!(report.started, vec!["id-ui".to_string()]);

    sched.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_in_flight_fire() -> TestResult {
    init_tracing();
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    mock.set_start_delay(Duration::from_secs(5));
    let sched = scheduler(&mock);
    sched.reconcile().await?;

    // Fire begins at t=10s; its start call completes at t=15s.
    sleep(Duration::from_secs(12)).await;
    assert_eq!(creates(&mock), 1);
    assert!(mock.started().is_empty());

    sched.shutdown().await;

    assert_eq!(mock.started().len(), 1);
    assert_eq!(sched.state(), SchedulerState::Stopped);
    assert!(sched.running_tasks().await.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reconcile_after_shutdown_starts_nothing() -> TestResult {
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    let sched = scheduler(&mock);
    sched.shutdown().await;

    let report = sched.reconcile().await?;
    assert!(report.started.is_empty());
    assert!(sched.running_tasks().await.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_loop_ticks_immediately_and_stops_on_cancel() -> TestResult {
    init_tracing();
    let mock = MockClient::with_containers([ContainerBuilder::test("suite").every("10s").build()]);
    let token = CancellationToken::new();
    let sched = Arc::new(RecurringScheduler::new(
        launcher(&mock),
        CandidateSelection::all(),
        TICK,
        token.clone(),
    ));
    assert_eq!(sched.state(), SchedulerState::Idle);

    let handle = {
        let sched = sched.clone();
        tokio::spawn(async move { sched.run().await })
    };

    sleep(Duration::from_millis(1)).await;
    assert_eq!(sched.state(), SchedulerState::Active);
    assert_eq!(sched.running_tasks().await.len(), 1);

    // A candidate appearing later is picked up on the next outer tick.
    mock.add_container(ContainerBuilder::test("late").every("10s").build());
    sleep(TICK).await;
    assert_eq!(sched.running_tasks().await.len(), 2);

    token.cancel();
    handle.await?;

    assert_eq!(sched.state(), SchedulerState::Stopped);
    assert!(sched.running_tasks().await.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn state_transitions_are_observable() -> TestResult {
    let mock = MockClient::new();
    let token = CancellationToken::new();
    let sched = Arc::new(RecurringScheduler::new(
        launcher(&mock),
        CandidateSelection::all(),
        TICK,
        token.clone(),
    ));
    let mut states = sched.watch_state();

    let handle = {
        let sched = sched.clone();
        tokio::spawn(async move { sched.run().await })
    };

    states.wait_for(|s| *s == SchedulerState::Active).await?;
    token.cancel();
    states.wait_for(|s| *s == SchedulerState::Stopped).await?;
    handle.await?;
    Ok(())
}
