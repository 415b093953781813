// tests/parallel_bound.rs
//
// Parallel dispatch: the semaphore bound is respected, extra permits are
// actually used, and fail-fast stops admission of new projects.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use runfleet::config::ProjectSpec;
use runfleet::engine::{Coordinator, EventSink};
use runfleet::types::ExecutionPolicy;
use runfleet_test_utils::builders::ProjectSpecBuilder;
use runfleet_test_utils::fake_invoker::{FakeInvoker, FakeOutcome};
use runfleet_test_utils::init_tracing;

const NO_FILTER: &[String] = &[];
const WORK: Duration = Duration::from_millis(100);

fn slow_projects(count: usize) -> Vec<ProjectSpec> {
    (0..count)
        .map(|i| ProjectSpecBuilder::new(&format!("p{i}")).main("work").build())
        .collect()
}

fn slow_fake() -> FakeInvoker {
    FakeInvoker::new().on("work", vec![FakeOutcome::success().with_delay(WORK)])
}

fn parallel_policy(max_parallel: usize, stop_on_first_failure: bool) -> ExecutionPolicy {
    ExecutionPolicy {
        parallel: true,
        max_parallel,
        stop_on_first_failure,
    }
}

#[tokio::test]
async fn concurrency_never_exceeds_the_configured_bound() {
    init_tracing();
    let fake = Arc::new(slow_fake());
    let coordinator = Coordinator::new(fake.clone(), EventSink::disabled(), parallel_policy(2, false));

    let started = Instant::now();
    let run = coordinator
        .run(slow_projects(5), NO_FILTER, NO_FILTER, CancellationToken::new())
        .await;
    let elapsed = started.elapsed();

    assert_eq!(run.projects.len(), 5);
    assert!(run.is_success());
    assert_eq!(fake.peak_concurrency(), 2);
    // Five 100ms projects two at a time need at least three rounds.
    assert!(elapsed >= Duration::from_millis(250), "elapsed: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "elapsed: {elapsed:?}");
}

#[tokio::test]
async fn a_wide_bound_actually_runs_projects_simultaneously() {
    init_tracing();
    let fake = Arc::new(slow_fake());
    let coordinator = Coordinator::new(fake.clone(), EventSink::disabled(), parallel_policy(5, false));

    let started = Instant::now();
    let run = coordinator
        .run(slow_projects(5), NO_FILTER, NO_FILTER, CancellationToken::new())
        .await;
    let elapsed = started.elapsed();

    assert_eq!(run.projects.len(), 5);
    assert_eq!(fake.peak_concurrency(), 5);
    // All five overlap, so the run takes roughly one project's worth of time.
    assert!(elapsed < Duration::from_millis(250), "elapsed: {elapsed:?}");
}

#[tokio::test]
async fn fail_fast_with_a_single_permit_stops_after_the_first_failure() {
    init_tracing();
    let fake = Arc::new(FakeInvoker::new().on("work", vec![FakeOutcome::failure(1)]));
    let coordinator = Coordinator::new(fake.clone(), EventSink::disabled(), parallel_policy(1, true));

    let run = coordinator
        .run(slow_projects(5), NO_FILTER, NO_FILTER, CancellationToken::new())
        .await;

    // One permit serialises admission, so the failure flag is visible before
    // any other project starts: exactly one result, one invocation.
    assert_eq!(run.projects.len(), 1);
    assert_eq!(fake.invocations().len(), 1);
    assert!(!run.is_success());
}

#[tokio::test]
async fn fail_fast_lets_in_flight_projects_finish() {
    init_tracing();
    let fake = Arc::new(
        FakeInvoker::new()
            .on(
                "bad",
                vec![FakeOutcome::failure(1).with_delay(Duration::from_millis(10))],
            )
            .on("work", vec![FakeOutcome::success().with_delay(WORK)]),
    );
    let coordinator = Coordinator::new(fake.clone(), EventSink::disabled(), parallel_policy(2, true));

    let projects = vec![
        ProjectSpecBuilder::new("bad").main("bad").build(),
        ProjectSpecBuilder::new("slow").main("work").build(),
        ProjectSpecBuilder::new("never-1").main("work").build(),
        ProjectSpecBuilder::new("never-2").main("work").build(),
    ];

    let run = coordinator
        .run(projects, NO_FILTER, NO_FILTER, CancellationToken::new())
        .await;

    // "bad" fails instantly while "slow" is in flight; "slow" completes, the
    // rest never start.
    assert_eq!(run.projects.len(), 2);
    assert_eq!(run.summary.failed, 1);
    assert_eq!(run.summary.passed, 1);
}
