//! Tests for tokio spawner utilities

use prometheus_task_executor::core::Spawn;
use prometheus_task_executor::runtime::tokio_spawner::TokioSpawner;
use prometheus_task_executor::runtime::SchedulerStatus;
use prometheus_task_executor::core::DispatchPhase;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_try_current_inside_runtime() {
    assert!(TokioSpawner::try_current().is_ok());
}

#[test]
fn test_try_current_outside_runtime() {
    assert!(TokioSpawner::try_current().is_err());
}

#[test]
fn test_owned_runtime_stays_alive() {
    let spawner = TokioSpawner::with_worker_threads(1).expect("runtime");
    let (tx, rx) = std::sync::mpsc::channel();
    spawner.spawn(async move {
        tx.send("ran").unwrap();
    });
    assert_eq!(rx.recv().unwrap(), "ran");
}

#[test]
fn test_status_helpers() {
    let status = SchedulerStatus {
        phase: DispatchPhase::Dispatching,
        pending: 3,
        in_flight: 1,
        executed_in_window: 2,
        max_tasks_per_window: 2,
        window_length_ms: 1000,
        history_len: 0,
    };
    assert!(status.is_throttled());
    assert!(!status.is_drained());
}
