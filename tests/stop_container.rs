mod common;
use crate::common::{init_tracing, ContainerBuilder, TestResult};

use std::time::Duration;

use tugbot::client::{stop_container, MockCall, MockClient};
use tugbot::errors::TugbotError;

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test(start_paused = true)]
async fn stops_with_default_signal_then_removes() -> TestResult {
    init_tracing();
    let c = ContainerBuilder::new("web").running().build();
    let mock = MockClient::with_containers([c.clone()]);

    stop_container(&mock, &c, TIMEOUT).await?;

    let calls = mock.calls();
    assert_eq!(
        calls.first(),
        Some(&MockCall::Kill {
            id: "id-web".to_string(),
            signal: "SIGTERM".to_string()
        })
    );
    assert!(calls.contains(&MockCall::Remove("id-web".to_string())));
    assert!(mock.container("id-web").is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn uses_custom_stop_signal_label() -> TestResult {
    let c = ContainerBuilder::new("web").running().stop_signal("SIGINT").build();
    let mock = MockClient::with_containers([c.clone()]);

    stop_container(&mock, &c, TIMEOUT).await?;

    assert!(mock.calls().contains(&MockCall::Kill {
        id: "id-web".to_string(),
        signal: "SIGINT".to_string()
    }));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn removes_after_timeout_when_kill_is_ignored() -> TestResult {
    let c = ContainerBuilder::new("stubborn").running().build();
    let mock = MockClient::with_containers([c.clone()]);
    mock.set_kill_stops(false);

    let started = tokio::time::Instant::now();
    stop_container(&mock, &c, TIMEOUT).await?;

    assert!(started.elapsed() >= TIMEOUT);
    assert!(mock.container("id-stubborn").is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn fails_when_container_survives_removal() {
    let c = ContainerBuilder::new("sticky").running().build();
    let mock = MockClient::with_containers([c.clone()]);
    mock.set_remove_deletes(false);

    match stop_container(&mock, &c, TIMEOUT).await {
        Err(TugbotError::EngineError(msg)) => {
            assert!(msg.contains("could not be removed"));
            assert!(msg.contains("sticky"));
        }
        other => panic!("Expected EngineError, got: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn kill_failure_is_returned() {
    let c = ContainerBuilder::new("ghost").running().build();
    let mock = MockClient::new();

    let result = stop_container(&mock, &c, TIMEOUT).await;

    assert!(matches!(result, Err(TugbotError::ContainerNotFound(_))));
    assert!(!mock.calls().contains(&MockCall::Remove("id-ghost".to_string())));
}
