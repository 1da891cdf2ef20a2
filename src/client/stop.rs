// src/client/stop.rs

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::EngineClient;
use crate::container::labels::DEFAULT_STOP_SIGNAL;
use crate::container::{Container, ContainerState};
use crate::errors::{Result, TugbotError};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Kill `container` with its configured stop signal, wait up to `timeout` for
/// it to stop, then force-remove it and wait up to `timeout` for it to
/// disappear.
///
/// Fails when the container can still be inspected after removal.
pub async fn stop_container(
    client: &dyn EngineClient,
    container: &Container,
    timeout: Duration,
) -> Result<()> {
    let signal = container
        .stop_signal()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STOP_SIGNAL);

    info!(
        container = %container.name(),
        container_id = %container.id(),
        signal = %signal,
        "stopping container"
    );
    client.kill_container(container.id(), signal).await?;

    // Proceed to removal even if it never stops.
    wait_until(timeout, || async {
        match client.inspect_container(container.id()).await {
            Ok(c) => c.state() != ContainerState::Running,
            Err(_) => true,
        }
    })
    .await;

    debug!(container_id = %container.id(), "removing container");
    client.remove_container(container.id()).await?;

    let gone = wait_until(timeout, || async {
        client.inspect_container(container.id()).await.is_err()
    })
    .await;

    if gone {
        Ok(())
    } else {
        Err(TugbotError::EngineError(format!(
            "container {} ({}) could not be removed",
            container.name(),
            container.id()
        )))
    }
}

/// Poll `done` once per second until it holds or `timeout` elapses.
/// Returns whether it held.
async fn wait_until<F, Fut>(timeout: Duration, mut done: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if done().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL).await;
    }
}
