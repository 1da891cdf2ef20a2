// src/dispatch/pump.rs

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::EngineClient;
use crate::container::Event;

/// Pause between a failed or closed subscription and the next attempt.
pub const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Feed engine events into `tx` until `token` is cancelled.
///
/// A subscription that fails or ends is logged and retried after
/// `retry_delay`. Stops early only when the receiving side has gone away.
pub async fn pump_events(
    client: &dyn EngineClient,
    tx: mpsc::Sender<Event>,
    token: CancellationToken,
    retry_delay: Duration,
) {
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match client.subscribe_events(tx.clone(), token.clone()).await {
            Ok(()) if token.is_cancelled() => break,
            Ok(()) => {
                warn!(attempt, retry_in = ?retry_delay, "event stream ended; resubscribing");
            }
            Err(err) => {
                warn!(attempt, error = %err, retry_in = ?retry_delay, "event subscription failed; resubscribing");
            }
        }

        if tx.is_closed() {
            debug!("event receiver dropped");
            break;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = time::sleep(retry_delay) => {}
        }
    }
    debug!("event pump stopped");
}
