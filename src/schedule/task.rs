// src/schedule/task.rs

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::reconcile::DesiredTask;
use crate::launch::Launcher;
use crate::types::ContainerId;

/// Handle to one container's recurring timer.
///
/// Dropping the handle does not stop the timer; call [`RecurringTask::stop`].
#[derive(Debug)]
pub struct RecurringTask {
    id: ContainerId,
    name: String,
    interval: Duration,
    token: CancellationToken,
    done: CancellationToken,
}

impl RecurringTask {
    /// Spawn the timer on `tracker`. It is cancelled by `parent` as well as
    /// by [`stop`](Self::stop). The first fire happens one full interval
    /// after spawning, and not before `after` (the [`finished`](Self::finished)
    /// token of a retired timer for the same container) is cancelled.
    pub fn spawn(
        tracker: &TaskTracker,
        parent: &CancellationToken,
        task: DesiredTask,
        launcher: Launcher,
        after: Option<CancellationToken>,
    ) -> Self {
        let token = parent.child_token();
        let done = CancellationToken::new();
        let DesiredTask { id, name, interval } = task;

        tracker.spawn(run_timer(
            TimerContext {
                id: id.clone(),
                name: name.clone(),
                interval,
                launcher,
            },
            token.clone(),
            done.clone(),
            after,
        ));

        Self {
            id,
            name,
            interval,
            token,
            done,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop future fires. A fire already in progress runs to completion.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancelled once the timer has exited, including any fire that was in
    /// progress when it was stopped.
    pub fn finished(&self) -> CancellationToken {
        self.done.clone()
    }
}

struct TimerContext {
    id: ContainerId,
    name: String,
    interval: Duration,
    launcher: Launcher,
}

async fn run_timer(
    ctx: TimerContext,
    token: CancellationToken,
    done: CancellationToken,
    mut after: Option<CancellationToken>,
) {
    let _done = done.drop_guard();
    let TimerContext {
        id,
        name,
        interval,
        launcher,
    } = ctx;
    debug!(container = %name, container_id = %id, ?interval, "recurring timer started");

    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // One fire per container at a time, across timer replacements.
        if let Some(previous) = after.take() {
            if !previous.is_cancelled() {
                debug!(container = %name, "waiting for the retired timer's fire to finish");
                previous.cancelled().await;
            }
            if token.is_cancelled() {
                break;
            }
        }

        // Not raced against cancellation: an in-flight launch always
        // finishes.
        fire(&launcher, &id, &name).await;
    }

    debug!(container = %name, container_id = %id, "recurring timer stopped");
}

async fn fire(launcher: &Launcher, id: &str, name: &str) {
    let source = match launcher.client().inspect_container(id).await {
        Ok(c) => c,
        Err(err) => {
            warn!(
                container = %name,
                container_id = %id,
                error = %err,
                "recurring launch skipped: source container could not be inspected"
            );
            return;
        }
    };

    match launcher.launch(&source).await {
        Ok(clone_id) => {
            info!(container = %name, clone_id = %clone_id, "recurring launch succeeded");
        }
        Err(err) => {
            warn!(container = %name, error = %err, "recurring launch failed");
        }
    }
}
