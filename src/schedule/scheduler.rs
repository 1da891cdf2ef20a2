// src/schedule/scheduler.rs

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use super::reconcile::{desired_tasks, plan};
use super::task::RecurringTask;
use crate::container::{recurring_interval, CandidateSelection, Container};
use crate::errors::Result;
use crate::launch::Launcher;
use crate::types::{ContainerId, SchedulerState};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub started: Vec<ContainerId>,
    pub stopped: Vec<ContainerId>,
    /// Timers running after the pass.
    pub running: usize,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        !self.started.is_empty() || !self.stopped.is_empty()
    }
}

/// Live timers plus the completion tokens of retired ones that may still be
/// finishing a fire.
#[derive(Default)]
struct TaskSet {
    running: HashMap<ContainerId, RecurringTask>,
    retiring: HashMap<ContainerId, CancellationToken>,
}

/// Keeps one recurring timer per candidate container that declares an
/// interval, reconciled on every outer tick.
///
/// The timer set is the only mutable shared state; reconciliation and
/// shutdown both take its lock, so a shutdown never races a start.
pub struct RecurringScheduler {
    launcher: Launcher,
    selection: CandidateSelection,
    tick_interval: Duration,
    tasks: Mutex<TaskSet>,
    tracker: TaskTracker,
    token: CancellationToken,
    state: watch::Sender<SchedulerState>,
}

impl fmt::Debug for RecurringScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecurringScheduler")
            .field("selection", &self.selection)
            .field("tick_interval", &self.tick_interval)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl RecurringScheduler {
    /// `token` stops the outer loop and every timer when cancelled.
    pub fn new(
        launcher: Launcher,
        selection: CandidateSelection,
        tick_interval: Duration,
        token: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            launcher,
            selection,
            tick_interval,
            tasks: Mutex::new(TaskSet::default()),
            tracker: TaskTracker::new(),
            token,
            state,
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Running timers as `(id, interval)`, sorted by id.
    pub async fn running_tasks(&self) -> Vec<(ContainerId, Duration)> {
        let tasks = self.tasks.lock().await;
        let mut out: Vec<_> = tasks
            .running
            .values()
            .map(|t| (t.id().to_string(), t.interval()))
            .collect();
        out.sort();
        out
    }

    /// One outer tick: list candidates with an interval and bring the timer
    /// set in line with them.
    ///
    /// A failed listing leaves the timer set untouched. Does nothing once
    /// shutdown has begun.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let selection = &self.selection;
        let filter =
            |c: &Container| selection.selects(c) && recurring_interval(c).is_some();
        let containers = self.launcher.client().list_containers(&filter).await?;
        let desired = desired_tasks(&containers);

        let mut tasks = self.tasks.lock().await;
        if self.token.is_cancelled()
            || matches!(
                self.state(),
                SchedulerState::ShuttingDown | SchedulerState::Stopped
            )
        {
            return Ok(ReconcileReport {
                running: tasks.running.len(),
                ..Default::default()
            });
        }

        tasks.retiring.retain(|_, done| !done.is_cancelled());

        let running: HashMap<ContainerId, Duration> = tasks
            .running
            .iter()
            .map(|(id, t)| (id.clone(), t.interval()))
            .collect();
        let plan = plan(&running, &desired);

        let mut report = ReconcileReport::default();
        for id in plan.stop {
            if let Some(task) = tasks.running.remove(&id) {
                task.stop();
                tasks.retiring.insert(id.clone(), task.finished());
                info!(container = %task.name(), container_id = %id, "recurring timer retired");
                report.stopped.push(id);
            }
        }
        for desired in plan.start {
            info!(
                container = %desired.name,
                container_id = %desired.id,
                interval = ?desired.interval,
                "recurring timer scheduled"
            );
            let id = desired.id.clone();
            let after = tasks.retiring.get(&id).cloned();
            let task = RecurringTask::spawn(
                &self.tracker,
                &self.token,
                desired,
                self.launcher.clone(),
                after,
            );
            tasks.running.insert(id.clone(), task);
            report.started.push(id);
        }

        report.running = tasks.running.len();
        Ok(report)
    }

    /// Outer loop. Reconciles immediately, then every tick interval, until
    /// the token is cancelled; then drains every timer before returning.
    pub async fn run(&self) {
        self.state.send_replace(SchedulerState::Active);
        info!(tick = ?self.tick_interval, "recurring scheduler started");

        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.reconcile().await {
                Ok(report) if report.changed() => {
                    info!(
                        started = report.started.len(),
                        stopped = report.stopped.len(),
                        running = report.running,
                        "recurring timers reconciled"
                    );
                }
                Ok(report) => {
                    debug!(running = report.running, "recurring timers unchanged");
                }
                Err(err) => {
                    error!(error = %err, "listing containers failed; retrying next tick");
                }
            }
        }

        self.drain().await;
    }

    /// Cancel the scheduler and wait for every timer, including in-flight
    /// fires, to finish.
    pub async fn shutdown(&self) {
        self.token.cancel();
        self.drain().await;
    }

    async fn drain(&self) {
        {
            let mut tasks = self.tasks.lock().await;
            if self.state() != SchedulerState::Stopped {
                self.state.send_replace(SchedulerState::ShuttingDown);
            }
            for (_, task) in tasks.running.drain() {
                task.stop();
            }
            tasks.retiring.clear();
        }

        info!("recurring scheduler shutting down; waiting for in-flight launches");
        self.tracker.close();
        self.tracker.wait().await;

        self.state.send_replace(SchedulerState::Stopped);
        info!("recurring scheduler stopped");
    }
}
