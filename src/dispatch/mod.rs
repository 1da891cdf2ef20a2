// src/dispatch/mod.rs

//! Engine event consumer.
//!
//! Each event is classified first (clones and swarm tasks are dropped), then
//! matched against every candidate; each match gets its own launch.

pub mod classify;
pub mod pump;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::container::{matches_event, CandidateSelection, Container, Event};
use crate::errors::{LaunchErrors, Result};
use crate::launch::Launcher;

pub use classify::{classify, Disposition, IgnoreReason};
pub use pump::{pump_events, RESUBSCRIBE_DELAY};

#[derive(Debug, Clone)]
pub struct EventDispatcher {
    launcher: Launcher,
    selection: CandidateSelection,
}

impl EventDispatcher {
    pub fn new(launcher: Launcher, selection: CandidateSelection) -> Self {
        Self {
            launcher,
            selection,
        }
    }

    /// Launch every candidate the event matches and return how many
    /// launches succeeded.
    ///
    /// Launches run concurrently and independently. Their failures are
    /// combined, in candidate listing order, into one
    /// [`TugbotError::LaunchFailures`](crate::errors::TugbotError::LaunchFailures).
    pub async fn handle_event(&self, event: &Event) -> Result<usize> {
        if let Disposition::Ignore(reason) = classify(event) {
            debug!(event_id = %event.id, %reason, "ignoring event");
            return Ok(0);
        }

        let selection = &self.selection;
        let filter = |c: &Container| selection.selects(c) && matches_event(c, Some(event));
        let matched = self.launcher.client().list_containers(&filter).await?;

        if matched.is_empty() {
            debug!(
                event_id = %event.id,
                kind = event.kind().unwrap_or_default(),
                action = event.action().unwrap_or_default(),
                "event matched no candidates"
            );
            return Ok(0);
        }

        info!(
            event_id = %event.id,
            kind = event.kind().unwrap_or_default(),
            action = event.action().unwrap_or_default(),
            matched = matched.len(),
            "event matched candidates"
        );

        let outcomes = join_all(matched.iter().map(|c| self.launcher.launch(c))).await;

        let mut errors = LaunchErrors::new();
        let mut launched = 0;
        for (source, outcome) in matched.iter().zip(outcomes) {
            match outcome {
                Ok(_) => launched += 1,
                Err(err) => errors.push(source.name(), err),
            }
        }
        errors.into_result()?;
        Ok(launched)
    }

    /// Handle events in delivery order until the channel closes or `token`
    /// is cancelled. An event already being handled is finished first.
    pub async fn run(&self, mut events: mpsc::Receiver<Event>, token: CancellationToken) {
        info!("event dispatcher started");
        loop {
            let event = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = events.recv() => match next {
                    Some(event) => event,
                    None => {
                        info!("event stream closed");
                        break;
                    }
                },
            };

            if let Err(err) = self.handle_event(&event).await {
                error!(event_id = %event.id, error = %err, "event handling failed");
            }
        }
        info!("event dispatcher stopped");
    }
}
