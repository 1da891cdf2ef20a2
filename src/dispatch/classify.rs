// src/dispatch/classify.rs

use std::fmt;

use crate::container::Event;

/// Why an event is dropped before any matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The actor is a clone tugbot launched.
    CreatedByTugbot,
    /// The actor is a swarm task replica.
    SwarmTask,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::CreatedByTugbot => f.write_str("created by tugbot"),
            IgnoreReason::SwarmTask => f.write_str("swarm task"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Dispatch,
    Ignore(IgnoreReason),
}

pub fn classify(event: &Event) -> Disposition {
    if event.is_created_by_tugbot() {
        Disposition::Ignore(IgnoreReason::CreatedByTugbot)
    } else if event.is_swarm_task() {
        Disposition::Ignore(IgnoreReason::SwarmTask)
    } else {
        Disposition::Dispatch
    }
}
