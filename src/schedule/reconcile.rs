// src/schedule/reconcile.rs

//! Pure reconciliation of the running timer set against the desired one.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::container::{recurring_interval, Container};
use crate::types::ContainerId;

/// A container that should have a recurring timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredTask {
    pub id: ContainerId,
    pub name: String,
    pub interval: Duration,
}

/// Timers to stop and timers to start, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub stop: Vec<ContainerId>,
    pub start: Vec<DesiredTask>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.stop.is_empty() && self.start.is_empty()
    }
}

/// Desired tasks for every listed container that carries a valid interval.
pub fn desired_tasks(containers: &[Container]) -> Vec<DesiredTask> {
    containers
        .iter()
        .filter_map(|c| {
            recurring_interval(c).map(|interval| DesiredTask {
                id: c.id().to_string(),
                name: c.name().to_string(),
                interval,
            })
        })
        .collect()
}

/// Compare `running` (id to interval) with `desired`.
///
/// - desired but not running: start
/// - running but not desired: stop
/// - running with a different interval: stop, then start
/// - running with the same interval: untouched
///
/// Duplicate desired ids keep their first occurrence. `stop` is sorted;
/// `start` follows the order of `desired`.
pub fn plan(running: &HashMap<ContainerId, Duration>, desired: &[DesiredTask]) -> ReconcilePlan {
    let mut seen = HashSet::new();
    let mut out = ReconcilePlan::default();

    for task in desired {
        if !seen.insert(task.id.as_str()) {
            continue;
        }
        match running.get(&task.id) {
            Some(current) if *current == task.interval => {}
            Some(_) => {
                out.stop.push(task.id.clone());
                out.start.push(task.clone());
            }
            None => out.start.push(task.clone()),
        }
    }

    out.stop.extend(
        running
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned(),
    );
    out.stop.sort();
    out
}
