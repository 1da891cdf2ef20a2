// src/schedule/mod.rs

//! Recurring launches.
//!
//! - [`reconcile`] is the pure diff between running and desired timers.
//! - [`task`] owns a single container's timer.
//! - [`scheduler`] runs the outer tick and holds the timer set.

pub mod reconcile;
pub mod scheduler;
pub mod task;

pub use reconcile::{desired_tasks, plan, DesiredTask, ReconcilePlan};
pub use scheduler::{RecurringScheduler, ReconcileReport};
pub use task::RecurringTask;
