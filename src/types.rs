use std::fmt;

/// Engine-assigned container identifier.
pub type ContainerId = String;

/// Lifecycle of the recurring scheduler as a whole.
///
/// - `Idle`: constructed, outer loop not started yet.
/// - `Active`: ticking and reconciling timers.
/// - `ShuttingDown`: cancellation observed; timers stopped, waiting for
///   in-flight fires to finish.
/// - `Stopped`: every timer has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Active,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Active => "active",
            SchedulerState::ShuttingDown => "shutting-down",
            SchedulerState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
