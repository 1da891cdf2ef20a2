#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tugbot::client::MockClient;
use tugbot::launch::{LaunchSettings, Launcher};

pub use tugbot_test_utils::builders::{ContainerBuilder, EventBuilder};
pub use tugbot_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Launcher over `mock` with default settings (no credentials).
pub fn launcher(mock: &MockClient) -> Launcher {
    Launcher::new(Arc::new(mock.clone()), LaunchSettings::default())
}

/// Fixed local timestamp for deterministic clone names.
pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .and_then(|date| date.and_hms_opt(h, mi, s))
        .expect("valid timestamp")
}
