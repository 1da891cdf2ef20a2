// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::client::RegistryAuth;
use crate::container::labels::DEFAULT_CLONE_PREFIX;
use crate::launch::LaunchSettings;

/// Engine address used when neither the CLI, `DOCKER_HOST` nor the config
/// file provides one.
pub const DEFAULT_ENGINE_HOST: &str = "unix:///var/run/docker.sock";

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(18);

/// Configuration file as deserialized, before validation.
///
/// ```toml
/// [engine]
/// host = "unix:///var/run/docker.sock"
/// event_queue_length = 64
///
/// [scheduler]
/// tick_interval = "18s"
///
/// [launch]
/// name_prefix = "tugbot_"
///
/// [registry]
/// username = "bot"
/// password = "secret"
/// email = "bot@example.com"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub launch: LaunchSection,

    #[serde(default)]
    pub registry: RegistrySection,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// `unix://`, `tcp://` or `http://` address of the engine API.
    #[serde(default)]
    pub host: Option<String>,

    /// Capacity of the channel between the event subscription and the
    /// dispatcher.
    #[serde(default = "default_event_queue_length")]
    pub event_queue_length: usize,
}

fn default_event_queue_length() -> usize {
    64
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            host: None,
            event_queue_length: default_event_queue_length(),
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    /// How often the candidate list is re-read, e.g. `"18s"`.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: String,
}

fn default_tick_interval() -> String {
    "18s".to_string()
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
        }
    }
}

/// `[launch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchSection {
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
}

fn default_name_prefix() -> String {
    DEFAULT_CLONE_PREFIX.to_string()
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
        }
    }
}

/// `[registry]` section. Used only when all three fields are set.
#[derive(Clone, Default, Deserialize)]
pub struct RegistrySection {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

impl std::fmt::Debug for RegistrySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySection")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

impl From<RegistrySection> for RegistryAuth {
    fn from(section: RegistrySection) -> Self {
        RegistryAuth {
            username: section.username,
            password: section.password,
            email: section.email,
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` or
/// `Default`, so durations are already parsed and limits checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub event_queue_length: usize,
    pub tick_interval: Duration,
    pub launch: LaunchSettings,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        host: Option<String>,
        event_queue_length: usize,
        tick_interval: Duration,
        launch: LaunchSettings,
    ) -> Self {
        Self {
            host,
            event_queue_length,
            tick_interval,
            launch,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            None,
            default_event_queue_length(),
            DEFAULT_TICK_INTERVAL,
            LaunchSettings::default(),
        )
    }
}
