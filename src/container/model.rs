// src/container/model.rs

//! Engine-independent container snapshot.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::labels::LABEL_ZODIAC;
use super::metadata::ContainerMetadata;

/// Lifecycle state reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    #[default]
    Unknown,
}

impl FromStr for ContainerState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        })
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// The run configuration copied onto a clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub image: String,
    pub cmd: Option<Vec<String>>,
    pub entrypoint: Option<Vec<String>>,
    pub env: Option<Vec<String>>,
    pub labels: HashMap<String, String>,
    pub working_dir: Option<String>,
    pub user: Option<String>,
    pub hostname: Option<String>,
    pub tty: Option<bool>,
    pub open_stdin: Option<bool>,
    pub stop_signal: Option<String>,
    pub exposed_ports: Option<Vec<String>>,
    pub volumes: Option<Vec<String>>,
}

/// Host-level configuration copied onto a clone.
///
/// `links` use the legacy `target:alias` syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostConfig {
    pub links: Vec<String>,
    pub binds: Option<Vec<String>>,
    pub network_mode: Option<String>,
    pub volumes_from: Option<Vec<String>>,
    pub privileged: Option<bool>,
    pub extra_hosts: Option<Vec<String>>,
    pub dns: Option<Vec<String>>,
    pub cap_add: Option<Vec<String>>,
    pub cap_drop: Option<Vec<String>>,
}

/// Read-only snapshot of a container, taken fresh from the engine.
///
/// Label-derived metadata is parsed once at construction.
#[derive(Debug, Clone)]
pub struct Container {
    id: String,
    name: String,
    state: ContainerState,
    config: RunConfig,
    host_config: HostConfig,
    metadata: ContainerMetadata,
}

impl Container {
    /// Build a snapshot. A leading `/` on the name (as the Docker API
    /// reports it) is stripped.
    pub fn new(
        id: impl Into<String>,
        name: impl AsRef<str>,
        state: ContainerState,
        config: RunConfig,
        host_config: HostConfig,
    ) -> Self {
        let name = name.as_ref().trim_start_matches('/').to_string();
        let metadata = ContainerMetadata::from_labels(&name, &config.labels);
        Self {
            id: id.into(),
            name,
            state,
            config,
            host_config,
            metadata,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn labels(&self) -> &HashMap<String, String> {
        &self.config.labels
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn host_config(&self) -> &HostConfig {
        &self.host_config
    }

    pub fn metadata(&self) -> &ContainerMetadata {
        &self.metadata
    }

    /// Raw image reference from the run configuration.
    pub fn image(&self) -> &str {
        &self.config.image
    }

    /// Image name the container was started from, honouring the Zodiac
    /// original-image label and defaulting the tag to `latest`.
    pub fn image_name(&self) -> String {
        let image = self
            .config
            .labels
            .get(LABEL_ZODIAC)
            .map(String::as_str)
            .unwrap_or(&self.config.image);
        if image.contains(':') {
            image.to_string()
        } else {
            format!("{image}:latest")
        }
    }

    /// Whether this container is the tugbot service itself.
    pub fn is_service(&self) -> bool {
        self.metadata.is_service
    }

    /// Custom stop signal from labels, if any.
    pub fn stop_signal(&self) -> Option<&str> {
        self.metadata.stop_signal.as_deref()
    }

    /// Whether this container was created as a clone by tugbot.
    pub fn is_created_by_tugbot(&self) -> bool {
        self.metadata.created_from.is_some()
    }
}
