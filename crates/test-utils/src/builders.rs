#![allow(dead_code)]

use tugbot::container::labels::{
    ATTR_IMAGE, ATTR_NAME, ATTR_SWARM_TASK_ID, LABEL_CREATED_FROM, LABEL_EVENTS,
    LABEL_EVENT_TIMER, LABEL_FILTER_ACTION, LABEL_FILTER_CONTAINER, LABEL_FILTER_IMAGE,
    LABEL_FILTER_LABEL, LABEL_FILTER_TYPE, LABEL_SERVICE, LABEL_STOP_SIGNAL, LABEL_TEST,
};
use tugbot::container::{Container, ContainerState, Event, HostConfig, RunConfig};

/// Builder for `Container` snapshots.
///
/// Defaults: id `id-<name>`, state `exited`, image `alpine:3.20`, no labels.
pub struct ContainerBuilder {
    id: String,
    name: String,
    state: ContainerState,
    config: RunConfig,
    host_config: HostConfig,
}

impl ContainerBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            id: format!("id-{name}"),
            name: name.to_string(),
            state: ContainerState::Exited,
            config: RunConfig {
                image: "alpine:3.20".to_string(),
                ..Default::default()
            },
            host_config: HostConfig::default(),
        }
    }

    /// An exited container labelled as a test.
    pub fn test(name: &str) -> Self {
        Self::new(name).label(LABEL_TEST, "true")
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn state(mut self, state: ContainerState) -> Self {
        self.state = state;
        self
    }

    pub fn running(self) -> Self {
        self.state(ContainerState::Running)
    }

    pub fn image(mut self, image: &str) -> Self {
        self.config.image = image.to_string();
        self
    }

    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.config.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn service(self) -> Self {
        self.label(LABEL_SERVICE, "true")
    }

    pub fn created_from(self, source: &str) -> Self {
        self.label(LABEL_CREATED_FROM, source)
    }

    pub fn every(self, interval: &str) -> Self {
        self.label(LABEL_EVENT_TIMER, interval)
    }

    pub fn stop_signal(self, signal: &str) -> Self {
        self.label(LABEL_STOP_SIGNAL, signal)
    }

    /// Subscribe to engine events with no filters.
    pub fn on_events(self) -> Self {
        self.label(LABEL_EVENTS, "true")
    }

    pub fn filter_type(self, value: &str) -> Self {
        self.on_events().label(LABEL_FILTER_TYPE, value)
    }

    pub fn filter_action(self, value: &str) -> Self {
        self.on_events().label(LABEL_FILTER_ACTION, value)
    }

    pub fn filter_container(self, value: &str) -> Self {
        self.on_events().label(LABEL_FILTER_CONTAINER, value)
    }

    pub fn filter_image(self, value: &str) -> Self {
        self.on_events().label(LABEL_FILTER_IMAGE, value)
    }

    pub fn filter_label(self, value: &str) -> Self {
        self.on_events().label(LABEL_FILTER_LABEL, value)
    }

    pub fn cmd(mut self, cmd: &[&str]) -> Self {
        self.config.cmd = Some(cmd.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn env(mut self, var: &str) -> Self {
        self.config.env.get_or_insert_with(Vec::new).push(var.to_string());
        self
    }

    pub fn link(mut self, link: &str) -> Self {
        self.host_config.links.push(link.to_string());
        self
    }

    pub fn bind(mut self, bind: &str) -> Self {
        self.host_config
            .binds
            .get_or_insert_with(Vec::new)
            .push(bind.to_string());
        self
    }

    pub fn build(self) -> Container {
        Container::new(
            self.id,
            self.name,
            self.state,
            self.config,
            self.host_config,
        )
    }
}

/// Builder for engine `Event`s.
///
/// Defaults to a `container` event with no action.
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            event: Event {
                kind: Some("container".to_string()),
                ..Default::default()
            },
        }
    }

    /// A `container` event with `action`, for actor `name`.
    pub fn container(action: &str, name: &str) -> Self {
        Self::new()
            .kind("container")
            .action(action)
            .id(&format!("id-{name}"))
            .attribute(ATTR_NAME, name)
    }

    /// An `image` event with `action`; the event id is the image reference.
    pub fn image(action: &str, image: &str) -> Self {
        Self::new().kind("image").action(action).id(image)
    }

    pub fn id(mut self, id: &str) -> Self {
        self.event.id = id.to_string();
        self.event.actor.id = id.to_string();
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.event.kind = Some(kind.to_string());
        self
    }

    pub fn action(mut self, action: &str) -> Self {
        self.event.action = Some(action.to_string());
        self
    }

    /// Legacy status field, used when no action is set.
    pub fn status(mut self, status: &str) -> Self {
        self.event.action = None;
        self.event.status = Some(status.to_string());
        self
    }

    /// Image the actor was created from.
    pub fn from_image(mut self, image: &str) -> Self {
        self.event.from = Some(image.to_string());
        self.attribute(ATTR_IMAGE, image)
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.event
            .actor
            .attributes
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn created_by_tugbot(self, source: &str) -> Self {
        self.attribute(LABEL_CREATED_FROM, source)
    }

    pub fn swarm_task(self, task_id: &str) -> Self {
        self.attribute(ATTR_SWARM_TASK_ID, task_id)
    }

    pub fn build(self) -> Event {
        self.event
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
