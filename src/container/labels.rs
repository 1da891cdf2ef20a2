// src/container/labels.rs

//! Label keys read from container metadata and event actor attributes.

/// Marks the tugbot container itself.
pub const LABEL_SERVICE: &str = "tugbot.service";
/// `"true"` when the container may be cloned and launched automatically.
pub const LABEL_TEST: &str = "tugbot.test";
/// Presence subscribes the container to live engine events.
pub const LABEL_EVENTS: &str = "tugbot.event.docker";
/// Duration string for a recurring launch, e.g. `"10s"`.
pub const LABEL_EVENT_TIMER: &str = "tugbot.event.timer";
/// Set on every clone; holds the source container's name.
pub const LABEL_CREATED_FROM: &str = "tugbot.created.from";
/// Custom signal used when stopping the container.
pub const LABEL_STOP_SIGNAL: &str = "tugbot.stop-signal";
/// Original image reference for Zodiac-style deployments.
pub const LABEL_ZODIAC: &str = "tugbot.zodiac.original-image";

pub const LABEL_FILTER_TYPE: &str = "tugbot.event.docker.filter.type";
pub const LABEL_FILTER_ACTION: &str = "tugbot.event.docker.filter.action";
pub const LABEL_FILTER_CONTAINER: &str = "tugbot.event.docker.filter.container";
pub const LABEL_FILTER_IMAGE: &str = "tugbot.event.docker.filter.image";
pub const LABEL_FILTER_LABEL: &str = "tugbot.event.docker.filter.label";

/// Actor attribute carried by events of swarm service task containers.
pub const ATTR_SWARM_TASK_ID: &str = "com.docker.swarm.task.id";
/// Actor attribute holding the container name.
pub const ATTR_NAME: &str = "name";
/// Actor attribute holding the image a container was created from.
pub const ATTR_IMAGE: &str = "image";

/// Prefix marking a filter value as a regular expression.
pub const REGEX_PREFIX: &str = "re2:";

/// Prefix used when naming clones.
pub const DEFAULT_CLONE_PREFIX: &str = "tugbot_";

/// Signal sent by `stop_container` when no custom one is configured.
pub const DEFAULT_STOP_SIGNAL: &str = "SIGTERM";
