// src/container/event.rs

use std::collections::HashMap;

use super::labels::{ATTR_NAME, ATTR_SWARM_TASK_ID, LABEL_CREATED_FROM};

/// Origin of an event: the object's id plus arbitrary attributes (container
/// name, image, labels, swarm task id, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub attributes: HashMap<String, String>,
}

/// A single notification from the engine's event stream.
///
/// `kind` and `action` are the modern split fields; `status` is the legacy
/// combined field some engines send instead of `action`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub kind: Option<String>,
    pub action: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub actor: Actor,
    pub time: Option<i64>,
}

impl Event {
    /// Event type, e.g. `"container"` or `"image"`.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Event action, falling back to the legacy status field.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref().or(self.status.as_deref())
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.actor.attributes.get(key).map(String::as_str)
    }

    /// The actor's `name` attribute, or `""`.
    pub fn actor_name(&self) -> &str {
        self.attribute(ATTR_NAME).unwrap_or_default()
    }

    /// Image the event refers to: the event id itself for image events,
    /// otherwise the image the actor was created from.
    pub fn image_ref(&self) -> &str {
        if self.kind() == Some("image") {
            &self.id
        } else {
            self.from.as_deref().unwrap_or_default()
        }
    }

    /// True when the actor carries a non-empty provenance attribute, i.e. it
    /// is a clone we launched ourselves.
    pub fn is_created_by_tugbot(&self) -> bool {
        self.attribute(LABEL_CREATED_FROM)
            .is_some_and(|v| !v.is_empty())
    }

    /// True when the actor is a swarm service task replica.
    pub fn is_swarm_task(&self) -> bool {
        self.attribute(ATTR_SWARM_TASK_ID)
            .is_some_and(|v| !v.is_empty())
    }
}
