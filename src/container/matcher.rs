// src/container/matcher.rs

//! Pure predicates deciding whether a container may be launched, and whether
//! a given engine event should launch it now.
//!
//! Nothing here touches the engine; every decision is taken from a fresh
//! [`Container`] snapshot.

use std::time::Duration;

use super::event::Event;
use super::model::{Container, ContainerState};

/// A container is a candidate when it is marked as a test, is not itself a
/// clone, and has exited.
pub fn is_candidate(container: &Container) -> bool {
    let meta = container.metadata();
    meta.is_test && meta.created_from.is_none() && container.state() == ContainerState::Exited
}

/// The container's recurring launch interval, if it carries a valid one.
pub fn recurring_interval(container: &Container) -> Option<Duration> {
    container.metadata().interval
}

/// Whether `event` should launch `container`.
///
/// Requires an event and an event subscription; every filter the container
/// declares must then hold, in order: type, action, name, image, labels.
pub fn matches_event(container: &Container, event: Option<&Event>) -> bool {
    let Some(event) = event else {
        return false;
    };
    let Some(filters) = container.metadata().events.as_ref() else {
        return false;
    };

    if let Some(types) = &filters.types {
        if !contains(types, event.kind()) {
            return false;
        }
    }

    if let Some(actions) = &filters.actions {
        if !contains(actions, event.action()) {
            return false;
        }
    }

    if let Some(names) = &filters.names {
        if !names.matches(event.actor_name()) {
            return false;
        }
    }

    if let Some(images) = &filters.images {
        if !images.matches(event.image_ref()) {
            return false;
        }
    }

    if let Some(clauses) = &filters.labels {
        if !clauses.iter().all(|c| c.holds(&event.actor.attributes)) {
            return false;
        }
    }

    true
}

fn contains(list: &[String], value: Option<&str>) -> bool {
    let value = value.unwrap_or_default();
    list.iter().any(|item| item == value)
}

/// Restricts candidates to an explicit set of container names.
///
/// An empty name list admits every container.
#[derive(Debug, Clone, Default)]
pub struct CandidateSelection {
    names: Vec<String>,
}

impl CandidateSelection {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim_start_matches('/').to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Selects every container.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn admits(&self, container: &Container) -> bool {
        self.names.is_empty() || self.names.iter().any(|n| n == container.name())
    }

    /// Candidate and admitted by name.
    pub fn selects(&self, container: &Container) -> bool {
        self.admits(container) && is_candidate(container)
    }
}
