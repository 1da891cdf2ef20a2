// src/container/metadata.rs

//! Typed view over a container's tugbot labels.

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use super::filter::{split_and_trim, FilterValue, LabelClause};
use super::labels::{
    LABEL_CREATED_FROM, LABEL_EVENTS, LABEL_EVENT_TIMER, LABEL_FILTER_ACTION,
    LABEL_FILTER_CONTAINER, LABEL_FILTER_IMAGE, LABEL_FILTER_LABEL, LABEL_FILTER_TYPE,
    LABEL_SERVICE, LABEL_STOP_SIGNAL, LABEL_TEST,
};
use crate::duration::parse_duration;

/// Label-derived facts about a container, parsed once per snapshot.
#[derive(Debug, Clone, Default)]
pub struct ContainerMetadata {
    /// `tugbot.service == "true"`.
    pub is_service: bool,
    /// `tugbot.test == "true"`.
    pub is_test: bool,
    /// Source container name for clones; `None` when absent or empty.
    pub created_from: Option<String>,
    /// Recurring launch interval; `None` when absent or malformed.
    pub interval: Option<Duration>,
    pub stop_signal: Option<String>,
    /// `None` unless the container subscribes to engine events.
    pub events: Option<EventFilters>,
}

/// Optional refinements on which events trigger a subscribed container.
/// A `None` criterion is satisfied by every event.
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    pub types: Option<Vec<String>>,
    pub actions: Option<Vec<String>>,
    pub names: Option<FilterValue>,
    pub images: Option<FilterValue>,
    pub labels: Option<Vec<LabelClause>>,
}

impl ContainerMetadata {
    pub fn from_labels(container: &str, labels: &HashMap<String, String>) -> Self {
        let get = |key: &str| labels.get(key).map(String::as_str);

        let interval = get(LABEL_EVENT_TIMER).and_then(|raw| match parse_duration(raw) {
            Ok(d) => Some(d),
            Err(err) => {
                warn!(
                    container = %container,
                    value = %raw,
                    error = %err,
                    "ignoring malformed recurring interval label"
                );
                None
            }
        });

        let events = get(LABEL_EVENTS).map(|_| EventFilters {
            types: get(LABEL_FILTER_TYPE).map(|v| split_and_trim(v, ',')),
            actions: get(LABEL_FILTER_ACTION).map(|v| split_and_trim(v, ',')),
            names: get(LABEL_FILTER_CONTAINER).map(FilterValue::parse),
            images: get(LABEL_FILTER_IMAGE).map(FilterValue::parse),
            labels: get(LABEL_FILTER_LABEL).map(LabelClause::parse_list),
        });

        Self {
            is_service: get(LABEL_SERVICE) == Some("true"),
            is_test: get(LABEL_TEST) == Some("true"),
            created_from: get(LABEL_CREATED_FROM)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            interval,
            stop_signal: get(LABEL_STOP_SIGNAL).map(str::to_string),
            events,
        }
    }
}
