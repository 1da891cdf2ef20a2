// src/container/mod.rs

//! Container and event model plus the label-driven decision rules.
//!
//! - [`labels`] is the label vocabulary.
//! - [`model`] holds the engine-independent `Container` snapshot.
//! - [`metadata`] parses labels into a typed record once per snapshot.
//! - [`filter`] implements the literal-list / `re2:` filter-value syntax.
//! - [`event`] is the engine event value.
//! - [`matcher`] contains the candidacy and event-matching predicates.

pub mod event;
pub mod filter;
pub mod labels;
pub mod matcher;
pub mod metadata;
pub mod model;

pub use event::{Actor, Event};
pub use filter::{FilterValue, LabelClause};
pub use matcher::{is_candidate, matches_event, recurring_interval, CandidateSelection};
pub use metadata::{ContainerMetadata, EventFilters};
pub use model::{Container, ContainerState, HostConfig, RunConfig};
