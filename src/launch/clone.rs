// src/launch/clone.rs

//! Pure construction of a clone's create request from a source snapshot.

use chrono::NaiveDateTime;

use crate::client::CreateRequest;
use crate::container::labels::LABEL_CREATED_FROM;
use crate::container::Container;

/// Timestamp layout appended to clone names (second resolution).
pub const CLONE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// `<prefix><source>_<YYYYMMDDhhmmss>`.
///
/// Two launches of the same source within one second produce the same name;
/// the engine rejects the second create.
pub fn clone_name(prefix: &str, source: &str, at: NaiveDateTime) -> String {
    format!("{prefix}{source}_{}", at.format(CLONE_TIMESTAMP_FORMAT))
}

/// Rewrite a legacy `target:alias` link so it still resolves under the
/// clone's new name. The engine reports aliases as `/<owner>/<alias>`; only
/// the last non-empty path segment is kept, falling back to the alias as
/// given when it has none.
///
/// Entries without `:` are returned unchanged.
pub fn rewrite_link(link: &str) -> String {
    let Some((target, alias)) = link.split_once(':') else {
        return link.to_string();
    };
    let last = alias
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(alias);
    format!("{target}:{last}")
}

/// Copy the source's run and host configuration, rewrite links, and stamp
/// the provenance label with the source name.
pub fn clone_request(source: &Container, name: String) -> CreateRequest {
    let mut config = source.config().clone();
    config
        .labels
        .insert(LABEL_CREATED_FROM.to_string(), source.name().to_string());

    let mut host_config = source.host_config().clone();
    host_config.links = host_config
        .links
        .iter()
        .map(|link| rewrite_link(link))
        .collect();

    CreateRequest {
        name,
        config,
        host_config,
    }
}
