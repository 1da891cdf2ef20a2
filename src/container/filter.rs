// src/container/filter.rs

//! Filter-value syntax used by the event filter labels.
//!
//! A value is either a comma-separated literal list (`"start, die"`), tested
//! by exact membership, or `re2:` followed by a regular expression, tested by
//! searching the candidate string.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use tracing::warn;

use super::labels::REGEX_PREFIX;

/// Split on `sep` and trim whitespace around each element.
pub fn split_and_trim(value: &str, sep: char) -> Vec<String> {
    value.split(sep).map(|s| s.trim().to_string()).collect()
}

/// A compiled filter value.
#[derive(Clone)]
pub enum FilterValue {
    /// Exact match against any element.
    List(Vec<String>),
    /// Regular-expression search.
    Pattern(Regex),
    /// The `re2:` pattern failed to compile; matches nothing.
    Invalid { pattern: String },
}

impl FilterValue {
    /// Parse a raw label value. A malformed pattern is logged and yields
    /// [`FilterValue::Invalid`].
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(REGEX_PREFIX) {
            Some(pattern) => match Regex::new(pattern) {
                Ok(re) => FilterValue::Pattern(re),
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "invalid filter pattern; it will never match");
                    FilterValue::Invalid {
                        pattern: pattern.to_string(),
                    }
                }
            },
            None => FilterValue::List(split_and_trim(raw, ',')),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            FilterValue::List(items) => items.iter().any(|item| item == value),
            FilterValue::Pattern(re) => re.is_match(value),
            FilterValue::Invalid { .. } => false,
        }
    }
}

impl fmt::Debug for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::List(items) => f.debug_tuple("List").field(items).finish(),
            FilterValue::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            FilterValue::Invalid { pattern } => {
                f.debug_struct("Invalid").field("pattern", pattern).finish()
            }
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::List(items) => write!(f, "{}", items.join(",")),
            FilterValue::Pattern(re) => write!(f, "{REGEX_PREFIX}{}", re.as_str()),
            FilterValue::Invalid { pattern } => write!(f, "{REGEX_PREFIX}{pattern} (invalid)"),
        }
    }
}

/// One clause of a label filter: `key=value` or a bare `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelClause {
    Equals { key: String, value: String },
    Exists { key: String },
}

impl LabelClause {
    /// Parse a single clause; the value is everything after the first `=`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('=') {
            Some((key, value)) => LabelClause::Equals {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => LabelClause::Exists {
                key: raw.trim().to_string(),
            },
        }
    }

    /// Parse a comma-separated clause list, skipping empty elements.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        split_and_trim(raw, ',')
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| Self::parse(&s))
            .collect()
    }

    pub fn holds(&self, attributes: &HashMap<String, String>) -> bool {
        match self {
            LabelClause::Equals { key, value } => attributes.get(key) == Some(value),
            LabelClause::Exists { key } => attributes.contains_key(key),
        }
    }
}
