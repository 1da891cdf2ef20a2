// src/errors.rs

//! Crate-wide error type and the aggregate error used for per-event launches.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TugbotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Docker API error: {0}")]
    DockerError(#[from] bollard::errors::Error),

    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("{0}")]
    LaunchFailures(LaunchErrors),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TugbotError>;

/// A single failed launch: which source container, and why.
#[derive(Debug)]
pub struct LaunchFailure {
    pub container: String,
    pub error: TugbotError,
}

/// Every launch failure produced while handling one event, in the order the
/// matching candidates were listed.
#[derive(Debug, Default)]
pub struct LaunchErrors {
    failures: Vec<LaunchFailure>,
}

impl LaunchErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, container: impl Into<String>, error: TugbotError) {
        self.failures.push(LaunchFailure {
            container: container.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[LaunchFailure] {
        &self.failures
    }

    /// `Ok(())` when nothing failed, otherwise the combined error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TugbotError::LaunchFailures(self))
        }
    }
}

impl fmt::Display for LaunchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, failure) in self.failures.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", failure.container, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for LaunchErrors {}
