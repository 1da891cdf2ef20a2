// src/config/resolve.rs

//! Merge CLI flags, environment and config file into final settings.
//!
//! Precedence, highest first: CLI flag, environment, config file, default.

use std::time::Duration;

use crate::client::RegistryAuth;
use crate::config::model::{ConfigFile, DEFAULT_ENGINE_HOST};
use crate::config::validate::{validate_host, warn_partial_credentials};
use crate::errors::Result;
use crate::launch::LaunchSettings;

pub const ENV_DOCKER_HOST: &str = "DOCKER_HOST";
pub const ENV_REPO_USER: &str = "REPO_USER";
pub const ENV_REPO_PASS: &str = "REPO_PASS";
pub const ENV_REPO_EMAIL: &str = "REPO_EMAIL";

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub tick_interval: Option<Duration>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub event_queue_length: usize,
    pub tick_interval: Duration,
    pub launch: LaunchSettings,
}

/// Resolve settings using `env` to look up environment variables.
///
/// Registry credentials come from the environment as a set: if any of
/// `REPO_USER`, `REPO_PASS` or `REPO_EMAIL` is set, the file's `[registry]`
/// section is ignored.
pub fn resolve<F>(file: ConfigFile, overrides: &Overrides, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let host = overrides
        .host
        .clone()
        .or_else(|| lookup(ENV_DOCKER_HOST))
        .or(file.host)
        .unwrap_or_else(|| DEFAULT_ENGINE_HOST.to_string());
    validate_host(&host)?;

    let tick_interval = overrides.tick_interval.unwrap_or(file.tick_interval);

    let env_user = lookup(ENV_REPO_USER);
    let env_pass = lookup(ENV_REPO_PASS);
    let env_email = lookup(ENV_REPO_EMAIL);
    let registry = if env_user.is_some() || env_pass.is_some() || env_email.is_some() {
        let auth = RegistryAuth {
            username: env_user.unwrap_or_default(),
            password: env_pass.unwrap_or_default(),
            email: env_email.unwrap_or_default(),
        };
        warn_partial_credentials(&auth, "environment");
        auth
    } else {
        file.launch.registry
    };

    Ok(Settings {
        host,
        event_queue_length: file.event_queue_length,
        tick_interval,
        launch: LaunchSettings {
            name_prefix: file.launch.name_prefix,
            registry,
        },
    })
}

/// Environment lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
