// src/config/validate.rs

use tracing::warn;

use crate::client::RegistryAuth;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::duration::parse_duration;
use crate::errors::{Result, TugbotError};
use crate::launch::LaunchSettings;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TugbotError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        if let Some(host) = &raw.engine.host {
            validate_host(host)?;
        }

        if raw.engine.event_queue_length == 0 {
            return Err(TugbotError::ConfigError(
                "[engine].event_queue_length must be >= 1 (got 0)".to_string(),
            ));
        }

        let tick_interval = parse_duration(&raw.scheduler.tick_interval).map_err(|err| {
            TugbotError::ConfigError(format!("[scheduler].tick_interval: {err}"))
        })?;

        if raw.launch.name_prefix.trim().is_empty() {
            return Err(TugbotError::ConfigError(
                "[launch].name_prefix must not be empty".to_string(),
            ));
        }

        let registry = RegistryAuth::from(raw.registry);
        warn_partial_credentials(&registry, "[registry]");

        Ok(ConfigFile::new_unchecked(
            raw.engine.host,
            raw.engine.event_queue_length,
            tick_interval,
            LaunchSettings {
                name_prefix: raw.launch.name_prefix,
                registry,
            },
        ))
    }
}

/// Accepts `unix://<path>`, `tcp://<addr>` and `http://<addr>`.
pub fn validate_host(host: &str) -> Result<()> {
    let rest = ["unix://", "tcp://", "http://"]
        .iter()
        .find_map(|scheme| host.strip_prefix(scheme));

    match rest {
        Some(rest) if !rest.is_empty() => Ok(()),
        Some(_) => Err(TugbotError::ConfigError(format!(
            "engine host '{host}' has no address after the scheme"
        ))),
        None => Err(TugbotError::ConfigError(format!(
            "engine host '{host}' must start with unix://, tcp:// or http://"
        ))),
    }
}

/// Partial credentials are never sent; say so once at startup.
pub fn warn_partial_credentials(auth: &RegistryAuth, origin: &str) {
    if auth.is_partial() {
        warn!(
            origin = %origin,
            "registry credentials incomplete (username, password and email are all required); credentials ignored"
        );
    }
}
