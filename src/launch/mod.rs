// src/launch/mod.rs

//! Launch orchestration: clone a source container and start the clone.
//!
//! - [`clone`] builds the create request (naming, link rewrite, provenance).
//! - [`Launcher`] sends it to the engine, create then start.

pub mod clone;

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::client::{EngineClient, RegistryAuth};
use crate::container::labels::DEFAULT_CLONE_PREFIX;
use crate::container::Container;
use crate::errors::Result;

pub use clone::{clone_name, clone_request, rewrite_link};

/// Everything the launcher needs besides the engine client.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub name_prefix: String,
    pub registry: RegistryAuth,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_CLONE_PREFIX.to_string(),
            registry: RegistryAuth::default(),
        }
    }
}

/// Creates and starts clones of source containers.
///
/// Shared by the dispatcher and every recurring timer, so it is cheap to
/// clone and holds no mutable state.
#[derive(Debug, Clone)]
pub struct Launcher {
    client: Arc<dyn EngineClient>,
    name_prefix: String,
    auth: Option<RegistryAuth>,
}

impl Launcher {
    pub fn new(client: Arc<dyn EngineClient>, settings: LaunchSettings) -> Self {
        let auth = settings.registry.is_complete().then_some(settings.registry);
        Self {
            client,
            name_prefix: settings.name_prefix,
            auth,
        }
    }

    pub fn client(&self) -> &Arc<dyn EngineClient> {
        &self.client
    }

    /// Credentials sent on create, if a complete set was configured.
    pub fn auth(&self) -> Option<&RegistryAuth> {
        self.auth.as_ref()
    }

    /// Launch a clone of `source` named after the current local time.
    pub async fn launch(&self, source: &Container) -> Result<String> {
        self.launch_at(source, Local::now().naive_local()).await
    }

    /// Launch a clone of `source` named after `at`. Returns the new
    /// container's id.
    ///
    /// Engine errors from create or start are returned as-is; nothing is
    /// retried.
    pub async fn launch_at(&self, source: &Container, at: NaiveDateTime) -> Result<String> {
        let name = clone_name(&self.name_prefix, source.name(), at);
        let request = clone_request(source, name);

        debug!(source = %source.name(), clone = %request.name, "creating clone");
        let id = self
            .client
            .create_container(&request, self.auth.as_ref())
            .await?;

        info!(source = %source.name(), clone = %request.name, container_id = %id, "starting clone");
        self.client
            .start_container(&id, &request.host_config)
            .await?;

        Ok(id)
    }
}
