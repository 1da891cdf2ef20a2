// src/client/mod.rs

//! Container engine client abstraction.
//!
//! Everything else in the crate talks to an [`EngineClient`] rather than to
//! the Docker API directly, so tests can swap in [`MockClient`].
//!
//! - [`docker`] implements the trait over the Docker API with `bollard`.
//! - [`mock`] is an in-memory engine with failure injection.
//! - [`stop`] composes the primitives into a stop-and-remove operation.

pub mod docker;
pub mod mock;
pub mod stop;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::container::{Container, Event, HostConfig, RunConfig};
use crate::errors::Result;

pub use docker::DockerClient;
pub use mock::{MockCall, MockClient};
pub use stop::stop_container;

/// Boxed future returned by the object-safe client methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Predicate applied to each listed container.
pub type ContainerFilter<'f> = dyn Fn(&Container) -> bool + Send + Sync + 'f;

/// Filter that keeps every container.
pub fn all_containers(_: &Container) -> bool {
    true
}

/// Everything needed to create a new container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub config: RunConfig,
    pub host_config: HostConfig,
}

/// Registry credentials passed along with a create call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl RegistryAuth {
    /// True only when username, password and email are all set.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.email.is_empty()
    }

    /// True when some but not all fields are set.
    pub fn is_partial(&self) -> bool {
        let set = [&self.username, &self.password, &self.email]
            .iter()
            .filter(|s| !s.is_empty())
            .count();
        set > 0 && set < 3
    }
}

impl fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

/// Operations tugbot needs from a container engine.
///
/// Implementations must tolerate concurrent use from the event dispatcher,
/// the scheduler's outer loop and every recurring timer.
pub trait EngineClient: Send + Sync + fmt::Debug {
    /// All containers (running or not) for which `filter` holds.
    fn list_containers<'a>(
        &'a self,
        filter: &'a ContainerFilter<'a>,
    ) -> BoxFuture<'a, Result<Vec<Container>>>;

    /// Fresh snapshot of one container; fails if it no longer exists.
    fn inspect_container<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Container>>;

    /// Create a container and return its id.
    fn create_container<'a>(
        &'a self,
        request: &'a CreateRequest,
        auth: Option<&'a RegistryAuth>,
    ) -> BoxFuture<'a, Result<String>>;

    fn start_container<'a>(
        &'a self,
        id: &'a str,
        host_config: &'a HostConfig,
    ) -> BoxFuture<'a, Result<()>>;

    fn kill_container<'a>(&'a self, id: &'a str, signal: &'a str) -> BoxFuture<'a, Result<()>>;

    fn remove_container<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Forward engine events into `tx` until `cancel` fires, the receiver is
    /// dropped, or the engine closes the stream.
    fn subscribe_events(
        &self,
        tx: mpsc::Sender<Event>,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<()>>;
}
