// src/client/docker.rs

//! [`EngineClient`] over the Docker Engine API.

use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;

use bollard::auth::DockerCredentials;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, KillContainerOptions,
    ListContainersOptions, RemoveContainerOptions, StartContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerInspectResponse, EventMessage, HostConfig as DockerHostConfig};
use bollard::system::EventsOptions;
use bollard::{Docker, API_DEFAULT_VERSION};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{BoxFuture, ContainerFilter, CreateRequest, EngineClient, RegistryAuth};
use crate::container::labels::ATTR_IMAGE;
use crate::container::{Actor, Container, ContainerState, Event, HostConfig, RunConfig};
use crate::errors::{Result, TugbotError};

/// Request timeout handed to bollard, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect to `host`, which must be a `unix://`, `tcp://` or `http://`
    /// address. No request is made until the first call.
    pub fn connect(host: &str) -> Result<Self> {
        let docker = if let Some(path) = host.strip_prefix("unix://") {
            Docker::connect_with_unix(path, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)?
        } else if host.starts_with("tcp://") || host.starts_with("http://") {
            Docker::connect_with_http(host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)?
        } else {
            return Err(TugbotError::ConfigError(format!(
                "unsupported engine host '{host}' (expected unix://, tcp:// or http://)"
            )));
        };
        Ok(Self { docker })
    }

    pub fn from_docker(docker: Docker) -> Self {
        Self { docker }
    }

    async fn list(&self, filter: &ContainerFilter<'_>) -> Result<Vec<Container>> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let summaries = self.docker.list_containers(Some(options)).await?;

        let mut containers = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let Some(id) = summary.id else {
                continue;
            };
            // Containers can vanish between list and inspect.
            match self.inspect(&id).await {
                Ok(container) => {
                    if filter(&container) {
                        containers.push(container);
                    }
                }
                Err(err) => {
                    debug!(container_id = %id, error = %err, "skipping container that failed inspection");
                }
            }
        }
        Ok(containers)
    }

    async fn inspect(&self, id: &str) -> Result<Container> {
        match self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
        {
            Ok(info) => Ok(to_container(info)),
            Err(err) if is_not_found(&err) => Err(TugbotError::ContainerNotFound(id.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    async fn create(&self, request: &CreateRequest, auth: Option<&RegistryAuth>) -> Result<String> {
        match self.try_create(request).await {
            Ok(id) => Ok(id),
            Err(err) if is_not_found(&err) => {
                info!(image = %request.config.image, "image not present locally, pulling");
                self.pull(&request.config.image, auth).await?;
                Ok(self.try_create(request).await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn try_create(&self, request: &CreateRequest) -> std::result::Result<String, BollardError> {
        let options = CreateContainerOptions {
            name: request.name.clone(),
            platform: None,
        };
        let response = self
            .docker
            .create_container(Some(options), to_docker_config(request))
            .await?;
        for warning in &response.warnings {
            warn!(container = %request.name, warning = %warning, "engine warning on create");
        }
        Ok(response.id)
    }

    async fn pull(&self, image: &str, auth: Option<&RegistryAuth>) -> Result<()> {
        let options = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };
        let credentials = auth.map(|a| DockerCredentials {
            username: Some(a.username.clone()),
            password: Some(a.password.clone()),
            email: Some(a.email.clone()),
            ..Default::default()
        });

        let mut progress = self.docker.create_image(Some(options), None, credentials);
        while let Some(step) = progress.next().await {
            let step = step?;
            if let Some(status) = step.status {
                debug!(image = %image, status = %status, "pull progress");
            }
        }
        Ok(())
    }

    async fn forward_events(&self, tx: mpsc::Sender<Event>, cancel: CancellationToken) -> Result<()> {
        let mut stream = self.docker.events(None::<EventsOptions<String>>);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("event subscription cancelled");
                    return Ok(());
                }
                next = stream.next() => match next {
                    Some(Ok(message)) => {
                        if tx.send(to_event(message)).await.is_err() {
                            debug!("event receiver dropped, closing subscription");
                            return Ok(());
                        }
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => {
                        info!("engine closed the event stream");
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl EngineClient for DockerClient {
    fn list_containers<'a>(
        &'a self,
        filter: &'a ContainerFilter<'a>,
    ) -> BoxFuture<'a, Result<Vec<Container>>> {
        Box::pin(self.list(filter))
    }

    fn inspect_container<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Container>> {
        Box::pin(self.inspect(id))
    }

    fn create_container<'a>(
        &'a self,
        request: &'a CreateRequest,
        auth: Option<&'a RegistryAuth>,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.create(request, auth))
    }

    /// The host configuration is applied at create time, so it is not sent
    /// again here.
    fn start_container<'a>(
        &'a self,
        id: &'a str,
        _host_config: &'a HostConfig,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.docker
                .start_container(id, None::<StartContainerOptions<String>>)
                .await?;
            Ok(())
        })
    }

    fn kill_container<'a>(&'a self, id: &'a str, signal: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let options = KillContainerOptions {
                signal: signal.to_string(),
            };
            self.docker.kill_container(id, Some(options)).await?;
            Ok(())
        })
    }

    fn remove_container<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let options = RemoveContainerOptions {
                force: true,
                ..Default::default()
            };
            self.docker.remove_container(id, Some(options)).await?;
            Ok(())
        })
    }

    fn subscribe_events(
        &self,
        tx: mpsc::Sender<Event>,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.forward_events(tx, cancel))
    }
}

fn is_not_found(err: &BollardError) -> bool {
    matches!(
        err,
        BollardError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

fn to_container(info: ContainerInspectResponse) -> Container {
    let state = info
        .state
        .and_then(|s| s.status)
        .map(|status| ContainerState::from_str(&status.to_string()).unwrap_or_default())
        .unwrap_or_default();

    let config = info
        .config
        .map(|c| RunConfig {
            image: c.image.unwrap_or_default(),
            cmd: c.cmd,
            entrypoint: c.entrypoint,
            env: c.env,
            labels: c.labels.unwrap_or_default(),
            working_dir: c.working_dir,
            user: c.user,
            hostname: c.hostname,
            tty: c.tty,
            open_stdin: c.open_stdin,
            stop_signal: c.stop_signal,
            exposed_ports: c.exposed_ports.map(into_keys),
            volumes: c.volumes.map(into_keys),
        })
        .unwrap_or_default();

    let host_config = info
        .host_config
        .map(|h| HostConfig {
            links: h.links.unwrap_or_default(),
            binds: h.binds,
            network_mode: h.network_mode,
            volumes_from: h.volumes_from,
            privileged: h.privileged,
            extra_hosts: h.extra_hosts,
            dns: h.dns,
            cap_add: h.cap_add,
            cap_drop: h.cap_drop,
        })
        .unwrap_or_default();

    Container::new(
        info.id.unwrap_or_default(),
        info.name.unwrap_or_default(),
        state,
        config,
        host_config,
    )
}

fn to_docker_config(request: &CreateRequest) -> Config<String> {
    let c = &request.config;
    let h = &request.host_config;
    Config {
        image: Some(c.image.clone()),
        cmd: c.cmd.clone(),
        entrypoint: c.entrypoint.clone(),
        env: c.env.clone(),
        labels: Some(c.labels.clone()),
        working_dir: c.working_dir.clone(),
        user: c.user.clone(),
        hostname: c.hostname.clone(),
        tty: c.tty,
        open_stdin: c.open_stdin,
        stop_signal: c.stop_signal.clone(),
        exposed_ports: c.exposed_ports.clone().map(from_keys),
        volumes: c.volumes.clone().map(from_keys),
        host_config: Some(DockerHostConfig {
            links: (!h.links.is_empty()).then(|| h.links.clone()),
            binds: h.binds.clone(),
            network_mode: h.network_mode.clone(),
            volumes_from: h.volumes_from.clone(),
            privileged: h.privileged,
            extra_hosts: h.extra_hosts.clone(),
            dns: h.dns.clone(),
            cap_add: h.cap_add.clone(),
            cap_drop: h.cap_drop.clone(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn to_event(message: EventMessage) -> Event {
    let actor = message
        .actor
        .map(|a| Actor {
            id: a.id.unwrap_or_default(),
            attributes: a.attributes.unwrap_or_default(),
        })
        .unwrap_or_default();

    Event {
        id: actor.id.clone(),
        kind: message
            .typ
            .map(|t| t.to_string())
            .filter(|t| !t.is_empty()),
        action: message.action,
        status: None,
        from: actor.attributes.get(ATTR_IMAGE).cloned(),
        actor,
        time: message.time,
    }
}

fn into_keys<K, V>(map: HashMap<K, V>) -> Vec<K> {
    map.into_keys().collect()
}

fn from_keys<K: Eq + Hash, V: Default>(keys: Vec<K>) -> HashMap<K, V> {
    keys.into_iter().map(|k| (k, V::default())).collect()
}
