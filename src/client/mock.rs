// src/client/mock.rs

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{BoxFuture, ContainerFilter, CreateRequest, EngineClient, RegistryAuth};
use crate::container::{Container, ContainerState, Event, HostConfig};
use crate::errors::{Result, TugbotError};

/// One recorded call against the mock engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    List,
    Inspect(String),
    Create(String),
    Start(String),
    Kill { id: String, signal: String },
    Remove(String),
    Subscribe,
}

#[derive(Debug)]
struct MockState {
    containers: Vec<Container>,
    calls: Vec<MockCall>,
    created: Vec<CreateRequest>,
    auths: Vec<Option<RegistryAuth>>,
    events: Vec<Event>,
    next_id: u64,
    fail_list: Option<String>,
    fail_inspect: HashSet<String>,
    fail_create: Vec<String>,
    fail_start: bool,
    start_delay: Option<Duration>,
    subscribe_failures: usize,
    close_streams: bool,
    kill_stops: bool,
    remove_deletes: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            containers: Vec::new(),
            calls: Vec::new(),
            created: Vec::new(),
            auths: Vec::new(),
            events: Vec::new(),
            next_id: 0,
            fail_list: None,
            fail_inspect: HashSet::new(),
            fail_create: Vec::new(),
            fail_start: false,
            start_delay: None,
            subscribe_failures: 0,
            close_streams: false,
            kill_stops: true,
            remove_deletes: true,
        }
    }
}

/// In-memory engine.
///
/// Containers are listed in insertion order. Created clones are added as
/// `Created` and flip to `Running` when started. Cloning the mock shares its
/// state.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(containers: impl IntoIterator<Item = Container>) -> Self {
        let mock = Self::new();
        for c in containers {
            mock.add_container(c);
        }
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a container, replacing any existing one with the same id.
    pub fn add_container(&self, container: Container) {
        let mut state = self.lock();
        match state.containers.iter_mut().find(|c| c.id() == container.id()) {
            Some(slot) => *slot = container,
            None => state.containers.push(container),
        }
    }

    pub fn remove(&self, id: &str) {
        self.lock().containers.retain(|c| c.id() != id);
    }

    pub fn set_state(&self, id: &str, new_state: ContainerState) {
        let mut state = self.lock();
        if let Some(slot) = state.containers.iter_mut().find(|c| c.id() == id) {
            *slot = with_state(slot, new_state);
        }
    }

    pub fn container(&self, id: &str) -> Option<Container> {
        self.lock().containers.iter().find(|c| c.id() == id).cloned()
    }

    pub fn containers(&self) -> Vec<Container> {
        self.lock().containers.clone()
    }

    /// Events replayed to every subscriber, in order.
    pub fn push_event(&self, event: Event) {
        self.lock().events.push(event);
    }

    pub fn fail_list(&self, message: impl Into<String>) {
        self.lock().fail_list = Some(message.into());
    }

    pub fn clear_list_failure(&self) {
        self.lock().fail_list = None;
    }

    pub fn fail_inspect(&self, id: impl Into<String>) {
        self.lock().fail_inspect.insert(id.into());
    }

    /// Fail every create whose container name contains `fragment`.
    pub fn fail_create(&self, fragment: impl Into<String>) {
        self.lock().fail_create.push(fragment.into());
    }

    pub fn fail_start(&self) {
        self.lock().fail_start = true;
    }

    /// Make every start call take `delay` before it completes.
    pub fn set_start_delay(&self, delay: Duration) {
        self.lock().start_delay = Some(delay);
    }

    /// Make the next `count` subscriptions fail before sending anything.
    pub fn fail_subscribe(&self, count: usize) {
        self.lock().subscribe_failures = count;
    }

    /// When true, every subscription ends right after replaying the queued
    /// events, as if the engine closed the stream.
    pub fn set_close_streams(&self, close: bool) {
        self.lock().close_streams = close;
    }

    /// When false, kill leaves the container running.
    pub fn set_kill_stops(&self, stops: bool) {
        self.lock().kill_stops = stops;
    }

    /// When false, remove succeeds but the container stays inspectable.
    pub fn set_remove_deletes(&self, deletes: bool) {
        self.lock().remove_deletes = deletes;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn created(&self) -> Vec<CreateRequest> {
        self.lock().created.clone()
    }

    pub fn auths(&self) -> Vec<Option<RegistryAuth>> {
        self.lock().auths.clone()
    }

    /// Ids passed to successful start calls.
    pub fn started(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Start(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

fn with_state(container: &Container, state: ContainerState) -> Container {
    Container::new(
        container.id(),
        container.name(),
        state,
        container.config().clone(),
        container.host_config().clone(),
    )
}

fn engine_error(message: impl Into<String>) -> TugbotError {
    TugbotError::EngineError(message.into())
}

impl EngineClient for MockClient {
    fn list_containers<'a>(
        &'a self,
        filter: &'a ContainerFilter<'a>,
    ) -> BoxFuture<'a, Result<Vec<Container>>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(MockCall::List);
            if let Some(message) = &state.fail_list {
                return Err(engine_error(message.clone()));
            }
            let skip = &state.fail_inspect;
            Ok(state
                .containers
                .iter()
                .filter(|c| !skip.contains(c.id()))
                .filter(|c| filter(c))
                .cloned()
                .collect())
        })
    }

    fn inspect_container<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Container>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(MockCall::Inspect(id.to_string()));
            if state.fail_inspect.contains(id) {
                return Err(engine_error(format!("inspect failed for {id}")));
            }
            state
                .containers
                .iter()
                .find(|c| c.id() == id)
                .cloned()
                .ok_or_else(|| TugbotError::ContainerNotFound(id.to_string()))
        })
    }

    fn create_container<'a>(
        &'a self,
        request: &'a CreateRequest,
        auth: Option<&'a RegistryAuth>,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(MockCall::Create(request.name.clone()));
            if state
                .fail_create
                .iter()
                .any(|fragment| request.name.contains(fragment.as_str()))
            {
                return Err(engine_error(format!("create failed for {}", request.name)));
            }

            state.next_id += 1;
            let id = format!("mock-{}", state.next_id);
            state.created.push(request.clone());
            state.auths.push(auth.cloned());
            state.containers.push(Container::new(
                id.clone(),
                &request.name,
                ContainerState::Created,
                request.config.clone(),
                request.host_config.clone(),
            ));
            Ok(id)
        })
    }

    fn start_container<'a>(
        &'a self,
        id: &'a str,
        _host_config: &'a HostConfig,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let delay = self.lock().start_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut state = self.lock();
            if state.fail_start {
                return Err(engine_error(format!("start failed for {id}")));
            }
            let Some(slot) = state.containers.iter_mut().find(|c| c.id() == id) else {
                return Err(TugbotError::ContainerNotFound(id.to_string()));
            };
            *slot = with_state(slot, ContainerState::Running);
            state.calls.push(MockCall::Start(id.to_string()));
            Ok(())
        })
    }

    fn kill_container<'a>(&'a self, id: &'a str, signal: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(MockCall::Kill {
                id: id.to_string(),
                signal: signal.to_string(),
            });
            let stops = state.kill_stops;
            let Some(slot) = state.containers.iter_mut().find(|c| c.id() == id) else {
                return Err(TugbotError::ContainerNotFound(id.to_string()));
            };
            if stops {
                *slot = with_state(slot, ContainerState::Exited);
            }
            Ok(())
        })
    }

    fn remove_container<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(MockCall::Remove(id.to_string()));
            if state.remove_deletes {
                state.containers.retain(|c| c.id() != id);
            }
            Ok(())
        })
    }

    fn subscribe_events(
        &self,
        tx: mpsc::Sender<Event>,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let (events, close) = {
                let mut state = self.lock();
                state.calls.push(MockCall::Subscribe);
                if state.subscribe_failures > 0 {
                    state.subscribe_failures -= 1;
                    return Err(engine_error("event stream unavailable"));
                }
                (state.events.clone(), state.close_streams)
            };
            for event in events {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            return Ok(());
                        }
                    }
                }
            }
            if !close {
                cancel.cancelled().await;
            }
            Ok(())
        })
    }
}
