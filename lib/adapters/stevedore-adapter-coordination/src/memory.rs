//! In-process coordination client for tests, drills and embedding.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{ChildData, ChildEvent, ChildEventKind, ChildListener, ChildWatchClient};

/// Keeps a tree of parent paths to children and notifies watchers of each
/// parent after `start`. Session state is driven explicitly through
/// [`suspend_connection`](Self::suspend_connection),
/// [`lose_connection`](Self::lose_connection) and
/// [`reconnect`](Self::reconnect).
///
/// Notifications are delivered on the mutating thread. Delivery is
/// serialized, so every listener observes events in mutation order. Listeners
/// must not call back into the client.
#[derive(Default)]
pub struct InMemoryCoordinationClient {
    state: Mutex<State>,
    delivery: Mutex<()>,
}

#[derive(Default)]
struct State {
    children: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    listeners: HashMap<String, Vec<Arc<ChildListener>>>,
    started: bool,
    disconnected: bool,
    fail_next_start: Option<String>,
}

impl State {
    fn listeners_for(&self, parent: &str) -> Vec<Arc<ChildListener>> {
        self.listeners.get(parent).cloned().unwrap_or_default()
    }

    fn all_listeners(&self) -> Vec<Arc<ChildListener>> {
        self.listeners.values().flatten().cloned().collect()
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.disconnected {
            bail!("coordination session is not connected");
        }
        Ok(())
    }
}

fn child_path(parent: &str, name: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), name)
}

impl InMemoryCoordinationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `start` fail with `reason`.
    pub fn fail_next_start(&self, reason: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next_start = Some(reason.into());
        }
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().map(|state| state.started).unwrap_or(false)
    }

    pub fn is_connected(&self) -> bool {
        self.state
            .lock()
            .map(|state| !state.disconnected)
            .unwrap_or(false)
    }

    pub fn children(&self, parent: &str) -> Vec<ChildData> {
        let Ok(state) = self.state.lock() else {
            return Vec::new();
        };
        state
            .children
            .get(parent)
            .map(|children| {
                children
                    .iter()
                    .map(|(name, data)| ChildData {
                        path: child_path(parent, name),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn create_child(&self, parent: &str, name: &str, data: &[u8]) -> Result<()> {
        self.publish(|state| {
            state.ensure_connected()?;
            let children = state.children.entry(parent.to_string()).or_default();
            if children.contains_key(name) {
                bail!("node {} already exists", child_path(parent, name));
            }
            children.insert(name.to_string(), data.to_vec());
            let event = ChildEvent::child(
                ChildEventKind::ChildAdded,
                ChildData {
                    path: child_path(parent, name),
                    data: data.to_vec(),
                },
            );
            Ok((event, state.listeners_for(parent)))
        })
    }

    pub fn update_child(&self, parent: &str, name: &str, data: &[u8]) -> Result<()> {
        self.publish(|state| {
            state.ensure_connected()?;
            let slot = state
                .children
                .get_mut(parent)
                .and_then(|children| children.get_mut(name))
                .ok_or_else(|| anyhow!("node {} does not exist", child_path(parent, name)))?;
            *slot = data.to_vec();
            let event = ChildEvent::child(
                ChildEventKind::ChildUpdated,
                ChildData {
                    path: child_path(parent, name),
                    data: data.to_vec(),
                },
            );
            Ok((event, state.listeners_for(parent)))
        })
    }

    pub fn remove_child(&self, parent: &str, name: &str) -> Result<()> {
        self.publish(|state| {
            state.ensure_connected()?;
            let data = state
                .children
                .get_mut(parent)
                .and_then(|children| children.remove(name))
                .ok_or_else(|| anyhow!("node {} does not exist", child_path(parent, name)))?;
            let event = ChildEvent::child(
                ChildEventKind::ChildRemoved,
                ChildData {
                    path: child_path(parent, name),
                    data,
                },
            );
            Ok((event, state.listeners_for(parent)))
        })
    }

    pub fn suspend_connection(&self) {
        self.session_change(ChildEventKind::ConnectionSuspended, true);
    }

    pub fn lose_connection(&self) {
        self.session_change(ChildEventKind::ConnectionLost, true);
    }

    pub fn reconnect(&self) {
        self.session_change(ChildEventKind::ConnectionReconnected, false);
    }

    fn session_change(&self, kind: ChildEventKind, disconnected: bool) {
        let result = self.publish(|state| {
            state.disconnected = disconnected;
            Ok((ChildEvent::connection(kind), state.all_listeners()))
        });
        if let Err(err) = result {
            warn!(?kind, "failed to publish session change: {err:#}");
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("coordination state lock poisoned"))
    }

    /// Apply a mutation and deliver its event while holding the delivery
    /// lock. Events are withheld until the client has started.
    fn publish<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut State) -> Result<(ChildEvent, Vec<Arc<ChildListener>>)>,
    {
        let _delivery = self
            .delivery
            .lock()
            .map_err(|_| anyhow!("coordination delivery lock poisoned"))?;
        let (event, listeners) = {
            let mut state = self.lock_state()?;
            let (event, listeners) = mutate(&mut state)?;
            if !state.started {
                return Ok(());
            }
            (event, listeners)
        };

        debug!(kind = ?event.kind, listeners = listeners.len(), "delivering coordination event");
        for listener in listeners {
            listener(&event);
        }
        Ok(())
    }
}

#[async_trait]
impl ChildWatchClient for InMemoryCoordinationClient {
    fn watch_children(&self, path: &str, listener: ChildListener) -> Result<()> {
        if !path.starts_with('/') {
            bail!("watch path must be absolute, got {path:?}");
        }
        let mut state = self.lock_state()?;
        if state.started {
            bail!("cannot add a watch on {path} after the client has started");
        }
        state
            .listeners
            .entry(path.to_string())
            .or_default()
            .push(Arc::new(listener));
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let _delivery = self
            .delivery
            .lock()
            .map_err(|_| anyhow!("coordination delivery lock poisoned"))?;
        let initial: Vec<(ChildEvent, Vec<Arc<ChildListener>>)> = {
            let mut state = self.lock_state()?;
            if let Some(reason) = state.fail_next_start.take() {
                bail!("coordination client failed to start: {reason}");
            }
            if state.started {
                bail!("coordination client already started");
            }
            state.started = true;
            state
                .listeners
                .iter()
                .map(|(parent, listeners)| {
                    let children = state
                        .children
                        .get(parent)
                        .map(|children| {
                            children
                                .iter()
                                .map(|(name, data)| ChildData {
                                    path: child_path(parent, name),
                                    data: data.clone(),
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    (ChildEvent::initialized(children), listeners.clone())
                })
                .collect()
        };

        for (event, listeners) in initial {
            for listener in listeners {
                listener(&event);
            }
        }
        Ok(())
    }
}
