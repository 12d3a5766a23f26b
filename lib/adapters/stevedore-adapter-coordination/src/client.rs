//! Contract of a coordination-service client that caches a path's children
//! and reports changes plus session state to registered listeners.

use anyhow::Result;
use async_trait::async_trait;

use stevedore_domain::CoordinationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildEventKind {
    Initialized,
    ChildAdded,
    ChildUpdated,
    ChildRemoved,
    ConnectionSuspended,
    ConnectionReconnected,
    ConnectionLost,
}

impl From<ChildEventKind> for CoordinationEvent {
    fn from(kind: ChildEventKind) -> Self {
        match kind {
            ChildEventKind::Initialized => CoordinationEvent::Initialized,
            ChildEventKind::ChildAdded => CoordinationEvent::ChildAdded,
            ChildEventKind::ChildUpdated => CoordinationEvent::ChildUpdated,
            ChildEventKind::ChildRemoved => CoordinationEvent::ChildRemoved,
            ChildEventKind::ConnectionSuspended => CoordinationEvent::ConnectionSuspended,
            ChildEventKind::ConnectionReconnected => CoordinationEvent::ConnectionReconnected,
            ChildEventKind::ConnectionLost => CoordinationEvent::ConnectionLost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildData {
    /// Full node path, `<parent>/<name>`.
    pub path: String,
    pub data: Vec<u8>,
}

/// Native notification. `child` is set for child events, `initial` holds the
/// cached children for `Initialized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEvent {
    pub kind: ChildEventKind,
    pub child: Option<ChildData>,
    pub initial: Vec<ChildData>,
}

impl ChildEvent {
    pub fn connection(kind: ChildEventKind) -> Self {
        Self {
            kind,
            child: None,
            initial: Vec::new(),
        }
    }

    pub fn child(kind: ChildEventKind, child: ChildData) -> Self {
        Self {
            kind,
            child: Some(child),
            initial: Vec::new(),
        }
    }

    pub fn initialized(initial: Vec<ChildData>) -> Self {
        Self {
            kind: ChildEventKind::Initialized,
            child: None,
            initial,
        }
    }
}

pub type ChildListener = Box<dyn Fn(&ChildEvent) + Send + Sync>;

#[async_trait]
pub trait ChildWatchClient: Send + Sync {
    /// Register a listener for children of `path`. Listeners may be invoked
    /// from the client's own threads.
    fn watch_children(&self, path: &str, listener: ChildListener) -> Result<()>;

    /// Build the child caches and begin delivering events.
    async fn start(&self) -> Result<()>;
}
