use serde::{Deserialize, Serialize};

use crate::liveness::{CONNECTION_LOST, CONNECTION_SUSPENDED, LivenessSignal};

/// Notification delivered by a coordination-service watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinationEvent {
    Initialized,
    ChildAdded,
    ChildRemoved,
    ChildUpdated,
    ConnectionLost,
    ConnectionSuspended,
    ConnectionReconnected,
}

impl CoordinationEvent {
    pub const ALL: [CoordinationEvent; 7] = [
        CoordinationEvent::Initialized,
        CoordinationEvent::ChildAdded,
        CoordinationEvent::ChildRemoved,
        CoordinationEvent::ChildUpdated,
        CoordinationEvent::ConnectionLost,
        CoordinationEvent::ConnectionSuspended,
        CoordinationEvent::ConnectionReconnected,
    ];

    /// Signal this event points the link towards.
    pub fn target(self) -> LivenessSignal {
        match self {
            // Any child traffic means the session is serving reads.
            Self::Initialized
            | Self::ConnectionReconnected
            | Self::ChildAdded
            | Self::ChildRemoved
            | Self::ChildUpdated => LivenessSignal::Healthy,
            Self::ConnectionLost => LivenessSignal::unhealthy(CONNECTION_LOST),
            Self::ConnectionSuspended => LivenessSignal::unhealthy(CONNECTION_SUSPENDED),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::ChildAdded => "child_added",
            Self::ChildRemoved => "child_removed",
            Self::ChildUpdated => "child_updated",
            Self::ConnectionLost => "connection_lost",
            Self::ConnectionSuspended => "connection_suspended",
            Self::ConnectionReconnected => "connection_reconnected",
        }
    }
}

impl std::fmt::Display for CoordinationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
