//! Liveness signal for the coordination-service link.

use serde::{Deserialize, Serialize};

pub const CONNECTION_LOST: &str = "CONNECTION_LOST";
pub const CONNECTION_SUSPENDED: &str = "CONNECTION_SUSPENDED";

/// Healthy/unhealthy classification of a signal, ignoring the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coarse {
    Healthy,
    Unhealthy,
}

/// Current view of the coordination link.
///
/// `Unknown` means no coordination event has been observed yet. Once the
/// signal leaves `Unknown` it only moves between `Healthy` and `Unhealthy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum LivenessSignal {
    #[default]
    Unknown,
    Healthy,
    Unhealthy(String),
}

impl LivenessSignal {
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self::Unhealthy(reason.into())
    }

    /// `None` while the signal is still `Unknown`.
    pub fn coarse(&self) -> Option<Coarse> {
        match self {
            Self::Unknown => None,
            Self::Healthy => Some(Coarse::Healthy),
            Self::Unhealthy(_) => Some(Coarse::Unhealthy),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Unhealthy(reason) => Some(reason.as_str()),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl std::fmt::Display for LivenessSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Healthy => f.write_str("healthy"),
            Self::Unhealthy(reason) => write!(f, "unhealthy ({reason})"),
        }
    }
}
