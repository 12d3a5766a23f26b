//! Values pushed to monitoring and returned to readiness callers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::liveness::LivenessSignal;

/// Reading emitted on every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReading {
    pub ok: bool,
    pub reason: Option<String>,
    pub ttl_seconds: u64,
}

impl HealthReading {
    /// Readings are never derived from an `Unknown` signal.
    pub fn from_signal(signal: &LivenessSignal, ttl: Duration) -> Option<Self> {
        let ttl_seconds = ttl.as_secs();
        match signal {
            LivenessSignal::Unknown => None,
            LivenessSignal::Healthy => Some(Self {
                ok: true,
                reason: None,
                ttl_seconds,
            }),
            LivenessSignal::Unhealthy(reason) => Some(Self {
                ok: false,
                reason: Some(reason.clone()),
                ttl_seconds,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    Ok,
    Critical,
}

impl EventState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Critical => "critical",
        }
    }
}

/// Envelope handed to a monitoring sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringEvent {
    pub service: String,
    pub state: EventState,
    pub metric: f64,
    pub ttl_seconds: u64,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub time_ms: i64,
}

impl MonitoringEvent {
    pub fn from_reading(service: &str, tags: &[String], reading: &HealthReading) -> Self {
        let (state, metric) = if reading.ok {
            (EventState::Ok, 1.0)
        } else {
            (EventState::Critical, 0.0)
        };
        Self {
            service: service.to_string(),
            state,
            metric,
            ttl_seconds: reading.ttl_seconds,
            tags: tags.to_vec(),
            description: reading.reason.clone(),
            time_ms: now_millis(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.state == EventState::Ok
    }
}

/// Boolean gate for callers that cannot use the tri-state signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub ok: bool,
    pub reason: Option<String>,
}

impl From<&LivenessSignal> for Readiness {
    fn from(signal: &LivenessSignal) -> Self {
        match signal {
            // No known problem yet.
            LivenessSignal::Unknown | LivenessSignal::Healthy => Self {
                ok: true,
                reason: None,
            },
            LivenessSignal::Unhealthy(reason) => Self {
                ok: false,
                reason: Some(reason.clone()),
            },
        }
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
