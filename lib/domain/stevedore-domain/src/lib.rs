//! Domain models and invariants.

pub mod config;
pub mod events;
pub mod liveness;
pub mod reading;

pub use config::{
    CoordinationConfig, LivenessConfig, ReporterConfig, SinkConfig, TTL_INTERVALS, config_path,
};
pub use events::CoordinationEvent;
pub use liveness::{CONNECTION_LOST, CONNECTION_SUSPENDED, Coarse, LivenessSignal};
pub use reading::{EventState, HealthReading, MonitoringEvent, Readiness, now_millis};
