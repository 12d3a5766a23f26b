//! Port traits between the liveness core and its collaborators.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use stevedore_domain::{CoordinationEvent, MonitoringEvent, Readiness};

/// Callback invoked once per coordination event, possibly from the
/// coordination client's own notification threads.
pub type EventHandler = Arc<dyn Fn(CoordinationEvent) + Send + Sync>;

#[async_trait]
pub trait CoordinationPort: Send + Sync {
    /// Register `handler` for events under `path`. Events for one path reach
    /// the handler in the order the client observed them.
    fn subscribe(&self, path: &str, handler: EventHandler) -> Result<()>;

    /// Start the underlying watch. Failures surface to the caller unchanged.
    async fn start(&self) -> Result<()>;
}

#[async_trait]
pub trait MonitoringSink: Send + Sync {
    async fn send(&self, event: MonitoringEvent) -> Result<()>;
}

pub trait ReadinessPort: Send + Sync {
    fn is_healthy(&self) -> Readiness;
}

#[derive(Clone)]
pub struct PortSet {
    pub coordination: Arc<dyn CoordinationPort>,
    pub sink: Arc<dyn MonitoringSink>,
}

impl PortSet {
    pub fn new(coordination: Arc<dyn CoordinationPort>, sink: Arc<dyn MonitoringSink>) -> Self {
        Self { coordination, sink }
    }

    pub fn empty() -> Self {
        Self {
            coordination: Arc::new(NullCoordinationPort),
            sink: Arc::new(NullMonitoringSink),
        }
    }
}

#[derive(Clone, Default)]
struct NullCoordinationPort;

#[async_trait]
impl CoordinationPort for NullCoordinationPort {
    fn subscribe(&self, _path: &str, _handler: EventHandler) -> Result<()> {
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Default)]
pub struct NullMonitoringSink;

#[async_trait]
impl MonitoringSink for NullMonitoringSink {
    async fn send(&self, _event: MonitoringEvent) -> Result<()> {
        Ok(())
    }
}
