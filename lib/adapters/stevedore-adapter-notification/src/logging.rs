use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use stevedore_domain::{EventState, MonitoringEvent};
use stevedore_ports::MonitoringSink;

/// Writes every health event to the process log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl MonitoringSink for LogSink {
    async fn send(&self, event: MonitoringEvent) -> Result<()> {
        let tags = event.tags.join(",");
        match event.state {
            EventState::Ok => info!(
                service = %event.service,
                state = event.state.as_str(),
                metric = event.metric,
                ttl_secs = event.ttl_seconds,
                %tags,
                "health event"
            ),
            EventState::Critical => warn!(
                service = %event.service,
                state = event.state.as_str(),
                metric = event.metric,
                ttl_secs = event.ttl_seconds,
                %tags,
                description = event.description.as_deref().unwrap_or_default(),
                "health event"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_domain::HealthReading;

    #[tokio::test]
    async fn test_accepts_both_states() {
        let sink = LogSink;
        for ok in [true, false] {
            let reading = HealthReading {
                ok,
                reason: (!ok).then(|| "CONNECTION_SUSPENDED".to_string()),
                ttl_seconds: 15,
            };
            let event = MonitoringEvent::from_reading("coordination-connection", &[], &reading);
            assert!(sink.send(event).await.is_ok());
        }
    }
}
