use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::Notify;

use stevedore_domain::MonitoringEvent;
use stevedore_ports::MonitoringSink;

/// Keeps every event in memory, for drills and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<MonitoringEvent>>>,
    notify: Arc<Notify>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MonitoringEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Wait until at least `count` events have been recorded.
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl MonitoringSink for RecordingSink {
    async fn send(&self, event: MonitoringEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow!("recording sink lock poisoned"))?
            .push(event);
        self.notify.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use stevedore_domain::HealthReading;

    fn event(ok: bool) -> MonitoringEvent {
        let reading = HealthReading {
            ok,
            reason: (!ok).then(|| "CONNECTION_LOST".to_string()),
            ttl_seconds: 15,
        };
        MonitoringEvent::from_reading("coordination-connection", &[], &reading)
    }

    #[tokio::test]
    async fn test_records_in_order_and_wakes_waiters() {
        let sink = RecordingSink::new();
        let waiter = {
            let sink = sink.clone();
            tokio::spawn(async move { sink.wait_for(2).await })
        };

        sink.send(event(true)).await.unwrap();
        sink.send(event(false)).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        let events = sink.events();
        assert!(events[0].is_ok());
        assert!(!events[1].is_ok());

        sink.clear();
        assert!(sink.is_empty());
    }
}
