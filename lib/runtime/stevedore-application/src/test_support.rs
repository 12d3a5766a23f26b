use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use stevedore_domain::MonitoringEvent;
use stevedore_ports::MonitoringSink;

#[derive(Default)]
pub struct CaptureSink {
    events: Mutex<Vec<MonitoringEvent>>,
    attempts: AtomicUsize,
    fail: bool,
    delay: Option<Duration>,
}

impl CaptureSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<MonitoringEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MonitoringSink for CaptureSink {
    async fn send(&self, event: MonitoringEvent) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            anyhow::bail!("monitoring endpoint unavailable");
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Let spawned tasks drain without crossing the next reporter tick.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
