use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use stevedore_domain::CoordinationEvent;
use stevedore_ports::{CoordinationPort, EventHandler};

use crate::client::{ChildEvent, ChildWatchClient};

/// Forwards a client's native child-cache notifications to liveness handlers.
///
/// Holds no state beyond the client handle; retries and reconnection belong
/// to the client.
pub struct WatchSubscription<C> {
    client: Arc<C>,
}

impl<C> Clone for WatchSubscription<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: ChildWatchClient> WatchSubscription<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: ChildWatchClient + 'static> CoordinationPort for WatchSubscription<C> {
    fn subscribe(&self, path: &str, handler: EventHandler) -> Result<()> {
        let watched = path.to_string();
        self.client
            .watch_children(
                path,
                Box::new(move |event: &ChildEvent| {
                    let translated = CoordinationEvent::from(event.kind);
                    debug!(path = %watched, event = %translated, "coordination notification");
                    handler(translated);
                }),
            )
            .with_context(|| format!("failed to watch children of {path}"))?;
        info!(path, "subscribed to coordination subtree");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        self.client.start().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::memory::InMemoryCoordinationClient;

    fn recording_handler() -> (EventHandler, Arc<Mutex<Vec<CoordinationEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler: EventHandler = {
            let seen = Arc::clone(&seen);
            Arc::new(move |event| seen.lock().unwrap().push(event))
        };
        (handler, seen)
    }

    #[tokio::test]
    async fn test_forwards_translated_events() {
        let client = Arc::new(InMemoryCoordinationClient::new());
        let subscription = WatchSubscription::new(Arc::clone(&client));
        let (handler, seen) = recording_handler();

        subscription.subscribe("/status/masters", handler).unwrap();
        subscription.start().await.unwrap();
        client.create_child("/status/masters", "m1", b"up").unwrap();
        client.update_child("/status/masters", "m1", b"busy").unwrap();
        client.suspend_connection();
        client.lose_connection();
        client.reconnect();
        client.remove_child("/status/masters", "m1").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CoordinationEvent::Initialized,
                CoordinationEvent::ChildAdded,
                CoordinationEvent::ChildUpdated,
                CoordinationEvent::ConnectionSuspended,
                CoordinationEvent::ConnectionLost,
                CoordinationEvent::ConnectionReconnected,
                CoordinationEvent::ChildRemoved,
            ]
        );
    }

    #[tokio::test]
    async fn test_start_failure_is_returned() {
        let client = Arc::new(InMemoryCoordinationClient::new());
        client.fail_next_start("connection refused");
        let subscription = WatchSubscription::new(client);

        let err = subscription.start().await.unwrap_err();
        assert!(format!("{err:#}").contains("connection refused"));
    }

    #[tokio::test]
    async fn test_only_subscribed_subtree_is_forwarded() {
        let client = Arc::new(InMemoryCoordinationClient::new());
        let subscription = WatchSubscription::new(Arc::clone(&client));
        let (handler, seen) = recording_handler();

        subscription.subscribe("/status/agents", handler).unwrap();
        subscription.start().await.unwrap();
        client.create_child("/jobs", "web", b"{}").unwrap();
        client.create_child("/status/agents", "a1", b"{}").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CoordinationEvent::Initialized, CoordinationEvent::ChildAdded]
        );
    }
}
