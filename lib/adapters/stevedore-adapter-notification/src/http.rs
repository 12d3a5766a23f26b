use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use stevedore_domain::MonitoringEvent;
use stevedore_ports::MonitoringSink;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts each health event as JSON to a monitoring collector.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: Url,
}

impl HttpSink {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid monitoring url {url:?}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("monitoring url must use http or https, got {}", url.scheme());
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build monitoring http client")?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl MonitoringSink for HttpSink {
    async fn send(&self, event: MonitoringEvent) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&event)
            .send()
            .await
            .with_context(|| format!("failed to post health event to {}", self.url))?;
        let status = response.status();
        response
            .error_for_status()
            .with_context(|| format!("monitoring collector {} rejected health event", self.url))?;
        debug!(url = %self.url, %status, state = event.state.as_str(), "health event delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_domain::HealthReading;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn critical_event() -> MonitoringEvent {
        let reading = HealthReading {
            ok: false,
            reason: Some("CONNECTION_LOST".to_string()),
            ttl_seconds: 15,
        };
        MonitoringEvent::from_reading("coordination-connection", &["master".to_string()], &reading)
    }

    /// Accepts one request, answers with `status_line` and hands back the body.
    async fn collector(status_line: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/events", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let body = loop {
                let read = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..read]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= split + 4 + length {
                        break text[split + 4..split + 4 + length].to_string();
                    }
                }
                if read == 0 {
                    break String::new();
                }
            };
            let response =
                format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(body);
        });
        (url, rx)
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(HttpSink::new("not a url").is_err());
        assert!(HttpSink::new("ftp://collector/events").is_err());
        let sink = HttpSink::new("https://collector.internal/events").unwrap();
        assert_eq!(sink.url(), "https://collector.internal/events");
    }

    #[tokio::test]
    async fn test_posts_event_as_json() {
        let (url, body) = collector("204 No Content").await;
        let sink = HttpSink::new(&url).unwrap();

        sink.send(critical_event()).await.unwrap();

        let posted: serde_json::Value = serde_json::from_str(&body.await.unwrap()).unwrap();
        assert_eq!(posted["service"], "coordination-connection");
        assert_eq!(posted["state"], "critical");
        assert_eq!(posted["metric"], 0.0);
        assert_eq!(posted["ttl_seconds"], 15);
        assert_eq!(posted["description"], "CONNECTION_LOST");
        assert_eq!(posted["tags"][0], "master");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (url, _body) = collector("503 Service Unavailable").await;
        let sink = HttpSink::new(&url).unwrap();

        let err = sink.send(critical_event()).await.unwrap_err();
        assert!(err.to_string().contains("rejected health event"));
    }
}
