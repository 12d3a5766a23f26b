//! Monitoring sink adapters for health readings.

pub mod http;
pub mod logging;
pub mod recording;

use std::sync::Arc;

use anyhow::Result;

use stevedore_domain::SinkConfig;
use stevedore_ports::{MonitoringSink, NullMonitoringSink};

pub use http::HttpSink;
pub use logging::LogSink;
pub use recording::RecordingSink;

pub fn sink_from_config(config: &SinkConfig) -> Result<Arc<dyn MonitoringSink>> {
    let sink: Arc<dyn MonitoringSink> = match config {
        SinkConfig::Log => Arc::new(LogSink),
        SinkConfig::Disabled => Arc::new(NullMonitoringSink),
        SinkConfig::Http { url } => Arc::new(HttpSink::new(url)?),
    };
    Ok(sink)
}
