use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use stevedore_adapter_coordination::{ChildWatchClient, InMemoryCoordinationClient, WatchSubscription};
use stevedore_adapter_notification::sink_from_config;
use stevedore_application::LivenessMonitor;
use stevedore_domain::{LivenessConfig, config_path};
use stevedore_ports::{MonitoringSink, PortSet};

/// Watched subtree when no config file is present.
pub const DEFAULT_WATCH_PATH: &str = "/status/masters";

/// Load the monitor config.
///
/// An explicit path must exist. Otherwise the default location is used when
/// present, falling back to built-in defaults. `interval_secs` overrides the
/// reporting interval from the file.
pub fn load_config(explicit: Option<&Path>, interval_secs: Option<u64>) -> Result<LivenessConfig> {
    let mut config = match explicit {
        Some(path) => LivenessConfig::load_from_path(path)?,
        None => {
            let path = config_path();
            if path.exists() {
                LivenessConfig::load_from_path(&path)?
            } else {
                info!(path = %path.display(), "no liveness config found, using defaults");
                LivenessConfig::new(DEFAULT_WATCH_PATH)
            }
        }
    };
    if let Some(secs) = interval_secs {
        config.reporter.interval_secs = secs;
    }
    config.validate().context("invalid liveness settings")?;
    Ok(config)
}

/// Subscribe a monitor to `client` and report through `sink`.
pub fn build_monitor<C>(
    config: &LivenessConfig,
    client: Arc<C>,
    sink: Arc<dyn MonitoringSink>,
) -> Result<LivenessMonitor>
where
    C: ChildWatchClient + 'static,
{
    let subscription = Arc::new(WatchSubscription::new(client));
    LivenessMonitor::new(config, PortSet::new(subscription, sink))
}

pub struct InMemoryWiring {
    pub client: Arc<InMemoryCoordinationClient>,
    pub monitor: LivenessMonitor,
}

/// Monitor over an in-process coordination client, with the configured sink.
pub fn wire_in_memory(config: &LivenessConfig) -> Result<InMemoryWiring> {
    let sink = sink_from_config(&config.sink)?;
    let client = Arc::new(InMemoryCoordinationClient::new());
    let monitor = build_monitor(config, Arc::clone(&client), sink)?;
    Ok(InMemoryWiring { client, monitor })
}
