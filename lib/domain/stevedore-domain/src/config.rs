//! Liveness monitor configuration loaded from YAML.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Reports older than this many intervals are considered stale downstream.
pub const TTL_INTERVALS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessConfig {
    pub coordination: CoordinationConfig,
    #[serde(default)]
    pub reporter: ReporterConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinationConfig {
    /// Subtree whose children are watched.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            service: default_service(),
            tags: default_tags(),
        }
    }
}

impl ReporterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn ttl(&self) -> Duration {
        self.interval() * TTL_INTERVALS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    #[default]
    Log,
    Disabled,
    Http {
        url: String,
    },
}

fn default_interval_secs() -> u64 {
    5
}

fn default_service() -> String {
    "coordination-connection".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["coordination".to_string(), "connection".to_string()]
}

impl LivenessConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            coordination: CoordinationConfig { path: path.into() },
            reporter: ReporterConfig::default(),
            sink: SinkConfig::default(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read liveness config at {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid liveness config at {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw).context("failed to parse liveness config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.coordination.path.starts_with('/') {
            bail!(
                "coordination.path must be absolute, got {:?}",
                self.coordination.path
            );
        }
        if self.reporter.interval_secs == 0 {
            bail!("reporter.interval_secs must be greater than zero");
        }
        if self.reporter.service.trim().is_empty() {
            bail!("reporter.service must not be empty");
        }
        if let SinkConfig::Http { url } = &self.sink {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("sink.url must be an http(s) URL, got {url:?}");
            }
        }
        Ok(())
    }
}

/// Resolve the config file location: `STEVEDORE_CONFIG_PATH`, then
/// `$HOME/.stevedore/liveness.yaml`, then the working directory.
pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var("STEVEDORE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    if let Ok(home) = env::var("HOME") {
        return Path::new(&home).join(".stevedore").join("liveness.yaml");
    }

    PathBuf::from("stevedore-liveness.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = LivenessConfig::from_yaml_str("coordination:\n  path: /status/masters\n")
            .unwrap();
        assert_eq!(config.reporter, ReporterConfig::default());
        assert_eq!(config.sink, SinkConfig::Log);
        assert_eq!(config.reporter.interval(), Duration::from_secs(5));
        assert_eq!(config.reporter.ttl(), Duration::from_secs(15));
    }

    #[test]
    fn test_http_sink_and_overrides() {
        let raw = r#"
coordination:
  path: /status/masters
reporter:
  interval_secs: 10
  service: zk-link
  tags: [zookeeper]
sink:
  kind: http
  url: http://monitoring.local/events
"#;
        let config = LivenessConfig::from_yaml_str(raw).unwrap();
        assert_eq!(config.reporter.ttl(), Duration::from_secs(30));
        assert_eq!(config.reporter.service, "zk-link");
        assert_eq!(config.reporter.tags, vec!["zookeeper".to_string()]);
        assert_eq!(
            config.sink,
            SinkConfig::Http {
                url: "http://monitoring.local/events".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_zero_interval() {
        let raw = "coordination:\n  path: /status\nreporter:\n  interval_secs: 0\n";
        let err = LivenessConfig::from_yaml_str(raw).unwrap_err();
        assert!(err.to_string().contains("interval_secs"));
    }

    #[test]
    fn test_rejects_relative_path() {
        let err = LivenessConfig::from_yaml_str("coordination:\n  path: status\n").unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "coordination:\n  path: /status/agents").unwrap();
        let config = LivenessConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.coordination.path, "/status/agents");

        let missing = file.path().with_extension("missing");
        let err = LivenessConfig::load_from_path(&missing).unwrap_err();
        assert!(err.to_string().contains("failed to read liveness config"));
    }
}
