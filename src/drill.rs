//! Line commands that drive an in-process coordination client during
//! alerting drills.

use std::str::FromStr;

use anyhow::{Error, Result, bail};

use stevedore_adapter_coordination::InMemoryCoordinationClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrillCommand {
    Added { name: String, data: String },
    Updated { name: String, data: String },
    Removed { name: String },
    Suspended,
    Lost,
    Reconnected,
}

impl DrillCommand {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }

    /// Apply the command to children of `parent`.
    pub fn apply(&self, client: &InMemoryCoordinationClient, parent: &str) -> Result<()> {
        match self {
            Self::Added { name, data } => client.create_child(parent, name, data.as_bytes()),
            Self::Updated { name, data } => client.update_child(parent, name, data.as_bytes()),
            Self::Removed { name } => client.remove_child(parent, name),
            Self::Suspended => {
                client.suspend_connection();
                Ok(())
            }
            Self::Lost => {
                client.lose_connection();
                Ok(())
            }
            Self::Reconnected => {
                client.reconnect();
                Ok(())
            }
        }
    }
}

impl FromStr for DrillCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            bail!("empty drill command");
        };
        let name = parts.next().map(str::to_string);
        let data = parts.collect::<Vec<_>>().join(" ");

        let command = match (verb.to_ascii_lowercase().as_str(), name) {
            ("added", Some(name)) => Self::Added { name, data },
            ("updated", Some(name)) => Self::Updated { name, data },
            ("removed", Some(name)) => Self::Removed { name },
            ("added" | "updated" | "removed", None) => {
                bail!("`{verb}` needs a child name")
            }
            ("suspended", None) => Self::Suspended,
            ("lost", None) => Self::Lost,
            ("reconnected", None) => Self::Reconnected,
            ("suspended" | "lost" | "reconnected", Some(_)) => {
                bail!("`{verb}` takes no arguments")
            }
            _ => bail!("unknown drill command {verb:?}"),
        };
        Ok(command)
    }
}
