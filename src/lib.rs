//! Coordination liveness monitor: wiring, telemetry and drill tooling.

pub mod bootstrap;
pub mod drill;
pub mod telemetry;

pub use bootstrap::{InMemoryWiring, build_monitor, load_config, wire_in_memory};
pub use drill::DrillCommand;
