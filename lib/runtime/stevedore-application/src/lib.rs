//! Coordination liveness core: state machine, periodic reporter, readiness
//! probe and the managed lifecycle that ties them to a coordination watch.

pub mod monitor;
pub mod readiness;
pub mod reporter;
pub mod state_machine;

pub use monitor::LivenessMonitor;
pub use readiness::ReadinessProbe;
pub use reporter::HealthReporter;
pub use state_machine::LivenessStateMachine;

#[cfg(test)]
mod test_support;
