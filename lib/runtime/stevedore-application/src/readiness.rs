use std::sync::Arc;

use anyhow::{Result, bail};

use stevedore_domain::Readiness;
use stevedore_ports::ReadinessPort;

use crate::state_machine::LivenessStateMachine;

/// Readiness gate handed to schedulers and health endpoints.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    machine: Arc<LivenessStateMachine>,
}

impl ReadinessProbe {
    pub fn new(machine: Arc<LivenessStateMachine>) -> Self {
        Self { machine }
    }

    pub fn is_healthy(&self) -> Readiness {
        Readiness::from(&self.machine.read())
    }

    /// Error out when the coordination link is known to be down.
    pub fn require_healthy(&self) -> Result<()> {
        let readiness = self.is_healthy();
        if !readiness.ok {
            bail!(
                "coordination link unhealthy: {}",
                readiness.reason.as_deref().unwrap_or("unknown reason")
            );
        }
        Ok(())
    }
}

impl ReadinessPort for ReadinessProbe {
    fn is_healthy(&self) -> Readiness {
        ReadinessProbe::is_healthy(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_domain::{CONNECTION_SUSPENDED, CoordinationEvent};

    #[test]
    fn test_unknown_passes_the_gate() {
        let probe = ReadinessProbe::new(Arc::new(LivenessStateMachine::new()));
        let readiness = probe.is_healthy();
        assert!(readiness.ok);
        assert_eq!(readiness.reason, None);
        assert!(probe.require_healthy().is_ok());
    }

    #[test]
    fn test_follows_state_machine() {
        let machine = Arc::new(LivenessStateMachine::new());
        let probe = ReadinessProbe::new(Arc::clone(&machine));
        let port: &dyn ReadinessPort = &probe;

        machine.apply_event(CoordinationEvent::ConnectionSuspended);
        let readiness = port.is_healthy();
        assert!(!readiness.ok);
        assert_eq!(readiness.reason.as_deref(), Some(CONNECTION_SUSPENDED));
        let err = probe.require_healthy().unwrap_err();
        assert!(err.to_string().contains(CONNECTION_SUSPENDED));

        machine.apply_event(CoordinationEvent::ConnectionReconnected);
        assert!(port.is_healthy().ok);
    }
}
