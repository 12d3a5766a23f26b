//! Managed lifecycle for the coordination liveness monitor.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::Mutex;
use tracing::info;

use stevedore_domain::{LivenessConfig, LivenessSignal};
use stevedore_ports::{CoordinationPort, EventHandler, PortSet};

use crate::readiness::ReadinessProbe;
use crate::reporter::HealthReporter;
use crate::state_machine::LivenessStateMachine;

/// Couples a coordination watch to the liveness state machine and reporter.
///
/// The watch is registered on construction and started by the first
/// [`start`](Self::start). [`stop`](Self::stop) only halts reporting: the
/// state machine keeps following coordination events, and a later `start`
/// resumes reporting from the current signal.
pub struct LivenessMonitor {
    path: String,
    machine: Arc<LivenessStateMachine>,
    reporter: Arc<HealthReporter>,
    coordination: Arc<dyn CoordinationPort>,
    watch_started: Mutex<bool>,
}

impl LivenessMonitor {
    pub fn new(config: &LivenessConfig, ports: PortSet) -> Result<Self> {
        config.validate()?;
        let path = config.coordination.path.clone();
        let machine = Arc::new(LivenessStateMachine::new());
        let reporter = Arc::new(HealthReporter::new(
            Arc::clone(&machine),
            ports.sink,
            config.reporter.clone(),
        ));

        let handler: EventHandler = {
            let machine = Arc::clone(&machine);
            let reporter = Arc::clone(&reporter);
            Arc::new(move |event| {
                if let Some(signal) = machine.apply_event(event) {
                    reporter.emit(&signal);
                }
            })
        };
        ports
            .coordination
            .subscribe(&path, handler)
            .with_context(|| format!("failed to subscribe to coordination path {path}"))?;

        Ok(Self {
            path,
            machine,
            reporter,
            coordination: ports.coordination,
            watch_started: Mutex::new(false),
        })
    }

    pub async fn start(&self) -> Result<()> {
        let mut watch_started = self.watch_started.lock().await;
        if self.reporter.is_running() {
            bail!("liveness monitor for {} already running", self.path);
        }
        if !*watch_started {
            self.coordination
                .start()
                .await
                .with_context(|| format!("failed to start coordination watch on {}", self.path))?;
            *watch_started = true;
        }
        self.reporter.start()?;
        info!(path = %self.path, "coordination liveness monitor started");
        Ok(())
    }

    pub fn stop(&self) {
        if self.reporter.is_running() {
            info!(path = %self.path, "stopping coordination liveness monitor");
        }
        self.reporter.stop();
    }

    pub fn is_running(&self) -> bool {
        self.reporter.is_running()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn signal(&self) -> LivenessSignal {
        self.machine.read()
    }

    pub fn readiness(&self) -> ReadinessProbe {
        ReadinessProbe::new(Arc::clone(&self.machine))
    }
}
