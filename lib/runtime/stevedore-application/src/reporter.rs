//! Periodic health reporting with a dead-man's-switch TTL.
//!
//! The reporter owns two tasks while running: a ticker that reads the
//! liveness signal every interval, and a dispatcher that forwards readings to
//! the monitoring sink. Both the ticker and the out-of-band path only publish
//! into a single latest-reading slot, so a slow sink never holds up event
//! handling or the next tick, and the sink always gets the newest reading.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arc_swap::ArcSwapOption;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use stevedore_domain::{HealthReading, LivenessSignal, MonitoringEvent, ReporterConfig};
use stevedore_ports::MonitoringSink;

use crate::state_machine::LivenessStateMachine;

pub struct HealthReporter {
    machine: Arc<LivenessStateMachine>,
    sink: Arc<dyn MonitoringSink>,
    settings: ReporterConfig,
    running: ArcSwapOption<RunningReporter>,
}

struct RunningReporter {
    cancel: CancellationToken,
    latest: watch::Sender<Option<HealthReading>>,
}

impl HealthReporter {
    pub fn new(
        machine: Arc<LivenessStateMachine>,
        sink: Arc<dyn MonitoringSink>,
        settings: ReporterConfig,
    ) -> Self {
        Self {
            machine,
            sink,
            settings,
            running: ArcSwapOption::empty(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load().is_some()
    }

    /// Schedule the ticker (first tick fires immediately) and the sink
    /// dispatcher on the current tokio runtime.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        if self.settings.interval_secs == 0 {
            bail!("reporter interval must be greater than zero");
        }
        let handle =
            Handle::try_current().context("health reporter must start inside a tokio runtime")?;

        let (latest, pending) = watch::channel(None);
        let cancel = CancellationToken::new();
        let running = Arc::new(RunningReporter {
            cancel: cancel.clone(),
            latest,
        });
        let idle: Option<Arc<RunningReporter>> = None;
        let previous = self.running.compare_and_swap(&idle, Some(running));
        if previous.is_some() {
            bail!("health reporter already running");
        }

        handle.spawn(dispatch(
            pending,
            Arc::clone(&self.sink),
            self.settings.service.clone(),
            self.settings.tags.clone(),
            cancel.clone(),
        ));
        handle.spawn(Arc::clone(self).tick(cancel));

        info!(
            service = %self.settings.service,
            interval_secs = self.settings.interval_secs,
            ttl_secs = self.settings.ttl().as_secs(),
            "health reporter started"
        );
        Ok(())
    }

    /// Cancel future ticks and out-of-band reports. Safe to call at any time.
    pub fn stop(&self) {
        if let Some(running) = self.running.swap(None) {
            running.cancel.cancel();
            info!(service = %self.settings.service, "health reporter stopped");
        }
    }

    /// Report whatever the state machine currently holds.
    pub fn report_current(&self) -> Option<HealthReading> {
        let signal = self.machine.read();
        if !signal.is_known() {
            trace!("no coordination event observed yet, withholding report");
        }
        self.emit(&signal)
    }

    /// Publish a reading for `signal`, replacing any reading the dispatcher
    /// has not picked up yet. Returns the published reading; nothing is
    /// published for an unknown signal or while stopped.
    pub fn emit(&self, signal: &LivenessSignal) -> Option<HealthReading> {
        let reading = HealthReading::from_signal(signal, self.settings.ttl())?;
        let guard = self.running.load();
        let Some(running) = &*guard else {
            debug!(%signal, "health reporter stopped, reading not sent");
            return None;
        };

        if let Some(superseded) = running.latest.send_replace(Some(reading.clone())) {
            trace!(ok = superseded.ok, "unsent health reading superseded");
        }
        Some(reading)
    }

    async fn tick(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = interval(self.settings.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.report_current();
                }
            }
        }
        debug!("health reporter ticker exited");
    }
}

async fn dispatch(
    mut pending: watch::Receiver<Option<HealthReading>>,
    sink: Arc<dyn MonitoringSink>,
    service: String,
    tags: Vec<String>,
    cancel: CancellationToken,
) {
    loop {
        let reading = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = pending.changed() => match changed {
                Ok(()) => pending.borrow_and_update().clone(),
                Err(_) => break,
            },
        };
        let Some(reading) = reading else {
            continue;
        };

        let event = MonitoringEvent::from_reading(&service, &tags, &reading);
        if let Err(err) = sink.send(event).await {
            warn!(%service, ok = reading.ok, "failed to send health reading: {err:#}");
        }
    }
    debug!(%service, "monitoring dispatcher exited");
}
