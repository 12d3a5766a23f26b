//! Debounced liveness state for the coordination link.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use tracing::{info, trace};

use stevedore_domain::{CoordinationEvent, LivenessSignal};

/// Folds coordination events into a coarse healthy/unhealthy signal.
///
/// Only a change of coarse category is stored. While unhealthy, a second
/// unhealthy event with a different reason leaves the first reason in place
/// until the link has been reported healthy again.
#[derive(Debug, Default)]
pub struct LivenessStateMachine {
    signal: ArcSwap<LivenessSignal>,
    transitions: AtomicU64,
}

impl LivenessStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns the stored signal when the coarse category
    /// changed, `None` when the event was absorbed.
    pub fn apply_event(&self, event: CoordinationEvent) -> Option<LivenessSignal> {
        let target = event.target();
        let mut current = self.signal.load();
        loop {
            let stored: &LivenessSignal = &current;
            if stored.coarse() == target.coarse() {
                trace!(%event, signal = %stored, "coordination event absorbed");
                return None;
            }

            let next = Arc::new(target.clone());
            let previous = self.signal.compare_and_swap(&*current, Arc::clone(&next));
            if Arc::ptr_eq(&*previous, &*current) {
                self.transitions.fetch_add(1, Ordering::AcqRel);
                info!(%event, from = %stored, to = %next, "coordination liveness changed");
                return Some(target);
            }
            current = previous;
        }
    }

    /// Lock-free snapshot of the current signal.
    pub fn read(&self) -> LivenessSignal {
        LivenessSignal::clone(&self.signal.load())
    }

    pub fn transitions(&self) -> u64 {
        self.transitions.load(Ordering::Acquire)
    }
}
