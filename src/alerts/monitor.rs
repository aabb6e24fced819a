use serde::Serialize;
use std::collections::{HashMap, VecDeque};

use crate::alerts::{
    evaluator::{evaluate_with, AlertDecision},
    notifications::NotificationDispatcher,
    thresholds::{Severity, ThresholdPolicy},
};
use crate::models::{normalize, normalize_entry, DeviceId, RawReading, Reading};

pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Everything known about one device between updates.
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    pub latest: Option<Reading>,
    pub decision: Option<AlertDecision>,
    pub history: VecDeque<Reading>,
}

/// Result of processing one incoming reading, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceUpdate {
    pub device: DeviceId,
    pub reading: Reading,
    pub gas: Severity,
    pub distance: Severity,
    pub fill_fraction: f64,
    pub decision: AlertDecision,
}

/// Sequences updates per device and owns each device's previous decision,
/// which is what makes alert de-duplication work.
pub struct DeviceMonitor {
    policy: ThresholdPolicy,
    history_window: usize,
    states: HashMap<DeviceId, DeviceState>,
}

impl DeviceMonitor {
    pub fn new(policy: ThresholdPolicy, history_window: usize) -> Self {
        Self {
            policy,
            history_window: history_window.max(1),
            states: HashMap::new(),
        }
    }

    /// Process a reading pushed by the data source.
    pub fn handle_update(&mut self, device: &DeviceId, raw: Option<&RawReading>) -> DeviceUpdate {
        self.apply(device, normalize(raw))
    }

    /// Process a history entry keyed by its timestamp.
    pub fn handle_entry(&mut self, device: &DeviceId, key: &str, raw: &RawReading) -> DeviceUpdate {
        self.apply(device, normalize_entry(key, raw))
    }

    fn apply(&mut self, device: &DeviceId, reading: Reading) -> DeviceUpdate {
        let state = self.states.entry(device.clone()).or_default();

        let decision = evaluate_with(&self.policy, &reading, state.decision.as_ref());
        let update = DeviceUpdate {
            device: device.clone(),
            gas: self.policy.classify_gas(reading.ppm),
            distance: self.policy.classify_distance(reading.distance_cm),
            fill_fraction: self.policy.fill_fraction(reading.distance_cm),
            decision: decision.clone(),
            reading: reading.clone(),
        };

        tracing::debug!(
            device = %device,
            ppm = reading.ppm,
            distance_cm = reading.distance_cm,
            gas = update.gas.label(),
            distance = update.distance.label(),
            notify = decision.should_notify,
            "reading processed"
        );

        state.history.push_back(reading.clone());
        while state.history.len() > self.history_window {
            state.history.pop_front();
        }
        state.latest = Some(reading);
        state.decision = Some(decision);

        update
    }

    /// Hand the update to the dispatcher if it warrants a notification.
    /// Returns whether a notification was delivered. Delivery failures are
    /// logged and swallowed.
    pub fn dispatch(&self, update: &DeviceUpdate, dispatcher: &dyn NotificationDispatcher) -> bool {
        if !update.decision.should_notify {
            return false;
        }

        let (title, body) = update.decision.notification(&update.reading);
        let title = format!("{}: {}", update.device, title);
        match dispatcher.dispatch(&title, &body) {
            Ok(()) => {
                tracing::info!(device = %update.device, reasons = ?update.decision.reasons, "alert dispatched");
                true
            }
            Err(e) => {
                tracing::warn!(device = %update.device, error = %e, "failed to deliver alert notification");
                false
            }
        }
    }

    pub fn latest(&self, device: &DeviceId) -> Option<&Reading> {
        self.states.get(device).and_then(|s| s.latest.as_ref())
    }

    pub fn decision(&self, device: &DeviceId) -> Option<&AlertDecision> {
        self.states.get(device).and_then(|s| s.decision.as_ref())
    }

    /// Trailing readings for charting, oldest first.
    pub fn history(&self, device: &DeviceId) -> Vec<Reading> {
        self.states
            .get(device)
            .map(|s| s.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn devices(&self) -> Vec<DeviceId> {
        let mut devices: Vec<DeviceId> = self.states.keys().cloned().collect();
        devices.sort();
        devices
    }

    pub fn forget(&mut self, device: &DeviceId) {
        self.states.remove(device);
    }
}

impl Default for DeviceMonitor {
    fn default() -> Self {
        Self::new(ThresholdPolicy::default(), DEFAULT_HISTORY_WINDOW)
    }
}
