use std::collections::HashMap;

use crate::models::DeviceId;
use crate::source::{DataSource, HistoryEntry};

/// Turns repeated history fetches into a stream of new readings: a device
/// only yields an entry when its latest key differs from the one seen on the
/// previous poll.
#[derive(Debug, Default)]
pub struct Poller {
    last_seen: HashMap<DeviceId, String>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll every device once. A device whose fetch fails is logged and
    /// skipped; the others are still processed.
    pub async fn poll<S: DataSource>(
        &mut self,
        source: &mut S,
        devices: &[DeviceId],
    ) -> Vec<(DeviceId, HistoryEntry)> {
        let mut fresh = Vec::new();

        for device in devices {
            match source.fetch_latest(device).await {
                Ok(Some(entry)) => {
                    if self.last_seen.get(device) == Some(&entry.key) {
                        continue;
                    }
                    self.last_seen.insert(device.clone(), entry.key.clone());
                    fresh.push((device.clone(), entry));
                }
                Ok(None) => {
                    tracing::debug!(device = %device, "no readings yet");
                }
                Err(e) => {
                    tracing::warn!(device = %device, error = %e, "failed to fetch readings");
                }
            }
        }

        fresh
    }
}
