use chrono::{SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};

use crate::models::{DeviceId, RawReading};
use crate::source::{DataSource, HistoryEntry, SourceError};

const MAX_SIMULATED_PPM: f64 = 2500.0;

/// Random readings for demos and for running without a database. Every
/// history fetch produces one new reading for that device, so a poll loop
/// sees fresh data on each tick.
pub struct SimulatedSource {
    devices: Vec<DeviceId>,
    rng: StdRng,
    max_distance_cm: f64,
    history_window: usize,
    history: HashMap<DeviceId, VecDeque<HistoryEntry>>,
    last_key: i64,
}

impl SimulatedSource {
    pub fn new(device_count: usize, max_distance_cm: f64, history_window: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), device_count, max_distance_cm, history_window)
    }

    pub fn seeded(seed: u64, device_count: usize, max_distance_cm: f64, history_window: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), device_count, max_distance_cm, history_window)
    }

    fn with_rng(rng: StdRng, device_count: usize, max_distance_cm: f64, history_window: usize) -> Self {
        // Locally administered MAC range, so they can't clash with real hardware
        let devices = (1..=device_count)
            .map(|i| DeviceId::new(format!("02:00:00:00:{:02X}:{:02X}", i / 256, i % 256)))
            .collect();

        Self {
            devices,
            rng,
            max_distance_cm: max_distance_cm.max(1.0),
            history_window: history_window.max(1),
            history: HashMap::new(),
            last_key: 0,
        }
    }

    fn next_entry(&mut self) -> HistoryEntry {
        let now = Utc::now();
        // Millisecond keys, bumped so two readings never share one
        let key = now.timestamp_millis().max(self.last_key + 1);
        self.last_key = key;

        let distance: f64 = self.rng.gen_range(0.0..self.max_distance_cm);
        let ppm: f64 = self.rng.gen_range(0.0..MAX_SIMULATED_PPM);
        let raw = RawReading::new(round_to(distance, 1), round_to(ppm, 0))
            .with_timestamp(now.to_rfc3339_opts(SecondsFormat::Secs, true));

        HistoryEntry::new(key.to_string(), raw)
    }
}

impl DataSource for SimulatedSource {
    async fn list_devices(&mut self) -> Result<Vec<DeviceId>, SourceError> {
        Ok(self.devices.clone())
    }

    async fn fetch_history(&mut self, device: &DeviceId) -> Result<Vec<HistoryEntry>, SourceError> {
        if !self.devices.contains(device) {
            return Ok(Vec::new());
        }

        let entry = self.next_entry();
        let window = self.history_window;
        let history = self.history.entry(device.clone()).or_default();
        history.push_back(entry);
        while history.len() > window {
            history.pop_front();
        }

        Ok(history.iter().cloned().collect())
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::normalize_entry;

    #[tokio::test]
    async fn test_lists_configured_devices() {
        let mut source = SimulatedSource::seeded(7, 3, 100.0, 10);
        let devices = source.list_devices().await.unwrap();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0], DeviceId::from("02:00:00:00:00:01"));
        assert_eq!(devices[2], DeviceId::from("02:00:00:00:00:03"));
    }

    #[tokio::test]
    async fn test_readings_stay_in_range() {
        let mut source = SimulatedSource::seeded(42, 1, 60.0, 50);
        let device = source.list_devices().await.unwrap().remove(0);

        for _ in 0..20 {
            source.fetch_history(&device).await.unwrap();
        }
        let history = source.fetch_history(&device).await.unwrap();
        assert_eq!(history.len(), 21);
        for entry in &history {
            let reading = normalize_entry(&entry.key, &entry.raw);
            assert!((0.0..=60.0).contains(&reading.distance_cm));
            assert!((0.0..=MAX_SIMULATED_PPM).contains(&reading.ppm));
            assert!(!reading.timestamp.is_empty());
        }
    }

    #[tokio::test]
    async fn test_history_window_and_unique_keys() {
        let mut source = SimulatedSource::seeded(1, 1, 100.0, 4);
        let device = source.list_devices().await.unwrap().remove(0);

        let mut keys = Vec::new();
        for _ in 0..6 {
            let latest = source.fetch_latest(&device).await.unwrap().unwrap();
            keys.push(latest.key);
        }
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys, deduped);

        let history = source.fetch_history(&device).await.unwrap();
        assert_eq!(history.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_device_has_no_history() {
        let mut source = SimulatedSource::seeded(1, 2, 100.0, 4);
        let history = source.fetch_history(&DeviceId::from("nope")).await.unwrap();
        assert!(history.is_empty());
    }
}
