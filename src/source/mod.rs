// Data source collaborators: where raw readings come from
pub mod firebase;
pub mod poller;
pub mod simulated;

pub use firebase::FirebaseSource;
pub use poller::Poller;
pub use simulated::SimulatedSource;

use crate::models::{DeviceId, RawReading};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to reach {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid payload from {url}: {source}")]
    Payload {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One stored reading, keyed by the timestamp the source filed it under.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub key: String,
    pub raw: RawReading,
}

impl HistoryEntry {
    pub fn new(key: impl Into<String>, raw: RawReading) -> Self {
        Self {
            key: key.into(),
            raw,
        }
    }
}

/// Device directory plus per-device reading history. Entries come back in
/// the order the source stores them; the last one is the latest reading.
#[allow(async_fn_in_trait)]
pub trait DataSource {
    async fn list_devices(&mut self) -> Result<Vec<DeviceId>, SourceError>;

    async fn fetch_history(&mut self, device: &DeviceId) -> Result<Vec<HistoryEntry>, SourceError>;

    async fn fetch_latest(&mut self, device: &DeviceId) -> Result<Option<HistoryEntry>, SourceError> {
        Ok(self.fetch_history(device).await?.pop())
    }
}

/// The source selected by configuration.
pub enum ConfiguredSource {
    Firebase(FirebaseSource),
    Simulated(SimulatedSource),
}

impl ConfiguredSource {
    pub fn from_config(config: &crate::config::Config, simulate: bool) -> anyhow::Result<Self> {
        if simulate || config.source.kind == "simulated" {
            tracing::info!(devices = config.source.simulated_devices, "using simulated readings");
            return Ok(Self::Simulated(SimulatedSource::new(
                config.source.simulated_devices,
                config.thresholds.max_distance_cm,
                config.history.window,
            )));
        }

        tracing::info!(url = %config.source.database_url, "using firebase realtime database");
        let source = FirebaseSource::new(
            &config.source.database_url,
            config.source.auth_token.clone(),
            config.source.request_timeout_secs,
        )?
        .with_history_limit(config.history.window);
        Ok(Self::Firebase(source))
    }
}

impl DataSource for ConfiguredSource {
    async fn list_devices(&mut self) -> Result<Vec<DeviceId>, SourceError> {
        match self {
            Self::Firebase(source) => source.list_devices().await,
            Self::Simulated(source) => source.list_devices().await,
        }
    }

    async fn fetch_history(&mut self, device: &DeviceId) -> Result<Vec<HistoryEntry>, SourceError> {
        match self {
            Self::Firebase(source) => source.fetch_history(device).await,
            Self::Simulated(source) => source.fetch_history(device).await,
        }
    }
}
