use reqwest::{Client, Url};
use serde_json::Value;
use std::cmp::Ordering;
use std::time::Duration;

use crate::models::{DeviceId, RawReading};
use crate::source::{DataSource, HistoryEntry, SourceError};

/// Firebase Realtime Database, read through its REST interface. The
/// database is laid out as `/{device}/sensorData/{timestamp}: {distance_cm, ppm}`.
pub struct FirebaseSource {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
    history_limit: Option<usize>,
}

impl FirebaseSource {
    pub fn new(base_url: &str, auth_token: Option<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("binwatch/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid database URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid database URL: {}", base_url);
        }

        Ok(Self {
            client,
            base_url,
            auth_token,
            history_limit: None,
        })
    }

    /// Only fetch the last `limit` readings of a device's history.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit.max(1));
        self
    }

    /// REST URL of a database location; each segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            match segments.split_last() {
                Some((last, parents)) => {
                    path.extend(parents);
                    path.push(&format!("{}.json", last));
                }
                None => {
                    path.push(".json");
                }
            }
        }
        url.to_string()
    }

    async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, SourceError> {
        let url = self.url(segments);

        let mut query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if let Some(token) = &self.auth_token {
            query.push(("auth", token.as_str()));
        }

        tracing::debug!(%url, "fetching from realtime database");
        // The request URL carries the auth token, so it is stripped from errors
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| SourceError::Unreachable {
                url: url.clone(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| SourceError::Payload {
                url,
                source: source.without_url(),
            })
    }
}

impl DataSource for FirebaseSource {
    async fn list_devices(&mut self) -> Result<Vec<DeviceId>, SourceError> {
        let body = self.get_json(&[], &[("shallow", "true".to_string())]).await?;
        Ok(parse_device_keys(&body))
    }

    async fn fetch_history(&mut self, device: &DeviceId) -> Result<Vec<HistoryEntry>, SourceError> {
        let segments = [device.as_str(), "sensorData"];
        match self.history_limit {
            Some(limit) => {
                let query = [
                    ("orderBy", "\"$key\"".to_string()),
                    ("limitToLast", limit.to_string()),
                ];
                let body = self.get_json(&segments, &query).await?;
                // Filtered REST responses come back unordered
                let mut entries = parse_history(&body);
                entries.sort_by(|a, b| compare_keys(&a.key, &b.key));
                Ok(entries)
            }
            None => {
                let body = self.get_json(&segments, &[]).await?;
                Ok(parse_history(&body))
            }
        }
    }
}

/// Top-level keys of the database are the device identifiers.
pub fn parse_device_keys(body: &Value) -> Vec<DeviceId> {
    match body {
        Value::Object(map) => map.keys().map(|k| DeviceId::new(k.as_str())).collect(),
        _ => Vec::new(),
    }
}

/// Timestamp-keyed readings, in the order the database returned them.
pub fn parse_history(body: &Value) -> Vec<HistoryEntry> {
    match body {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| HistoryEntry::new(key.as_str(), RawReading::from_value(value)))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(kind = ?other, "unexpected sensorData payload, ignoring");
            Vec::new()
        }
    }
}

/// Key order used by `orderBy="$key"`: integer keys first, numerically,
/// then everything else lexicographically.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
