use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::alerts::ThresholdPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub thresholds: ThresholdPolicy,
    pub notifications: NotificationConfig,
    pub history: HistoryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: String, // "firebase" or "simulated"
    pub database_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub simulated_devices: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub desktop: bool, // false logs alerts instead
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String, // "table" or "json"
    pub decimal_places: u8,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: "simulated".to_string(),
            database_url: "https://your-project-default-rtdb.firebaseio.com".to_string(),
            auth_token: None,
            request_timeout_secs: 30,
            poll_interval_secs: 2,
            simulated_devices: 3,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            desktop: true,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "table".to_string(),
            decimal_places: 1,
        }
    }
}

impl Config {
    /// Load from `path`, writing a commented default file there first if it
    /// doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = self.to_commented_toml();

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".config").join("binwatch").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if !["firebase", "simulated"].contains(&self.source.kind.as_str()) {
            anyhow::bail!("Invalid source kind: {}. Must be 'firebase' or 'simulated'", self.source.kind);
        }
        if self.source.poll_interval_secs == 0 {
            anyhow::bail!("source.poll_interval_secs must be at least 1");
        }
        if self.history.window == 0 {
            anyhow::bail!("history.window must be at least 1");
        }
        if !["table", "json"].contains(&self.output.format.as_str()) {
            anyhow::bail!("Invalid output format: {}. Must be 'table' or 'json'", self.output.format);
        }
        self.thresholds.validate()
    }

    /// TOML with a comment above every option
    pub fn to_commented_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# binwatch configuration\n");
        output.push_str("# Smart garbage bin monitor: fill level and gas readings\n");
        output.push_str("\n");

        output.push_str("[source]\n");
        output.push_str("# Where readings come from:\n");
        output.push_str("#   \"firebase\"  - Firebase Realtime Database at database_url\n");
        output.push_str("#   \"simulated\" - Random readings for simulated_devices bins\n");
        output.push_str(&format!("kind = {}\n", toml_string(&self.source.kind)));
        output.push_str("# Layout expected: /<device>/sensorData/<timestamp> = { distance_cm, ppm }\n");
        output.push_str(&format!("database_url = {}\n", toml_string(&self.source.database_url)));
        output.push_str("# Database secret or ID token, sent as the `auth` query parameter\n");
        match &self.source.auth_token {
            Some(token) => output.push_str(&format!("auth_token = {}\n", toml_string(token))),
            None => output.push_str("# auth_token = \"\"\n"),
        }
        output.push_str(&format!("request_timeout_secs = {}\n", self.source.request_timeout_secs));
        output.push_str("# Seconds between polls in watch mode\n");
        output.push_str(&format!("poll_interval_secs = {}\n", self.source.poll_interval_secs));
        output.push_str(&format!("simulated_devices = {}\n", self.source.simulated_devices));
        output.push_str("\n");

        output.push_str("[thresholds]\n");
        output.push_str("# Gas (ppm): below warning is safe, at or above alert triggers a notification\n");
        output.push_str(&format!("gas_warning_ppm = {:?}\n", self.thresholds.gas_warning_ppm));
        output.push_str(&format!("gas_alert_ppm = {:?}\n", self.thresholds.gas_alert_ppm));
        output.push_str("# Distance to contents (cm): smaller means fuller\n");
        output.push_str("# At or above warning is safe, below alert triggers a notification\n");
        output.push_str(&format!("distance_warning_cm = {:?}\n", self.thresholds.distance_warning_cm));
        output.push_str(&format!("distance_alert_cm = {:?}\n", self.thresholds.distance_alert_cm));
        output.push_str("# Distance reported by an empty bin, used for the fill percentage\n");
        output.push_str(&format!("max_distance_cm = {:?}\n", self.thresholds.max_distance_cm));
        output.push_str("\n");

        output.push_str("[notifications]\n");
        output.push_str(&format!("enabled = {}\n", self.notifications.enabled));
        output.push_str("# true: desktop notifications, false: alerts are only logged\n");
        output.push_str(&format!("desktop = {}\n", self.notifications.desktop));
        output.push_str("\n");

        output.push_str("[history]\n");
        output.push_str("# Readings kept per bin for the history chart\n");
        output.push_str(&format!("window = {}\n", self.history.window));
        output.push_str("\n");

        output.push_str("[output]\n");
        output.push_str("# \"table\" or \"json\" (--json overrides)\n");
        output.push_str(&format!("format = {}\n", toml_string(&self.output.format)));
        output.push_str(&format!("decimal_places = {}\n", self.output.decimal_places));

        output
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "source.kind" => {
                if !["firebase", "simulated"].contains(&value) {
                    anyhow::bail!("Invalid source kind: {}. Must be 'firebase' or 'simulated'", value);
                }
                self.source.kind = value.to_string();
            }
            "source.database_url" => self.source.database_url = value.to_string(),
            "source.auth_token" => {
                self.source.auth_token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "source.request_timeout_secs" => {
                self.source.request_timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout value: {}", value))?;
            }
            "source.poll_interval_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid interval value: {}", value))?;
                if secs == 0 {
                    anyhow::bail!("Poll interval must be at least 1 second");
                }
                self.source.poll_interval_secs = secs;
            }
            "source.simulated_devices" => {
                self.source.simulated_devices = value
                    .parse()
                    .with_context(|| format!("Invalid device count: {}", value))?;
            }
            "thresholds.gas_warning_ppm"
            | "thresholds.gas_alert_ppm"
            | "thresholds.distance_warning_cm"
            | "thresholds.distance_alert_cm"
            | "thresholds.max_distance_cm" => {
                let number: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid threshold value: {}", value))?;
                let mut thresholds = self.thresholds;
                match key {
                    "thresholds.gas_warning_ppm" => thresholds.gas_warning_ppm = number,
                    "thresholds.gas_alert_ppm" => thresholds.gas_alert_ppm = number,
                    "thresholds.distance_warning_cm" => thresholds.distance_warning_cm = number,
                    "thresholds.distance_alert_cm" => thresholds.distance_alert_cm = number,
                    _ => thresholds.max_distance_cm = number,
                }
                thresholds.validate()?;
                self.thresholds = thresholds;
            }
            "notifications.enabled" => {
                self.notifications.enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "notifications.desktop" => {
                self.notifications.desktop = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "history.window" => {
                let window: usize = value
                    .parse()
                    .with_context(|| format!("Invalid window size: {}", value))?;
                if window == 0 {
                    anyhow::bail!("History window must be at least 1");
                }
                self.history.window = window;
            }
            "output.format" => {
                if !["table", "json"].contains(&value) {
                    anyhow::bail!("Invalid output format: {}. Must be 'table' or 'json'", value);
                }
                self.output.format = value.to_string();
            }
            "output.decimal_places" => {
                let places: u8 = value
                    .parse()
                    .with_context(|| format!("Invalid decimal places value: {}", value))?;
                if places > 6 {
                    anyhow::bail!("Decimal places must be between 0 and 6");
                }
                self.output.decimal_places = places;
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}

/// Quoted and escaped TOML string literal
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
