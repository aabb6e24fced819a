use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque identifier of a monitored bin (usually a MAC address).
/// Only ever compared by string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Untrusted record as delivered by the data source. Every field is kept as
/// raw JSON so that strings like `"42.5"` and outright garbage both survive
/// deserialization and are dealt with by [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(default)]
    pub distance_cm: Option<Value>,
    #[serde(default)]
    pub ppm: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl RawReading {
    pub fn new(distance_cm: impl Into<Value>, ppm: impl Into<Value>) -> Self {
        Self {
            distance_cm: Some(distance_cm.into()),
            ppm: Some(ppm.into()),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<Value>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Lenient conversion from an arbitrary JSON value. Anything that isn't an
    /// object yields an empty record, which normalizes to zeros.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                distance_cm: map.get("distance_cm").cloned(),
                ppm: map.get("ppm").cloned(),
                timestamp: map.get("timestamp").cloned(),
            },
            _ => Self::default(),
        }
    }
}

/// Canonical reading. Both numeric fields are finite and non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub distance_cm: f64,
    pub ppm: f64,
    pub timestamp: String,
}

impl Reading {
    /// Hour label for chart axes, e.g. `"14:00"`. Falls back to the raw
    /// timestamp when it is not a recognizable date-time.
    pub fn chart_label(&self) -> String {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return format!("{:02}:00", parsed.hour());
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&self.timestamp, format) {
                return format!("{:02}:00", parsed.hour());
            }
        }
        self.timestamp.clone()
    }
}

/// Coerce a raw record into a [`Reading`]. Never fails: missing or malformed
/// fields degrade to `0` so there is always something to display.
pub fn normalize(raw: Option<&RawReading>) -> Reading {
    let Some(raw) = raw else {
        return Reading::default();
    };

    Reading {
        distance_cm: parse_measurement(raw.distance_cm.as_ref()),
        ppm: parse_measurement(raw.ppm.as_ref()),
        timestamp: timestamp_text(raw.timestamp.as_ref()),
    }
}

/// Normalize a history entry keyed by its timestamp. The key stands in for the
/// timestamp when the record body doesn't carry one.
pub fn normalize_entry(key: &str, raw: &RawReading) -> Reading {
    let mut reading = normalize(Some(raw));
    if reading.timestamp.is_empty() {
        reading.timestamp = key.to_string();
    }
    reading
}

fn parse_measurement(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

fn timestamp_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
