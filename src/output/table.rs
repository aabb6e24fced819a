use tabled::{Table, Tabled};

use crate::alerts::{DeviceUpdate, Severity};

/// Things that can be printed as a table or as JSON
pub trait OutputFormat {
    fn to_table(&self, decimal_places: u8) -> String;
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

/// One line per device in the device overview
#[derive(Tabled, Debug)]
pub struct DeviceStatusRow {
    #[tabled(rename = "Device")]
    pub device: String,
    #[tabled(rename = "Fill")]
    pub fill: String,
    #[tabled(rename = "Distance")]
    pub distance: String,
    #[tabled(rename = "Gas")]
    pub gas: String,
    #[tabled(rename = "Alerts")]
    pub alerts: String,
    #[tabled(rename = "Last Updated")]
    pub last_updated: String,
}

/// One line per reading in a device's history
#[derive(Tabled, Debug)]
pub struct HistoryRow {
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Distance (cm)")]
    pub distance_cm: String,
    #[tabled(rename = "Fill Level")]
    pub fill_level: String,
    #[tabled(rename = "Gas (ppm)")]
    pub ppm: String,
    #[tabled(rename = "Gas Level")]
    pub gas_level: String,
}

impl DeviceStatusRow {
    pub fn from_update(update: &DeviceUpdate, decimal_places: u8) -> Self {
        let places = decimal_places as usize;
        Self {
            device: update.device.to_string(),
            fill: fill_bar(update.fill_fraction, 10),
            distance: format!(
                "{:.*} cm ({})",
                places,
                update.reading.distance_cm,
                update.distance.label().to_uppercase()
            ),
            gas: format!("{:.0} ppm ({})", update.reading.ppm, update.gas.label().to_uppercase()),
            alerts: if update.decision.is_alerting() {
                update.decision.reasons.join("; ")
            } else {
                "-".to_string()
            },
            last_updated: or_dash(&update.reading.timestamp),
        }
    }
}

impl HistoryRow {
    pub fn from_update(update: &DeviceUpdate, decimal_places: u8) -> Self {
        let places = decimal_places as usize;
        Self {
            time: or_dash(&update.reading.chart_label()),
            distance_cm: format!("{:.*}", places, update.reading.distance_cm),
            fill_level: format!("{} ({})", format_percent(update.fill_fraction), update.distance.label()),
            ppm: format!("{:.0}", update.reading.ppm),
            gas_level: update.gas.label().to_string(),
        }
    }
}

/// Latest update per device
pub struct DeviceOverview(pub Vec<DeviceUpdate>);

/// Trailing updates of a single device, oldest first
pub struct DeviceHistory(pub Vec<DeviceUpdate>);

impl OutputFormat for DeviceOverview {
    fn to_table(&self, decimal_places: u8) -> String {
        if self.0.is_empty() {
            return "No devices found.".to_string();
        }

        let rows: Vec<DeviceStatusRow> = self
            .0
            .iter()
            .map(|update| DeviceStatusRow::from_update(update, decimal_places))
            .collect();

        Table::new(rows).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }
}

impl OutputFormat for DeviceHistory {
    fn to_table(&self, decimal_places: u8) -> String {
        if self.0.is_empty() {
            return "No data available.".to_string();
        }

        let rows: Vec<HistoryRow> = self
            .0
            .iter()
            .map(|update| HistoryRow::from_update(update, decimal_places))
            .collect();

        Table::new(rows).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }
}

/// Text progress bar, e.g. `[#######---] 70%`
pub fn fill_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        format_percent(fraction)
    )
}

/// Wrap `text` in the ANSI color of `severity`. Terminals have no orange,
/// so warnings render yellow.
pub fn paint(severity: Severity, text: &str) -> String {
    let code = match severity.color() {
        "green" => "32",
        "orange" => "33",
        "red" => "31",
        _ => "0",
    };
    format!("\x1b[{}m{}\x1b[0m", code, text)
}

fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::DeviceMonitor;
    use crate::models::{DeviceId, RawReading};

    fn sample_update(distance: f64, ppm: f64, timestamp: &str) -> DeviceUpdate {
        let mut monitor = DeviceMonitor::default();
        let raw = RawReading::new(distance, ppm).with_timestamp(timestamp);
        monitor.handle_update(&DeviceId::from("AA:BB:CC:DD:EE:01"), Some(&raw))
    }

    #[test]
    fn test_fill_bar() {
        assert_eq!(fill_bar(0.0, 10), "[----------] 0%");
        assert_eq!(fill_bar(0.7, 10), "[#######---] 70%");
        assert_eq!(fill_bar(1.0, 4), "[####] 100%");
        assert_eq!(fill_bar(3.0, 4), "[####] 100%");
    }

    #[test]
    fn test_paint_uses_severity_color() {
        assert_eq!(paint(Severity::Safe, "SAFE"), "\x1b[32mSAFE\x1b[0m");
        assert_eq!(paint(Severity::Warning, "WARNING"), "\x1b[33mWARNING\x1b[0m");
        assert_eq!(paint(Severity::Alert, "ALERT"), "\x1b[31mALERT\x1b[0m");
    }

    #[test]
    fn test_status_row_creation() {
        let update = sample_update(4.0, 2000.0, "2024-11-02 10:15:00");
        let row = DeviceStatusRow::from_update(&update, 1);

        assert_eq!(row.device, "AA:BB:CC:DD:EE:01");
        assert_eq!(row.fill, "[##########] 96%");
        assert_eq!(row.distance, "4.0 cm (ALERT)");
        assert_eq!(row.gas, "2000 ppm (ALERT)");
        assert!(row.alerts.contains("nearly full"));
        assert_eq!(row.last_updated, "2024-11-02 10:15:00");
    }

    #[test]
    fn test_safe_row_has_no_alerts() {
        let update = sample_update(60.0, 120.0, "");
        let row = DeviceStatusRow::from_update(&update, 0);
        assert_eq!(row.distance, "60 cm (SAFE)");
        assert_eq!(row.alerts, "-");
        assert_eq!(row.last_updated, "-");
    }

    #[test]
    fn test_history_row_creation() {
        let update = sample_update(12.0, 900.0, "2024-11-02 14:05:00");
        let row = HistoryRow::from_update(&update, 1);
        assert_eq!(row.time, "14:00");
        assert_eq!(row.distance_cm, "12.0");
        assert_eq!(row.fill_level, "88% (Warning)");
        assert_eq!(row.ppm, "900");
        assert_eq!(row.gas_level, "Warning");
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(DeviceOverview(vec![]).to_table(1), "No devices found.");
        assert_eq!(DeviceHistory(vec![]).to_table(1), "No data available.");
    }

    #[test]
    fn test_json_output() {
        let overview = DeviceOverview(vec![sample_update(5.0, 2000.0, "t1")]);
        let json = overview.to_json().unwrap();
        assert!(json.contains("AA:BB:CC:DD:EE:01"));
        assert!(json.contains("\"should_notify\": true"));
        assert!(json.contains("\"gas\": \"alert\""));
    }
}
