use binwatch::alerts::{
    classify_distance, classify_gas, evaluate, fill_fraction, DeviceMonitor, NotificationDispatcher,
    Severity, ThresholdPolicy,
};
use binwatch::models::{normalize, DeviceId, RawReading, Reading};
use serde_json::json;
use std::cell::RefCell;

/// End-to-end checks of normalize -> classify -> evaluate, the way the watch
/// loop drives them

fn reading(ppm: f64, distance_cm: f64) -> Reading {
    Reading {
        distance_cm,
        ppm,
        timestamp: "2024-11-02 10:00:00".to_string(),
    }
}

#[test]
fn test_malformed_fields_never_produce_nan() {
    let payloads = vec![
        json!({}),
        json!({"distance_cm": null, "ppm": null}),
        json!({"distance_cm": "", "ppm": "twelve"}),
        json!({"distance_cm": [1, 2], "ppm": {"v": 3}}),
        json!({"distance_cm": true, "ppm": false}),
        json!("not even an object"),
    ];

    for payload in payloads {
        let raw = RawReading::from_value(&payload);
        let reading = normalize(Some(&raw));
        assert_eq!(reading.distance_cm, 0.0, "payload {}", payload);
        assert_eq!(reading.ppm, 0.0, "payload {}", payload);
    }
}

#[test]
fn test_valid_fields_round_trip() {
    let raw: RawReading =
        serde_json::from_value(json!({"distance_cm": 37.25, "ppm": 640.5, "timestamp": "k1"})).unwrap();
    let reading = normalize(Some(&raw));
    assert_eq!(reading.distance_cm, 37.25);
    assert_eq!(reading.ppm, 640.5);
    assert_eq!(reading.timestamp, "k1");
}

#[test]
fn test_classification_is_deterministic() {
    for ppm in [0.0, 799.99, 800.0, 1499.0, 1500.0, 9000.0] {
        assert_eq!(classify_gas(ppm), classify_gas(ppm));
    }
    assert_eq!(classify_gas(800.0), Severity::Warning);
    assert_eq!(classify_gas(799.99), Severity::Safe);
    assert_eq!(classify_gas(1500.0), Severity::Alert);
    assert_eq!(classify_distance(10.0), Severity::Warning);
    assert_eq!(classify_distance(15.0), Severity::Safe);
}

#[test]
fn test_fill_fraction_bounds() {
    let mut distance = 0.0;
    while distance < 500.0 {
        let f = fill_fraction(distance);
        assert!((0.0..=1.0).contains(&f), "distance {} gave {}", distance, f);
        distance += 3.7;
    }
}

#[test]
fn test_both_reasons_in_fixed_order() {
    let decision = evaluate(&reading(2000.0, 5.0), None);
    assert!(decision.should_notify);
    assert_eq!(decision.reasons.len(), 2);
    assert!(decision.reasons[0].contains("Gas"));
    assert!(decision.reasons[1].contains("full"));
}

#[test]
fn test_persisting_alert_notifies_once() {
    let first = evaluate(&reading(2000.0, 50.0), None);
    let second = evaluate(&reading(2000.0, 50.0), Some(&first));
    assert!(first.should_notify);
    assert!(!second.should_notify);
}

#[test]
fn test_safe_to_alert_transition_notifies() {
    let safe = evaluate(&reading(100.0, 50.0), None);
    let alert = evaluate(&reading(2000.0, 50.0), Some(&safe));
    assert!(alert.should_notify);
}

#[derive(Default)]
struct Outbox {
    messages: RefCell<Vec<String>>,
}

impl NotificationDispatcher for Outbox {
    fn dispatch(&self, title: &str, body: &str) -> anyhow::Result<()> {
        self.messages.borrow_mut().push(format!("{} | {}", title, body));
        Ok(())
    }
}

#[test]
fn test_monitor_sequence_with_dispatcher() {
    let mut monitor = DeviceMonitor::new(ThresholdPolicy::default(), 5);
    let device = DeviceId::from("AA:BB:CC:DD:EE:01");
    let outbox = Outbox::default();

    // safe, alert, alert (persisting), safe, alert again
    let sequence = [(40, 100), (40, 2000), (40, 2100), (40, 300), (40, 1600)];
    let mut notified = Vec::new();
    for (distance, ppm) in sequence {
        let update = monitor.handle_update(&device, Some(&RawReading::new(distance, ppm)));
        notified.push(monitor.dispatch(&update, &outbox));
    }

    assert_eq!(notified, vec![false, true, false, false, true]);
    let messages = outbox.messages.borrow();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("AA:BB:CC:DD:EE:01: "));
    assert_eq!(monitor.history(&device).len(), 5);
}
