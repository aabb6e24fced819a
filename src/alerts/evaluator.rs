use serde::{Deserialize, Serialize};

use crate::alerts::thresholds::{Severity, ThresholdPolicy};
use crate::models::Reading;

pub const GAS_ALERT_REASON: &str = "Gas concentration has reached a dangerous level";
pub const FILL_ALERT_REASON: &str = "Bin is nearly full";

/// Outcome of evaluating one reading. `reasons` lists every active alert
/// cause (gas first, then fill); `should_notify` is false when the causes are
/// unchanged from the previous decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDecision {
    pub should_notify: bool,
    pub reasons: Vec<String>,
}

impl AlertDecision {
    /// Whether any alert cause is active, regardless of de-duplication.
    pub fn is_alerting(&self) -> bool {
        !self.reasons.is_empty()
    }

    /// Title and body handed to the notification dispatcher.
    pub fn notification(&self, reading: &Reading) -> (String, String) {
        let title = if self.reasons.len() > 1 {
            "Garbage bin alerts".to_string()
        } else {
            "Garbage bin alert".to_string()
        };
        let body = format!(
            "{} (gas: {:.0} ppm, distance: {:.1} cm)",
            self.reasons.join("; "),
            reading.ppm,
            reading.distance_cm
        );
        (title, body)
    }
}

pub fn evaluate(reading: &Reading, previous: Option<&AlertDecision>) -> AlertDecision {
    evaluate_with(&ThresholdPolicy::default(), reading, previous)
}

pub fn evaluate_with(
    policy: &ThresholdPolicy,
    reading: &Reading,
    previous: Option<&AlertDecision>,
) -> AlertDecision {
    let gas_alert = policy.classify_gas(reading.ppm) == Severity::Alert;
    let fill_alert = policy.classify_distance(reading.distance_cm) == Severity::Alert;

    let mut reasons = Vec::new();
    if gas_alert {
        reasons.push(GAS_ALERT_REASON.to_string());
    }
    if fill_alert {
        reasons.push(FILL_ALERT_REASON.to_string());
    }

    // Same causes as last time: the user has already been told.
    let repeated = previous
        .map(|prev| prev.is_alerting() && prev.reasons == reasons)
        .unwrap_or(false);

    AlertDecision {
        should_notify: (gas_alert || fill_alert) && !repeated,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ppm: f64, distance_cm: f64) -> Reading {
        Reading {
            distance_cm,
            ppm,
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_safe_reading_does_not_notify() {
        let decision = evaluate(&reading(100.0, 50.0), None);
        assert!(!decision.should_notify);
        assert!(decision.reasons.is_empty());
        assert!(!decision.is_alerting());
    }

    #[test]
    fn test_warning_levels_do_not_notify() {
        let decision = evaluate(&reading(1200.0, 12.0), None);
        assert!(!decision.should_notify);
        assert!(decision.reasons.is_empty());
    }

    #[test]
    fn test_both_reasons_gas_first() {
        let decision = evaluate(&reading(2000.0, 5.0), None);
        assert!(decision.should_notify);
        assert_eq!(decision.reasons, vec![GAS_ALERT_REASON, FILL_ALERT_REASON]);
    }

    #[test]
    fn test_repeated_alert_is_suppressed() {
        let first = evaluate(&reading(2000.0, 50.0), None);
        assert!(first.should_notify);

        let second = evaluate(&reading(2000.0, 50.0), Some(&first));
        assert!(!second.should_notify);
        assert_eq!(second.reasons, first.reasons);

        // Stays quiet while the condition persists
        let third = evaluate(&reading(2200.0, 50.0), Some(&second));
        assert!(!third.should_notify);
    }

    #[test]
    fn test_transition_to_alert_notifies() {
        let safe = evaluate(&reading(100.0, 50.0), None);
        let alert = evaluate(&reading(2000.0, 50.0), Some(&safe));
        assert!(alert.should_notify);
    }

    #[test]
    fn test_alert_clears_and_returns() {
        let first = evaluate(&reading(2000.0, 50.0), None);
        let cleared = evaluate(&reading(100.0, 50.0), Some(&first));
        assert!(!cleared.should_notify);
        let again = evaluate(&reading(2000.0, 50.0), Some(&cleared));
        assert!(again.should_notify);
    }

    #[test]
    fn test_new_cause_notifies() {
        let gas_only = evaluate(&reading(2000.0, 50.0), None);
        let both = evaluate(&reading(2000.0, 5.0), Some(&gas_only));
        assert!(both.should_notify);
        assert_eq!(both.reasons.len(), 2);

        let fill_only = evaluate(&reading(100.0, 5.0), Some(&both));
        assert!(fill_only.should_notify);
        assert_eq!(fill_only.reasons, vec![FILL_ALERT_REASON]);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ThresholdPolicy {
            gas_alert_ppm: 70.0,
            gas_warning_ppm: 30.0,
            ..Default::default()
        };
        let decision = evaluate_with(&policy, &reading(75.0, 50.0), None);
        assert!(decision.should_notify);
        assert_eq!(decision.reasons, vec![GAS_ALERT_REASON]);
    }

    #[test]
    fn test_notification_text() {
        let r = reading(2000.0, 5.0);
        let decision = evaluate(&r, None);
        let (title, body) = decision.notification(&r);
        assert_eq!(title, "Garbage bin alerts");
        assert!(body.starts_with(GAS_ALERT_REASON));
        assert!(body.contains("2000 ppm"));
        assert!(body.contains("5.0 cm"));
    }
}
