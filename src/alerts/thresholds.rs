use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GAS_WARNING_PPM: f64 = 800.0;
pub const DEFAULT_GAS_ALERT_PPM: f64 = 1500.0;
pub const DEFAULT_DISTANCE_WARNING_CM: f64 = 15.0;
pub const DEFAULT_DISTANCE_ALERT_CM: f64 = 10.0;
pub const DEFAULT_MAX_DISTANCE_CM: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Safe,
    Warning,
    Alert,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Safe => "Safe",
            Severity::Warning => "Warning",
            Severity::Alert => "Alert",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Severity::Safe => "green",
            Severity::Warning => "orange",
            Severity::Alert => "red",
        }
    }
}

/// Boundaries used to classify gas concentration and fill distance.
///
/// Gas is classified upward (`ppm >= gas_alert_ppm` is an alert), distance
/// downward since a smaller distance to the contents means a fuller bin
/// (`distance_cm < distance_alert_cm` is an alert).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub gas_warning_ppm: f64,
    pub gas_alert_ppm: f64,
    pub distance_warning_cm: f64,
    pub distance_alert_cm: f64,
    pub max_distance_cm: f64, // Distance reported by an empty bin
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            gas_warning_ppm: DEFAULT_GAS_WARNING_PPM,
            gas_alert_ppm: DEFAULT_GAS_ALERT_PPM,
            distance_warning_cm: DEFAULT_DISTANCE_WARNING_CM,
            distance_alert_cm: DEFAULT_DISTANCE_ALERT_CM,
            max_distance_cm: DEFAULT_MAX_DISTANCE_CM,
        }
    }
}

impl ThresholdPolicy {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("gas_warning_ppm", self.gas_warning_ppm),
            ("gas_alert_ppm", self.gas_alert_ppm),
            ("distance_warning_cm", self.distance_warning_cm),
            ("distance_alert_cm", self.distance_alert_cm),
            ("max_distance_cm", self.max_distance_cm),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                bail!("Threshold {} must be a finite, non-negative number (got {})", name, value);
            }
        }
        if self.gas_warning_ppm > self.gas_alert_ppm {
            bail!(
                "gas_warning_ppm ({}) must not exceed gas_alert_ppm ({})",
                self.gas_warning_ppm,
                self.gas_alert_ppm
            );
        }
        if self.distance_alert_cm > self.distance_warning_cm {
            bail!(
                "distance_alert_cm ({}) must not exceed distance_warning_cm ({})",
                self.distance_alert_cm,
                self.distance_warning_cm
            );
        }
        if self.max_distance_cm <= 0.0 {
            bail!("max_distance_cm must be greater than zero");
        }
        Ok(())
    }

    pub fn classify_gas(&self, ppm: f64) -> Severity {
        if ppm < self.gas_warning_ppm {
            Severity::Safe
        } else if ppm < self.gas_alert_ppm {
            Severity::Warning
        } else {
            Severity::Alert
        }
    }

    pub fn classify_distance(&self, distance_cm: f64) -> Severity {
        if distance_cm >= self.distance_warning_cm {
            Severity::Safe
        } else if distance_cm >= self.distance_alert_cm {
            Severity::Warning
        } else {
            Severity::Alert
        }
    }

    /// How full the bin is, for progress-bar style display. Always in `[0, 1]`.
    pub fn fill_fraction(&self, distance_cm: f64) -> f64 {
        let fraction = 1.0 - distance_cm / self.max_distance_cm;
        if fraction.is_nan() {
            return 0.0;
        }
        fraction.clamp(0.0, 1.0)
    }
}

pub fn classify_gas(ppm: f64) -> Severity {
    ThresholdPolicy::default().classify_gas(ppm)
}

pub fn classify_distance(distance_cm: f64) -> Severity {
    ThresholdPolicy::default().classify_distance(distance_cm)
}

pub fn fill_fraction(distance_cm: f64) -> f64 {
    ThresholdPolicy::default().fill_fraction(distance_cm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_boundaries() {
        assert_eq!(classify_gas(0.0), Severity::Safe);
        assert_eq!(classify_gas(799.99), Severity::Safe);
        assert_eq!(classify_gas(800.0), Severity::Warning);
        assert_eq!(classify_gas(1499.99), Severity::Warning);
        assert_eq!(classify_gas(1500.0), Severity::Alert);
        assert_eq!(classify_gas(25_000.0), Severity::Alert);
    }

    #[test]
    fn test_distance_boundaries() {
        assert_eq!(classify_distance(100.0), Severity::Safe);
        assert_eq!(classify_distance(15.0), Severity::Safe);
        assert_eq!(classify_distance(14.99), Severity::Warning);
        assert_eq!(classify_distance(10.0), Severity::Warning);
        assert_eq!(classify_distance(9.99), Severity::Alert);
        assert_eq!(classify_distance(0.0), Severity::Alert);
    }

    #[test]
    fn test_fill_fraction_is_clamped() {
        assert_eq!(fill_fraction(0.0), 1.0);
        assert_eq!(fill_fraction(100.0), 0.0);
        assert_eq!(fill_fraction(250.0), 0.0);
        assert!((fill_fraction(25.0) - 0.75).abs() < 1e-9);

        for distance in [0.0, 0.5, 9.0, 50.0, 99.9, 100.0, 100.1, 1e9] {
            let f = fill_fraction(distance);
            assert!((0.0..=1.0).contains(&f), "fraction {} out of range for {}", f, distance);
        }
    }

    #[test]
    fn test_fill_fraction_custom_max() {
        let policy = ThresholdPolicy {
            max_distance_cm: 40.0,
            ..Default::default()
        };
        assert!((policy.fill_fraction(10.0) - 0.75).abs() < 1e-9);
        assert_eq!(policy.fill_fraction(80.0), 0.0);
    }

    #[test]
    fn test_severity_ordering_and_presentation() {
        assert!(Severity::Safe < Severity::Warning);
        assert!(Severity::Warning < Severity::Alert);

        assert_eq!(Severity::Safe.color(), "green");
        assert_eq!(Severity::Alert.color(), "red");
        assert_eq!(Severity::Alert.label(), "Alert");
    }

    #[test]
    fn test_policy_validation() {
        assert!(ThresholdPolicy::default().validate().is_ok());

        let inverted_gas = ThresholdPolicy {
            gas_warning_ppm: 2000.0,
            ..Default::default()
        };
        assert!(inverted_gas.validate().is_err());

        let inverted_distance = ThresholdPolicy {
            distance_alert_cm: 20.0,
            ..Default::default()
        };
        assert!(inverted_distance.validate().is_err());

        let zero_max = ThresholdPolicy {
            max_distance_cm: 0.0,
            ..Default::default()
        };
        assert!(zero_max.validate().is_err());

        let nan = ThresholdPolicy {
            gas_alert_ppm: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_custom_policy_classification() {
        let policy = ThresholdPolicy {
            gas_warning_ppm: 30.0,
            gas_alert_ppm: 70.0,
            ..Default::default()
        };
        assert_eq!(policy.classify_gas(29.0), Severity::Safe);
        assert_eq!(policy.classify_gas(30.0), Severity::Warning);
        assert_eq!(policy.classify_gas(70.0), Severity::Alert);
    }
}
