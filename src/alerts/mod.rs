pub mod evaluator;
pub mod monitor;
pub mod notifications;
pub mod thresholds;

pub use evaluator::{evaluate, evaluate_with, AlertDecision};
pub use monitor::{DeviceMonitor, DeviceUpdate};
pub use notifications::{DesktopNotifier, LogNotifier, NotificationDispatcher};
pub use thresholds::{classify_distance, classify_gas, fill_fraction, Severity, ThresholdPolicy};
