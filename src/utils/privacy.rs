use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::DeviceId;

/// Maps real device identifiers to stable dummy names, so output can be
/// shared without leaking hardware addresses.
pub struct DeviceMasker {
    name_mapping: Mutex<HashMap<DeviceId, String>>,
}

impl DeviceMasker {
    pub fn new() -> Self {
        Self {
            name_mapping: Mutex::new(HashMap::new()),
        }
    }

    pub fn dummy_name(&self, device: &DeviceId) -> String {
        let mut mapping = self
            .name_mapping
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(dummy_name) = mapping.get(device) {
            return dummy_name.clone();
        }

        let dummy_name = generate_dummy_name(mapping.len() + 1);
        mapping.insert(device.clone(), dummy_name.clone());

        dummy_name
    }
}

fn generate_dummy_name(index: usize) -> String {
    const BIN_NAMES: &[&str] = &[
        "bin-alpha", "bin-beta", "bin-gamma", "bin-delta", "bin-epsilon", "bin-zeta",
        "bin-eta", "bin-theta", "bin-iota", "bin-kappa", "bin-lambda", "bin-mu",
    ];

    if index <= BIN_NAMES.len() {
        BIN_NAMES[index - 1].to_string()
    } else {
        format!("bin-{:02}", index)
    }
}

impl Default for DeviceMasker {
    fn default() -> Self {
        Self::new()
    }
}

static DEVICE_MASKER: std::sync::LazyLock<DeviceMasker> = std::sync::LazyLock::new(DeviceMasker::new);

/// Device label for display: the real id, or its dummy name when hidden.
pub fn display_name(device: &DeviceId, hidden: bool) -> String {
    if hidden {
        DEVICE_MASKER.dummy_name(device)
    } else {
        device.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_dummy_names() {
        let masker = DeviceMasker::new();
        let a = DeviceId::from("AA:BB:CC:DD:EE:01");
        let b = DeviceId::from("AA:BB:CC:DD:EE:02");

        assert_eq!(masker.dummy_name(&a), "bin-alpha");
        assert_eq!(masker.dummy_name(&b), "bin-beta");
        assert_eq!(masker.dummy_name(&a), "bin-alpha");
    }

    #[test]
    fn test_numbered_names_after_list() {
        assert_eq!(generate_dummy_name(12), "bin-mu");
        assert_eq!(generate_dummy_name(13), "bin-13");
    }

    #[test]
    fn test_display_name() {
        let device = DeviceId::from("AA:BB:CC:DD:EE:FF");
        assert_eq!(display_name(&device, false), "AA:BB:CC:DD:EE:FF");

        let hidden = display_name(&device, true);
        assert!(hidden.starts_with("bin-"));
        assert_eq!(hidden, display_name(&device, true));
    }
}
