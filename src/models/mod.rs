// Models module
pub mod reading;

pub use reading::{normalize, normalize_entry, DeviceId, RawReading, Reading};
