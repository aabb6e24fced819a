// Output module
pub mod table;

pub use table::{fill_bar, paint, DeviceHistory, DeviceOverview, OutputFormat};
