// Utility functions module
pub mod privacy;

pub use privacy::display_name;
