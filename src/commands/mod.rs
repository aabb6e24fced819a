// Command handlers module
pub mod config;
pub mod devices;
pub mod notify;
pub mod show;
pub mod watch;

pub use config::handle_config_action;
pub use devices::handle_devices_command;
pub use notify::handle_test_notification_command;
pub use show::handle_show_command;
pub use watch::{handle_watch_command, WatchSession};

use crate::alerts::{DeviceMonitor, DeviceUpdate};
use crate::models::DeviceId;
use crate::source::HistoryEntry;
use crate::utils::display_name;

/// Run a device's stored history through the monitor, oldest first.
pub fn process_history(
    monitor: &mut DeviceMonitor,
    device: &DeviceId,
    entries: &[HistoryEntry],
) -> Vec<DeviceUpdate> {
    entries
        .iter()
        .map(|entry| monitor.handle_entry(device, &entry.key, &entry.raw))
        .collect()
}

pub(crate) fn mask_device(mut update: DeviceUpdate, hidden: bool) -> DeviceUpdate {
    if hidden {
        update.device = DeviceId::new(display_name(&update.device, true));
    }
    update
}
