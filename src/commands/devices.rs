use anyhow::{Context, Result};

use crate::alerts::{DeviceMonitor, DeviceUpdate};
use crate::commands::{mask_device, process_history};
use crate::config::Config;
use crate::output::{DeviceOverview, OutputFormat};
use crate::source::DataSource;

/// Overview of every known bin with its latest reading
pub async fn handle_devices_command<S: DataSource>(
    source: &mut S,
    config: &Config,
    json_output: bool,
    hidden: bool,
) -> Result<()> {
    let devices = source
        .list_devices()
        .await
        .context("Failed to list devices")?;

    let mut monitor = DeviceMonitor::new(config.thresholds, config.history.window);
    let mut latest: Vec<DeviceUpdate> = Vec::new();

    for device in &devices {
        match source.fetch_history(device).await {
            Ok(entries) => {
                if let Some(update) = process_history(&mut monitor, device, &entries).pop() {
                    latest.push(mask_device(update, hidden));
                }
            }
            Err(e) => {
                tracing::warn!(device = %device, error = %e, "failed to fetch readings");
            }
        }
    }

    let overview = DeviceOverview(latest);
    if json_output {
        println!("{}", overview.to_json()?);
    } else {
        println!("Bins: {}", devices.len());
        println!("{}", overview.to_table(config.output.decimal_places));
    }

    Ok(())
}
