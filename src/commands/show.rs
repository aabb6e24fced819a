use anyhow::{Context, Result};
use serde_json::json;

use crate::alerts::DeviceMonitor;
use crate::commands::{mask_device, process_history};
use crate::config::Config;
use crate::models::DeviceId;
use crate::output::{fill_bar, DeviceHistory, OutputFormat};
use crate::source::DataSource;
use crate::utils::display_name;

/// Latest reading and trailing history of one bin
pub async fn handle_show_command<S: DataSource>(
    source: &mut S,
    config: &Config,
    device: &str,
    json_output: bool,
    hidden: bool,
) -> Result<()> {
    let device = DeviceId::new(device);
    let entries = source
        .fetch_history(&device)
        .await
        .with_context(|| format!("Failed to fetch readings for {}", device))?;

    // Only the trailing window is charted
    let skip = entries.len().saturating_sub(config.history.window);
    let mut monitor = DeviceMonitor::new(config.thresholds, config.history.window);
    let updates: Vec<_> = process_history(&mut monitor, &device, &entries[skip..])
        .into_iter()
        .map(|update| mask_device(update, hidden))
        .collect();

    let Some(latest) = updates.last().cloned() else {
        let label = display_name(&device, hidden);
        if json_output {
            println!("{}", json!({"device": label, "latest": null, "history": []}));
        } else {
            println!("No data available for {}.", label);
        }
        return Ok(());
    };

    if json_output {
        let body = json!({
            "device": latest.device,
            "latest": latest,
            "history": updates,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let places = config.output.decimal_places as usize;
    println!("Details for {}", latest.device);
    println!("Last Updated: {}", latest.reading.timestamp);
    println!(
        "Distance:     {:.*} cm {} ({})",
        places,
        latest.reading.distance_cm,
        fill_bar(latest.fill_fraction, 20),
        latest.distance.label().to_uppercase()
    );
    println!(
        "Gas Level:    {} - {:.0} ppm",
        latest.gas.label().to_uppercase(),
        latest.reading.ppm
    );
    for reason in &latest.decision.reasons {
        println!("  ! {}", reason);
    }
    println!();
    println!("History (last {} readings)", updates.len());
    println!("{}", DeviceHistory(updates).to_table(config.output.decimal_places));

    Ok(())
}
