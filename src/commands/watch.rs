use anyhow::{Context, Result};
use std::io::IsTerminal;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::alerts::{DeviceMonitor, DeviceUpdate, NotificationDispatcher, Severity};
use crate::commands::mask_device;
use crate::config::Config;
use crate::models::DeviceId;
use crate::output::paint;
use crate::source::{DataSource, Poller};

/// State carried across polls: which readings were already seen, and each
/// device's previous alert decision.
pub struct WatchSession {
    devices: Vec<DeviceId>,
    poller: Poller,
    monitor: DeviceMonitor,
}

impl WatchSession {
    pub fn new(config: &Config, devices: Vec<DeviceId>) -> Self {
        Self {
            devices,
            poller: Poller::new(),
            monitor: DeviceMonitor::new(config.thresholds, config.history.window),
        }
    }

    /// Poll once, process every new reading and dispatch the alerts it raises.
    pub async fn tick<S: DataSource>(
        &mut self,
        source: &mut S,
        dispatcher: Option<&dyn NotificationDispatcher>,
    ) -> Vec<DeviceUpdate> {
        let fresh = self.poller.poll(source, &self.devices).await;

        let mut updates = Vec::with_capacity(fresh.len());
        for (device, entry) in fresh {
            let update = self.monitor.handle_entry(&device, &entry.key, &entry.raw);
            if let Some(dispatcher) = dispatcher {
                self.monitor.dispatch(&update, dispatcher);
            }
            updates.push(update);
        }
        updates
    }
}

pub async fn handle_watch_command<S: DataSource>(
    source: &mut S,
    config: &Config,
    devices: Vec<String>,
    interval_secs: Option<u64>,
    once: bool,
    json_output: bool,
    hidden: bool,
    dispatcher: Option<&dyn NotificationDispatcher>,
) -> Result<()> {
    let devices: Vec<DeviceId> = if devices.is_empty() {
        source
            .list_devices()
            .await
            .context("Failed to list devices")?
    } else {
        devices.into_iter().map(DeviceId::from).collect()
    };

    if devices.is_empty() {
        println!("No devices to watch.");
        return Ok(());
    }

    let secs = interval_secs.unwrap_or(config.source.poll_interval_secs).max(1);
    tracing::info!(devices = devices.len(), interval_secs = secs, "watching bins");

    let mut session = WatchSession::new(config, devices);
    let mut ticker = interval(Duration::from_secs(secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for update in session.tick(source, dispatcher).await {
                    print_update(mask_device(update, hidden), config.output.decimal_places, json_output)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping watch");
                break;
            }
        }

        if once {
            break;
        }
    }

    Ok(())
}

fn print_update(update: DeviceUpdate, decimal_places: u8, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string(&update)?);
        return Ok(());
    }

    println!("{}", format_update(&update, decimal_places, std::io::stdout().is_terminal()));
    Ok(())
}

/// One status line per reading; severities are colored when `color` is set.
fn format_update(update: &DeviceUpdate, decimal_places: u8, color: bool) -> String {
    let level = |severity: Severity| {
        let label = severity.label().to_uppercase();
        if color { paint(severity, &label) } else { label }
    };

    let mut line = format!(
        "[{}] {}: fill {:.0}% ({:.*} cm, {}), gas {:.0} ppm ({})",
        update.reading.timestamp,
        update.device,
        update.fill_fraction * 100.0,
        decimal_places as usize,
        update.reading.distance_cm,
        level(update.distance),
        update.reading.ppm,
        level(update.gas),
    );
    if update.decision.is_alerting() {
        line.push_str(&format!(" !! {}", update.decision.reasons.join("; ")));
    }
    line
}
