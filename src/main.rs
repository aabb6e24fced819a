// binwatch: smart garbage bin monitor
use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use binwatch::alerts::{DesktopNotifier, LogNotifier, NotificationDispatcher};
use binwatch::cli::{Cli, Commands};
use binwatch::commands::{
    handle_config_action, handle_devices_command, handle_show_command, handle_test_notification_command,
    handle_watch_command,
};
use binwatch::config::Config;
use binwatch::source::ConfiguredSource;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };

    // Default behavior: device overview
    let command = cli.command.unwrap_or(Commands::Devices);

    match command {
        Commands::Config { action } => {
            handle_config_action(action, &config_path, cli.json)?;
        }
        Commands::TestNotification => {
            handle_test_notification_command(cli.json)?;
        }
        Commands::Devices => {
            let (config, mut source) = prepare(&config_path, cli.simulate)?;
            let json_output = cli.json || config.output.format == "json";
            handle_devices_command(&mut source, &config, json_output, cli.hidden).await?;
        }
        Commands::Show { device } => {
            let (config, mut source) = prepare(&config_path, cli.simulate)?;
            let json_output = cli.json || config.output.format == "json";
            handle_show_command(&mut source, &config, &device, json_output, cli.hidden).await?;
        }
        Commands::Watch {
            devices,
            interval,
            once,
        } => {
            let (config, mut source) = prepare(&config_path, cli.simulate)?;
            let json_output = cli.json || config.output.format == "json";
            let dispatcher = build_dispatcher(&config);
            handle_watch_command(
                &mut source,
                &config,
                devices,
                interval,
                once,
                json_output,
                cli.hidden,
                dispatcher.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "binwatch=debug" } else { "binwatch=info" };

    // Logs go to stderr so --json output on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn prepare(config_path: &Path, simulate: bool) -> Result<(Config, ConfiguredSource)> {
    let config = Config::load_from(config_path)?;
    let source = ConfiguredSource::from_config(&config, simulate)?;
    Ok((config, source))
}

fn build_dispatcher(config: &Config) -> Option<Box<dyn NotificationDispatcher>> {
    if !config.notifications.enabled {
        tracing::info!("notifications disabled");
        return None;
    }

    if config.notifications.desktop && DesktopNotifier::is_available() {
        Some(Box::new(DesktopNotifier::new(true)))
    } else {
        tracing::info!("desktop notifications unavailable, alerts will be logged");
        Some(Box::new(LogNotifier))
    }
}
