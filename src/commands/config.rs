use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn handle_config_action(action: ConfigAction, config_path: &Path, json_output: bool) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::default()
                .save_to(config_path)
                .context("Failed to initialize config")?;
            if json_output {
                println!(
                    "{}",
                    json!({"status": "success", "message": "Configuration initialized successfully"})
                );
            } else {
                println!("Configuration initialized at: {}", config_path.display());
            }
        }
        ConfigAction::Show => {
            let config = Config::load_from(config_path).context("Failed to load config")?;
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config).context("Failed to serialize config to JSON")?
                );
            } else {
                let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("Configuration ({})", config_path.display());
                println!("{}", toml_str);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_from(config_path).context("Failed to load config")?;
            config
                .set_value(&key, &value)
                .context("Invalid configuration")?;
            config.save_to(config_path).context("Failed to save config")?;
            tracing::debug!(%key, %value, "configuration updated");
            if json_output {
                println!("{}", set_confirmation_json(&key, &value));
            } else {
                println!("Configuration updated: {} = {}", key, value);
            }
        }
    }
    Ok(())
}

fn set_confirmation_json(key: &str, value: &str) -> serde_json::Value {
    json!({
        "status": "success",
        "message": format!("Configuration updated: {} = {}", key, value),
    })
}
