use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "binwatch")]
#[command(about = "Smart garbage bin monitor")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Use simulated readings instead of the configured data source
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON output format
    #[arg(long, global = true)]
    pub json: bool,

    /// Replace device identifiers with dummy names
    #[arg(short = 'd', long, global = true)]
    pub hidden: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize fresh configuration
    Init,
    /// Set configuration value
    Set {
        /// Configuration key (e.g., thresholds.gas_alert_ppm)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known bins with their latest readings
    Devices,

    /// Show the latest reading and recent history of one bin
    Show {
        /// Device identifier (e.g. its MAC address)
        device: String,
    },

    /// Poll bins continuously and send alerts
    Watch {
        /// Devices to watch (all known devices when omitted)
        devices: Vec<String>,

        /// Poll interval in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,

        /// Poll once and exit
        #[arg(long)]
        once: bool,
    },

    /// Send a test desktop notification
    #[command(name = "test-notification")]
    TestNotification,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}
