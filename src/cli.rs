use bigbutton::config::ButtonConfig;
use bigbutton::{Command, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bigbutton", version, about = "Drive a USB-serial Big Internet Button", long_about = None)]
pub struct Args {
    /// Serial device path (default: /dev/ttyACM0)
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Baud rate (default: 9600)
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// Milliseconds to wait after opening the port (default: 2000)
    #[arg(long, global = true)]
    pub settle_ms: Option<u64>,

    /// JSON file with device, baud_rate and settle_ms
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Run the light and sound show
    Demo,
    /// Exercise every action, then take single-key commands
    Test {
        /// Go straight to the interactive loop
        #[arg(long)]
        skip_self_test: bool,
    },
    /// Single-key commands only
    Interactive,
    /// Send one command: led-off, led-on, beep-high, beep-low (or 1-4)
    Send { command: Command },
}

impl Args {
    /// Defaults, then the config file, then flags.
    pub fn resolve_config(&self) -> Result<ButtonConfig> {
        let mut config = match &self.config {
            Some(path) => ButtonConfig::load(path)?,
            None => ButtonConfig::default(),
        };
        if let Some(device) = &self.device {
            config.device = device.clone();
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(settle_ms) = self.settle_ms {
            config.settle_ms = settle_ms;
        }
        config.validate()?;
        Ok(config)
    }
}
