use crate::protocol_constants::{BAUD_RATE, DEFAULT_DEVICE_PATH, SETTLE_PERIOD};
use crate::{ButtonError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Where the button lives and how to talk to it.
///
/// Every field is optional in a config file; missing ones fall back to the
/// stock `/dev/ttyACM0`, 9600 baud, two second settle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonConfig {
    pub device: String,
    pub baud_rate: u32,
    pub settle_ms: u64,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE_PATH.to_string(),
            baud_rate: BAUD_RATE,
            settle_ms: SETTLE_PERIOD.as_millis() as u64,
        }
    }
}

impl ButtonConfig {
    /// Reads a JSON config file.
    /// # Errors
    /// [`ButtonError::Config`] if the file cannot be read,
    /// [`ButtonError::ConfigParse`] if it is not valid config JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ButtonError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// # Errors
    /// [`ButtonError::ConfigParse`] on malformed JSON or unknown keys.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// [`ButtonError::Config`] for an empty device path or a zero baud rate.
    pub fn validate(&self) -> Result<()> {
        if self.device.trim().is_empty() {
            return Err(ButtonError::Config("device path is empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(ButtonError::Config("baud rate must be positive".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
