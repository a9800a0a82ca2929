//#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A host-side driver for the Big Internet Button, a USB-serial gadget with
//! one LED and a piezo beeper.
//!
//! The device understands four single ASCII bytes and never answers. This
//! crate wraps that in a [`Command`] type, a synchronous
//! [`standard::board::Board`] that owns the serial port for one session, an
//! async twin in [`asynchronous`], and the scripted shows in [`script`].
pub mod asynchronous;
pub mod config;
pub mod console;
pub mod interactive;
pub mod pacing;
mod protocol_constants;
pub mod script;
pub mod session;
pub mod standard;

pub use protocol_constants::{
    BAUD_RATE, DEFAULT_DEVICE_PATH, INTERRUPT_KEY, SETTLE_PERIOD, WIRE_BEEP_HIGH, WIRE_BEEP_LOW,
    WIRE_LED_OFF, WIRE_LED_ON,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every action the button firmware knows about.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Command {
    LedOff = WIRE_LED_OFF,
    LedOn = WIRE_LED_ON,
    /// High F, roughly 100ms on the device.
    BeepHigh = WIRE_BEEP_HIGH,
    /// Middle G#, roughly 100ms on the device.
    BeepLow = WIRE_BEEP_LOW,
}

impl Command {
    pub const ALL: [Self; 4] = [Self::LedOff, Self::LedOn, Self::BeepHigh, Self::BeepLow];

    /// The byte written to the serial port for this command.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Maps a wire byte back onto a command.
    /// # Errors
    /// Returns [`ButtonError::UnknownCommand`] for anything outside `'1'..='4'`.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            WIRE_LED_OFF => Ok(Self::LedOff),
            WIRE_LED_ON => Ok(Self::LedOn),
            WIRE_BEEP_HIGH => Ok(Self::BeepHigh),
            WIRE_BEEP_LOW => Ok(Self::BeepLow),
            _ => Err(ButtonError::UnknownCommand(
                char::from(value).escape_default().to_string(),
            )),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LedOff => "led-off",
            Self::LedOn => "led-on",
            Self::BeepHigh => "beep-high",
            Self::BeepLow => "beep-low",
        }
    }

    /// Progress line printed when the command is issued interactively.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::LedOff => "Turning LED OFF...",
            Self::LedOn => "Turning LED ON...",
            Self::BeepHigh => "Playing High F beep (100ms)...",
            Self::BeepLow => "Playing Middle G# beep (100ms)...",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either the kebab-case name or the wire digit itself.
impl FromStr for Command {
    type Err = ButtonError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let [byte] = trimmed.as_bytes() {
            return Self::from_u8(*byte);
        }
        Self::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ButtonError::UnknownCommand(trimmed.to_string()))
    }
}

/// Button result type
pub type Result<T> = std::result::Result<T, ButtonError>;
/// Button error that wraps all underlying errors for consistency
#[derive(Debug, thiserror::Error)]
pub enum ButtonError {
    #[error("could not open serial port {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: tokio_serial::Error,
    },
    #[error("underlying io error {0}")]
    Io(#[from] std::io::Error),
    #[error("serial connection is already closed")]
    Closed,
    #[error("interrupted by user")]
    Interrupted,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("config error `{0}`")]
    Config(String),
    #[error("config parse error {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("terminal error `{0}`")]
    Terminal(String),
}
