//! Keystroke driven control of the button.
use crate::console::KeySource;
use crate::pacing::Pacer;
use crate::protocol_constants::INTERRUPT_KEY;
use crate::script::{self, PHYSICAL_BUTTON_NOTE};
use crate::standard::board::Board;
use crate::{Command, Result};
use std::io;
use tracing::{debug, info};

const RULE_WIDTH: usize = 50;

/// What a single key asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Send(Command),
    Pattern,
    Quit,
    /// Ctrl+C typed while the terminal is in raw mode.
    Interrupt,
    Unknown(char),
}

impl Action {
    #[must_use]
    pub fn from_key(key: char) -> Self {
        match key {
            'p' | 'P' => Self::Pattern,
            'q' | 'Q' => Self::Quit,
            INTERRUPT_KEY => Self::Interrupt,
            _ => u8::try_from(key)
                .ok()
                .and_then(|byte| Command::from_u8(byte).ok())
                .map_or(Self::Unknown(key), Self::Send),
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    Interrupt,
    EndOfInput,
}

/// Prints the command overview shown before the first prompt.
/// # Errors
/// Fails only if `out` does.
pub fn print_banner<W: io::Write>(out: &mut W) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\nINTERACTIVE MODE\n{rule}")?;
    writeln!(out, "Commands:")?;
    for command in Command::ALL {
        writeln!(out, "  {} - {}", char::from(command.to_u8()), label(command))?;
    }
    writeln!(out, "  p - Run pattern")?;
    writeln!(out, "  q - Quit")?;
    writeln!(out, "\nNOTE: {PHYSICAL_BUTTON_NOTE}")?;
    writeln!(out, "(Open a text editor to test the Enter key functionality)")?;
    writeln!(out, "{rule}")?;
    Ok(())
}

const fn label(command: Command) -> &'static str {
    match command {
        Command::LedOff => "LED OFF",
        Command::LedOn => "LED ON",
        Command::BeepHigh => "High F beep",
        Command::BeepLow => "Middle G# beep",
    }
}

/// Reads keys and acts on them until `q`, Ctrl+C or end of input.
///
/// Every key is echoed. Unrecognised keys produce a notice and no write.
/// # Errors
/// Write failures, input failures and interrupts reported by the pacer end
/// the loop early.
pub fn run<T, K, P, W>(
    board: &mut Board<T>,
    keys: &mut K,
    pacer: &mut P,
    out: &mut W,
) -> Result<Exit>
where
    T: io::Write,
    K: KeySource,
    P: Pacer,
    W: io::Write,
{
    info!(board = board.name(), "interactive loop started");
    let exit = loop {
        pacer.check()?;
        write!(out, "\nCommand: ")?;
        out.flush()?;

        let Some(key) = keys.next_key()? else {
            writeln!(out, "\nEnd of input, exiting...")?;
            break Exit::EndOfInput;
        };
        if key.is_control() {
            writeln!(out)?;
        } else {
            writeln!(out, "{key}")?;
        }

        let action = Action::from_key(key);
        debug!(?action, "key");
        match action {
            Action::Send(command) => board.play(&script::single(command), pacer, out)?,
            Action::Pattern => board.play(&script::quick_pattern(), pacer, out)?,
            Action::Quit => {
                writeln!(out, "Exiting...")?;
                break Exit::Quit;
            }
            Action::Interrupt => {
                writeln!(out, "\nExiting...")?;
                break Exit::Interrupt;
            }
            Action::Unknown(other) => {
                writeln!(out, "Unknown command: '{}'", other.escape_default())?;
            }
        }
    };
    info!(?exit, "interactive loop finished");
    Ok(exit)
}
